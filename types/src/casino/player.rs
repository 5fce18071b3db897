use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::{BetHistory, BetKind, BetRecord, BET_HISTORY_WINDOW_SECS, MAX_NAME_LENGTH};

/// Chat-level user identifier.
pub type PlayerId = u64;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum PlayerInvariantError {
    #[error("player name too long (len={len}, max={max})")]
    NameTooLong { len: usize, max: usize },
    #[error("player name is empty")]
    NameEmpty,
    #[error("same-kind streak recorded without a count")]
    EmptyKindStreak,
}

/// Consecutive bets of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStreak {
    pub kind: BetKind,
    pub count: u32,
    /// Unix seconds of the most recent bet in the streak.
    pub last_at: u64,
}

/// Per-player gambling state threaded between resolutions.
///
/// Counters change only through [GamblingProfile::record], which applies the
/// post-resolution contract: a win clears the loss streak, a loss extends it, and the
/// same-kind streak grows while the kind repeats inside the history window.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamblingProfile {
    pub loss_streak: u32,
    #[serde(default)]
    pub same_kind: Option<KindStreak>,
    #[serde(default)]
    pub history: BetHistory,
}

impl GamblingProfile {
    /// Same-kind streak a bet of `kind` placed at `now` would carry, counting that bet.
    pub fn streak_for(&self, kind: BetKind, now: u64) -> u32 {
        match &self.same_kind {
            Some(streak)
                if streak.kind == kind
                    && now.saturating_sub(streak.last_at) <= BET_HISTORY_WINDOW_SECS =>
            {
                streak.count.saturating_add(1)
            }
            _ => 1,
        }
    }

    /// Apply the outcome of a settled bet.
    pub fn record(&mut self, kind: BetKind, stake: u64, won: bool, now: u64) {
        let count = self.streak_for(kind, now);
        self.same_kind = Some(KindStreak {
            kind,
            count,
            last_at: now,
        });
        self.loss_streak = if won {
            0
        } else {
            self.loss_streak.saturating_add(1)
        };
        self.history.push(BetRecord {
            kind,
            stake,
            won,
            at: now,
        });
    }
}

/// Player record as kept by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub balance: u64,
    /// Unix seconds at registration.
    pub created_at: u64,
    #[serde(default)]
    pub gambling: GamblingProfile,
}

impl Player {
    pub fn new(id: PlayerId, name: String, balance: u64, created_at: u64) -> Self {
        Self {
            id,
            name,
            balance,
            created_at,
            gambling: GamblingProfile::default(),
        }
    }

    pub fn validate_invariants(&self) -> Result<(), PlayerInvariantError> {
        if self.name.trim().is_empty() {
            return Err(PlayerInvariantError::NameEmpty);
        }
        let len = self.name.chars().count();
        if len > MAX_NAME_LENGTH {
            return Err(PlayerInvariantError::NameTooLong {
                len,
                max: MAX_NAME_LENGTH,
            });
        }
        if matches!(self.gambling.same_kind, Some(KindStreak { count: 0, .. })) {
            return Err(PlayerInvariantError::EmptyKindStreak);
        }
        Ok(())
    }
}
