use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::{BetKind, BET_HISTORY_WINDOW_SECS, MAX_BET_HISTORY};

/// One settled bet, as remembered by the sliding window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    pub kind: BetKind,
    pub stake: u64,
    pub won: bool,
    /// Unix seconds supplied by the caller.
    pub at: u64,
}

/// Sliding window of a player's recent bets.
///
/// Entries older than [BET_HISTORY_WINDOW_SECS] relative to the newest timestamp seen are
/// dropped on insert. The bias model does not read this window; it only consumes the
/// streak counters derived alongside it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BetHistory {
    entries: VecDeque<BetRecord>,
}

impl BetHistory {
    pub fn push(&mut self, record: BetRecord) {
        self.prune(record.at);
        self.entries.push_back(record);
        while self.entries.len() > MAX_BET_HISTORY {
            self.entries.pop_front();
        }
    }

    /// Drop every entry that fell out of the window ending at `now`.
    pub fn prune(&mut self, now: u64) {
        while let Some(front) = self.entries.front() {
            if front.at.saturating_add(BET_HISTORY_WINDOW_SECS) >= now {
                break;
            }
            self.entries.pop_front();
        }
    }

    /// Entries still inside the window ending at `now`.
    pub fn recent(&self, now: u64) -> impl Iterator<Item = &BetRecord> {
        self.entries
            .iter()
            .filter(move |record| record.at.saturating_add(BET_HISTORY_WINDOW_SECS) >= now)
    }

    pub fn last(&self) -> Option<&BetRecord> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BetRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
