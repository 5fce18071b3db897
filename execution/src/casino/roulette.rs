//! Roulette bet classification, outcome sampling, and settlement.
//!
//! Bet tokens (case-insensitive):
//! - `red`/`black` (also `r`, `b`, `красное`, `черное`): 18 numbers, pays 2x
//! - `even`/`odd` (also `чет`, `нечет`): 18 numbers, pays 2x
//! - `1-18`/`19-36` (also `low`, `high`): 18 numbers, pays 2x
//! - `1-12`, `13-24`, `25-36` (also `d1`..`d3`): 12 numbers, pays 3x
//! - `row1`..`row3` (also `col1`..`col3`): 12 numbers, pays 3x
//! - `zero` (also `0`, `зеро`): pays 36x
//! - `n` for 1..=36: pays 36x
//! - `a-b`: any twelve consecutive numbers, pays 3x
//!
//! The draw is two-bucket: the bias model decides whether this spin is a win, and the pocket
//! is then picked uniformly from the winning set or from its complement.

use fortuna_types::casino::{
    BetKind, Color, Rank, DOZEN_MULTIPLIER, EVEN_MONEY_MULTIPLIER, MAX_ROULETTE_NUMBER,
    ROULETTE_POCKETS, STRAIGHT_MULTIPLIER,
};
use rand::Rng;
use tracing::debug;

use super::{BiasConfig, BiasInputs, GameError};

/// Mask with bits 0..=36 set.
const WHEEL_MASK: u64 = (1u64 << ROULETTE_POCKETS) - 1;

/// Stake as requested by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stake {
    Amount(u64),
    /// Entire current balance.
    AllIn,
}

impl Stake {
    /// Resolve the stake against `balance`, rejecting empty stakes.
    pub fn resolve(self, balance: u64) -> Result<u64, GameError> {
        let amount = match self {
            Stake::Amount(amount) => amount,
            Stake::AllIn => balance,
        };
        if amount == 0 {
            return Err(GameError::InvalidStake);
        }
        Ok(amount)
    }
}

/// Numbers that make a bet win, with the gross multiplier paid when one is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WinningSet {
    mask: u64,
    multiplier: u64,
}

impl WinningSet {
    pub fn of(kind: BetKind) -> Self {
        let mask = (0..=MAX_ROULETTE_NUMBER)
            .filter(|n| kind.covers(*n))
            .fold(0u64, |mask, n| mask | (1 << n));
        Self {
            mask,
            multiplier: multiplier(kind),
        }
    }

    pub fn contains(&self, number: u8) -> bool {
        number <= MAX_ROULETTE_NUMBER && self.mask & (1 << number) != 0
    }

    pub fn cardinality(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=MAX_ROULETTE_NUMBER).filter(move |n| self.contains(*n))
    }

    fn complement_mask(&self) -> u64 {
        !self.mask & WHEEL_MASK
    }
}

/// Gross payout multiplier for a bet kind (stake included).
fn multiplier(kind: BetKind) -> u64 {
    match kind {
        BetKind::Red
        | BetKind::Black
        | BetKind::Even
        | BetKind::Odd
        | BetKind::Low
        | BetKind::High => EVEN_MONEY_MULTIPLIER,
        BetKind::Dozen { .. } | BetKind::Row { .. } | BetKind::Range { .. } => DOZEN_MULTIPLIER,
        BetKind::Zero | BetKind::Straight { .. } => STRAIGHT_MULTIPLIER,
    }
}

/// Classify a raw bet token.
pub fn classify(token: &str) -> Result<BetKind, GameError> {
    let normalized = token.trim().to_lowercase();
    let unrecognized = || GameError::UnrecognizedBetKind(token.trim().to_string());
    if normalized.is_empty() || normalized.contains(char::is_whitespace) {
        return Err(unrecognized());
    }

    let kind = match normalized.as_str() {
        "red" | "r" | "красное" | "красный" | "кр" => BetKind::Red,
        "black" | "b" | "черное" | "чёрное" | "черный" | "чёрный" | "ч" => BetKind::Black,
        "even" | "чет" | "чёт" => BetKind::Even,
        "odd" | "нечет" | "нечёт" => BetKind::Odd,
        "low" => BetKind::Low,
        "high" => BetKind::High,
        "zero" | "зеро" | "0" => BetKind::Zero,
        "d1" => BetKind::Dozen { index: 0 },
        "d2" => BetKind::Dozen { index: 1 },
        "d3" => BetKind::Dozen { index: 2 },
        "row1" | "col1" => BetKind::Row { index: 0 },
        "row2" | "col2" => BetKind::Row { index: 1 },
        "row3" | "col3" => BetKind::Row { index: 2 },
        other => {
            if let Some((low, high)) = other.split_once('-') {
                return classify_range(low, high)?.ok_or_else(unrecognized);
            }
            match other.parse::<u8>() {
                Ok(number) if (1..=MAX_ROULETTE_NUMBER).contains(&number) => {
                    BetKind::Straight { number }
                }
                _ => return Err(unrecognized()),
            }
        }
    };
    Ok(kind)
}

/// Classify `low-high`. `Ok(None)` means the token is not a range bet at all.
fn classify_range(low: &str, high: &str) -> Result<Option<BetKind>, GameError> {
    let (Ok(low), Ok(high)) = (low.parse::<i64>(), high.parse::<i64>()) else {
        return Ok(None);
    };
    let max = i64::from(MAX_ROULETTE_NUMBER);
    if low < 1 || high > max || low > high {
        return Err(GameError::InvalidRange { low, high });
    }

    // Bounds were checked above
    let (low, high) = (low as u8, high as u8);
    let kind = match (low, high) {
        (1, 18) => BetKind::Low,
        (19, 36) => BetKind::High,
        (1, 12) => BetKind::Dozen { index: 0 },
        (13, 24) => BetKind::Dozen { index: 1 },
        (25, 36) => BetKind::Dozen { index: 2 },
        _ if high - low + 1 == 12 => BetKind::Range { low, high },
        _ => return Ok(None),
    };
    Ok(Some(kind))
}

/// Position of the `index`-th set bit of `mask`.
fn nth_member(mut mask: u64, index: u32) -> u8 {
    for _ in 0..index {
        mask &= mask - 1;
    }
    mask.trailing_zeros() as u8
}

fn pick<R: Rng + ?Sized>(mask: u64, rng: &mut R) -> u8 {
    let count = mask.count_ones();
    nth_member(mask, rng.gen_range(0..count))
}

/// Draw a pocket: a win draw with probability `win_probability`, otherwise a loss draw.
pub fn sample<R: Rng + ?Sized>(set: &WinningSet, win_probability: f64, rng: &mut R) -> u8 {
    let roll: f64 = rng.gen();
    if roll < win_probability && !set.is_empty() {
        return pick(set.mask, rng);
    }
    let complement = set.complement_mask();
    if complement == 0 {
        return rng.gen_range(0..=MAX_ROULETTE_NUMBER);
    }
    pick(complement, rng)
}

/// Result of one spin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub drawn: u8,
    pub color: Color,
    pub won: bool,
    /// Zero when the bet lost.
    pub multiplier: u64,
    /// Stake times multiplier, zero when the bet lost.
    pub payout: u64,
}

/// Settle a bet against a drawn pocket.
pub fn settle(set: &WinningSet, drawn: u8, stake: u64) -> Outcome {
    let won = set.contains(drawn);
    let multiplier = if won { set.multiplier() } else { 0 };
    Outcome {
        drawn,
        color: Color::of(drawn),
        won,
        multiplier,
        payout: stake.saturating_mul(multiplier),
    }
}

/// Player snapshot consumed by one resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EconomicContext {
    pub balance: u64,
    pub rank: Rank,
    pub loss_streak: u32,
    /// Consecutive bets of the same kind, counting the bet being resolved.
    pub same_kind_streak: u32,
}

/// A settled bet together with the inputs that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub kind: BetKind,
    pub stake: u64,
    pub win_probability: f64,
    pub outcome: Outcome,
}

/// Stateless resolver over a validated [BiasConfig].
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    config: BiasConfig,
}

impl Resolver {
    pub fn new(config: BiasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BiasConfig {
        &self.config
    }

    /// Win probability for `kind` at `stake` given `context`.
    pub fn win_probability(&self, kind: BetKind, stake: u64, context: &EconomicContext) -> f64 {
        self.config.win_probability(&BiasInputs {
            balance: context.balance,
            stake,
            cardinality: WinningSet::of(kind).cardinality(),
            rank: context.rank,
            loss_streak: context.loss_streak,
            same_kind_streak: context.same_kind_streak,
        })
    }

    /// Classify `token` and resolve it.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        token: &str,
        stake: Stake,
        context: &EconomicContext,
        rng: &mut R,
    ) -> Result<Resolution, GameError> {
        let kind = classify(token)?;
        self.resolve_kind(kind, stake, context, rng)
    }

    pub fn resolve_kind<R: Rng + ?Sized>(
        &self,
        kind: BetKind,
        stake: Stake,
        context: &EconomicContext,
        rng: &mut R,
    ) -> Result<Resolution, GameError> {
        let stake = stake.resolve(context.balance)?;
        let set = WinningSet::of(kind);
        let win_probability = self.win_probability(kind, stake, context);
        let outcome = settle(&set, sample(&set, win_probability, rng), stake);
        debug!(
            %kind,
            stake,
            balance = context.balance,
            rank = %context.rank,
            loss_streak = context.loss_streak,
            same_kind_streak = context.same_kind_streak,
            win_probability,
            drawn = outcome.drawn,
            won = outcome.won,
            "resolved roulette bet"
        );
        Ok(Resolution {
            kind,
            stake,
            win_probability,
            outcome,
        })
    }
}
