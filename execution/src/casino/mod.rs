//! Roulette resolution.
//!
//! Classification turns a bet token into a [fortuna_types::casino::BetKind], the
//! [bias] model turns the player's economic context into a win probability, and
//! [roulette] draws the pocket and settles the bet.

use thiserror::Error;

pub mod bias;
pub mod logging;
pub mod payload;
pub mod roulette;

pub use bias::{BiasConfig, BiasConfigError, BiasInputs};
pub use payload::parse_stake;
pub use roulette::{
    classify, sample, settle, EconomicContext, Outcome, Resolution, Resolver, Stake, WinningSet,
};

/// Validation failures raised before any probability computation or draw.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unrecognized bet kind: {0:?}")]
    UnrecognizedBetKind(String),
    #[error("stake must be a positive amount")]
    InvalidStake,
    #[error("invalid range {low}-{high}: bounds must satisfy 1 <= low <= high <= 36")]
    InvalidRange { low: i64, high: i64 },
}
