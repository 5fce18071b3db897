//! Fortuna execution layer.
//!
//! This crate contains the roulette resolution engine ([casino]) and the caller around it
//! ([table::RouletteTable]) used by the bot.
//!
//! ## Determinism requirements
//! - Do not read wall-clock time inside resolution; callers pass `now` explicitly.
//! - Only draw randomness from the `rand::Rng` handed in by the caller.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Minimal resolution (example)
//! ```rust
//! use fortuna_execution::casino::{EconomicContext, Resolver, Stake};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let resolver = Resolver::default();
//! let context = EconomicContext {
//!     balance: 10_000,
//!     same_kind_streak: 1,
//!     ..Default::default()
//! };
//! let mut rng = StdRng::seed_from_u64(7);
//! let resolution = resolver
//!     .resolve("13-24", Stake::Amount(500), &context, &mut rng)
//!     .unwrap();
//! assert!(resolution.win_probability <= resolver.config().ceiling(12));
//! ```

pub mod casino;
pub mod state;
pub mod table;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use casino::{
    classify, parse_stake, BiasConfig, BiasConfigError, EconomicContext, GameError, Outcome,
    Resolution, Resolver, Stake, WinningSet,
};
pub use state::{JsonStore, Memory, Store};
pub use table::{RouletteTable, Spin, TableError};
