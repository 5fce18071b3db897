//! Casino domain types.
//!
//! Defines player/profile/leaderboard state and the roulette vocabulary used by the execution
//! layer and clients.

mod constants;
mod history;
mod leaderboard;
mod player;
mod roulette;

pub use constants::*;
pub use history::*;
pub use leaderboard::*;
pub use player::*;
pub use roulette::*;
