//! Common types used throughout fortuna.
//!
//! Player records, the per-player gambling profile, the leaderboard read model, and the
//! roulette vocabulary (bet kinds, colours, ranks) shared by the execution layer and the bot.

pub mod casino;
