//! Fortuna bot front end.
//!
//! [console] stands in for the chat transport: it reads slash commands line by line and
//! answers through the [fortuna_execution::RouletteTable]. [simulate] runs Monte Carlo
//! estimates of the house edge the bias model produces for a given player context.

pub mod config;
pub mod console;
pub mod simulate;

pub use config::{Config, ConfigError, ValidatedConfig};
