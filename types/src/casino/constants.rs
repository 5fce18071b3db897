/// Maximum name length for player registration
pub const MAX_NAME_LENGTH: usize = 32;

/// Starting balance for new players
pub const STARTING_BALANCE: u64 = 10_000;

/// Highest number on the wheel (0..=36).
pub const MAX_ROULETTE_NUMBER: u8 = 36;

/// Number of pockets on a single-zero wheel.
pub const ROULETTE_POCKETS: usize = 37;

/// Red numbers on a roulette wheel.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Payout multipliers (gross, stake included).
pub const EVEN_MONEY_MULTIPLIER: u64 = 2;
pub const DOZEN_MULTIPLIER: u64 = 3;
pub const STRAIGHT_MULTIPLIER: u64 = 36;

/// Players outside this many leaderboard places are unranked.
pub const LEADERBOARD_SIZE: usize = 100;

/// Retention of the per-player bet history window (5 minutes).
pub const BET_HISTORY_WINDOW_SECS: u64 = 5 * 60;

/// Hard cap on retained history entries regardless of the window.
pub const MAX_BET_HISTORY: usize = 256;

/// Currency scale helpers.
pub const THOUSAND: u64 = 1_000;
pub const MILLION: u64 = 1_000_000;
pub const BILLION: u64 = 1_000_000_000;
pub const TRILLION: u64 = 1_000_000_000_000;
