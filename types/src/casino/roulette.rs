use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MAX_ROULETTE_NUMBER, RED_NUMBERS};

/// Pocket colour on a single-zero wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    /// Colour of a pocket. Numbers above 36 are not on the wheel and read as green.
    pub fn of(number: u8) -> Self {
        if number == 0 || number > MAX_ROULETTE_NUMBER {
            Color::Green
        } else if RED_NUMBERS.contains(&number) {
            Color::Red
        } else {
            Color::Black
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "red",
            Color::Black => "black",
            Color::Green => "green",
        };
        f.write_str(name)
    }
}

/// A single roulette wager category.
///
/// Dozens and rows carry a zero-based index (0, 1, 2). Rows are the residue classes of
/// 1..=36 modulo 3: row 0 holds 1, 4, 7..., row 1 holds 2, 5, 8..., row 2 holds 3, 6, 9...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BetKind {
    Red,
    Black,
    Even,
    Odd,
    /// 1-18
    Low,
    /// 19-36
    High,
    Dozen { index: u8 },
    Row { index: u8 },
    Zero,
    Straight { number: u8 },
    /// Inclusive custom range of twelve consecutive numbers.
    Range { low: u8, high: u8 },
}

impl BetKind {
    /// Whether the bet wins when `result` is drawn.
    pub fn covers(&self, result: u8) -> bool {
        if result > MAX_ROULETTE_NUMBER {
            return false;
        }

        // Zero loses all except bets placed on zero itself
        if result == 0 {
            return matches!(self, BetKind::Zero | BetKind::Straight { number: 0 });
        }

        match *self {
            BetKind::Red => Color::of(result) == Color::Red,
            BetKind::Black => Color::of(result) == Color::Black,
            BetKind::Even => result % 2 == 0,
            BetKind::Odd => result % 2 == 1,
            BetKind::Low => result <= 18,
            BetKind::High => result >= 19,
            BetKind::Dozen { index } => (result - 1) / 12 == index,
            BetKind::Row { index } => (result - 1) % 3 == index,
            BetKind::Zero => false,
            BetKind::Straight { number } => number == result,
            BetKind::Range { low, high } => (low..=high).contains(&result),
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BetKind::Red => f.write_str("red"),
            BetKind::Black => f.write_str("black"),
            BetKind::Even => f.write_str("even"),
            BetKind::Odd => f.write_str("odd"),
            BetKind::Low => f.write_str("1-18"),
            BetKind::High => f.write_str("19-36"),
            BetKind::Dozen { index } => {
                let low = u16::from(index) * 12 + 1;
                write!(f, "{}-{}", low, low + 11)
            }
            BetKind::Row { index } => write!(f, "row{}", index + 1),
            BetKind::Zero => f.write_str("zero"),
            BetKind::Straight { number } => write!(f, "{}", number),
            BetKind::Range { low, high } => write!(f, "{}-{}", low, high),
        }
    }
}

/// Leaderboard position used by the bias model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    /// 1-based place on the leaderboard.
    Ranked(u32),
    #[default]
    Unranked,
}

impl Rank {
    pub fn position(&self) -> Option<u32> {
        match self {
            Rank::Ranked(place) => Some(*place),
            Rank::Unranked => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Ranked(place) => write!(f, "#{}", place),
            Rank::Unranked => f.write_str("unranked"),
        }
    }
}
