use fortuna_types::casino::Color;
use std::fmt::Write;

use super::Resolution;

/// `1234567` -> `1 234 567`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(' ');
        }
        out.push(digit);
    }
    out
}

pub fn color_glyph(color: Color) -> &'static str {
    match color {
        Color::Red => "🔴",
        Color::Black => "⚫",
        Color::Green => "🟢",
    }
}

/// One-line chat summary of a settled bet.
pub fn format_resolution(resolution: &Resolution, balance_after: u64) -> String {
    let outcome = &resolution.outcome;
    let mut out = String::with_capacity(96);
    let _ = write!(
        out,
        "{} {} | bet {} on {}",
        color_glyph(outcome.color),
        outcome.drawn,
        format_amount(resolution.stake),
        resolution.kind
    );
    if outcome.won {
        let _ = write!(
            out,
            " | won {} (x{})",
            format_amount(outcome.payout),
            outcome.multiplier
        );
    } else {
        out.push_str(" | lost");
    }
    let _ = write!(out, " | balance {}", format_amount(balance_after));
    out
}
