use fortuna_types::casino::{BILLION, MILLION, THOUSAND, TRILLION};

use super::{GameError, Stake};

/// Longest accepted fractional part (`1.25k`).
const MAX_FRACTION_DIGITS: u32 = 12;

fn suffix_scale(suffix: &str) -> Option<u64> {
    if !suffix.is_empty() && suffix.chars().all(|c| c == 'k' || c == 'к') {
        // 1k = 1e3, 1kk = 1e6, ...
        return match suffix.chars().count() {
            1 => Some(THOUSAND),
            2 => Some(MILLION),
            3 => Some(BILLION),
            4 => Some(TRILLION),
            _ => None,
        };
    }
    match suffix {
        "" => Some(1),
        "m" | "м" => Some(MILLION),
        "b" | "млрд" => Some(BILLION),
        "t" | "трлн" => Some(TRILLION),
        _ => None,
    }
}

/// Parse a stake token: `all`/`max` for the whole balance, otherwise a positive amount with an
/// optional `k`/`m`/`b`/`t` suffix (`250`, `1_000`, `1.5k`, `2kk`).
pub fn parse_stake(token: &str) -> Result<Stake, GameError> {
    let normalized: String = token
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '_')
        .collect();

    if matches!(
        normalized.as_str(),
        "all" | "max" | "allin" | "все" | "всё" | "вабанк"
    ) {
        return Ok(Stake::AllIn);
    }

    let split = normalized
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(normalized.len());
    let (number, suffix) = normalized.split_at(split);
    let scale = suffix_scale(suffix).ok_or(GameError::InvalidStake)?;

    let (whole, fraction) = match number.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(GameError::InvalidStake);
    }
    if !fraction.chars().all(|c| c.is_ascii_digit())
        || fraction.len() as u32 > MAX_FRACTION_DIGITS
        || (!fraction.is_empty() && scale == 1)
    {
        return Err(GameError::InvalidStake);
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| GameError::InvalidStake)?
    };
    let mut amount = whole
        .checked_mul(u128::from(scale))
        .ok_or(GameError::InvalidStake)?;
    if !fraction.is_empty() {
        let digits: u128 = fraction.parse().map_err(|_| GameError::InvalidStake)?;
        let denominator = 10u128.pow(fraction.len() as u32);
        amount = amount
            .checked_add(digits * u128::from(scale) / denominator)
            .ok_or(GameError::InvalidStake)?;
    }

    let amount = u64::try_from(amount).map_err(|_| GameError::InvalidStake)?;
    ensure_nonzero_amount(amount)?;
    Ok(Stake::Amount(amount))
}

pub(crate) fn ensure_nonzero_amount(amount: u64) -> Result<(), GameError> {
    if amount == 0 {
        return Err(GameError::InvalidStake);
    }
    Ok(())
}
