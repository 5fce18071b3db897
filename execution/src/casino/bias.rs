//! Win-probability bias model.
//!
//! The model is a fixed pipeline of adjustments applied to a single scalar:
//!
//! 1. base loss chance by balance tier
//! 2. stake-share penalty, loss chance capped at [BiasConfig::max_loss_chance]
//! 3. `p = 1 - loss`
//! 4. per-kind ceiling by winning-set cardinality
//! 5. loss-streak boost (never above the ceiling; single numbers re-clamped)
//! 6. top-of-leaderboard penalty
//! 7. high-probability risk correction
//! 8. same-kind streak penalty with its own floor
//! 9. large absolute stake penalty
//! 10. absolute wealth penalty
//! 11. "curse of luck" shave above 40%
//! 12. floor at a fraction of the ceiling
//!
//! Every tunable lives in [BiasConfig]; its `Default` is the reference tuning. Steps 6
//! through 11 only ever multiply by factors in (0, 1] or divide by values >= 1, so the
//! result stays within `[floor_ratio * ceiling, ceiling]`.

use fortuna_types::casino::{Rank, BILLION, MILLION, TRILLION};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Basis points in 100%.
const BPS: u128 = 10_000;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum BiasConfigError {
    #[error("{table} must be strictly ascending (row {index})")]
    NotAscending { table: &'static str, index: usize },
    #[error("{field} must be a probability in [0, 1] (got {value})")]
    InvalidProbability { field: &'static str, value: f64 },
    #[error("{field} must be a factor in (0, 1] (got {value})")]
    InvalidFactor { field: &'static str, value: f64 },
    #[error("leaderboard penalties must not favour higher ranks (rank {rank})")]
    RankOrdering { rank: usize },
    #[error("ceiling rule {index} has min {min} > max {max}")]
    InvalidCeilingRule { index: usize, min: usize, max: usize },
}

/// One row of an ordered tier table: applies to inputs `<= up_to`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub up_to: u64,
    pub value: f64,
}

/// Ordered lookup table: the first tier whose bound covers the input wins, `above` applies
/// past the last bound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub tiers: Vec<Tier>,
    pub above: f64,
}

impl TierTable {
    pub fn lookup(&self, input: u64) -> f64 {
        self.tiers
            .iter()
            .find(|tier| input <= tier.up_to)
            .map(|tier| tier.value)
            .unwrap_or(self.above)
    }

    fn validate(
        &self,
        table: &'static str,
        check: fn(&'static str, f64) -> Result<(), BiasConfigError>,
    ) -> Result<(), BiasConfigError> {
        for (index, pair) in self.tiers.windows(2).enumerate() {
            if pair[0].up_to >= pair[1].up_to {
                return Err(BiasConfigError::NotAscending {
                    table,
                    index: index + 1,
                });
            }
        }
        for tier in &self.tiers {
            check(table, tier.value)?;
        }
        check(table, self.above)
    }
}

/// Multiplier applied once an input reaches `at_least`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub at_least: u64,
    pub factor: f64,
}

/// Ceiling for winning sets whose cardinality falls in `min..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CeilingRule {
    pub min: usize,
    pub max: usize,
    pub ceiling: f64,
}

/// Additive boost once the loss streak reaches `min_streak`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreakBoost {
    pub min_streak: u32,
    pub boost: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskCorrection {
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub slope: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SameKindPenalty {
    pub min_streak: u32,
    pub factor: f64,
    /// Floor as a fraction of the per-kind ceiling.
    pub floor_ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curse {
    pub threshold: f64,
    pub max_shave: f64,
}

/// Tuning surface of the bias model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasConfig {
    /// Base loss chance keyed by balance.
    pub balance_tiers: TierTable,
    /// Extra loss chance keyed by stake share of balance, in basis points.
    pub stake_share_bands: TierTable,
    pub max_loss_chance: f64,
    pub ceilings: Vec<CeilingRule>,
    pub default_ceiling: f64,
    pub single_number_cap: f64,
    pub loss_streak_boosts: Vec<StreakBoost>,
    /// Factor for leaderboard places 1, 2, 3, ...
    pub leaderboard_penalties: Vec<f64>,
    pub risk_correction: RiskCorrection,
    pub same_kind: SameKindPenalty,
    pub large_stake: Vec<Threshold>,
    pub wealth: Vec<Threshold>,
    pub curse: Curse,
    pub floor_ratio: f64,
}

impl Default for BiasConfig {
    fn default() -> Self {
        let flat_loss = 0.20;
        Self {
            balance_tiers: TierTable {
                tiers: [
                    MILLION,
                    10 * MILLION,
                    100 * MILLION,
                    BILLION,
                    10 * BILLION,
                    100 * BILLION,
                    TRILLION,
                ]
                .into_iter()
                .map(|up_to| Tier {
                    up_to,
                    value: flat_loss,
                })
                .collect(),
                above: flat_loss,
            },
            stake_share_bands: TierTable {
                tiers: [500, 1_500, 3_000, 5_000, 8_000]
                    .into_iter()
                    .map(|up_to| Tier { up_to, value: 0.0 })
                    .collect(),
                above: 0.0,
            },
            max_loss_chance: 0.50,
            ceilings: vec![
                CeilingRule {
                    min: 1,
                    max: 1,
                    ceiling: 0.03,
                },
                CeilingRule {
                    min: 18,
                    max: 18,
                    ceiling: 0.60,
                },
                CeilingRule {
                    min: 12,
                    max: 12,
                    ceiling: 0.65,
                },
                CeilingRule {
                    min: 2,
                    max: 6,
                    ceiling: 0.65,
                },
            ],
            default_ceiling: 0.65,
            single_number_cap: 0.03,
            loss_streak_boosts: vec![
                StreakBoost {
                    min_streak: 2,
                    boost: 0.08,
                },
                StreakBoost {
                    min_streak: 4,
                    boost: 0.15,
                },
                StreakBoost {
                    min_streak: 6,
                    boost: 0.22,
                },
                StreakBoost {
                    min_streak: 8,
                    boost: 0.30,
                },
            ],
            leaderboard_penalties: vec![0.99 * 0.99 * 0.99, 0.99 * 0.99, 0.99],
            risk_correction: RiskCorrection {
                upper_threshold: 0.50,
                lower_threshold: 0.30,
                slope: 0.1,
            },
            same_kind: SameKindPenalty {
                min_streak: 8,
                factor: 0.85,
                floor_ratio: 0.40,
            },
            large_stake: vec![
                Threshold {
                    at_least: 70 * BILLION,
                    factor: 0.92,
                },
                Threshold {
                    at_least: 300 * BILLION,
                    factor: 0.85,
                },
            ],
            wealth: vec![
                Threshold {
                    at_least: 100 * BILLION,
                    factor: 0.94,
                },
                Threshold {
                    at_least: TRILLION,
                    factor: 0.88,
                },
            ],
            curse: Curse {
                threshold: 0.40,
                max_shave: 0.15,
            },
            floor_ratio: 0.30,
        }
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), BiasConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(BiasConfigError::InvalidProbability { field, value });
    }
    Ok(())
}

fn check_factor(field: &'static str, value: f64) -> Result<(), BiasConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(BiasConfigError::InvalidFactor { field, value });
    }
    Ok(())
}

fn check_thresholds(field: &'static str, rows: &[Threshold]) -> Result<(), BiasConfigError> {
    for (index, pair) in rows.windows(2).enumerate() {
        if pair[0].at_least >= pair[1].at_least {
            return Err(BiasConfigError::NotAscending {
                table: field,
                index: index + 1,
            });
        }
    }
    rows.iter().try_for_each(|row| check_factor(field, row.factor))
}

/// Highest threshold reached by `input`, if any.
fn threshold_factor(rows: &[Threshold], input: u64) -> Option<f64> {
    rows.iter()
        .rev()
        .find(|row| input >= row.at_least)
        .map(|row| row.factor)
}

/// Stake as a share of balance in basis points, rounded up so any stake past a band edge
/// falls in the next band. An empty balance reads as the top band.
fn stake_share_bps(stake: u64, balance: u64) -> u64 {
    if balance == 0 {
        return u64::MAX;
    }
    let bps = (u128::from(stake) * BPS).div_ceil(u128::from(balance));
    u64::try_from(bps).unwrap_or(u64::MAX)
}

impl BiasConfig {
    pub fn validate(&self) -> Result<(), BiasConfigError> {
        self.balance_tiers
            .validate("balance_tiers", check_probability)?;
        self.stake_share_bands
            .validate("stake_share_bands", check_probability)?;
        check_probability("max_loss_chance", self.max_loss_chance)?;

        for (index, rule) in self.ceilings.iter().enumerate() {
            if rule.min > rule.max {
                return Err(BiasConfigError::InvalidCeilingRule {
                    index,
                    min: rule.min,
                    max: rule.max,
                });
            }
            check_probability("ceilings", rule.ceiling)?;
        }
        check_probability("default_ceiling", self.default_ceiling)?;
        check_probability("single_number_cap", self.single_number_cap)?;

        for (index, pair) in self.loss_streak_boosts.windows(2).enumerate() {
            if pair[0].min_streak >= pair[1].min_streak {
                return Err(BiasConfigError::NotAscending {
                    table: "loss_streak_boosts",
                    index: index + 1,
                });
            }
        }
        for boost in &self.loss_streak_boosts {
            check_probability("loss_streak_boosts", boost.boost)?;
        }

        for factor in &self.leaderboard_penalties {
            check_factor("leaderboard_penalties", *factor)?;
        }
        for (index, pair) in self.leaderboard_penalties.windows(2).enumerate() {
            if pair[0] > pair[1] {
                return Err(BiasConfigError::RankOrdering { rank: index + 1 });
            }
        }

        check_probability("risk_correction.upper_threshold", self.risk_correction.upper_threshold)?;
        check_probability("risk_correction.lower_threshold", self.risk_correction.lower_threshold)?;
        if self.risk_correction.slope < 0.0 || !self.risk_correction.slope.is_finite() {
            return Err(BiasConfigError::InvalidProbability {
                field: "risk_correction.slope",
                value: self.risk_correction.slope,
            });
        }

        check_factor("same_kind.factor", self.same_kind.factor)?;
        check_probability("same_kind.floor_ratio", self.same_kind.floor_ratio)?;
        check_thresholds("large_stake", &self.large_stake)?;
        check_thresholds("wealth", &self.wealth)?;
        check_probability("curse.threshold", self.curse.threshold)?;
        check_probability("curse.max_shave", self.curse.max_shave)?;
        check_probability("floor_ratio", self.floor_ratio)
    }

    /// Maximum win probability for a winning set of `cardinality` numbers.
    pub fn ceiling(&self, cardinality: usize) -> f64 {
        self.ceilings
            .iter()
            .find(|rule| (rule.min..=rule.max).contains(&cardinality))
            .map(|rule| rule.ceiling)
            .unwrap_or(self.default_ceiling)
    }

    fn loss_streak_boost(&self, loss_streak: u32) -> f64 {
        self.loss_streak_boosts
            .iter()
            .rev()
            .find(|row| loss_streak >= row.min_streak)
            .map(|row| row.boost)
            .unwrap_or(0.0)
    }

    fn leaderboard_factor(&self, rank: Rank) -> f64 {
        rank.position()
            .and_then(|place| place.checked_sub(1))
            .and_then(|index| self.leaderboard_penalties.get(index as usize))
            .copied()
            .unwrap_or(1.0)
    }

    /// Run the full pipeline.
    pub fn win_probability(&self, inputs: &BiasInputs) -> f64 {
        // Steps 1-3: loss chance from balance tier and stake share
        let base_loss = self.balance_tiers.lookup(inputs.balance);
        let share = stake_share_bps(inputs.stake, inputs.balance);
        let loss = (base_loss + self.stake_share_bands.lookup(share)).min(self.max_loss_chance);
        let mut p = 1.0 - loss;

        // Step 4: per-kind ceiling
        let mut ceiling = self.ceiling(inputs.cardinality);
        p = p.min(ceiling);

        // Step 5: loss-streak boost. Single numbers never exceed their hard cap, whatever
        // the ceiling table says, and later floors are measured against that cap.
        p = (p + self.loss_streak_boost(inputs.loss_streak)).min(ceiling);
        if inputs.cardinality == 1 {
            ceiling = ceiling.min(self.single_number_cap);
            p = p.min(ceiling);
        }

        // Step 6: top of the leaderboard
        p *= self.leaderboard_factor(inputs.rank);

        // Step 7: shave favourable odds
        let risk = &self.risk_correction;
        if p > risk.upper_threshold {
            p /= 1.0 + (p - risk.upper_threshold) * risk.slope;
        } else if p > risk.lower_threshold {
            p /= 1.0 + (p - risk.lower_threshold) * risk.slope;
        }

        // Step 8: repeated same-kind bets
        if inputs.same_kind_streak >= self.same_kind.min_streak {
            p = (p * self.same_kind.factor).max(ceiling * self.same_kind.floor_ratio);
        }

        // Steps 9-10: absolute stake and wealth
        if let Some(factor) = threshold_factor(&self.large_stake, inputs.stake) {
            p *= factor;
        }
        if let Some(factor) = threshold_factor(&self.wealth, inputs.balance) {
            p *= factor;
        }

        // Step 11: curse of luck
        let curse = &self.curse;
        if p > curse.threshold && curse.threshold < 1.0 {
            let excess = ((p - curse.threshold) / (1.0 - curse.threshold)).min(1.0);
            p *= 1.0 - curse.max_shave * excess;
        }

        // Step 12: floor
        p.max(ceiling * self.floor_ratio).clamp(0.0, 1.0)
    }
}

/// Everything the bias model reads for one resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiasInputs {
    pub balance: u64,
    pub stake: u64,
    /// Size of the winning set.
    pub cardinality: usize,
    pub rank: Rank,
    pub loss_streak: u32,
    pub same_kind_streak: u32,
}
