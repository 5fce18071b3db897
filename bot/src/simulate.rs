//! Monte Carlo house-edge estimates for the bias model.

use fortuna_execution::casino::{classify, EconomicContext, GameError, Resolver, Stake, WinningSet};
use fortuna_types::casino::{BetKind, Rank};
use rand::Rng;
use std::fmt::Write;

/// Tokens simulated when none are given.
pub const DEFAULT_KINDS: [&str; 8] = ["red", "even", "1-18", "13-24", "row2", "5-16", "zero", "17"];

/// Running totals over a sequence of settled bets.
///
/// Net results are kept exactly; only the variance estimate goes through `f64`.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    trials: u64,
    wins: u64,
    net: i128,
    wagered: u128,
    net_sq: f64,
}

impl Stats {
    /// Fold in one bet that returned `payout` for `stake`.
    pub fn record(&mut self, stake: u64, payout: u64) {
        let net = i128::from(payout) - i128::from(stake);
        self.trials += 1;
        self.wins += u64::from(payout > 0);
        self.net += net;
        self.wagered += u128::from(stake);
        self.net_sq += (net as f64).powi(2);
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    fn per_trial(&self, total: f64) -> f64 {
        match self.trials {
            0 => 0.0,
            n => total / n as f64,
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.per_trial(self.wins as f64)
    }

    pub fn mean_net(&self) -> f64 {
        self.per_trial(self.net as f64)
    }

    /// Share of each wagered unit kept by the house.
    pub fn house_edge(&self) -> f64 {
        match self.wagered {
            0 => 0.0,
            wagered => -(self.net as f64) / wagered as f64,
        }
    }

    /// Standard error of the mean net result.
    pub fn stderr(&self) -> f64 {
        if self.trials < 2 {
            return 0.0;
        }
        let mean = self.mean_net();
        let variance = (self.per_trial(self.net_sq) - mean * mean).max(0.0);
        (variance / self.trials as f64).sqrt()
    }
}

/// Fixed player context every simulated bet is resolved against.
#[derive(Clone, Copy, Debug)]
pub struct Scenario {
    pub balance: u64,
    pub stake: u64,
    pub rank: Rank,
    pub loss_streak: u32,
    pub same_kind_streak: u32,
    pub trials: u64,
}

#[derive(Clone, Debug)]
pub struct Row {
    pub kind: BetKind,
    pub model_probability: f64,
    /// Win rate of an unbiased wheel for the same bet.
    pub fair_probability: f64,
    pub stats: Stats,
}

/// Simulate every token in `kinds` under `scenario`.
pub fn run<R: Rng + ?Sized>(
    resolver: &Resolver,
    kinds: &[String],
    scenario: &Scenario,
    rng: &mut R,
) -> Result<Vec<Row>, GameError> {
    let context = EconomicContext {
        balance: scenario.balance,
        rank: scenario.rank,
        loss_streak: scenario.loss_streak,
        same_kind_streak: scenario.same_kind_streak.max(1),
    };

    let mut rows = Vec::with_capacity(kinds.len());
    for token in kinds {
        let kind = classify(token)?;
        let cardinality = WinningSet::of(kind).cardinality();
        let mut stats = Stats::default();
        for _ in 0..scenario.trials {
            let resolution =
                resolver.resolve_kind(kind, Stake::Amount(scenario.stake), &context, rng)?;
            stats.record(resolution.stake, resolution.outcome.payout);
        }
        rows.push(Row {
            kind,
            model_probability: resolver.win_probability(kind, scenario.stake, &context),
            fair_probability: cardinality as f64 / 37.0,
            stats,
        });
    }
    Ok(rows)
}

/// Render rows as a fixed-width table.
pub fn render(rows: &[Row]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>8} {:>8} {:>8} {:>12} {:>9} {:>10}",
        "bet", "trials", "model", "fair", "mean net", "edge", "stderr"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<8} {:>8} {:>7.2}% {:>7.2}% {:>12.2} {:>8.2}% {:>10.2}",
            row.kind.to_string(),
            row.stats.trials(),
            row.model_probability * 100.0,
            row.fair_probability * 100.0,
            row.stats.mean_net(),
            row.stats.house_edge() * 100.0,
            row.stats.stderr(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortuna_execution::mocks::seeded_rng;
    use fortuna_types::casino::MILLION;

    fn scenario(trials: u64) -> Scenario {
        Scenario {
            balance: MILLION,
            stake: 100_000,
            rank: Rank::Unranked,
            loss_streak: 0,
            same_kind_streak: 1,
            trials,
        }
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = Stats::default();
        assert_eq!(stats.house_edge(), 0.0);
        assert_eq!(stats.stderr(), 0.0);

        stats.record(100, 200);
        stats.record(100, 0);
        assert_eq!(stats.trials(), 2);
        assert_eq!(stats.win_rate(), 0.5);
        assert_eq!(stats.mean_net(), 0.0);
        assert_eq!(stats.house_edge(), 0.0);
        assert!((stats.stderr() - 70.71).abs() < 0.01);

        stats.record(100, 0);
        assert!((stats.house_edge() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_tracks_model_probability() {
        let resolver = Resolver::default();
        let kinds = vec!["red".to_string(), "13-24".to_string()];
        let rows = run(&resolver, &kinds, &scenario(20_000), &mut seeded_rng(1)).unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!(
                (row.stats.win_rate() - row.model_probability).abs() < 0.02,
                "{}: observed {} model {}",
                row.kind,
                row.stats.win_rate(),
                row.model_probability
            );
        }
        assert!(render(&rows).contains("13-24"));
    }

    #[test]
    fn test_run_rejects_unknown_kind() {
        let resolver = Resolver::default();
        let kinds = vec!["purple".to_string()];
        assert!(matches!(
            run(&resolver, &kinds, &scenario(1), &mut seeded_rng(1)),
            Err(GameError::UnrecognizedBetKind(_))
        ));
    }
}
