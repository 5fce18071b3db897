//! Roulette table: the caller around [Resolver].
//!
//! The table owns the player store and applies the surrounding contract of a spin:
//! per-player exclusion while a bet resolves, funds checks, rank lookup, balance settlement,
//! and the post-resolution profile update.

use fortuna_types::casino::{
    Leaderboard, Player, PlayerId, PlayerInvariantError, Rank, STARTING_BALANCE,
};
use rand::Rng;
use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    casino::{
        classify, parse_stake, BiasConfig, EconomicContext, GameError, Resolution, Resolver, Stake,
    },
    state::Store,
};

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("player {0} is not registered")]
    NotRegistered(PlayerId),
    #[error("player {0} is already registered")]
    AlreadyRegistered(PlayerId),
    #[error("a bet for player {0} is already being resolved")]
    AlreadyResolving(PlayerId),
    #[error("insufficient funds: stake {stake} exceeds balance {balance}")]
    InsufficientFunds { stake: u64, balance: u64 },
    #[error(transparent)]
    InvalidPlayer(#[from] PlayerInvariantError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// A settled spin, with the player's balance after settlement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub resolution: Resolution,
    pub balance: u64,
    pub rank: Rank,
}

/// Marks a player as resolving until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<PlayerId>>,
    player: PlayerId,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<PlayerId>>, player: PlayerId) -> Result<Self, TableError> {
        if !lock(set).insert(player) {
            return Err(TableError::AlreadyResolving(player));
        }
        Ok(Self { set, player })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.player);
    }
}

/// Lock, ignoring poisoning.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write through after a mutation. The mutation already happened, so a failed write is
/// logged and left to the store's next flush.
fn flush<S: Store>(store: &mut S, player: PlayerId) {
    if let Err(err) = store.flush() {
        warn!(player, ?err, "failed to flush player store");
    }
}

pub struct RouletteTable<S: Store> {
    store: Mutex<S>,
    resolver: Resolver,
    starting_balance: u64,
    in_flight: Mutex<HashSet<PlayerId>>,
}

impl<S: Store> RouletteTable<S> {
    /// `config` is expected to have passed [BiasConfig::validate].
    pub fn new(store: S, config: BiasConfig, starting_balance: u64) -> Self {
        Self {
            store: Mutex::new(store),
            resolver: Resolver::new(config),
            starting_balance,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_defaults(store: S) -> Self {
        Self::new(store, BiasConfig::default(), STARTING_BALANCE)
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn register(&self, id: PlayerId, name: &str, now: u64) -> Result<Player, TableError> {
        let player = Player::new(id, name.trim().to_string(), self.starting_balance, now);
        player.validate_invariants()?;

        let mut store = lock(&self.store);
        if store.get(id)?.is_some() {
            return Err(TableError::AlreadyRegistered(id));
        }
        store.insert(player.clone())?;
        flush(&mut *store, id);
        info!(player = id, name = %player.name, balance = player.balance, "registered player");
        Ok(player)
    }

    /// Resolve one bet for `id`. Nothing is debited unless the bet settles.
    pub fn spin<R: Rng + ?Sized>(
        &self,
        id: PlayerId,
        kind_token: &str,
        stake_token: &str,
        now: u64,
        rng: &mut R,
    ) -> Result<Spin, TableError> {
        let kind = classify(kind_token)?;
        let stake = parse_stake(stake_token)?;
        let _guard = InFlight::acquire(&self.in_flight, id)?;

        let (mut player, rank) = {
            let store = lock(&self.store);
            let player = store.get(id)?.ok_or(TableError::NotRegistered(id))?;
            let players = store.players()?;
            (player, Leaderboard::from_players(&players).rank_of(id))
        };

        let amount = stake.resolve(player.balance)?;
        if amount > player.balance {
            warn!(
                player = id,
                stake = amount,
                balance = player.balance,
                "rejected bet over balance"
            );
            return Err(TableError::InsufficientFunds {
                stake: amount,
                balance: player.balance,
            });
        }

        let context = EconomicContext {
            balance: player.balance,
            rank,
            loss_streak: player.gambling.loss_streak,
            same_kind_streak: player.gambling.streak_for(kind, now),
        };
        let resolution = self
            .resolver
            .resolve_kind(kind, Stake::Amount(amount), &context, rng)?;

        let outcome = resolution.outcome;
        player.balance = (player.balance - amount).saturating_add(outcome.payout);
        player.gambling.record(kind, amount, outcome.won, now);

        {
            let mut store = lock(&self.store);
            store.insert(player.clone())?;
            flush(&mut *store, id);
        }
        info!(
            player = id,
            %kind,
            stake = amount,
            drawn = outcome.drawn,
            won = outcome.won,
            payout = outcome.payout,
            balance = player.balance,
            "settled roulette bet"
        );
        Ok(Spin {
            resolution,
            balance: player.balance,
            rank,
        })
    }

    pub fn player(&self, id: PlayerId) -> Result<Player, TableError> {
        lock(&self.store)
            .get(id)?
            .ok_or(TableError::NotRegistered(id))
    }

    pub fn balance(&self, id: PlayerId) -> Result<u64, TableError> {
        Ok(self.player(id)?.balance)
    }

    pub fn leaderboard(&self) -> Result<Leaderboard, TableError> {
        let players = lock(&self.store).players()?;
        Ok(Leaderboard::from_players(&players))
    }

    /// Consume the table, returning the store.
    pub fn into_store(self) -> S {
        self.store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mocks::{create_table, seeded_rng},
        state::Memory,
    };
    use fortuna_types::casino::{BetKind, MAX_NAME_LENGTH};

    fn table() -> RouletteTable<Memory> {
        RouletteTable::with_defaults(Memory::default())
    }

    /// Store whose writes to disk always fail.
    #[derive(Default)]
    struct ReadOnlyDisk {
        memory: Memory,
        flushes: usize,
    }

    impl Store for ReadOnlyDisk {
        fn get(&self, id: PlayerId) -> anyhow::Result<Option<Player>> {
            self.memory.get(id)
        }

        fn insert(&mut self, player: Player) -> anyhow::Result<()> {
            self.memory.insert(player)
        }

        fn players(&self) -> anyhow::Result<Vec<Player>> {
            self.memory.players()
        }

        fn flush(&mut self) -> anyhow::Result<()> {
            self.flushes += 1;
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn test_register_grants_starting_balance() {
        let table = table();
        let player = table.register(1, " alice ", 10).unwrap();
        assert_eq!(player.name, "alice");
        assert_eq!(table.balance(1).unwrap(), STARTING_BALANCE);
        assert!(matches!(
            table.register(1, "alice", 11),
            Err(TableError::AlreadyRegistered(1))
        ));
    }

    #[test]
    fn test_register_rejects_bad_names() {
        let table = table();
        assert!(matches!(
            table.register(1, "  ", 0),
            Err(TableError::InvalidPlayer(PlayerInvariantError::NameEmpty))
        ));
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            table.register(1, &long, 0),
            Err(TableError::InvalidPlayer(PlayerInvariantError::NameTooLong { .. }))
        ));
    }

    #[test]
    fn test_spin_settles_balance() {
        let table = table();
        table.register(1, "alice", 0).unwrap();
        let mut rng = seeded_rng(1);
        let spin = table.spin(1, "red", "1000", 5, &mut rng).unwrap();
        let expected = STARTING_BALANCE - 1_000 + spin.resolution.outcome.payout;
        assert_eq!(spin.balance, expected);
        assert_eq!(table.balance(1).unwrap(), expected);
        assert_eq!(spin.rank, Rank::Ranked(1));
    }

    #[test]
    fn test_errors_leave_player_untouched() {
        let table = table();
        table.register(1, "alice", 0).unwrap();
        let before = table.player(1).unwrap();
        let mut rng = seeded_rng(2);

        assert!(matches!(
            table.spin(1, "purple", "10", 1, &mut rng),
            Err(TableError::Game(GameError::UnrecognizedBetKind(_)))
        ));
        assert!(matches!(
            table.spin(1, "red", "0", 1, &mut rng),
            Err(TableError::Game(GameError::InvalidStake))
        ));
        assert!(matches!(
            table.spin(1, "20-9", "10", 1, &mut rng),
            Err(TableError::Game(GameError::InvalidRange { .. }))
        ));
        assert!(matches!(
            table.spin(1, "red", "1m", 1, &mut rng),
            Err(TableError::InsufficientFunds { stake: 1_000_000, balance: STARTING_BALANCE })
        ));
        assert!(matches!(
            table.spin(2, "red", "10", 1, &mut rng),
            Err(TableError::NotRegistered(2))
        ));
        assert_eq!(table.player(1).unwrap(), before);
    }

    #[test]
    fn test_in_flight_guard_is_released() {
        let table = table();
        table.register(1, "alice", 0).unwrap();
        {
            let _guard = InFlight::acquire(&table.in_flight, 1).unwrap();
            assert!(matches!(
                table.spin(1, "red", "10", 1, &mut seeded_rng(3)),
                Err(TableError::AlreadyResolving(1))
            ));
        }

        // Released after an error as well as after success
        assert!(table.spin(1, "red", "1m", 1, &mut seeded_rng(3)).is_err());
        assert!(table.spin(1, "red", "10", 1, &mut seeded_rng(3)).is_ok());
        assert!(lock(&table.in_flight).is_empty());
    }

    #[test]
    fn test_all_in_spends_whole_balance() {
        let table = table();
        table.register(1, "alice", 0).unwrap();
        let spin = table.spin(1, "zero", "all", 1, &mut seeded_rng(4)).unwrap();
        assert_eq!(spin.resolution.stake, STARTING_BALANCE);
        if spin.resolution.outcome.won {
            assert_eq!(spin.balance, STARTING_BALANCE * 36);
        } else {
            assert_eq!(spin.balance, 0);
            assert!(matches!(
                table.spin(1, "red", "all", 2, &mut seeded_rng(4)),
                Err(TableError::Game(GameError::InvalidStake))
            ));
        }
    }

    #[test]
    fn test_profile_tracks_streaks() {
        let table = table();
        table.register(1, "alice", 0).unwrap();
        let mut rng = seeded_rng(5);
        let mut losses = 0;
        for now in 1..=4 {
            let spin = table.spin(1, "7", "1", now, &mut rng).unwrap();
            losses = if spin.resolution.outcome.won { 0 } else { losses + 1 };
        }
        let profile = table.player(1).unwrap().gambling;
        assert_eq!(profile.loss_streak, losses);
        let streak = profile.same_kind.unwrap();
        assert_eq!(streak.kind, BetKind::Straight { number: 7 });
        assert_eq!(streak.count, 4);
        assert_eq!(profile.history.len(), 4);

        table.spin(1, "8", "1", 5, &mut rng).unwrap();
        assert_eq!(table.player(1).unwrap().gambling.same_kind.unwrap().count, 1);
    }

    #[test]
    fn test_failed_flush_still_reports_settlement() {
        let table = RouletteTable::with_defaults(ReadOnlyDisk::default());
        let player = table.register(1, "alice", 0).unwrap();
        assert_eq!(player.balance, STARTING_BALANCE);

        let spin = table.spin(1, "red", "1000", 1, &mut seeded_rng(7)).unwrap();
        assert_eq!(table.balance(1).unwrap(), spin.balance);
        assert_eq!(
            spin.balance,
            STARTING_BALANCE - 1_000 + spin.resolution.outcome.payout
        );
        assert!(matches!(
            table.register(1, "alice", 2),
            Err(TableError::AlreadyRegistered(1))
        ));
        assert_eq!(table.into_store().flushes, 2);
    }

    #[test]
    fn test_leaderboard_orders_by_balance() {
        let table = create_table(3);
        table.spin(2, "red", "all", 1, &mut seeded_rng(6)).unwrap();

        let board = table.leaderboard().unwrap();
        assert_eq!(board.entries.len(), 3);
        let balances: Vec<u64> = board.entries.iter().map(|e| e.balance).collect();
        assert!(balances.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(board.rank_of(4), Rank::Unranked);
    }
}
