use crate::{state::Memory, table::RouletteTable};
use fortuna_types::casino::{Player, PlayerId, MILLION};
use rand::{rngs::StdRng, SeedableRng};

/// Creates a deterministic rng for a test case
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a player with an explicit balance and a fresh profile
pub fn create_player(id: PlayerId, balance: u64) -> Player {
    Player::new(id, format!("player{id}"), balance, 0)
}

/// Creates a table with players `1..=count` registered at 1M each
pub fn create_table(count: u64) -> RouletteTable<Memory> {
    let table = RouletteTable::new(Memory::default(), Default::default(), MILLION);
    for id in 1..=count {
        table
            .register(id, &format!("player{id}"), 0)
            .expect("failed to register player");
    }
    table
}
