use serde::{Deserialize, Serialize};

use super::{Player, PlayerId, Rank, LEADERBOARD_SIZE};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player: PlayerId,
    pub name: String,
    pub balance: u64,
    pub rank: u32,
}

/// Balance leaderboard, rebuilt from the player set whenever a rank is needed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn from_players<'a>(players: impl IntoIterator<Item = &'a Player>) -> Self {
        let mut entries: Vec<LeaderboardEntry> = players
            .into_iter()
            .map(|player| LeaderboardEntry {
                player: player.id,
                name: player.name.clone(),
                balance: player.balance,
                rank: 0,
            })
            .collect();

        // Sort by balance descending, ties broken by id so ordering is deterministic
        entries.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.player.cmp(&b.player)));

        entries.truncate(LEADERBOARD_SIZE);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u32;
        }
        Self { entries }
    }

    pub fn rank_of(&self, player: PlayerId) -> Rank {
        self.entries
            .iter()
            .find(|entry| entry.player == player)
            .map(|entry| Rank::Ranked(entry.rank))
            .unwrap_or(Rank::Unranked)
    }

    pub fn top(&self, count: usize) -> &[LeaderboardEntry] {
        &self.entries[..count.min(self.entries.len())]
    }
}
