use anyhow::{Context as _, Result};
use fortuna_types::casino::{Player, PlayerId};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Key-value store of player records.
pub trait Store {
    fn get(&self, id: PlayerId) -> Result<Option<Player>>;
    fn insert(&mut self, player: Player) -> Result<()>;
    /// Every stored player, in id order.
    fn players(&self) -> Result<Vec<Player>>;

    /// Persist pending changes. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Memory {
    state: BTreeMap<PlayerId, Player>,
}

impl Store for Memory {
    fn get(&self, id: PlayerId) -> Result<Option<Player>> {
        Ok(self.state.get(&id).cloned())
    }

    fn insert(&mut self, player: Player) -> Result<()> {
        self.state.insert(player.id, player);
        Ok(())
    }

    fn players(&self) -> Result<Vec<Player>> {
        Ok(self.state.values().cloned().collect())
    }
}

/// JSON file holding the whole player map, loaded on open and written back wholesale on
/// [Store::flush].
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    memory: Memory,
    dirty: bool,
}

impl JsonStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state: BTreeMap<PlayerId, Player> = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse player store {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read player store {}", path.display()))
            }
        };
        debug!(path = %path.display(), players = state.len(), "opened player store");
        Ok(Self {
            path,
            memory: Memory { state },
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonStore {
    fn get(&self, id: PlayerId) -> Result<Option<Player>> {
        self.memory.get(id)
    }

    fn insert(&mut self, player: Player) -> Result<()> {
        self.dirty = true;
        self.memory.insert(player)
    }

    fn players(&self) -> Result<Vec<Player>> {
        self.memory.players()
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let bytes =
            serde_json::to_vec_pretty(&self.memory.state).context("failed to encode players")?;

        // Write beside the target and rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        self.dirty = false;
        debug!(path = %self.path.display(), players = self.memory.state.len(), "flushed player store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_player;
    use fortuna_types::casino::BetKind;

    #[test]
    fn test_memory_roundtrip() {
        let mut store = Memory::default();
        assert!(store.get(1).unwrap().is_none());
        store.insert(create_player(2, 20)).unwrap();
        store.insert(create_player(1, 10)).unwrap();
        assert_eq!(store.get(1).unwrap().unwrap().balance, 10);
        let ids: Vec<PlayerId> = store.players().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_json_store_persists_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.json");

        let mut store = JsonStore::open(&path).unwrap();
        assert!(store.players().unwrap().is_empty());
        let mut player = Player::new(42, "alice".into(), 5_000, 100);
        player.gambling.record(BetKind::Red, 100, false, 120);
        store.insert(player.clone()).unwrap();
        store.flush().unwrap();

        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.get(42).unwrap(), Some(player));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_json_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.json");
        fs::write(&path, b"{not json").unwrap();
        let err = JsonStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse player store"));
    }

    #[test]
    fn test_json_store_treats_blank_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.json");
        fs::write(&path, b"\n").unwrap();
        assert!(JsonStore::open(&path).unwrap().players().unwrap().is_empty());
    }
}
