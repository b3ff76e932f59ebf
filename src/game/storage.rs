use std::path::{Path, PathBuf};

use log::{debug, info};
use sled::IVec;

use crate::game::achievement::{AchievementStore, ACHIEVEMENT_NAMESPACE};
use crate::game::errors::GameError;
use crate::game::types::{GameState, SaveRecord, SAVE_SCHEMA_VERSION};

const TREE_SAVES: &str = "parentsim_saves";
const TREE_ACHIEVEMENTS: &str = "parentsim_achievements";

/// Helper builder so tests can easily create throwaway stores.
pub struct GameStoreBuilder {
    path: PathBuf,
    temporary: bool,
}

impl GameStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: false,
        }
    }

    /// Remove the database files when the last handle is dropped.
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn open(self) -> Result<GameStore, GameError> {
        GameStore::open_with_options(self.path, self.temporary)
    }
}

/// Sled-backed persistence for save games and the achievement unlock list.
#[derive(Clone)]
pub struct GameStore {
    _db: sled::Db,
    saves: sled::Tree,
    achievements: sled::Tree,
}

impl GameStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        Self::open_with_options(path, false)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, temporary: bool) -> Result<Self, GameError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::Config::new()
            .path(path_ref)
            .temporary(temporary)
            .open()?;
        let saves = db.open_tree(TREE_SAVES)?;
        let achievements = db.open_tree(TREE_ACHIEVEMENTS)?;
        debug!("opened game store at {}", path_ref.display());
        Ok(Self {
            _db: db,
            saves,
            achievements,
        })
    }

    fn validate_user(user_id: &str) -> Result<String, GameError> {
        let trimmed = user_id.trim();
        if trimmed.is_empty() || trimmed.contains(':') {
            return Err(GameError::Validation(format!("invalid user id '{}'", user_id)));
        }
        Ok(trimmed.to_ascii_lowercase())
    }

    fn user_prefix(user: &str) -> Vec<u8> {
        format!("saves:{}:", user).into_bytes()
    }

    fn save_key(user: &str, id: &str) -> Vec<u8> {
        format!("saves:{}:{}", user, id).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GameError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, GameError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn check_schema(record: SaveRecord) -> Result<SaveRecord, GameError> {
        if record.schema_version != SAVE_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "save",
                expected: SAVE_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Persist a new save for `user_id` and return it with its generated id.
    pub fn create_save(&self, user_id: &str, state: GameState) -> Result<SaveRecord, GameError> {
        let user = Self::validate_user(user_id)?;
        let record = SaveRecord::new(&user, state);
        let key = Self::save_key(&user, &record.id);
        self.saves.insert(key, Self::serialize(&record)?)?;
        self.saves.flush()?;
        info!("created save {} for {}", record.id, user);
        Ok(record)
    }

    /// Insert or overwrite a save. Last write wins; `created_at` is kept from
    /// the stored copy and `updated_at` is refreshed.
    pub fn put_save(&self, mut record: SaveRecord) -> Result<SaveRecord, GameError> {
        let user = Self::validate_user(&record.user_id)?;
        record.user_id = user.clone();
        let key = Self::save_key(&user, &record.id);
        if let Some(bytes) = self.saves.get(&key)? {
            let existing: SaveRecord = Self::deserialize(bytes)?;
            record.created_at = existing.created_at;
        }
        record.schema_version = SAVE_SCHEMA_VERSION;
        record.touch();
        self.saves.insert(key, Self::serialize(&record)?)?;
        self.saves.flush()?;
        debug!("stored save {} for {} at turn {}", record.id, user, record.game_state.turn);
        Ok(record)
    }

    pub fn get_save(&self, user_id: &str, save_id: &str) -> Result<SaveRecord, GameError> {
        let user = Self::validate_user(user_id)?;
        let Some(bytes) = self.saves.get(Self::save_key(&user, save_id))? else {
            return Err(GameError::NotFound(format!("save: {}", save_id)));
        };
        Self::check_schema(Self::deserialize(bytes)?)
    }

    /// All saves for a user, most recently updated first.
    pub fn list_saves(&self, user_id: &str) -> Result<Vec<SaveRecord>, GameError> {
        let user = Self::validate_user(user_id)?;
        let mut records = Vec::new();
        for entry in self.saves.scan_prefix(Self::user_prefix(&user)) {
            let (_, bytes) = entry?;
            records.push(Self::check_schema(Self::deserialize(bytes)?)?);
        }
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    /// Remove a save; returns false if there was nothing to delete.
    pub fn delete_save(&self, user_id: &str, save_id: &str) -> Result<bool, GameError> {
        let user = Self::validate_user(user_id)?;
        let removed = self.saves.remove(Self::save_key(&user, save_id))?;
        self.saves.flush()?;
        if removed.is_some() {
            info!("deleted save {} for {}", save_id, user);
        }
        Ok(removed.is_some())
    }
}

impl AchievementStore for GameStore {
    fn load_unlocked(&self) -> Result<Vec<String>, GameError> {
        match self.achievements.get(ACHIEVEMENT_NAMESPACE)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_unlocked(&self, ids: &[String]) -> Result<(), GameError> {
        let bytes = serde_json::to_vec(ids)?;
        self.achievements.insert(ACHIEVEMENT_NAMESPACE, bytes)?;
        self.achievements.flush()?;
        Ok(())
    }
}
