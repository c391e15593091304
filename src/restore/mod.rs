//! # Player Restoration Store
//!
//! Persisted per-player snapshots so a player's pre-game state can be put
//! back after leaving a round. A record is written when the player enters
//! a game and taken (removed and returned) when they leave or disconnect
//! abnormally. The backing document is YAML, keyed by player UUID, and is
//! flushed by `GameResource::save_to_disk` under an exclusive file lock.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diskio;
use crate::error::{GameError, Result};

/// A position with orientation, in the coordinate space of the map the
/// player stood on before entering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

/// One inventory slot at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub slot: u32,
    pub item: String,
    pub amount: u32,
}

/// Per-player persisted snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestorationRecord {
    /// Game type the player entered when this snapshot was taken.
    pub game: String,
    pub position: Position,
    #[serde(default)]
    pub inventory: Vec<ItemSnapshot>,
    pub saved_at: DateTime<Utc>,
}

impl RestorationRecord {
    pub fn new(game: &str, position: Position, inventory: Vec<ItemSnapshot>) -> Self {
        RestorationRecord {
            game: game.to_string(),
            position,
            inventory,
            saved_at: Utc::now(),
        }
    }
}

/// In-memory view of one restoration document.
#[derive(Debug, Clone, Default)]
pub struct RestoreStore {
    records: BTreeMap<Uuid, RestorationRecord>,
}

impl RestoreStore {
    /// Load the document. Missing or empty files yield an empty store;
    /// a malformed document is a configuration error.
    pub async fn load(path: &Path) -> Result<RestoreStore> {
        let text = match diskio::read_optional(path).await? {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(RestoreStore::default()),
        };
        let records: BTreeMap<Uuid, RestorationRecord> =
            serde_yaml::from_str(&text).map_err(|e| {
                GameError::faulty(format!(
                    "unreadable restoration document {}: {}",
                    path.display(),
                    e
                ))
            })?;
        Ok(RestoreStore { records })
    }

    /// Record a snapshot on player entry. Re-entering overwrites the
    /// previous snapshot.
    pub fn store(&mut self, player: Uuid, record: RestorationRecord) {
        self.records.insert(player, record);
    }

    pub fn get(&self, player: Uuid) -> Option<&RestorationRecord> {
        self.records.get(&player)
    }

    /// Remove and return the snapshot on player exit or disconnect.
    pub fn take(&mut self, player: Uuid) -> Option<RestorationRecord> {
        self.records.remove(&player)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flush to disk under an exclusive file lock.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(&self.records).map_err(|e| {
            GameError::faulty(format!("unserializable restoration store: {}", e))
        })?;
        diskio::write_locked(path, &text)
    }
}
