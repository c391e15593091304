//! # Game Instance Registry
//!
//! Allocates unique instance ids, tracks every running game, and reclaims
//! entries on teardown. The registry is an explicitly owned value, not a
//! process-wide singleton: callers (command handlers, host listeners)
//! receive it by reference, tests build as many independent registries as
//! they like. Mutation goes through `&mut self`, so insertion and removal
//! are statically exclusive; move instance creation off a single thread
//! and you wrap the registry in a lock.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};

use crate::config::Config;
use crate::error::{GameError, Result};
use crate::game::resource::GameResource;
use crate::game::Game;

/// Registry of all currently running game instances.
pub struct GameRegistry {
    config: Config,
    games: HashMap<u32, Game>,
    next_id: u32,
}

impl GameRegistry {
    /// Build a registry, recovering the id counter from disk.
    ///
    /// Existing `<label>_<n>` directories under the worlds directory are
    /// stale state from a previous run; the next id starts one past the
    /// largest suffix observed so a fresh instance never collides with a
    /// leftover working directory. The scan runs once here, never on
    /// `open_new`.
    pub async fn new(config: Config) -> Result<GameRegistry> {
        let next_id = scan_next_id(
            &config.worlds_dir(),
            &config.worlds.directory_label,
        )
        .await?;
        if next_id > 0 {
            info!(
                "Recovered instance id counter from disk: next id is {}",
                next_id
            );
        }
        Ok(GameRegistry {
            config,
            games: HashMap::new(),
            next_id,
        })
    }

    /// The working-directory name an instance with this id uses.
    pub fn instance_dir_name(&self, id: u32) -> String {
        format!("{}_{}", self.config.worlds.directory_label, id)
    }

    /// Open a new running game of type `name`.
    ///
    /// The name check runs before any file is touched. Construction is
    /// all-or-nothing: a failure in any resolution step registers no
    /// partial instance.
    pub async fn open_new(&mut self, name: &str) -> Result<&mut Game> {
        if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(GameError::faulty(format!(
                "game name must not start with a digit: '{}'",
                name
            )));
        }

        let resource = GameResource::load(&self.config, name).await?;
        let id = self.next_id;
        let game = Game::new(id, name, resource);
        self.next_id = id + 1;
        debug!("Opened game #{} of type '{}'", id, name);
        Ok(self.games.entry(id).or_insert(game))
    }

    /// Running instances matching the given predicates. Pass `None` to
    /// skip a condition.
    pub fn get(&self, name: Option<&str>, can_join: Option<bool>) -> Vec<&Game> {
        let mut found: Vec<&Game> = self
            .games
            .values()
            .filter(|g| {
                name.map_or(true, |n| g.name == n)
                    && can_join.map_or(true, |j| g.can_join() == j)
            })
            .collect();
        found.sort_by_key(|g| g.id);
        found
    }

    /// Direct lookup by instance id.
    pub fn get_by_id(&self, id: u32) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn get_by_id_mut(&mut self, id: u32) -> Option<&mut Game> {
        self.games.get_mut(&id)
    }

    /// Remove an instance from the live set, returning it for any final
    /// cleanup the caller owes (working-directory removal is the host's
    /// business, not ours).
    pub fn purge(&mut self, id: u32) -> Option<Game> {
        let removed = self.games.remove(&id);
        if removed.is_some() {
            debug!("Purged game #{}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The id the next `open_new` will assign.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Stop and purge every instance. Teardown order is unspecified;
    /// each instance flushes independently.
    pub fn shutdown(&mut self) -> Result<()> {
        let ids: Vec<u32> = self.games.keys().copied().collect();
        for id in ids {
            if let Some(mut game) = self.games.remove(&id) {
                game.force_stop()?;
            }
        }
        Ok(())
    }
}

/// Scan the worlds directory for `<label>_<n>` entries and return one
/// past the largest numeric suffix, or 0 when nothing matches. The suffix
/// is whatever follows the last `_`, matching the naming convention used
/// by `instance_dir_name`.
async fn scan_next_id(worlds_dir: &Path, label: &str) -> Result<u32> {
    let mut entries = match tokio::fs::read_dir(worlds_dir).await {
        Ok(entries) => entries,
        // No worlds directory yet means no stale state to recover from.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(GameError::io(worlds_dir, e)),
    };

    let prefix = format!("{}_", label);
    let mut next_id = 0u32;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| GameError::io(worlds_dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| GameError::io(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }
        if let Some(id) = name.rsplit('_').next().and_then(|s| s.parse::<u32>().ok()) {
            if id >= next_id {
                next_id = id + 1;
            }
        }
    }
    Ok(next_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_worlds_dir_starts_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let next = scan_next_id(&dir.path().join("absent"), "game").await.unwrap();
        assert_eq!(next, 0);
    }

    #[tokio::test]
    async fn scan_skips_foreign_and_file_entries() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("game_3")).await.unwrap();
        tokio::fs::create_dir(dir.path().join("other_9")).await.unwrap();
        tokio::fs::write(dir.path().join("game_12"), "").await.unwrap();
        tokio::fs::create_dir(dir.path().join("gamey")).await.unwrap();
        let next = scan_next_id(dir.path(), "game").await.unwrap();
        assert_eq!(next, 4);
    }

    #[tokio::test]
    async fn scan_takes_suffix_after_last_underscore() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("game_7_21")).await.unwrap();
        let next = scan_next_id(dir.path(), "game").await.unwrap();
        assert_eq!(next, 22);
    }
}
