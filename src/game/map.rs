//! Game map metadata and the per-game-type map registry.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rand::seq::IteratorRandom;

use crate::coordtag::Capture;
use crate::error::{GameError, Result};

/// One playable variant of a game type.
#[derive(Debug, Clone)]
pub struct GameMap {
    /// Unique within the owning game type.
    pub id: String,
    /// Display name; defaults to `id` when the layout omits it.
    pub alias: String,
    pub description: Vec<String>,
    /// Exactly one map per game type carries this flag.
    pub lobby: bool,
    /// Path to the original map folder this variant is cloned from.
    pub repository: PathBuf,
    /// Area captures valid on this map, keyed by tag name. Embedded at
    /// resource-load time; the tag store stays authoritative for
    /// serialization only.
    pub area_registry: BTreeMap<String, Vec<Capture>>,
}

impl GameMap {
    /// Area captures recorded under the given tag name on this map.
    pub fn areas(&self, tag: &str) -> &[Capture] {
        self.area_registry
            .get(tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// All map variants of one game type.
///
/// Construction enforces the lobby invariant: exactly one map must be the
/// lobby, and map ids must be unique.
#[derive(Debug, Clone)]
pub struct MapRegistry {
    maps: BTreeMap<String, GameMap>,
    lobby_id: String,
}

impl MapRegistry {
    pub(crate) fn from_maps(game: &str, maps: Vec<GameMap>) -> Result<MapRegistry> {
        let mut registry = BTreeMap::new();
        let mut lobby_ids = Vec::new();

        for map in maps {
            if map.lobby {
                lobby_ids.push(map.id.clone());
            }
            let id = map.id.clone();
            if registry.insert(id.clone(), map).is_some() {
                return Err(GameError::faulty(format!(
                    "game '{}' declares map id '{}' more than once",
                    game, id
                )));
            }
        }

        match lobby_ids.as_slice() {
            [lobby] => Ok(MapRegistry {
                lobby_id: lobby.clone(),
                maps: registry,
            }),
            [] => Err(GameError::faulty(format!(
                "game '{}' doesn't have a lobby map",
                game
            ))),
            many => Err(GameError::faulty(format!(
                "game '{}' has {} lobby maps, expected exactly one",
                game,
                many.len()
            ))),
        }
    }

    pub fn get(&self, id: &str) -> Option<&GameMap> {
        self.maps.get(id)
    }

    pub fn lobby(&self) -> &GameMap {
        // Invariant upheld by from_maps: lobby_id is always present.
        &self.maps[&self.lobby_id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameMap> {
        self.maps.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// A random playable map. The lobby is never returned.
    pub fn random_playable(&self, game: &str) -> Result<&GameMap> {
        self.maps
            .values()
            .filter(|m| !m.lobby)
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| GameError::MapNotFound {
                game: game.to_string(),
            })
    }
}
