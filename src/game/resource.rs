//! # Game Resource Loader
//!
//! Given a game-type name, locate and parse its layout document, then
//! materialize the in-memory registries an instance binds to: maps,
//! scripts, coordinate tags, and the player restoration store. Loading is
//! strictly sequential (tags, then maps, then scripts) because later steps
//! depend on earlier ones; any whole-bundle failure aborts with nothing
//! registered.
//!
//! A layout document looks like:
//!
//! ```yaml
//! maps:
//!   - id: lobby
//!     path: maps/lobby
//!     lobby: true
//!   - id: island_a
//!     alias: "Island A"
//!     description:
//!       - "Small islands, fast rounds."
//!     path: maps/island_a
//! scripts:
//!   - id: round
//!     path: scripts/round.groovy
//! players:
//!   path: players.yml
//! coordinate-tags:
//!   path: coordinate-tags.yml
//! ```
//!
//! Map entries missing `id` or `path` are logged and skipped; a missing
//! `alias` is defaulted to the id and written back into the layout file
//! (self-healing, see [`GameResource::load`]). Script entries are stricter:
//! a missing field or file aborts the load, only an unsupported engine is
//! downgraded to a warning.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use crate::config::Config;
use crate::coordtag::TagStore;
use crate::diskio;
use crate::error::{GameError, Result};
use crate::game::map::{GameMap, MapRegistry};
use crate::logutil::escape_log;
use crate::restore::RestoreStore;
use crate::script::{Script, ScriptRegistry};

#[derive(Debug, Deserialize)]
struct LayoutDoc {
    #[serde(default)]
    maps: Vec<MapEntry>,
    #[serde(default)]
    scripts: Vec<ScriptEntry>,
    players: Option<PathSection>,
    #[serde(rename = "coordinate-tags")]
    coordinate_tags: Option<PathSection>,
}

#[derive(Debug, Deserialize)]
struct PathSection {
    path: String,
}

#[derive(Debug, Deserialize)]
struct MapEntry {
    id: Option<String>,
    alias: Option<String>,
    path: Option<String>,
    #[serde(default)]
    lobby: bool,
    description: Option<Description>,
}

/// `description` accepts a single line or a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Line(String),
    Lines(Vec<String>),
}

impl Description {
    fn into_lines(self) -> Vec<String> {
        match self {
            Description::Line(line) => vec![line],
            Description::Lines(lines) => lines,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScriptEntry {
    id: Option<String>,
    path: Option<String>,
}

/// The resource bundle one game instance exclusively owns for its
/// lifetime. Bundles are never shared: concurrent rounds of the same type
/// each load their own copy.
#[derive(Debug)]
pub struct GameResource {
    pub game: String,
    pub maps: MapRegistry,
    pub scripts: ScriptRegistry,
    pub tags: TagStore,
    pub restore: RestoreStore,
    /// Root folder of all resources of this game type (the layout file's
    /// directory).
    root: PathBuf,
    restore_file: PathBuf,
    tag_file: PathBuf,
}

impl GameResource {
    /// Load the full resource bundle for `game`.
    ///
    /// Self-healing runs as a separate step after parse: entries that
    /// lacked `alias` get `alias: <id>` written back into the layout file
    /// before the typed registries are built, so a second load of the
    /// same file is a no-op.
    pub async fn load(config: &Config, game: &str) -> Result<GameResource> {
        let layout_file = config.layout_path(game).ok_or_else(|| GameError::GameNotFound {
            game: game.to_string(),
        })?;

        let text = match diskio::read_optional(&layout_file).await? {
            Some(text) => text,
            None => {
                return Err(GameError::faulty(format!(
                    "game '{}' does not have a layout file at {}",
                    game,
                    layout_file.display()
                )))
            }
        };
        if text.trim().is_empty() {
            return Err(GameError::faulty(format!(
                "layout file is empty: {}",
                layout_file.display()
            )));
        }

        let mut raw: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|e| {
            GameError::faulty(format!(
                "malformed layout file {}: {}",
                layout_file.display(),
                e
            ))
        })?;

        let healed = self_heal_aliases(&mut raw);
        if healed > 0 {
            let patched = serde_yaml::to_string(&raw).map_err(|e| {
                GameError::faulty(format!("unserializable layout document: {}", e))
            })?;
            tokio::fs::write(&layout_file, patched)
                .await
                .map_err(|e| GameError::io(&layout_file, e))?;
            debug!(
                "Layout of '{}' normalized: {} alias field(s) defaulted",
                game, healed
            );
        }

        let layout: LayoutDoc = serde_yaml::from_value(raw).map_err(|e| {
            GameError::faulty(format!(
                "malformed layout file {}: {}",
                layout_file.display(),
                e
            ))
        })?;

        let root = layout_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        // Auxiliary documents resolve relative to the layout directory and
        // are created on first load.
        let restore_file = aux_file(&root, &layout_file, "players.path", layout.players).await?;
        let tag_file = aux_file(
            &root,
            &layout_file,
            "coordinate-tags.path",
            layout.coordinate_tags,
        )
        .await?;

        // Tags first; map construction consumes their area captures.
        let tags = TagStore::load(&tag_file).await?;
        let restore = RestoreStore::load(&restore_file).await?;

        let mut maps = Vec::new();
        for entry in layout.maps {
            let Some(id) = entry.id else {
                warn!(
                    "Entry 'id' of map is missing in {}",
                    layout_file.display()
                );
                continue;
            };
            let Some(path) = entry.path else {
                warn!(
                    "Entry 'path' of {} is missing in {}",
                    escape_log(&id),
                    layout_file.display()
                );
                continue;
            };
            let alias = entry.alias.unwrap_or_else(|| id.clone());
            let description = entry.description.map(Description::into_lines).unwrap_or_default();
            maps.push(GameMap {
                area_registry: tags.area_registry(&id),
                repository: root.join(path),
                id,
                alias,
                description,
                lobby: entry.lobby,
            });
        }
        let maps = MapRegistry::from_maps(game, maps)?;

        let mut scripts = ScriptRegistry::default();
        for entry in layout.scripts {
            let id = entry.id.ok_or_else(|| {
                GameError::faulty(format!(
                    "entry 'id' of script is missing in {}",
                    layout_file.display()
                ))
            })?;
            let path = entry.path.ok_or_else(|| {
                GameError::faulty(format!(
                    "entry 'path' of script '{}' is missing in {}",
                    id,
                    layout_file.display()
                ))
            })?;
            match Script::resolve(&id, &root.join(path)).await {
                Ok(script) => scripts.insert(script)?,
                Err(e @ GameError::ScriptEngineNotFound { .. }) => {
                    // Soft failure: the game type stays usable without
                    // this particular scripted behavior.
                    warn!("{}", e);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Resource bundle of '{}' loaded: {} map(s), {} script(s)",
            game,
            maps.len(),
            scripts.len()
        );

        Ok(GameResource {
            game: game.to_string(),
            maps,
            scripts,
            tags,
            restore,
            root,
            restore_file,
            tag_file,
        })
    }

    /// Root folder of this game type's resources.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn restore_file(&self) -> &Path {
        &self.restore_file
    }

    pub fn tag_file(&self) -> &Path {
        &self.tag_file
    }

    /// A random playable map; the lobby is never chosen.
    pub fn random_map(&self) -> Result<&GameMap> {
        self.maps.random_playable(&self.game)
    }

    /// Flush the restoration document, and the tag document only when
    /// `save_tag` is set. Tag data rarely changes at runtime, so callers
    /// skip it when untouched. Writes hold an exclusive file lock because
    /// instances of different types may flush concurrently.
    pub fn save_to_disk(&self, save_tag: bool) -> Result<()> {
        self.restore.save(&self.restore_file)?;
        if save_tag {
            self.tags.save(&self.tag_file)?;
        }
        Ok(())
    }
}

/// Default `alias: <id>` on map entries that lack it, in the raw document
/// so the rest of the file survives untouched. Returns how many entries
/// were patched.
fn self_heal_aliases(raw: &mut serde_yaml::Value) -> usize {
    let Some(maps) = raw.get_mut("maps").and_then(|m| m.as_sequence_mut()) else {
        return 0;
    };
    let mut healed = 0;
    for entry in maps {
        let Some(mapping) = entry.as_mapping_mut() else {
            continue;
        };
        let Some(id) = mapping.get("id").and_then(|v| v.as_str()).map(String::from) else {
            continue;
        };
        if mapping.get("alias").is_none() {
            mapping.insert("alias".into(), id.into());
            healed += 1;
        }
    }
    healed
}

/// Resolve an auxiliary document path, create the file when absent, and
/// reject anything that is not a `.yml` file.
async fn aux_file(
    root: &Path,
    layout_file: &Path,
    key: &str,
    section: Option<PathSection>,
) -> Result<PathBuf> {
    let section = section.ok_or_else(|| {
        GameError::faulty(format!(
            "{} is not defined in {}",
            key,
            layout_file.display()
        ))
    })?;
    let file = root.join(&section.path);

    if file.extension().and_then(|e| e.to_str()) != Some("yml") {
        return Err(GameError::faulty(format!(
            "this file has the wrong extension: {} (rename it to .yml)",
            file.display()
        )));
    }

    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| GameError::io(parent, e))?;
    }
    match tokio::fs::metadata(&file).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(GameError::faulty(format!(
                "not a regular file: {}",
                file.display()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tokio::fs::write(&file, "")
                .await
                .map_err(|e| GameError::io(&file, e))?;
        }
        Err(e) => return Err(GameError::io(&file, e)),
    }
    Ok(file)
}
