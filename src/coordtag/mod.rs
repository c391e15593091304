//! # Coordinate Tag Store
//!
//! Named spatial references (points or areas) scoped to a game type, with
//! zero or more captures per map id. The store loads a YAML document of
//! the form:
//!
//! ```yaml
//! spawn:
//!   mode: point
//!   captures:
//!     island_a:
//!       - "0.5,64.0,0.5,90.0,0.0"
//! battlefield:
//!   mode: area
//!   captures:
//!     island_a:
//!       - "-8.0,60.0,-8.0,8.0,72.0,8.0"
//! ```
//!
//! Capture strings use the fixed-precision format defined in
//! [`capture`]; the serialized form is the single source of truth for the
//! on-disk representation. Malformed capture entries are logged and
//! skipped; a structurally unreadable document aborts the load.

pub mod capture;

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

pub use capture::{Capture, TagMode};

use crate::diskio;
use crate::error::{GameError, Result};
use crate::logutil::escape_log;

/// A named, typed spatial reference with per-map captures.
#[derive(Debug, Clone)]
pub struct CoordTag {
    pub name: String,
    pub mode: TagMode,
    /// Ordered capture lists keyed by map id.
    captures: BTreeMap<String, Vec<Capture>>,
}

impl CoordTag {
    /// Captures recorded for the given map.
    pub fn captures(&self, map_id: &str) -> &[Capture] {
        self.captures.get(map_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Map ids that hold at least one capture for this tag.
    pub fn map_ids(&self) -> impl Iterator<Item = &str> {
        self.captures.keys().map(String::as_str)
    }
}

/// On-disk shape of one tag.
#[derive(Debug, Serialize, Deserialize)]
struct TagEntry {
    mode: TagMode,
    #[serde(default)]
    captures: BTreeMap<String, Vec<String>>,
}

/// All tags of one resource bundle, keyed by tag name.
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    tags: BTreeMap<String, CoordTag>,
}

impl TagStore {
    /// Reload all tags from the given tag document. A missing or empty
    /// file yields an empty store; a malformed document is a
    /// configuration error.
    pub async fn load(path: &Path) -> Result<TagStore> {
        let text = match diskio::read_optional(path).await? {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(TagStore::default()),
        };
        let doc: BTreeMap<String, TagEntry> = serde_yaml::from_str(&text).map_err(|e| {
            GameError::faulty(format!("unreadable tag document {}: {}", path.display(), e))
        })?;

        let mut tags = BTreeMap::new();
        for (name, entry) in doc {
            let mut captures: BTreeMap<String, Vec<Capture>> = BTreeMap::new();
            for (map_id, lines) in entry.captures {
                let mut parsed = Vec::with_capacity(lines.len());
                for line in lines {
                    match Capture::deserialize(entry.mode, &line) {
                        Ok(cap) => parsed.push(cap),
                        Err(e) => warn!(
                            "Skipping capture '{}' of tag '{}': {}",
                            escape_log(&line),
                            escape_log(&name),
                            e
                        ),
                    }
                }
                captures.insert(map_id, parsed);
            }
            tags.insert(
                name.clone(),
                CoordTag {
                    name,
                    mode: entry.mode,
                    captures,
                },
            );
        }
        Ok(TagStore { tags })
    }

    /// All tags in this store.
    pub fn iter(&self) -> impl Iterator<Item = &CoordTag> {
        self.tags.values()
    }

    pub fn get(&self, name: &str) -> Option<&CoordTag> {
        self.tags.get(name)
    }

    /// Tags restricted to one capture mode.
    pub fn by_mode(&self, mode: TagMode) -> impl Iterator<Item = &CoordTag> {
        self.tags.values().filter(move |t| t.mode == mode)
    }

    /// Every `(tag, capture)` pair valid on the given map.
    pub fn captures(&self, map_id: &str) -> Vec<(&CoordTag, &Capture)> {
        self.tags
            .values()
            .flat_map(|tag| tag.captures(map_id).iter().map(move |cap| (tag, cap)))
            .collect()
    }

    /// Area-capture slices for one map, keyed by tag name. This is what a
    /// map embeds at resource-load time.
    pub fn area_registry(&self, map_id: &str) -> BTreeMap<String, Vec<Capture>> {
        self.by_mode(TagMode::Area)
            .map(|tag| (tag.name.clone(), tag.captures(map_id).to_vec()))
            .filter(|(_, caps)| !caps.is_empty())
            .collect()
    }

    /// Create an empty tag. Fails if the name is taken.
    pub fn create(&mut self, name: &str, mode: TagMode) -> Result<()> {
        if self.tags.contains_key(name) {
            return Err(GameError::faulty(format!("tag '{}' already exists", name)));
        }
        self.tags.insert(
            name.to_string(),
            CoordTag {
                name: name.to_string(),
                mode,
                captures: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Record a capture into an existing tag.
    ///
    /// A point capture without an index replaces the map's existing point
    /// capture (a map holds at most one unless explicitly indexed); an
    /// indexed point capture overwrites only that slot. Area captures
    /// always append.
    pub fn record(
        &mut self,
        name: &str,
        map_id: &str,
        cap: Capture,
        index: Option<usize>,
    ) -> Result<()> {
        let tag = self
            .tags
            .get_mut(name)
            .ok_or_else(|| GameError::faulty(format!("tag '{}' does not exist", name)))?;
        if tag.mode != cap.mode() {
            return Err(GameError::faulty(format!(
                "tag '{}' is a {} tag, got a {} capture",
                name,
                tag.mode.label(),
                cap.mode().label()
            )));
        }

        let slot = tag.captures.entry(map_id.to_string()).or_default();
        match (tag.mode, index) {
            (TagMode::Point, None) => {
                slot.clear();
                slot.push(cap);
            }
            (TagMode::Point, Some(i)) | (TagMode::Area, Some(i)) => {
                if i < slot.len() {
                    slot[i] = cap;
                } else {
                    slot.push(cap);
                }
            }
            (TagMode::Area, None) => slot.push(cap),
        }
        Ok(())
    }

    /// Remove a tag entirely. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.tags.remove(name).is_some()
    }

    /// Serialize the whole store back to its YAML document form.
    pub fn to_document(&self) -> Result<String> {
        let doc: BTreeMap<&str, TagEntry> = self
            .tags
            .values()
            .map(|tag| {
                let captures = tag
                    .captures
                    .iter()
                    .map(|(map_id, caps)| {
                        (
                            map_id.clone(),
                            caps.iter().map(Capture::serialize).collect(),
                        )
                    })
                    .collect();
                (
                    tag.name.as_str(),
                    TagEntry {
                        mode: tag.mode,
                        captures,
                    },
                )
            })
            .collect();
        serde_yaml::to_string(&doc)
            .map_err(|e| GameError::faulty(format!("unserializable tag store: {}", e)))
    }

    /// Flush to disk under an exclusive file lock.
    pub fn save(&self, path: &Path) -> Result<()> {
        diskio::write_locked(path, &self.to_document()?)
    }
}
