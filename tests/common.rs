//! Test utilities & fixtures.
//! Builds throwaway config + layout trees under a temp dir. Each test owns
//! its tree and may mutate it freely.
#![allow(dead_code)]

use std::path::PathBuf;

use gamehall::config::{Config, GameTypeConfig};

/// A layout with one lobby and one playable map, no scripts.
pub const BASIC_LAYOUT: &str = r#"maps:
  - id: lobby
    path: maps/lobby
    lobby: true
  - id: island_a
    alias: Island A
    path: maps/island_a
players:
  path: players.yml
coordinate-tags:
  path: coordinate-tags.yml
"#;

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub config: Config,
}

impl Fixture {
    pub fn new() -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::default();
        config.data_dir = dir.path().join("data").display().to_string();
        config.worlds.directory = dir.path().join("worlds").display().to_string();
        config.logging.file = None;
        Fixture { dir, config }
    }

    /// Register `game` in the config and write its layout document.
    /// Returns the layout file path.
    pub fn add_game(&mut self, game: &str, layout: &str) -> PathBuf {
        let root = self.game_root(game);
        std::fs::create_dir_all(&root).unwrap();
        let layout_file = root.join("layout.yml");
        std::fs::write(&layout_file, layout).unwrap();
        self.config.games.insert(
            game.to_string(),
            GameTypeConfig {
                layout: format!("{}/layout.yml", game),
            },
        );
        layout_file
    }

    /// Register `game` without writing any layout file.
    pub fn add_game_without_layout(&mut self, game: &str) {
        self.config.games.insert(
            game.to_string(),
            GameTypeConfig {
                layout: format!("{}/layout.yml", game),
            },
        );
    }

    /// Root folder of one game type's resources.
    pub fn game_root(&self, game: &str) -> PathBuf {
        PathBuf::from(&self.config.data_dir).join(game)
    }

    /// Write a script file under the game's root, returning its relative path.
    pub fn write_script(&self, game: &str, name: &str) -> String {
        let scripts = self.game_root(game).join("scripts");
        std::fs::create_dir_all(&scripts).unwrap();
        std::fs::write(scripts.join(name), "// behavior code\n").unwrap();
        format!("scripts/{}", name)
    }

    /// Write the game's coordinate tag document.
    pub fn write_tags(&self, game: &str, tags: &str) {
        let root = self.game_root(game);
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("coordinate-tags.yml"), tags).unwrap();
    }

    pub fn worlds_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.worlds.directory)
    }
}
