//! # Gamehall - game-instance and resource-registry core
//!
//! Gamehall manages the lifecycle of concurrent minigame rounds. Each
//! running instance is bound to a map registry, a set of behavior scripts,
//! named coordinate tags, and a per-player restoration store, all loaded
//! from a per-game-type layout document.
//!
//! ## Features
//!
//! - **Instance registry**: unique monotonic instance ids with crash
//!   recovery against stale on-disk working directories, lookup and
//!   filtering of live rounds.
//! - **Resource loading**: YAML layout parsing with per-entry skip
//!   semantics, self-healing alias defaults, and a strict lobby-map
//!   invariant.
//! - **Coordinate tags**: point and area captures per map with a
//!   fixed-precision, lossless wire format.
//! - **Script registry**: opaque script resources resolved by engine,
//!   behind a host-implemented capability trait.
//! - **Player restoration**: persisted inventory/position snapshots keyed
//!   by player UUID, flushed under file locks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gamehall::config::Config;
//! use gamehall::game::registry::GameRegistry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut registry = GameRegistry::new(config).await?;
//!
//!     let id = registry.open_new("skywars").await?.id;
//!     println!("opened instance #{id}");
//!
//!     registry.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - Instances, the instance registry, maps, and resource loading
//! - [`coordtag`] - Coordinate tag store and capture serialization
//! - [`script`] - Script resources and the host-engine capability seam
//! - [`restore`] - Per-player restoration records and their store
//! - [`config`] - Global configuration management
//! - [`error`] - The error taxonomy every operation reports through
//!
//! ## Scope
//!
//! Rendering, physics, networking, event dispatch, and script execution
//! belong to the hosting server and its script engine. This crate is the
//! core those collaborators call into: its public operations map onto the
//! host's commands (`open_new`, `get`, `get_by_id`, `purge`, tag CRUD) and
//! its trigger hooks are invoked by the host's listener layer.

pub mod config;
pub mod coordtag;
mod diskio;
pub mod error;
pub mod game;
pub mod logutil;
pub mod restore;
pub mod script;
