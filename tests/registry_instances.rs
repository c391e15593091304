// Instance registry behavior: name validation, id monotonicity, filtered
// lookup, and purge semantics.

mod common;

use common::{Fixture, BASIC_LAYOUT};
use gamehall::error::GameError;
use gamehall::game::registry::GameRegistry;

#[tokio::test]
async fn digit_leading_name_fails_before_any_io() {
    let mut fx = Fixture::new();
    // Registered, but no layout tree exists: if open_new touched the
    // filesystem we would see a missing-layout error instead.
    fx.add_game_without_layout("9lives");

    let mut registry = GameRegistry::new(fx.config.clone()).await.unwrap();
    let err = registry.open_new("9lives").await.unwrap_err();
    match err {
        GameError::FaultyConfiguration(msg) => assert!(msg.contains("digit")),
        other => panic!("unexpected error: {other}"),
    }
    // The loader never ran, so nothing was created under the game root.
    assert!(!fx.game_root("9lives").exists());
}

#[tokio::test]
async fn repeated_open_new_yields_distinct_increasing_ids() {
    let mut fx = Fixture::new();
    fx.add_game("arena", BASIC_LAYOUT);

    let mut registry = GameRegistry::new(fx.config.clone()).await.unwrap();
    let first = registry.open_new("arena").await.unwrap().id;
    let second = registry.open_new("arena").await.unwrap().id;
    assert!(second > first);

    let both = registry.get(Some("arena"), None);
    assert_eq!(both.len(), 2);
    assert_eq!(both[0].id, first);
    assert_eq!(both[1].id, second);
}

#[tokio::test]
async fn get_filters_by_name_and_joinability() {
    let mut fx = Fixture::new();
    fx.add_game("arena", BASIC_LAYOUT);
    fx.add_game("skywars", BASIC_LAYOUT);

    let mut registry = GameRegistry::new(fx.config.clone()).await.unwrap();
    let arena_id = registry.open_new("arena").await.unwrap().id;
    registry.open_new("skywars").await.unwrap();

    assert_eq!(registry.get(None, None).len(), 2);
    assert_eq!(registry.get(Some("arena"), None).len(), 1);
    assert_eq!(registry.get(None, Some(true)).len(), 2);

    // A started round is no longer joinable.
    registry
        .get_by_id_mut(arena_id)
        .unwrap()
        .start(Some("island_a"))
        .unwrap();
    assert_eq!(registry.get(None, Some(true)).len(), 1);
    assert_eq!(registry.get(Some("arena"), Some(false)).len(), 1);
}

#[tokio::test]
async fn purge_removes_from_live_set() {
    let mut fx = Fixture::new();
    fx.add_game("arena", BASIC_LAYOUT);

    let mut registry = GameRegistry::new(fx.config.clone()).await.unwrap();
    let id = registry.open_new("arena").await.unwrap().id;
    assert!(registry.get_by_id(id).is_some());

    let removed = registry.purge(id).unwrap();
    assert_eq!(removed.id, id);
    assert!(registry.get_by_id(id).is_none());
    assert!(registry.purge(id).is_none());
}

#[tokio::test]
async fn shutdown_stops_and_clears_everything() {
    let mut fx = Fixture::new();
    fx.add_game("arena", BASIC_LAYOUT);

    let mut registry = GameRegistry::new(fx.config.clone()).await.unwrap();
    registry.open_new("arena").await.unwrap();
    registry.open_new("arena").await.unwrap();
    registry.shutdown().unwrap();
    assert!(registry.is_empty());
}
