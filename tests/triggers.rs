// Kill and death trigger hooks: registered per player or globally,
// dispatched by the host listener layer, and gated on the Playing phase.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{Fixture, BASIC_LAYOUT};
use gamehall::game::registry::GameRegistry;
use uuid::Uuid;

#[tokio::test]
async fn triggers_fire_only_while_playing() {
    let mut fx = Fixture::new();
    fx.add_game("arena", BASIC_LAYOUT);
    let mut registry = GameRegistry::new(fx.config.clone()).await.unwrap();
    let game = registry.open_new("arena").await.unwrap();

    let killer = Uuid::new_v4();
    let kills = Arc::new(AtomicUsize::new(0));
    let counted = kills.clone();
    game.add_kill_trigger(
        Some(killer),
        Box::new(move |_, _| {
            counted.fetch_add(1, Ordering::SeqCst);
        }),
    );

    // Still in the lobby: nothing fires.
    game.dispatch_kill(killer, "zombie");
    assert_eq!(kills.load(Ordering::SeqCst), 0);
    assert_eq!(game.dispatch_death(killer), None);

    game.start(None).unwrap();
    game.dispatch_kill(killer, "zombie");
    assert_eq!(kills.load(Ordering::SeqCst), 1);

    // Another player's kills don't reach a player-bound trigger.
    game.dispatch_kill(Uuid::new_v4(), "zombie");
    assert_eq!(kills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn player_bound_death_trigger_takes_precedence() {
    let mut fx = Fixture::new();
    fx.add_game("arena", BASIC_LAYOUT);
    let mut registry = GameRegistry::new(fx.config.clone()).await.unwrap();
    let game = registry.open_new("arena").await.unwrap();
    game.start(None).unwrap();

    let doomed = Uuid::new_v4();
    game.add_death_trigger(None, Box::new(|_| true));
    game.add_death_trigger(Some(doomed), Box::new(|_| false));

    // Bound trigger answers for its player; globals answer for the rest.
    assert_eq!(game.dispatch_death(doomed), Some(false));
    assert_eq!(game.dispatch_death(Uuid::new_v4()), Some(true));
}

#[tokio::test]
async fn started_round_binds_a_playable_map() {
    let mut fx = Fixture::new();
    fx.add_game("arena", BASIC_LAYOUT);
    let mut registry = GameRegistry::new(fx.config.clone()).await.unwrap();
    let game = registry.open_new("arena").await.unwrap();

    assert_eq!(game.active_map().id, "lobby");
    game.start(None).unwrap();
    // BASIC_LAYOUT has a single playable map.
    assert_eq!(game.active_map().id, "island_a");
    assert!(!game.can_join());
}
