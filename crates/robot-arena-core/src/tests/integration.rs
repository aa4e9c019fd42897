//! Integration tests for the full tick protocol.
//!
//! These tests drive whole arenas through `update_all → process_deferred`
//! (and the [`Simulation`] driver where drawing or the clock matters):
//! - Motion and containment
//! - Pursuit and harvesting end to end
//! - Obstacle respawn
//! - Trading and the economy
//! - Day/night population changes
//! - Snapshot round trips mid-game

use glam::Vec2;

use crate::arena::Arena;
use crate::canvas::RecordingCanvas;
use crate::config::ArenaConfig;
use crate::entity::components::{HarvestRole, HarvestState, ObstacleKind, ResourceKind};
use crate::entity::{AgentKind, Entity, EntityTag};
use crate::events::ArenaEvent;
use crate::input::{Direction, InputEvent};
use crate::shop::Interaction;
use crate::simulation::Simulation;
use crate::snapshot::ArenaSnapshot;

use super::helpers::{
    harvester_state, run_ticks, spawn_enemy, spawn_harvester, spawn_player, spawn_pursuer,
    spawn_ready_drop, spawn_trader, spawn_wanderer, wanderer_velocity,
};

// =============================================================================
// Motion
// =============================================================================

#[test]
fn wanderer_bounces_off_right_wall() {
    let mut arena = Arena::default();
    let id = spawn_wanderer(&mut arena, Vec2::new(100.0, 100.0), Vec2::new(2.0, 0.0));

    let mut flipped_at = None;
    for tick in 1..=400 {
        arena.update_all();
        let pos = arena.get(id).map(Entity::position).unwrap_or_default();
        assert!((20.0..=780.0).contains(&pos.x), "x out of bounds at tick {tick}: {}", pos.x);
        assert!((20.0..=580.0).contains(&pos.y), "y out of bounds at tick {tick}: {}", pos.y);
        if flipped_at.is_none() && wanderer_velocity(&arena, id).x < 0.0 {
            flipped_at = Some(tick);
        }
    }
    // 100 + 2 * 341 = 782 is the first proposal past 780.
    assert_eq!(flipped_at, Some(341));
}

#[test]
fn all_kinds_stay_inside_the_arena() {
    let mut arena = Arena::default();
    arena.seed_default_scenario();
    for kind in [
        AgentKind::Basic,
        AgentKind::Smart,
        AgentKind::Predator,
        AgentKind::Lumber,
        AgentKind::Miner,
    ] {
        arena.add_agent(kind);
        arena.add_agent(kind);
    }
    arena.handle_input(InputEvent::Pressed(Direction::Up));

    for _ in 0..600 {
        arena.update_all();
        arena.process_deferred();
        for entity in arena.entities() {
            let (pos, r) = (entity.position(), entity.radius());
            assert!(pos.x >= r - 1e-3 && pos.x <= 800.0 - r + 1e-3, "{entity:?}");
            assert!(pos.y >= r - 1e-3 && pos.y <= 600.0 - r + 1e-3, "{entity:?}");
        }
    }
}

// =============================================================================
// Pursuit
// =============================================================================

#[test]
fn pursuer_catches_adjacent_prey_on_first_tick() {
    let mut arena = Arena::default();
    let pursuer = spawn_pursuer(&mut arena, Vec2::new(0.0, 0.0));
    let prey = spawn_wanderer(&mut arena, Vec2::new(5.0, 5.0), Vec2::ZERO);

    arena.update_all();
    assert!(arena.deferred().is_removal_scheduled(prey));
    assert!(arena.get(prey).is_some());

    arena.process_deferred();
    assert!(arena.get(prey).is_none());
    assert!(arena.get(pursuer).is_some());
    assert!(arena
        .take_events()
        .iter()
        .any(|e| matches!(e, ArenaEvent::PreyCaught { prey: p, .. } if *p == prey)));
}

#[test]
fn pursuer_eventually_clears_all_prey() {
    let mut arena = Arena::default();
    spawn_pursuer(&mut arena, Vec2::new(400.0, 300.0));
    spawn_wanderer(&mut arena, Vec2::new(100.0, 100.0), Vec2::ZERO);
    spawn_wanderer(&mut arena, Vec2::new(700.0, 500.0), Vec2::ZERO);

    run_ticks(&mut arena, 1000);
    assert_eq!(arena.view().count(EntityTag::Wanderer), 0);
}

// =============================================================================
// Harvesting
// =============================================================================

#[test]
fn idle_harvester_collects_touching_drop() {
    let mut arena = Arena::default();
    let robot = spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(300.0, 300.0));
    let drop = spawn_ready_drop(&mut arena, ResourceKind::Wood, Vec2::new(320.0, 300.0));
    let wood_before = arena.economy().wood();

    arena.update_all();
    assert_eq!(harvester_state(&arena, robot), Some(HarvestState::Idle));
    assert_eq!(arena.economy().wood(), wood_before + 1);

    arena.process_deferred();
    assert!(arena.get(drop).is_none());
}

#[test]
fn lumber_robot_turns_tree_into_wood() {
    let mut arena = Arena::default();
    spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(100.0, 300.0));
    arena.add_obstacle(ObstacleKind::Tree, Vec2::new(400.0, 300.0));
    let wood_before = arena.economy().wood();

    // Walk ~250 units at 2 per tick, wait for the drop to ripen, then collect.
    run_ticks(&mut arena, 600);
    assert_eq!(arena.view().count(EntityTag::Obstacle), 0);
    assert_eq!(arena.economy().wood(), wood_before + 1);
    assert_eq!(arena.view().count(EntityTag::Resource), 0);
}

#[test]
fn miner_collects_rock() {
    let mut arena = Arena::default();
    spawn_harvester(&mut arena, HarvestRole::Miner, Vec2::new(100.0, 300.0));
    arena.add_obstacle(ObstacleKind::Rock, Vec2::new(300.0, 300.0));

    run_ticks(&mut arena, 600);
    assert_eq!(arena.economy().rock(), 1);
    assert_eq!(arena.economy().wood(), 5);
}

#[test]
fn destroyed_obstacle_respawns_after_cooldown() {
    let mut arena = Arena::default();
    let tree = arena.add_obstacle(ObstacleKind::Tree, Vec2::new(200.0, 200.0));
    arena.destroy(tree).unwrap();
    arena.process_deferred();
    assert_eq!(arena.view().count(EntityTag::Obstacle), 0);

    run_ticks(&mut arena, 1799);
    assert_eq!(arena.view().count(EntityTag::Obstacle), 0);

    // The uncollected drop still sits on the spot, so the respawn waits.
    run_ticks(&mut arena, 10);
    assert_eq!(arena.view().count(EntityTag::Obstacle), 0);

    let drop = arena
        .entities()
        .find(|e| e.tag() == EntityTag::Resource)
        .map(Entity::id)
        .unwrap();
    arena.schedule_removal(drop);
    run_ticks(&mut arena, 2);
    let tree = arena
        .entities()
        .find(|e| e.tag() == EntityTag::Obstacle)
        .unwrap();
    assert_eq!(tree.position(), Vec2::new(200.0, 200.0));
    assert_eq!(tree.inner.as_obstacle().map(|o| o.kind), Some(ObstacleKind::Tree));
}

// =============================================================================
// Trading
// =============================================================================

#[test]
fn rapid_interacts_open_one_session() {
    let mut arena = Arena::default();
    let trader = spawn_trader(&mut arena, Vec2::new(450.0, 300.0));
    spawn_player(&mut arena, Vec2::new(400.0, 300.0));
    arena.update_all();

    let first = arena.handle_input(InputEvent::Interact);
    let second = arena.handle_input(InputEvent::Interact);
    assert!(matches!(first, Some(Interaction::Opened { trader: t, .. }) if t == trader));
    assert_eq!(second, Some(Interaction::AlreadyInteracting));

    let opened = arena
        .take_events()
        .iter()
        .filter(|e| matches!(e, ArenaEvent::ShopOpened { .. }))
        .count();
    assert_eq!(opened, 1);
}

#[test]
fn walk_to_trader_and_buy_a_lumber_robot() {
    let mut sim = Simulation::new(ArenaConfig::default());
    spawn_player(sim.arena_mut(), Vec2::new(400.0, 300.0));
    spawn_trader(sim.arena_mut(), Vec2::new(700.0, 90.0));
    let mut canvas = RecordingCanvas::new();

    sim.arena_mut()
        .handle_input(InputEvent::Pressed(Direction::Right));
    let mut turned = false;
    let mut session = None;
    for _ in 0..400 {
        sim.step(&mut canvas);
        let player = sim
            .arena()
            .player_id()
            .and_then(|id| sim.arena().get(id))
            .map(Entity::position)
            .unwrap_or_default();
        if !turned && player.x >= 690.0 {
            turned = true;
            sim.arena_mut()
                .handle_input(InputEvent::Released(Direction::Right));
            sim.arena_mut().handle_input(InputEvent::Pressed(Direction::Up));
        }
        if let Interaction::Opened { trader, .. } = sim.arena_mut().interact() {
            session = Some(trader);
            break;
        }
    }

    let trader = session.expect("player never reached the trader");
    assert!(canvas
        .calls()
        .iter()
        .any(|c| matches!(c, crate::canvas::DrawCall::KeyIndicator { .. })));
    let receipt = sim.arena_mut().purchase(trader, 0).unwrap();
    assert_eq!(receipt.item.kind, AgentKind::Lumber);
    sim.step(&mut canvas);
    assert_eq!(sim.arena().view().count(EntityTag::Harvester), 1);
    assert_eq!(sim.arena().economy().wood(), 0);
}

#[test]
fn declined_purchase_changes_nothing() {
    let mut config = ArenaConfig::default();
    config.economy.starting_wood = 2;
    let mut arena = Arena::new(config);
    let trader = spawn_trader(&mut arena, Vec2::new(450.0, 300.0));
    spawn_player(&mut arena, Vec2::new(400.0, 300.0));
    arena.update_all();
    arena.interact();
    let before = arena.snapshot();

    assert!(arena.purchase(trader, 0).is_err());
    assert!(arena.deferred().is_empty());
    assert_eq!(arena.snapshot(), before);
}

#[test]
fn wood_threshold_notice_fires_once() {
    let mut arena = Arena::default();
    spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(400.0, 300.0));
    for x in [100.0, 200.0, 300.0, 500.0, 600.0, 700.0] {
        spawn_ready_drop(&mut arena, ResourceKind::Wood, Vec2::new(x, 520.0));
    }

    let mut notices = Vec::new();
    for _ in 0..3000 {
        arena.update_all();
        arena.process_deferred();
        notices.extend(arena.take_notices());
    }
    assert_eq!(arena.economy().wood(), 11);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].resource, ResourceKind::Wood);
    assert_eq!(notices[0].total, 10);
}

// =============================================================================
// Day and night
// =============================================================================

#[test]
fn enemies_hunt_at_night_and_leave_at_dawn() {
    let mut sim = Simulation::new(ArenaConfig::default());
    let mut canvas = RecordingCanvas::new();
    for _ in 0..12 {
        sim.advance_clock_hour();
    }
    assert!(sim.arena().clock().is_night());
    sim.step(&mut canvas);
    assert_eq!(sim.arena().view().count(EntityTag::Enemy), 3);

    for _ in 0..12 {
        sim.advance_clock_hour();
    }
    assert!(!sim.arena().clock().is_night());
    sim.step(&mut canvas);
    assert_eq!(sim.arena().view().count(EntityTag::Enemy), 0);
}

#[test]
fn enemy_takes_out_harvester() {
    let mut arena = Arena::default();
    let worker = spawn_harvester(&mut arena, HarvestRole::Miner, Vec2::new(400.0, 300.0));
    spawn_enemy(&mut arena, Vec2::new(100.0, 300.0));

    run_ticks(&mut arena, 600);
    assert!(arena.get(worker).is_none());
    assert!(arena
        .take_events()
        .iter()
        .any(|e| matches!(e, ArenaEvent::WorkerLost { worker: w, .. } if *w == worker)));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn snapshot_mid_game_restores_equivalent_arena() {
    let mut arena = Arena::default();
    arena.seed_default_scenario();
    arena.add_agent(AgentKind::Lumber);
    arena.add_agent(AgentKind::Basic);
    run_ticks(&mut arena, 120);
    arena.set_hour(20);
    arena.process_deferred();

    let json = arena.snapshot().to_json().unwrap();
    let restored = Arena::restore(ArenaSnapshot::from_json(&json).unwrap(), ArenaConfig::default())
        .unwrap();

    assert_eq!(restored.len(), arena.len());
    assert_eq!(restored.current_tick(), arena.current_tick());
    assert_eq!(restored.clock().hour(), 20);
    assert!(restored.clock().is_night());
    assert_eq!(restored.economy(), arena.economy());
    for (a, b) in restored.entities().zip(arena.entities()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.tag(), b.tag());
        assert_eq!(a.position(), b.position());
        assert_eq!(a.radius(), b.radius());
    }
}

#[test]
fn pending_respawn_survives_save_and_load() {
    let mut arena = Arena::default();
    let tree = arena.add_obstacle(ObstacleKind::Tree, Vec2::new(200.0, 200.0));
    arena.destroy(tree).unwrap();
    arena.process_deferred();
    let drop = arena
        .entities()
        .find(|e| e.tag() == EntityTag::Resource)
        .map(Entity::id)
        .unwrap();
    arena.schedule_removal(drop);
    arena.process_deferred();
    run_ticks(&mut arena, 100);

    let json = arena.snapshot().to_json().unwrap();
    let saved = ArenaSnapshot::from_json(&json).unwrap();
    assert_eq!(saved.respawns.len(), 1);
    let mut restored = Arena::restore(saved, ArenaConfig::default()).unwrap();
    assert_eq!(restored.deferred().respawns().len(), 1);

    run_ticks(&mut arena, 1800);
    run_ticks(&mut restored, 1800);
    assert_eq!(arena.view().count(EntityTag::Obstacle), 1);
    assert_eq!(restored.view().count(EntityTag::Obstacle), 1);
    let back = restored
        .entities()
        .find(|e| e.tag() == EntityTag::Obstacle)
        .unwrap();
    assert_eq!(back.position(), Vec2::new(200.0, 200.0));
}
