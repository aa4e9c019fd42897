//! Test helper functions for placing entities with exact state.
//!
//! The arena's own `add_agent` picks random headings and positions. Tests
//! that need a known starting velocity or a collectible drop build the spawn
//! here and insert it with [`Arena::add_item`].

use glam::Vec2;

use crate::arena::Arena;
use crate::entity::components::{
    EnemyComponents, HarvestRole, HarvestState, HarvesterComponents, Motion, PlayerComponents,
    PursuerComponents, ResourceComponents, ResourceKind, TraderComponents, WandererComponents,
};
use crate::entity::{Body, EntityId, EntityInner, Spawn};
use crate::shop::Catalog;

/// Radius every robot in the default configuration uses.
pub(crate) const ROBOT_RADIUS: f32 = 20.0;

// =============================================================================
// Entity Factory Functions
// =============================================================================

/// Spawns a wanderer moving with `velocity`. Its speed is the velocity's length.
pub(crate) fn spawn_wanderer(arena: &mut Arena, position: Vec2, velocity: Vec2) -> EntityId {
    arena.add_item(Spawn::new(
        Body::new(position, ROBOT_RADIUS),
        EntityInner::Wanderer(WandererComponents::new(Motion::new(
            velocity,
            velocity.length(),
        ))),
    ))
}

/// Spawns a resting pursuer with the default predator speed.
pub(crate) fn spawn_pursuer(arena: &mut Arena, position: Vec2) -> EntityId {
    let speed = arena.config().agents.predator_speed;
    arena.add_item(Spawn::new(
        Body::new(position, ROBOT_RADIUS),
        EntityInner::Pursuer(PursuerComponents::new(Motion::new(Vec2::ZERO, speed))),
    ))
}

/// Spawns an idle harvester heading along +x.
pub(crate) fn spawn_harvester(arena: &mut Arena, role: HarvestRole, position: Vec2) -> EntityId {
    let speed = arena.config().agents.harvester_speed;
    arena.add_item(Spawn::new(
        Body::new(position, ROBOT_RADIUS),
        EntityInner::Harvester(HarvesterComponents::new(
            role,
            Motion::with_heading(0.0, speed),
        )),
    ))
}

/// Spawns a drop that is collectible immediately.
pub(crate) fn spawn_ready_drop(arena: &mut Arena, kind: ResourceKind, position: Vec2) -> EntityId {
    let config = arena.config();
    let radius = config.scenario.obstacle_radius * config.harvest.drop_scale;
    arena.add_item(Spawn::new(
        Body::new(position, radius),
        EntityInner::Resource(ResourceComponents::new(kind, position, 0)),
    ))
}

/// Spawns the player robot.
pub(crate) fn spawn_player(arena: &mut Arena, position: Vec2) -> EntityId {
    let speed = arena.config().agents.player_speed;
    arena.add_item(Spawn::new(
        Body::new(position, ROBOT_RADIUS),
        EntityInner::Player(PlayerComponents::new(speed)),
    ))
}

/// Spawns a shopkeeper with the starting catalog.
pub(crate) fn spawn_trader(arena: &mut Arena, position: Vec2) -> EntityId {
    let catalog = Catalog::starting(&arena.config().shop);
    arena.add_item(Spawn::new(
        Body::new(position, ROBOT_RADIUS),
        EntityInner::Trader(TraderComponents::new(catalog)),
    ))
}

/// Spawns a night enemy.
pub(crate) fn spawn_enemy(arena: &mut Arena, position: Vec2) -> EntityId {
    let speed = arena.config().agents.enemy_speed;
    arena.add_item(Spawn::new(
        Body::new(position, ROBOT_RADIUS),
        EntityInner::Enemy(EnemyComponents::new(speed)),
    ))
}

// =============================================================================
// State Query Functions
// =============================================================================

/// Velocity of a wanderer, or zero if `id` is not one.
pub(crate) fn wanderer_velocity(arena: &Arena, id: EntityId) -> Vec2 {
    arena
        .get(id)
        .and_then(|e| e.inner.as_wanderer())
        .map_or(Vec2::ZERO, |w| w.motion.velocity)
}

/// Task state of a harvester.
pub(crate) fn harvester_state(arena: &Arena, id: EntityId) -> Option<HarvestState> {
    arena
        .get(id)
        .and_then(|e| e.inner.as_harvester())
        .map(|h| h.state)
}

/// Runs `ticks` full update and apply cycles without drawing.
pub(crate) fn run_ticks(arena: &mut Arena, ticks: u64) {
    for _ in 0..ticks {
        arena.update_all();
        arena.process_deferred();
    }
}
