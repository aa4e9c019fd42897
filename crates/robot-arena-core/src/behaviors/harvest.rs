//! Harvester behavior for lumber and miner robots.
//!
//! # States
//!
//! - `Idle`: once the cooldown has elapsed, pick a task. A ready drop of the
//!   harvester's resource wins over an obstacle of its material; with neither
//!   the robot falls back to `DefaultBehavior`.
//! - `TargetingResource`: walk to the nearest ready drop, then collect it.
//! - `CollectingResource`: destroy the drop, bump the counter, cool down.
//! - `TargetingRawMaterial`: walk to the remembered obstacle and destroy it on
//!   contact. A blocker met on the way is remembered and the robot deflects
//!   perpendicular to it for the configured detour time.
//! - `DefaultBehavior`: wander and re-check for tasks every tick.
//!
//! A state that hands over to the next one (a task picked from `Idle`, contact
//! with a drop) lets the next handler run in the same tick, so a robot already
//! touching a ready drop collects it in a single update.
//!
//! After the state handler, contact with another agent reverses the velocity.
//! Drops and obstacles are exempt so the robot never bounces off its own
//! target. Targets staged for removal by someone else are ignored, which keeps
//! two harvesters from cashing in the same drop.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use crate::behavior::{mismatch, Behavior, TickContext};
use crate::canvas::{Canvas, SpriteKind};
use crate::entity::components::{Detour, HarvestRole, HarvestState, HarvesterComponents};
use crate::entity::{Body, Entity, EntityId, EntityInner, EntityTag};
use crate::error::UpdateError;
use crate::events::ArenaEvent;
use crate::geometry::{circles_overlap, heading_of};

use super::wander::bounce_step;

/// Upper bound on state handlers run in one tick.
const MAX_HANDOFFS: usize = 4;

/// Whether the state just entered should run in the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Done,
    Continue,
}

/// Behavior of lumber and miner robots.
#[derive(Debug, Default, Clone, Copy)]
pub struct HarvestBehavior;

fn set_state(id: EntityId, robot: &mut HarvesterComponents, state: HarvestState) {
    if robot.state != state {
        tracing::debug!(harvester = %id, from = ?robot.state, to = ?state, "harvester state change");
        robot.state = state;
    }
}

fn go_idle(id: EntityId, robot: &mut HarvesterComponents) {
    robot.target = None;
    robot.detour = None;
    set_state(id, robot, HarvestState::Idle);
}

fn start_cooldown(robot: &mut HarvesterComponents, ctx: &TickContext<'_>) {
    robot.cooldown_until = ctx.now() + ctx.ticks_for(ctx.config.harvest.cooldown_secs);
}

fn is_ready_drop_for(entity: &Entity, role: HarvestRole, now: u64) -> bool {
    entity
        .inner
        .as_resource()
        .is_some_and(|drop| drop.kind == role.resource_kind() && drop.is_ready_to_collect(now))
}

fn is_material_for(entity: &Entity, role: HarvestRole) -> bool {
    entity
        .inner
        .as_obstacle()
        .is_some_and(|obstacle| obstacle.kind == role.obstacle_kind())
}

fn nearest_ready_drop<'a>(
    id: EntityId,
    position: Vec2,
    role: HarvestRole,
    ctx: &TickContext<'a>,
) -> Option<&'a Entity> {
    let now = ctx.now();
    let deferred = &*ctx.deferred;
    ctx.view.nearest(position, Some(id), |e| {
        is_ready_drop_for(e, role, now) && !deferred.is_removal_scheduled(e.id())
    })
}

fn nearest_material<'a>(
    id: EntityId,
    position: Vec2,
    role: HarvestRole,
    ctx: &TickContext<'a>,
) -> Option<&'a Entity> {
    let deferred = &*ctx.deferred;
    ctx.view.nearest(position, Some(id), |e| {
        is_material_for(e, role) && !deferred.is_removal_scheduled(e.id())
    })
}

fn live_target<'a>(robot: &HarvesterComponents, ctx: &TickContext<'a>) -> Option<&'a Entity> {
    robot
        .target
        .filter(|&target| ctx.is_live(target))
        .and_then(|target| ctx.view.get(target))
}

fn advance(body: &mut Body, robot: &HarvesterComponents, ctx: &TickContext<'_>) {
    body.set_position(body.position + robot.motion.velocity, ctx.bounds());
}

fn deflect_around(body: &mut Body, robot: &mut HarvesterComponents, blocker: Vec2, ctx: &TickContext<'_>) {
    let away = heading_of(blocker - body.position) + FRAC_PI_2;
    robot.motion.set_heading(away);
    advance(body, robot, ctx);
}

fn find_next_task(
    id: EntityId,
    body: &Body,
    robot: &mut HarvesterComponents,
    ctx: &TickContext<'_>,
) -> Flow {
    if ctx.now() < robot.cooldown_until {
        return Flow::Done;
    }
    if let Some(drop) = nearest_ready_drop(id, body.position, robot.role, ctx) {
        robot.target = Some(drop.id());
        set_state(id, robot, HarvestState::TargetingResource);
        return Flow::Continue;
    }
    if let Some(obstacle) = nearest_material(id, body.position, robot.role, ctx) {
        robot.target = Some(obstacle.id());
        robot.detour = None;
        set_state(id, robot, HarvestState::TargetingRawMaterial);
        return Flow::Continue;
    }
    robot.target = None;
    set_state(id, robot, HarvestState::DefaultBehavior);
    Flow::Done
}

fn target_resource(
    id: EntityId,
    body: &mut Body,
    robot: &mut HarvesterComponents,
    ctx: &TickContext<'_>,
) -> Flow {
    let Some(drop) = nearest_ready_drop(id, body.position, robot.role, ctx) else {
        go_idle(id, robot);
        return Flow::Done;
    };
    robot.target = Some(drop.id());
    if circles_overlap(body.position, body.radius, drop.position(), drop.radius()) {
        set_state(id, robot, HarvestState::CollectingResource);
        return Flow::Continue;
    }
    robot.motion.steer_towards(drop.position() - body.position);
    advance(body, robot, ctx);
    Flow::Done
}

fn collect_resource(
    id: EntityId,
    body: &Body,
    robot: &mut HarvesterComponents,
    ctx: &mut TickContext<'_>,
) -> Flow {
    let now = ctx.now();
    let Some(drop) = live_target(robot, ctx).filter(|e| is_ready_drop_for(e, robot.role, now))
    else {
        go_idle(id, robot);
        return Flow::Done;
    };
    if !circles_overlap(body.position, body.radius, drop.position(), drop.radius()) {
        set_state(id, robot, HarvestState::TargetingResource);
        return Flow::Done;
    }

    if let Err(err) = ctx.destroy(drop) {
        tracing::warn!(harvester = %id, drop = %drop.id(), error = %err, "failed to destroy drop");
        go_idle(id, robot);
        return Flow::Done;
    }
    let resource = robot.role.resource_kind();
    ctx.economy.add(resource, 1);
    let total = ctx.economy.get(resource);
    ctx.emit(ArenaEvent::ResourceCollected {
        harvester: id,
        resource,
        total,
    });
    tracing::debug!(harvester = %id, resource = resource.as_str(), total, "collected drop");

    start_cooldown(robot, ctx);
    go_idle(id, robot);
    Flow::Done
}

fn target_raw_material(
    id: EntityId,
    body: &mut Body,
    robot: &mut HarvesterComponents,
    ctx: &mut TickContext<'_>,
) -> Flow {
    let role = robot.role;
    let Some(obstacle) = live_target(robot, ctx).filter(|e| is_material_for(e, role)) else {
        go_idle(id, robot);
        return Flow::Done;
    };

    if circles_overlap(body.position, body.radius, obstacle.position(), obstacle.radius()) {
        if let Err(err) = ctx.destroy(obstacle) {
            tracing::warn!(harvester = %id, obstacle = %obstacle.id(), error = %err, "failed to destroy obstacle");
        }
        start_cooldown(robot, ctx);
        go_idle(id, robot);
        return Flow::Done;
    }

    let now = ctx.now();
    if let Some(detour) = robot.detour {
        if now < detour.until {
            if let Some(blocker) = ctx.view.get(detour.blocker) {
                deflect_around(body, robot, blocker.position(), ctx);
                return Flow::Done;
            }
        }
        robot.detour = None;
    }

    robot.motion.steer_towards(obstacle.position() - body.position);
    let target_id = obstacle.id();
    if let Some(blocker) = ctx.view.first_collision(id, body, |e| e.id() != target_id) {
        robot.detour = Some(Detour {
            blocker: blocker.id(),
            until: now + ctx.ticks_for(ctx.config.harvest.detour_secs),
        });
        tracing::debug!(harvester = %id, blocker = %blocker.id(), "detouring around blocker");
        deflect_around(body, robot, blocker.position(), ctx);
        return Flow::Done;
    }

    advance(body, robot, ctx);
    Flow::Done
}

impl Behavior for HarvestBehavior {
    fn name(&self, entity: &Entity) -> &'static str {
        match entity.inner.as_harvester().map(|h| h.role) {
            Some(HarvestRole::Miner) => "Miner Robot",
            _ => "Lumber Robot",
        }
    }

    fn description(&self, entity: &Entity) -> &'static str {
        match entity.inner.as_harvester().map(|h| h.role) {
            Some(HarvestRole::Miner) => "Breaks rocks apart and gathers the rock they drop.",
            _ => "Chops down trees and gathers the wood they drop.",
        }
    }

    fn update(&self, entity: &mut Entity, ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        let id = entity.id();
        let EntityInner::Harvester(robot) = &mut entity.inner else {
            return Err(mismatch(id, EntityTag::Harvester));
        };
        let body = &mut entity.body;

        for _ in 0..MAX_HANDOFFS {
            let flow = match robot.state {
                HarvestState::Idle => find_next_task(id, body, robot, ctx),
                HarvestState::TargetingResource => target_resource(id, body, robot, ctx),
                HarvestState::CollectingResource => collect_resource(id, body, robot, ctx),
                HarvestState::TargetingRawMaterial => target_raw_material(id, body, robot, ctx),
                HarvestState::DefaultBehavior => {
                    bounce_step(id, body, &mut robot.motion, ctx);
                    find_next_task(id, body, robot, ctx);
                    Flow::Done
                }
            };
            if flow == Flow::Done {
                break;
            }
        }

        if ctx
            .view
            .first_collision(id, body, |e| !e.tag().is_prop())
            .is_some()
        {
            robot.motion.velocity = -robot.motion.velocity;
        }

        robot
            .frame
            .advance(ctx.frame_ticks(), ctx.config.agents.frame_count);
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        if let Some(robot) = entity.inner.as_harvester() {
            let sprite = match robot.role {
                HarvestRole::Lumber => SpriteKind::Lumber(robot.frame.index),
                HarvestRole::Miner => SpriteKind::Miner(robot.frame.index),
            };
            super::draw_body(canvas, sprite, &entity.body, robot.motion.heading());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::entity::components::{ObstacleKind, ResourceKind};
    use crate::tests::helpers::{harvester_state, spawn_harvester, spawn_ready_drop};

    mod task_selection_tests {
        use super::*;

        #[test]
        fn prefers_drop_over_obstacle() {
            let mut arena = Arena::default();
            let robot = spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(100.0, 100.0));
            arena.add_obstacle(ObstacleKind::Tree, Vec2::new(200.0, 100.0));
            spawn_ready_drop(&mut arena, ResourceKind::Wood, Vec2::new(600.0, 500.0));

            arena.update_all();
            assert_eq!(harvester_state(&arena, robot), Some(HarvestState::TargetingResource));
        }

        #[test]
        fn miner_ignores_trees_and_wood() {
            let mut arena = Arena::default();
            let robot = spawn_harvester(&mut arena, HarvestRole::Miner, Vec2::new(100.0, 100.0));
            arena.add_obstacle(ObstacleKind::Tree, Vec2::new(200.0, 100.0));
            spawn_ready_drop(&mut arena, ResourceKind::Wood, Vec2::new(300.0, 300.0));

            arena.update_all();
            assert_eq!(harvester_state(&arena, robot), Some(HarvestState::DefaultBehavior));
        }

        #[test]
        fn unready_drop_is_skipped() {
            let mut arena = Arena::default();
            let robot = spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(100.0, 100.0));
            arena.add_obstacle(ObstacleKind::Tree, Vec2::new(400.0, 100.0));
            arena.add_resource(ResourceKind::Wood, Vec2::new(200.0, 200.0));

            arena.update_all();
            assert_eq!(
                harvester_state(&arena, robot),
                Some(HarvestState::TargetingRawMaterial)
            );
        }

        #[test]
        fn cooldown_delays_next_task() {
            let mut arena = Arena::default();
            let robot = spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(100.0, 100.0));
            spawn_ready_drop(&mut arena, ResourceKind::Wood, Vec2::new(100.0, 100.0));
            spawn_ready_drop(&mut arena, ResourceKind::Wood, Vec2::new(300.0, 100.0));

            arena.update_all();
            arena.process_deferred();
            assert_eq!(arena.economy().wood(), 6);
            assert_eq!(harvester_state(&arena, robot), Some(HarvestState::Idle));

            // Still cooling down on the next tick.
            arena.update_all();
            assert_eq!(harvester_state(&arena, robot), Some(HarvestState::Idle));

            for _ in 0..60 {
                arena.update_all();
                arena.process_deferred();
            }
            assert_ne!(harvester_state(&arena, robot), Some(HarvestState::Idle));
        }
    }

    mod raw_material_tests {
        use super::*;

        #[test]
        fn breaks_obstacle_on_contact() {
            let mut arena = Arena::default();
            let robot = spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(100.0, 100.0));
            let tree = arena.add_obstacle(ObstacleKind::Tree, Vec2::new(140.0, 100.0));

            arena.update_all();
            arena.process_deferred();

            assert!(arena.get(tree).is_none());
            assert_eq!(arena.view().count(EntityTag::Resource), 1);
            assert_eq!(harvester_state(&arena, robot), Some(HarvestState::Idle));
        }

        #[test]
        fn detours_around_blocker() {
            let mut arena = Arena::default();
            let robot = spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(100.0, 300.0));
            let blocker = arena.add_obstacle(ObstacleKind::Rock, Vec2::new(140.0, 300.0));
            arena.add_obstacle(ObstacleKind::Tree, Vec2::new(600.0, 300.0));

            arena.update_all();
            let detour = arena
                .get(robot)
                .and_then(|e| e.inner.as_harvester())
                .and_then(|h| h.detour);
            assert_eq!(detour.map(|d| d.blocker), Some(blocker));
            assert_eq!(detour.map(|d| d.until), Some(1 + 120));

            // Deflection is perpendicular to the blocker direction.
            let velocity = arena
                .get(robot)
                .and_then(|e| e.inner.motion())
                .map(|m| m.velocity)
                .unwrap_or_default();
            assert!(velocity.x.abs() < 1e-4);
        }

        #[test]
        fn vanished_obstacle_returns_to_idle() {
            let mut arena = Arena::default();
            let robot = spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(100.0, 100.0));
            let tree = arena.add_obstacle(ObstacleKind::Tree, Vec2::new(500.0, 100.0));

            arena.update_all();
            assert_eq!(
                harvester_state(&arena, robot),
                Some(HarvestState::TargetingRawMaterial)
            );

            arena.schedule_removal(tree);
            arena.process_deferred();
            arena.update_all();
            // Drops the stale target and waits for the next tick.
            assert_eq!(harvester_state(&arena, robot), Some(HarvestState::Idle));
        }
    }

    #[test]
    fn names_follow_role() {
        let mut arena = Arena::default();
        let lumber = spawn_harvester(&mut arena, HarvestRole::Lumber, Vec2::new(100.0, 100.0));
        let miner = spawn_harvester(&mut arena, HarvestRole::Miner, Vec2::new(300.0, 100.0));
        assert_eq!(arena.display_name(lumber), Some("Lumber Robot"));
        assert_eq!(arena.display_name(miner), Some("Miner Robot"));
    }
}
