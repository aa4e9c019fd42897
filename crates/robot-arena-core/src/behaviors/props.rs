//! Obstacles and the resource drops they leave behind.
//!
//! Obstacles never move. Destroying one stages three things at once: a drop
//! of the matching resource on the same spot (larger than the obstacle by the
//! configured scale and not collectible until its ready tick), the obstacle's
//! own removal, and a respawn of an identical obstacle after the respawn delay.
//!
//! Drops bob up and down around their anchor.

use glam::Vec2;

use crate::behavior::{mismatch, Behavior, TickContext};
use crate::canvas::{Canvas, SpriteKind};
use crate::entity::components::{ObstacleKind, ResourceComponents, ResourceKind};
use crate::entity::{Body, Entity, EntityInner, EntityTag, Spawn};
use crate::error::{ArenaError, UpdateError};
use crate::events::ArenaEvent;

/// Obstacle sprites are drawn larger than their collision circle.
const OBSTACLE_SPRITE_SCALE: f32 = 2.5;

/// Behavior of trees and rocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObstacleBehavior;

impl Behavior for ObstacleBehavior {
    fn name(&self, entity: &Entity) -> &'static str {
        match entity.inner.as_obstacle().map(|o| o.kind) {
            Some(ObstacleKind::Rock) => "Rock Obstacle",
            _ => "Tree Obstacle",
        }
    }

    fn description(&self, entity: &Entity) -> &'static str {
        match entity.inner.as_obstacle().map(|o| o.kind) {
            Some(ObstacleKind::Rock) => "A boulder. Miner robots break it into rock.",
            _ => "A tree. Lumber robots chop it into wood.",
        }
    }

    fn update(&self, _entity: &mut Entity, _ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        let Some(obstacle) = entity.inner.as_obstacle() else {
            return;
        };
        let sprite = match obstacle.kind {
            ObstacleKind::Tree => SpriteKind::Tree,
            ObstacleKind::Rock => SpriteKind::Rock,
        };
        let size = entity.radius() * OBSTACLE_SPRITE_SCALE;
        let pos = entity.position();
        canvas.draw_sprite(sprite, pos.x, pos.y, size, size, 0.0);
    }

    fn destroy(&self, entity: &Entity, ctx: &mut TickContext<'_>) -> Result<(), ArenaError> {
        let id = entity.id();
        let Some(obstacle) = entity.inner.as_obstacle() else {
            return Err(ArenaError::WrongKind {
                id,
                expected: EntityTag::Obstacle,
                actual: entity.tag(),
            });
        };
        // A second destroy in the same tick must not drop twice.
        if !ctx.deferred.schedule_removal(id) {
            return Ok(());
        }

        let now = ctx.now();
        let config = ctx.config;
        let harvest = &config.harvest;
        let drop_radius = entity.radius() * harvest.drop_scale;
        let spot = ctx.bounds().clamp_center(entity.position(), drop_radius);
        let drop = ResourceComponents::new(
            obstacle.kind.drop_kind(),
            spot,
            now + ctx.ticks_for(harvest.resource_ready_secs),
        );
        let respawn_due = now + ctx.ticks_for(harvest.respawn_secs);
        ctx.deferred.schedule_addition(Spawn::new(
            Body::new(spot, drop_radius),
            EntityInner::Resource(drop),
        ));
        ctx.deferred.schedule_respawn(
            respawn_due,
            Spawn::new(entity.body, EntityInner::Obstacle(*obstacle)),
        );
        ctx.emit(ArenaEvent::ObstacleBroken {
            obstacle: id,
            kind: obstacle.kind,
        });
        tracing::debug!(obstacle = %id, kind = ?obstacle.kind, respawn_due, "obstacle broken");
        Ok(())
    }
}

/// Behavior of wood and rock drops.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResourceBehavior;

impl Behavior for ResourceBehavior {
    fn name(&self, entity: &Entity) -> &'static str {
        match entity.inner.as_resource().map(|r| r.kind) {
            Some(ResourceKind::Rock) => "Rock",
            _ => "Wood",
        }
    }

    fn description(&self, _entity: &Entity) -> &'static str {
        "A resource drop waiting to be collected by a harvester."
    }

    fn update(&self, entity: &mut Entity, ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        let id = entity.id();
        let EntityInner::Resource(drop) = &mut entity.inner else {
            return Err(mismatch(id, EntityTag::Resource));
        };
        let step = ctx.config.harvest.bob_step;
        let amplitude = ctx.config.harvest.bob_amplitude;

        if drop.rising {
            drop.bob_offset -= step;
            if drop.bob_offset <= -amplitude {
                drop.bob_offset = -amplitude;
                drop.rising = false;
            }
        } else {
            drop.bob_offset += step;
            if drop.bob_offset >= amplitude {
                drop.bob_offset = amplitude;
                drop.rising = true;
            }
        }

        let bobbed = drop.anchor + Vec2::new(0.0, drop.bob_offset);
        entity.body.set_position(bobbed, ctx.bounds());
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        if let Some(drop) = entity.inner.as_resource() {
            let sprite = match drop.kind {
                ResourceKind::Wood => SpriteKind::WoodDrop,
                ResourceKind::Rock => SpriteKind::RockDrop,
            };
            super::draw_body(canvas, sprite, &entity.body, 0.0);
        }
    }
}
