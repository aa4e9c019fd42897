//! Wanderer behavior and the bounce motion every robot builds on.
//!
//! Each tick the robot proposes `position + velocity`, then:
//!
//! 1. If its current circle collides (buffered test) with another entity, the
//!    heading is jittered by up to ±π/8 and the proposal is pushed a further
//!    two steps along the new velocity.
//! 2. If the proposal crosses a vertical wall, `dx` flips and `dy` picks up a
//!    small random nudge; likewise for horizontal walls.
//! 3. The body moves to the proposal through the clamping setter.

use std::f32::consts::FRAC_PI_4;

use rand::Rng;

use crate::behavior::{mismatch, Behavior, TickContext};
use crate::canvas::{Canvas, SpriteKind};
use crate::entity::components::Motion;
use crate::entity::{Body, Entity, EntityId, EntityInner, EntityTag};
use crate::error::UpdateError;

/// Random nudge range applied to the other axis after a wall bounce.
const WALL_NUDGE: f32 = 0.1;

/// Advances a robot by one step of bounce motion.
pub(crate) fn bounce_step(
    id: EntityId,
    body: &mut Body,
    motion: &mut Motion,
    ctx: &mut TickContext<'_>,
) {
    let mut next = body.position + motion.velocity;

    if let Some(other) = ctx.view.first_collision(id, body, |_| true) {
        let jitter = (ctx.rng.gen::<f32>() - 0.5) * FRAC_PI_4;
        motion.set_heading(motion.heading() + jitter);
        next += motion.velocity * 2.0;
        tracing::debug!(entity = %id, other = %other.id(), "bounced off entity");
    }

    let bounds = ctx.bounds();
    let r = body.radius;
    if next.x < r || next.x > bounds.width - r {
        motion.velocity.x = -motion.velocity.x;
        motion.velocity.y += (ctx.rng.gen::<f32>() - 0.5) * WALL_NUDGE;
        next.x = r.max(next.x.min(bounds.width - r));
    }
    if next.y < r || next.y > bounds.height - r {
        motion.velocity.y = -motion.velocity.y;
        motion.velocity.x += (ctx.rng.gen::<f32>() - 0.5) * WALL_NUDGE;
        next.y = r.max(next.y.min(bounds.height - r));
    }

    body.set_position(next, bounds);
}

/// Behavior of basic robots.
#[derive(Debug, Default, Clone, Copy)]
pub struct WanderBehavior;

impl Behavior for WanderBehavior {
    fn name(&self, _entity: &Entity) -> &'static str {
        "Basic Robot"
    }

    fn description(&self, _entity: &Entity) -> &'static str {
        "Wanders the arena and bounces off walls and anything it bumps into."
    }

    fn update(&self, entity: &mut Entity, ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        let id = entity.id();
        let EntityInner::Wanderer(robot) = &mut entity.inner else {
            return Err(mismatch(id, EntityTag::Wanderer));
        };
        bounce_step(id, &mut entity.body, &mut robot.motion, ctx);
        robot
            .frame
            .advance(ctx.frame_ticks(), ctx.config.agents.frame_count);
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        if let Some(robot) = entity.inner.as_wanderer() {
            super::draw_body(
                canvas,
                SpriteKind::Wanderer(robot.frame.index),
                &entity.body,
                robot.motion.heading(),
            );
        }
    }
}
