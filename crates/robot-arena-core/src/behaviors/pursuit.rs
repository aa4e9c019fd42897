//! Pursuer behavior.
//!
//! A pursuer keeps a target id between ticks and drops it as soon as the id
//! is no longer live or another hunter has already caught it. Prey is any
//! basic wanderer. On contact the prey is
//! staged for removal; otherwise the pursuer turns straight toward it. The
//! shared bounce motion always runs afterwards, so a pursuer with nothing to
//! hunt simply wanders.

use crate::behavior::{mismatch, Behavior, TickContext};
use crate::canvas::{Canvas, SpriteKind};
use crate::entity::{Entity, EntityInner, EntityTag};
use crate::error::UpdateError;
use crate::events::ArenaEvent;
use crate::geometry::circles_overlap;

use super::wander::bounce_step;

/// Behavior of predator robots.
#[derive(Debug, Default, Clone, Copy)]
pub struct PursuitBehavior;

/// Returns true for entities a pursuer hunts.
pub(crate) fn is_prey(entity: &Entity) -> bool {
    entity.tag() == EntityTag::Wanderer
}

impl Behavior for PursuitBehavior {
    fn name(&self, _entity: &Entity) -> &'static str {
        "Predator Robot"
    }

    fn description(&self, _entity: &Entity) -> &'static str {
        "Hunts down basic robots and removes them on contact."
    }

    fn update(&self, entity: &mut Entity, ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        let id = entity.id();
        let EntityInner::Pursuer(robot) = &mut entity.inner else {
            return Err(mismatch(id, EntityTag::Pursuer));
        };
        let position = entity.body.position;

        if robot.target.map_or(true, |target| !ctx.is_live(target)) {
            let deferred = &*ctx.deferred;
            robot.target = ctx
                .view
                .nearest(position, Some(id), |e| {
                    is_prey(e) && !deferred.is_removal_scheduled(e.id())
                })
                .map(Entity::id);
            if let Some(target) = robot.target {
                tracing::debug!(pursuer = %id, prey = %target, "acquired prey");
            }
        }

        if let Some(prey) = robot.target.and_then(|target| ctx.view.get(target)) {
            if circles_overlap(position, entity.body.radius, prey.position(), prey.radius()) {
                ctx.deferred.schedule_removal(prey.id());
                ctx.emit(ArenaEvent::PreyCaught {
                    pursuer: id,
                    prey: prey.id(),
                });
                tracing::debug!(pursuer = %id, prey = %prey.id(), "caught prey");
                robot.target = None;
            } else {
                robot.motion.steer_towards(prey.position() - position);
            }
        }

        bounce_step(id, &mut entity.body, &mut robot.motion, ctx);
        robot
            .frame
            .advance(ctx.frame_ticks(), ctx.config.agents.frame_count);
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        if let Some(robot) = entity.inner.as_pursuer() {
            super::draw_body(
                canvas,
                SpriteKind::Pursuer(robot.frame.index),
                &entity.body,
                robot.motion.heading(),
            );
        }
    }
}
