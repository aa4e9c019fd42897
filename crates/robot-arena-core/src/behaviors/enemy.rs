//! Night raiders.
//!
//! An enemy walks straight at the nearest harvester that is not already
//! doomed, then checks for contact from where it landed. Reaching it (strict
//! circle overlap) stages the harvester's removal in the same tick. Without a
//! target the enemy stands still. Enemies are spawned when night
//! starts and swept away at dawn.

use crate::behavior::{mismatch, Behavior, TickContext};
use crate::canvas::{Canvas, SpriteKind};
use crate::entity::{Entity, EntityInner, EntityTag};
use crate::error::UpdateError;
use crate::events::ArenaEvent;
use crate::geometry::circles_overlap;

/// Behavior of night enemies.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnemyBehavior;

impl Behavior for EnemyBehavior {
    fn name(&self, _entity: &Entity) -> &'static str {
        "Sword Enemy"
    }

    fn description(&self, _entity: &Entity) -> &'static str {
        "Roams at night and cuts down harvesting robots."
    }

    fn update(&self, entity: &mut Entity, ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        let id = entity.id();
        let EntityInner::Enemy(enemy) = &mut entity.inner else {
            return Err(mismatch(id, EntityTag::Enemy));
        };
        let position = entity.body.position;

        if enemy.target.map_or(true, |target| !ctx.is_live(target)) {
            let deferred = &*ctx.deferred;
            enemy.target = ctx
                .view
                .nearest(position, Some(id), |e| {
                    e.tag() == EntityTag::Harvester && !deferred.is_removal_scheduled(e.id())
                })
                .map(Entity::id);
        }

        if let Some(worker) = enemy.target.and_then(|target| ctx.view.get(target)) {
            let step = (worker.position() - position).normalize_or_zero() * enemy.speed;
            entity.body.set_position(position + step, ctx.bounds());

            if circles_overlap(
                entity.body.position,
                entity.body.radius,
                worker.position(),
                worker.radius(),
            ) {
                ctx.deferred.schedule_removal(worker.id());
                ctx.emit(ArenaEvent::WorkerLost {
                    enemy: id,
                    worker: worker.id(),
                });
                tracing::info!(enemy = %id, worker = %worker.id(), "worker lost to enemy");
                enemy.target = None;
            }
        }

        enemy
            .frame
            .advance(ctx.frame_ticks(), ctx.config.agents.frame_count);
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        let Some(enemy) = entity.inner.as_enemy() else {
            return;
        };
        super::draw_body(canvas, SpriteKind::Enemy(enemy.frame.index), &entity.body, 0.0);
    }
}
