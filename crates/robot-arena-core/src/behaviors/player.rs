//! Player-controlled robot.
//!
//! Movement comes from the held direction keys (see
//! [`PlayerComponents::velocity`](crate::entity::components::PlayerComponents::velocity)). A move is taken only if the new circle
//! would not overlap any other entity; otherwise the player stays where it is.
//! The walk animation advances only while a key is held.
//!
//! Each tick the player also records the nearest trader within reach so the
//! renderer can show the interact prompt and the arena can open a shop.
//! The player can never be destroyed.

use glam::Vec2;

use crate::behavior::{mismatch, Behavior, TickContext};
use crate::canvas::{Canvas, SpriteKind};
use crate::entity::{Entity, EntityInner, EntityTag};
use crate::error::{ArenaError, UpdateError};
use crate::geometry::distance;

/// Behavior of the player's robot.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlayerBehavior;

impl Behavior for PlayerBehavior {
    fn name(&self, _entity: &Entity) -> &'static str {
        "Player Robot"
    }

    fn description(&self, _entity: &Entity) -> &'static str {
        "Your robot. Walk up to the shopkeeper to buy workers."
    }

    fn update(&self, entity: &mut Entity, ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        let id = entity.id();
        let EntityInner::Player(player) = &mut entity.inner else {
            return Err(mismatch(id, EntityTag::Player));
        };
        let body = &mut entity.body;

        let velocity = player.velocity();
        if velocity != Vec2::ZERO {
            let candidate = body.position + velocity;
            if ctx.view.check_overlap(candidate, body.radius, Some(id)) {
                tracing::trace!(player = %id, "move blocked");
            } else {
                body.set_position(candidate, ctx.bounds());
            }
            player
                .frame
                .advance(ctx.frame_ticks(), ctx.config.agents.frame_count);
        }

        let reach = ctx.config.shop.interaction_margin;
        let position = body.position;
        let radius = body.radius;
        player.near_trader = ctx
            .view
            .nearest(position, Some(id), |e| {
                e.tag() == EntityTag::Trader
                    && distance(position, e.position()) <= radius + e.radius() + reach
            })
            .map(Entity::id);
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        let Some(player) = entity.inner.as_player() else {
            return;
        };
        let size = entity.radius() * 2.0;
        let pos = entity.position();
        canvas.draw_sprite(
            SpriteKind::Player(player.frame.index),
            pos.x,
            pos.y,
            size,
            size,
            player.facing.rotation_deg(),
        );
    }

    fn destroy(&self, entity: &Entity, _ctx: &mut TickContext<'_>) -> Result<(), ArenaError> {
        tracing::error!(player = %entity.id(), "attempted to destroy the player");
        Err(ArenaError::NotDestroyable {
            id: entity.id(),
            tag: entity.tag(),
        })
    }
}
