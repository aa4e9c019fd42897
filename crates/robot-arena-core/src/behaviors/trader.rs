//! Stationary shopkeeper.
//!
//! The trader itself does nothing per tick. Sessions are opened and closed by
//! the arena ([`Arena::interact`](crate::arena::Arena::interact)), which flips
//! the trader's `interacting` flag so a second interact while a session is open
//! is ignored.

use crate::behavior::{Behavior, TickContext};
use crate::canvas::{Canvas, SpriteKind};
use crate::entity::Entity;
use crate::error::{ArenaError, UpdateError};

/// Behavior of the shopkeeper.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraderBehavior;

impl Behavior for TraderBehavior {
    fn name(&self, _entity: &Entity) -> &'static str {
        "Shopkeeper"
    }

    fn description(&self, _entity: &Entity) -> &'static str {
        "Sells worker robots for wood. Press E nearby to trade."
    }

    fn update(&self, _entity: &mut Entity, _ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        super::draw_body(canvas, SpriteKind::Trader, &entity.body, 0.0);
    }

    fn destroy(&self, entity: &Entity, _ctx: &mut TickContext<'_>) -> Result<(), ArenaError> {
        tracing::error!(trader = %entity.id(), "attempted to destroy the trader");
        Err(ArenaError::NotDestroyable {
            id: entity.id(),
            tag: entity.tag(),
        })
    }
}
