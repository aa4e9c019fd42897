//! Built-in behaviors, one per entity kind.
//!
//! - [`WanderBehavior`]: bounce motion shared by every robot
//! - [`SensorBehavior`]: wander plus forward cone avoidance
//! - [`PursuitBehavior`]: hunts wanderers
//! - [`HarvestBehavior`]: lumber and miner task machine
//! - [`PlayerBehavior`]: key-driven, blocked by other bodies
//! - [`TraderBehavior`]: stationary shopkeeper
//! - [`EnemyBehavior`]: night raider hunting harvesters
//! - [`ObstacleBehavior`], [`ResourceBehavior`]: trees, rocks and their drops
//!
//! Register them all with
//! [`BehaviorRegistry::with_defaults`](crate::behavior::BehaviorRegistry::with_defaults).

mod enemy;
mod harvest;
mod player;
mod props;
mod pursuit;
mod sensor;
mod trader;
mod wander;

pub use enemy::EnemyBehavior;
pub use harvest::HarvestBehavior;
pub use player::PlayerBehavior;
pub use props::{ObstacleBehavior, ResourceBehavior};
pub use pursuit::PursuitBehavior;
pub use sensor::SensorBehavior;
pub use trader::TraderBehavior;
pub use wander::WanderBehavior;

use crate::canvas::{Canvas, SpriteKind};
use crate::entity::Body;

/// Draws a circular body's sprite, sized to its diameter and rotated by `heading` radians.
pub(crate) fn draw_body(canvas: &mut dyn Canvas, sprite: SpriteKind, body: &Body, heading: f32) {
    let size = body.radius * 2.0;
    canvas.draw_sprite(
        sprite,
        body.position.x,
        body.position.y,
        size,
        size,
        heading.to_degrees(),
    );
}
