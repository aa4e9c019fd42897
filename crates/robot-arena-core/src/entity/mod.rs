//! Entity module for the arena simulation.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier assigned on insertion
//! - [`EntityTag`]: Kind classification used to pick a behavior
//! - [`EntityInner`]: Type-safe storage for kind-specific components
//! - [`Body`]: Position and radius shared by every kind
//! - [`Entity`]: The complete entity container
//! - [`Spawn`]: An entity waiting to be inserted, without an id yet
//!
//! # Architecture
//!
//! Every entity is one record: a [`Body`] plus an [`EntityInner`] variant.
//! The tag is derived from the variant, so the two can never disagree. The
//! arena looks up the [`Behavior`](crate::behavior::Behavior) registered for
//! the tag to run `update`, `draw` and `destroy`.
//!
//! # Example
//!
//! ```
//! use robot_arena_core::entity::{Body, Entity, EntityId, EntityInner, EntityTag};
//! use robot_arena_core::entity::components::{ObstacleComponents, ObstacleKind};
//! use glam::Vec2;
//!
//! let tree = Entity::new(
//!     EntityId::new(42),
//!     Body::new(Vec2::new(100.0, 100.0), 30.0),
//!     EntityInner::Obstacle(ObstacleComponents::new(ObstacleKind::Tree)),
//! );
//!
//! assert_eq!(tree.id().as_u64(), 42);
//! assert_eq!(tree.tag(), EntityTag::Obstacle);
//! ```

pub mod components;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;

pub use components::{
    Detour, EnemyComponents, FrameClock, HarvestRole, HarvestState, HarvesterComponents, Motion,
    ObstacleComponents, ObstacleKind, PlayerComponents, PursuerComponents, ResourceComponents,
    ResourceKind, SensorComponents, TraderComponents, WandererComponents,
};

/// Unique identifier for an entity.
///
/// Ids are handed out by the arena in increasing order, so ordering by id is
/// the same as insertion order. That order is both the update order and the
/// draw order.
///
/// # Example
///
/// ```
/// use robot_arena_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity kind, used to select the behavior that drives an entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityTag {
    /// Static tree or rock that harvesters break down.
    Obstacle,
    /// Collectible wood or rock dropped by a destroyed obstacle.
    Resource,
    /// Basic robot that wanders and bounces.
    Wanderer,
    /// Wanderer with a forward sensor cone.
    SensorAvoider,
    /// Robot that hunts wanderers.
    Pursuer,
    /// Lumber or miner robot.
    Harvester,
    /// The player's robot.
    Player,
    /// Stationary shopkeeper.
    Trader,
    /// Night-time robot that hunts harvesters.
    Enemy,
}

impl EntityTag {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Obstacle,
        Self::Resource,
        Self::Wanderer,
        Self::SensorAvoider,
        Self::Pursuer,
        Self::Harvester,
        Self::Player,
        Self::Trader,
        Self::Enemy,
    ];

    /// Returns true for static props (obstacles and resource drops).
    #[must_use]
    pub const fn is_prop(self) -> bool {
        matches!(self, Self::Obstacle | Self::Resource)
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Obstacle => "Obstacle",
            Self::Resource => "Resource",
            Self::Wanderer => "Wanderer",
            Self::SensorAvoider => "SensorAvoider",
            Self::Pursuer => "Pursuer",
            Self::Harvester => "Harvester",
            Self::Player => "Player",
            Self::Trader => "Trader",
            Self::Enemy => "Enemy",
        };
        f.write_str(name)
    }
}

/// Robot kinds that can be spawned by name (menus, trader catalog).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Wanderer.
    Basic,
    /// Sensor-avoider.
    Smart,
    /// Pursuer.
    Predator,
    /// Harvester breaking trees.
    Lumber,
    /// Harvester breaking rocks.
    Miner,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "Basic Robot",
            Self::Smart => "Smart Robot",
            Self::Predator => "Predator Robot",
            Self::Lumber => "Lumber Robot",
            Self::Miner => "Miner Robot",
        };
        f.write_str(name)
    }
}

/// Position and size shared by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center of the entity's circle.
    pub position: Vec2,
    /// Radius of the entity's circle.
    pub radius: f32,
}

impl Body {
    /// Creates a body at `position`. No clamping happens here.
    #[must_use]
    pub const fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }

    /// Moves the body, clamping it so the circle stays inside `bounds`.
    pub fn set_position(&mut self, position: Vec2, bounds: Bounds) {
        self.position = bounds.clamp_center(position, self.radius);
    }
}

/// Type-safe storage for kind-specific components.
///
/// The variant determines the entity's [`EntityTag`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Tree or rock.
    Obstacle(ObstacleComponents),
    /// Resource drop.
    Resource(ResourceComponents),
    /// Basic wandering robot.
    Wanderer(WandererComponents),
    /// Sensor-avoiding robot.
    SensorAvoider(SensorComponents),
    /// Predator robot.
    Pursuer(PursuerComponents),
    /// Lumber or miner robot.
    Harvester(HarvesterComponents),
    /// Player robot.
    Player(PlayerComponents),
    /// Shopkeeper.
    Trader(TraderComponents),
    /// Night enemy.
    Enemy(EnemyComponents),
}

macro_rules! inner_accessors {
    ($($variant:ident => $components:ty, $as_ref:ident, $as_mut:ident;)*) => {
        impl EntityInner {
            $(
                #[doc = concat!("Returns the ", stringify!($variant), " components, if this is one.")]
                #[must_use]
                pub const fn $as_ref(&self) -> Option<&$components> {
                    match self {
                        Self::$variant(components) => Some(components),
                        _ => None,
                    }
                }

                #[doc = concat!("Returns the ", stringify!($variant), " components mutably, if this is one.")]
                #[must_use]
                pub fn $as_mut(&mut self) -> Option<&mut $components> {
                    match self {
                        Self::$variant(components) => Some(components),
                        _ => None,
                    }
                }
            )*
        }
    };
}

inner_accessors! {
    Obstacle => ObstacleComponents, as_obstacle, as_obstacle_mut;
    Resource => ResourceComponents, as_resource, as_resource_mut;
    Wanderer => WandererComponents, as_wanderer, as_wanderer_mut;
    SensorAvoider => SensorComponents, as_sensor, as_sensor_mut;
    Pursuer => PursuerComponents, as_pursuer, as_pursuer_mut;
    Harvester => HarvesterComponents, as_harvester, as_harvester_mut;
    Player => PlayerComponents, as_player, as_player_mut;
    Trader => TraderComponents, as_trader, as_trader_mut;
    Enemy => EnemyComponents, as_enemy, as_enemy_mut;
}

impl EntityInner {
    /// Returns the tag matching this variant.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Obstacle(_) => EntityTag::Obstacle,
            Self::Resource(_) => EntityTag::Resource,
            Self::Wanderer(_) => EntityTag::Wanderer,
            Self::SensorAvoider(_) => EntityTag::SensorAvoider,
            Self::Pursuer(_) => EntityTag::Pursuer,
            Self::Harvester(_) => EntityTag::Harvester,
            Self::Player(_) => EntityTag::Player,
            Self::Trader(_) => EntityTag::Trader,
            Self::Enemy(_) => EntityTag::Enemy,
        }
    }

    /// Returns the motion state of mobile robots.
    #[must_use]
    pub const fn motion(&self) -> Option<&Motion> {
        match self {
            Self::Wanderer(c) => Some(&c.motion),
            Self::SensorAvoider(c) => Some(&c.motion),
            Self::Pursuer(c) => Some(&c.motion),
            Self::Harvester(c) => Some(&c.motion),
            _ => None,
        }
    }
}

/// A complete entity: identity, body and kind-specific components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    /// Position and radius.
    pub body: Body,
    /// Kind-specific components.
    pub inner: EntityInner,
}

impl Entity {
    /// Creates an entity. Normally only the arena does this, on insertion.
    #[must_use]
    pub const fn new(id: EntityId, body: Body, inner: EntityInner) -> Self {
        Self { id, body, inner }
    }

    /// Returns the entity's id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's kind.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Shorthand for `self.body.position`.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Shorthand for `self.body.radius`.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.body.radius
    }

    /// Returns true if position and any velocity are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        let motion_ok = self
            .inner
            .motion()
            .map_or(true, |m| m.velocity.is_finite() && m.speed.is_finite());
        self.body.position.is_finite() && self.body.radius.is_finite() && motion_ok
    }
}

/// An entity waiting for insertion. The arena assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    /// Position and radius.
    pub body: Body,
    /// Kind-specific components.
    pub inner: EntityInner,
}

impl Spawn {
    /// Creates a spawn request.
    #[must_use]
    pub const fn new(body: Body, inner: EntityInner) -> Self {
        Self { body, inner }
    }

    /// Returns the kind this spawn will become.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    pub(crate) fn into_entity(self, id: EntityId) -> Entity {
        Entity::new(id, self.body, self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod entity_id_tests {
        use super::*;

        #[test]
        fn debug_and_display_formats() {
            let id = EntityId::new(42);
            assert_eq!(format!("{id:?}"), "EntityId(42)");
            assert_eq!(format!("{id}"), "42");
        }

        #[test]
        fn conversions_round_trip() {
            let id: EntityId = 7u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 7);
        }

        #[test]
        fn ordering_follows_value() {
            let mut ids = vec![EntityId::new(3), EntityId::new(1), EntityId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
        }
    }

    mod inner_tests {
        use super::*;

        #[test]
        fn tag_follows_variant() {
            let inner = EntityInner::Obstacle(ObstacleComponents::new(ObstacleKind::Rock));
            assert_eq!(inner.tag(), EntityTag::Obstacle);
            assert!(inner.as_obstacle().is_some());
            assert!(inner.as_resource().is_none());
            assert!(inner.motion().is_none());
        }

        #[test]
        fn mobile_variants_expose_motion() {
            let inner = EntityInner::Wanderer(WandererComponents::new(Motion::new(
                Vec2::new(2.0, 0.0),
                2.0,
            )));
            assert_eq!(inner.motion().map(|m| m.speed), Some(2.0));
        }

        #[test]
        fn prop_tags() {
            assert!(EntityTag::Obstacle.is_prop());
            assert!(EntityTag::Resource.is_prop());
            assert!(!EntityTag::Wanderer.is_prop());
        }
    }

    mod body_tests {
        use super::*;

        #[test]
        fn set_position_clamps() {
            let mut body = Body::new(Vec2::new(100.0, 100.0), 20.0);
            body.set_position(Vec2::new(900.0, -10.0), Bounds::new(800.0, 600.0));
            assert_eq!(body.position, Vec2::new(780.0, 20.0));
        }

        #[test]
        fn non_finite_entities_are_detected() {
            let mut entity = Entity::new(
                EntityId::new(1),
                Body::new(Vec2::new(10.0, 10.0), 5.0),
                EntityInner::Wanderer(WandererComponents::new(Motion::new(Vec2::X, 1.0))),
            );
            assert!(entity.is_finite());
            entity.body.position.x = f32::NAN;
            assert!(!entity.is_finite());
        }
    }
}
