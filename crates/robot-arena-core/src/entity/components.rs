//! Component structs stored inside [`EntityInner`](super::EntityInner).
//!
//! Fields marked `#[serde(skip)]` are per-tick caches (targets, animation
//! frames, sensor alert, harvester task). They reset to their defaults when a
//! snapshot is restored and are rebuilt by the next update.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::geometry::{from_heading, heading_of};
use crate::input::{Direction, DirectionKeys};
use crate::shop::Catalog;

// =============================================================================
// Shared state
// =============================================================================

/// Velocity and cruising speed of a mobile robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Displacement applied each tick.
    pub velocity: Vec2,
    /// Magnitude the velocity is rescaled to when steering.
    pub speed: f32,
}

impl Motion {
    /// Creates motion with an explicit velocity.
    #[must_use]
    pub const fn new(velocity: Vec2, speed: f32) -> Self {
        Self { velocity, speed }
    }

    /// Creates motion heading along `heading` radians at `speed`.
    #[must_use]
    pub fn with_heading(heading: f32, speed: f32) -> Self {
        Self::new(from_heading(heading, speed), speed)
    }

    /// Current heading in radians.
    #[must_use]
    pub fn heading(&self) -> f32 {
        heading_of(self.velocity)
    }

    /// Points the velocity along `heading`, keeping the cruising speed.
    pub fn set_heading(&mut self, heading: f32) {
        self.velocity = from_heading(heading, self.speed);
    }

    /// Points the velocity toward `direction` at cruising speed.
    ///
    /// A zero direction leaves the velocity unchanged.
    pub fn steer_towards(&mut self, direction: Vec2) {
        if let Some(unit) = direction.try_normalize() {
            self.velocity = unit * self.speed;
        }
    }
}

/// Walk-cycle animation counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClock {
    /// Frame currently shown.
    pub index: u8,
    elapsed: u64,
}

impl FrameClock {
    /// Advances one tick, moving to the next frame every `frame_ticks` ticks.
    pub fn advance(&mut self, frame_ticks: u64, frame_count: u8) {
        self.elapsed += 1;
        if self.elapsed >= frame_ticks.max(1) {
            self.elapsed = 0;
            self.index = (self.index + 1) % frame_count.max(1);
        }
    }
}

// =============================================================================
// Props
// =============================================================================

/// What an obstacle is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Broken down by lumber robots into wood.
    Tree,
    /// Broken down by miner robots into rock.
    Rock,
}

impl ObstacleKind {
    /// The resource dropped when this obstacle is destroyed.
    #[must_use]
    pub const fn drop_kind(self) -> ResourceKind {
        match self {
            Self::Tree => ResourceKind::Wood,
            Self::Rock => ResourceKind::Rock,
        }
    }
}

/// What a resource drop is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Adds to the wood counter.
    Wood,
    /// Adds to the rock counter.
    Rock,
}

impl ResourceKind {
    /// Lower-case counter name, used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Rock => "rock",
        }
    }
}

/// A static tree or rock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleComponents {
    /// Tree or rock. Never changes.
    pub kind: ObstacleKind,
}

impl ObstacleComponents {
    /// Creates obstacle components.
    #[must_use]
    pub const fn new(kind: ObstacleKind) -> Self {
        Self { kind }
    }
}

/// A collectible drop that bobs around its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceComponents {
    /// Wood or rock.
    pub kind: ResourceKind,
    /// Rest position the bob oscillates around.
    pub anchor: Vec2,
    /// Tick from which the drop may be collected.
    pub ready_at: u64,
    /// Current vertical offset from the anchor.
    #[serde(skip)]
    pub bob_offset: f32,
    /// True while the bob moves toward negative Y.
    #[serde(skip)]
    pub rising: bool,
}

impl ResourceComponents {
    /// Creates a drop anchored at `anchor` that becomes collectible at `ready_at`.
    #[must_use]
    pub const fn new(kind: ResourceKind, anchor: Vec2, ready_at: u64) -> Self {
        Self {
            kind,
            anchor,
            ready_at,
            bob_offset: 0.0,
            rising: false,
        }
    }

    /// Returns true once the drop has existed long enough to be picked up.
    #[must_use]
    pub const fn is_ready_to_collect(&self, now: u64) -> bool {
        now >= self.ready_at
    }
}

// =============================================================================
// Robots
// =============================================================================

/// A basic wandering robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WandererComponents {
    /// Velocity and speed.
    pub motion: Motion,
    /// Animation.
    #[serde(skip)]
    pub frame: FrameClock,
}

impl WandererComponents {
    /// Creates wanderer components.
    #[must_use]
    pub fn new(motion: Motion) -> Self {
        Self {
            motion,
            frame: FrameClock::default(),
        }
    }
}

/// A wanderer with a forward sensor cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorComponents {
    /// Velocity and speed.
    pub motion: Motion,
    /// True when the last scan detected something. Drawn as a red beam.
    #[serde(skip)]
    pub alert: bool,
    /// Animation.
    #[serde(skip)]
    pub frame: FrameClock,
}

impl SensorComponents {
    /// Creates sensor-avoider components.
    #[must_use]
    pub fn new(motion: Motion) -> Self {
        Self {
            motion,
            alert: false,
            frame: FrameClock::default(),
        }
    }
}

/// A robot hunting wanderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PursuerComponents {
    /// Velocity and speed.
    pub motion: Motion,
    /// Prey currently chased. Checked for liveness every tick.
    #[serde(skip)]
    pub target: Option<EntityId>,
    /// Animation.
    #[serde(skip)]
    pub frame: FrameClock,
}

impl PursuerComponents {
    /// Creates pursuer components with no target.
    #[must_use]
    pub fn new(motion: Motion) -> Self {
        Self {
            motion,
            target: None,
            frame: FrameClock::default(),
        }
    }
}

/// Which raw material a harvester works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarvestRole {
    /// Breaks trees, collects wood.
    Lumber,
    /// Breaks rocks, collects rock.
    Miner,
}

impl HarvestRole {
    /// Obstacles this role breaks down.
    #[must_use]
    pub const fn obstacle_kind(self) -> ObstacleKind {
        match self {
            Self::Lumber => ObstacleKind::Tree,
            Self::Miner => ObstacleKind::Rock,
        }
    }

    /// Drops this role collects.
    #[must_use]
    pub const fn resource_kind(self) -> ResourceKind {
        self.obstacle_kind().drop_kind()
    }
}

/// Task a harvester is working on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarvestState {
    /// Waiting for the cooldown, then picking a task.
    #[default]
    Idle,
    /// Walking to a ready drop.
    TargetingResource,
    /// Touching a drop and picking it up.
    CollectingResource,
    /// Walking to an obstacle to break it.
    TargetingRawMaterial,
    /// Nothing to do; wandering and re-checking each tick.
    DefaultBehavior,
}

/// A blocker remembered while deflecting around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detour {
    /// The entity in the way.
    pub blocker: EntityId,
    /// Tick at which direct pursuit resumes.
    pub until: u64,
}

/// A lumber or miner robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarvesterComponents {
    /// Trees or rocks.
    pub role: HarvestRole,
    /// Velocity and speed.
    pub motion: Motion,
    /// Current task.
    #[serde(skip)]
    pub state: HarvestState,
    /// Drop or obstacle being walked to.
    #[serde(skip)]
    pub target: Option<EntityId>,
    /// Active deflection around a blocker.
    #[serde(skip)]
    pub detour: Option<Detour>,
    /// No new task is picked before this tick.
    #[serde(skip)]
    pub cooldown_until: u64,
    /// Animation.
    #[serde(skip)]
    pub frame: FrameClock,
}

impl HarvesterComponents {
    /// Creates an idle harvester.
    #[must_use]
    pub fn new(role: HarvestRole, motion: Motion) -> Self {
        Self {
            role,
            motion,
            state: HarvestState::Idle,
            target: None,
            detour: None,
            cooldown_until: 0,
            frame: FrameClock::default(),
        }
    }
}

// =============================================================================
// Player, trader and enemies
// =============================================================================

/// The player's robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerComponents {
    /// Distance moved per tick while a key is held.
    pub speed: f32,
    /// Direction the sprite faces.
    pub facing: Direction,
    /// Keys currently held.
    #[serde(skip)]
    pub keys: DirectionKeys,
    /// Direction currently driving movement (last pressed and still held).
    #[serde(skip)]
    pub moving: Option<Direction>,
    /// Trader within interaction reach, refreshed each tick.
    #[serde(skip)]
    pub near_trader: Option<EntityId>,
    /// Animation.
    #[serde(skip)]
    pub frame: FrameClock,
}

impl PlayerComponents {
    /// Creates a stationary player facing right.
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            facing: Direction::Right,
            keys: DirectionKeys::empty(),
            moving: None,
            near_trader: None,
            frame: FrameClock::default(),
        }
    }

    /// Records a key press. The pressed direction takes over movement.
    pub fn press(&mut self, direction: Direction) {
        self.keys.insert(direction.key());
        self.moving = Some(direction);
        self.facing = direction;
    }

    /// Records a key release. Movement falls back to another held key, if any.
    pub fn release(&mut self, direction: Direction) {
        self.keys.remove(direction.key());
        if self.moving == Some(direction) {
            self.moving = Direction::ALL
                .into_iter()
                .find(|d| self.keys.contains(d.key()));
            if let Some(next) = self.moving {
                self.facing = next;
            }
        }
    }

    /// Displacement for this tick.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.moving.map_or(Vec2::ZERO, |d| d.unit() * self.speed)
    }
}

/// The stationary shopkeeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderComponents {
    /// Items on sale.
    pub catalog: Catalog,
    /// Reentrancy flag: set while a session is open.
    #[serde(skip)]
    pub interacting: bool,
}

impl TraderComponents {
    /// Creates a trader with the given catalog and no open session.
    #[must_use]
    pub const fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            interacting: false,
        }
    }
}

/// A night enemy hunting harvesters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyComponents {
    /// Distance moved per tick toward the target.
    pub speed: f32,
    /// Harvester currently chased.
    #[serde(skip)]
    pub target: Option<EntityId>,
    /// Animation.
    #[serde(skip)]
    pub frame: FrameClock,
}

impl EnemyComponents {
    /// Creates an enemy with no target.
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            target: None,
            frame: FrameClock::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod motion_tests {
        use super::*;

        #[test]
        fn set_heading_keeps_speed() {
            let mut motion = Motion::new(Vec2::new(3.0, 4.0), 2.0);
            motion.set_heading(1.0);
            assert!((motion.velocity.length() - 2.0).abs() < 1e-5);
            assert!((motion.heading() - 1.0).abs() < 1e-5);
        }

        #[test]
        fn steer_towards_zero_is_ignored() {
            let mut motion = Motion::new(Vec2::new(1.0, 0.0), 2.0);
            motion.steer_towards(Vec2::ZERO);
            assert_eq!(motion.velocity, Vec2::new(1.0, 0.0));
            motion.steer_towards(Vec2::new(0.0, 10.0));
            assert_eq!(motion.velocity, Vec2::new(0.0, 2.0));
        }
    }

    mod frame_tests {
        use super::*;

        #[test]
        fn frames_cycle() {
            let mut frame = FrameClock::default();
            for _ in 0..12 {
                frame.advance(12, 4);
            }
            assert_eq!(frame.index, 1);
            for _ in 0..36 {
                frame.advance(12, 4);
            }
            assert_eq!(frame.index, 0);
        }
    }

    mod player_tests {
        use super::*;

        #[test]
        fn last_pressed_key_drives_movement() {
            let mut player = PlayerComponents::new(2.5);
            player.press(Direction::Up);
            player.press(Direction::Right);
            assert_eq!(player.velocity(), Vec2::new(2.5, 0.0));
            assert_eq!(player.facing, Direction::Right);

            player.release(Direction::Right);
            assert_eq!(player.velocity(), Vec2::new(0.0, -2.5));
            assert_eq!(player.facing, Direction::Up);

            player.release(Direction::Up);
            assert_eq!(player.velocity(), Vec2::ZERO);
            assert_eq!(player.facing, Direction::Up);
        }

        #[test]
        fn releasing_an_idle_key_keeps_movement() {
            let mut player = PlayerComponents::new(2.5);
            player.press(Direction::Left);
            player.release(Direction::Down);
            assert_eq!(player.velocity(), Vec2::new(-2.5, 0.0));
        }
    }

    mod role_tests {
        use super::*;

        #[test]
        fn roles_map_to_materials() {
            assert_eq!(HarvestRole::Lumber.obstacle_kind(), ObstacleKind::Tree);
            assert_eq!(HarvestRole::Lumber.resource_kind(), ResourceKind::Wood);
            assert_eq!(HarvestRole::Miner.obstacle_kind(), ObstacleKind::Rock);
            assert_eq!(HarvestRole::Miner.resource_kind(), ResourceKind::Rock);
        }

        #[test]
        fn readiness_uses_ready_tick() {
            let drop = ResourceComponents::new(ResourceKind::Wood, Vec2::ZERO, 60);
            assert!(!drop.is_ready_to_collect(59));
            assert!(drop.is_ready_to_collect(60));
        }
    }
}
