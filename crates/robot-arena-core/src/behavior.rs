//! Behavior strategies for the arena's update protocol.
//!
//! Each entity kind is driven by one [`Behavior`] registered for its
//! [`EntityTag`] in a [`BehaviorRegistry`]. The arena calls the behavior once
//! per tick with a [`TickContext`] that gives:
//!
//! - a read-only [`ArenaView`] of the live population
//! - the [`DeferredQueue`] for staging additions, removals and respawns
//! - the economy counters, event log, RNG and configuration
//!
//! Behaviors mutate only the entity they are handed. Everything else goes
//! through the deferred queue, which keeps the population stable for the
//! whole scan.
//!
//! # Shared motion
//!
//! Robot kinds share the wanderer's bounce motion by calling the wander
//! module's `bounce_step` explicitly, then layer their own targeting on top.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use robot_arena_core::behavior::{Behavior, BehaviorRegistry, TickContext};
//! use robot_arena_core::canvas::Canvas;
//! use robot_arena_core::entity::{Entity, EntityTag};
//! use robot_arena_core::error::UpdateError;
//!
//! struct Frozen;
//!
//! impl Behavior for Frozen {
//!     fn name(&self, _entity: &Entity) -> &'static str {
//!         "Frozen"
//!     }
//!
//!     fn description(&self, _entity: &Entity) -> &'static str {
//!         "Does nothing."
//!     }
//!
//!     fn update(&self, _entity: &mut Entity, _ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
//!         Ok(())
//!     }
//!
//!     fn draw(&self, _entity: &Entity, _canvas: &mut dyn Canvas) {}
//! }
//!
//! let mut registry = BehaviorRegistry::with_defaults();
//! registry.register(EntityTag::Wanderer, Arc::new(Frozen));
//! assert!(registry.get(EntityTag::Wanderer).is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand_chacha::ChaCha8Rng;

use crate::behaviors::{
    EnemyBehavior, HarvestBehavior, ObstacleBehavior, PlayerBehavior, PursuitBehavior,
    ResourceBehavior, SensorBehavior, TraderBehavior, WanderBehavior,
};
use crate::canvas::Canvas;
use crate::config::ArenaConfig;
use crate::deferred::DeferredQueue;
use crate::economy::Economy;
use crate::entity::{Entity, EntityId, EntityTag};
use crate::error::{ArenaError, UpdateError};
use crate::events::{ArenaEvent, EventLog};
use crate::geometry::Bounds;
use crate::view::ArenaView;

// =============================================================================
// Tick Context
// =============================================================================

/// Everything a behavior may read or stage during one update or destroy call.
pub struct TickContext<'a> {
    /// Read-only population.
    pub view: ArenaView<'a>,
    /// Staged mutations.
    pub deferred: &'a mut DeferredQueue,
    /// Resource counters.
    pub economy: &'a mut Economy,
    /// Event log.
    pub events: &'a mut EventLog,
    /// Arena RNG.
    pub rng: &'a mut ChaCha8Rng,
    /// Arena configuration.
    pub config: &'a ArenaConfig,
    /// Behaviors of other kinds, for destroying targets.
    pub behaviors: &'a BehaviorRegistry,
}

impl TickContext<'_> {
    /// Current logical tick.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.view.tick()
    }

    /// Arena bounds.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.view.bounds()
    }

    /// Converts seconds to ticks at the configured rate.
    #[must_use]
    pub fn ticks_for(&self, secs: f32) -> u64 {
        self.config.timing.ticks_for(secs)
    }

    /// Ticks each animation frame is shown.
    #[must_use]
    pub fn frame_ticks(&self) -> u64 {
        self.ticks_for(self.config.agents.frame_secs)
    }

    /// Returns true if `id` is live and not already staged for removal.
    #[must_use]
    pub fn is_live(&self, id: EntityId) -> bool {
        self.view.contains(id) && !self.deferred.is_removal_scheduled(id)
    }

    /// Records an event.
    pub fn emit(&mut self, event: ArenaEvent) {
        self.events.push(event);
    }

    /// Runs the destroy behavior of `target`'s kind.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::NotDestroyable`] if the kind cannot be destroyed.
    pub fn destroy(&mut self, target: &Entity) -> Result<(), ArenaError> {
        let behaviors = self.behaviors;
        match behaviors.get(target.tag()) {
            Some(behavior) => behavior.destroy(target, self),
            None => Err(ArenaError::NotDestroyable {
                id: target.id(),
                tag: target.tag(),
            }),
        }
    }
}

impl fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickContext")
            .field("tick", &self.now())
            .field("population", &self.view.len())
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Behavior Trait
// =============================================================================

/// Per-kind strategy implementing the entity contract.
pub trait Behavior: Send + Sync {
    /// Display name for selection UI.
    fn name(&self, entity: &Entity) -> &'static str;

    /// One-line description for selection UI.
    fn description(&self, entity: &Entity) -> &'static str;

    /// Advances the entity by one tick.
    ///
    /// # Errors
    ///
    /// Returns an [`UpdateError`] if the entity is in a state this behavior
    /// cannot handle. The arena keeps the entity's previous state and carries on.
    fn update(&self, entity: &mut Entity, ctx: &mut TickContext<'_>) -> Result<(), UpdateError>;

    /// Draws the entity.
    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas);

    /// Removes the entity from the arena through the deferred queue.
    ///
    /// The default stages a plain removal. Kinds that leave something behind
    /// or must never disappear override this.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::NotDestroyable`] for kinds without a destroy.
    fn destroy(&self, entity: &Entity, ctx: &mut TickContext<'_>) -> Result<(), ArenaError> {
        ctx.deferred.schedule_removal(entity.id());
        Ok(())
    }
}

/// Builds the error for an entity whose components do not match its behavior.
pub(crate) const fn mismatch(id: EntityId, expected: EntityTag) -> UpdateError {
    UpdateError::ComponentMismatch { id, expected }
}

// =============================================================================
// Behavior Registry
// =============================================================================

/// Behaviors keyed by entity kind.
#[derive(Clone, Default)]
pub struct BehaviorRegistry {
    behaviors: HashMap<EntityTag, Arc<dyn Behavior>>,
}

impl BehaviorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in behavior for every kind.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(EntityTag::Obstacle, Arc::new(ObstacleBehavior));
        registry.register(EntityTag::Resource, Arc::new(ResourceBehavior));
        registry.register(EntityTag::Wanderer, Arc::new(WanderBehavior));
        registry.register(EntityTag::SensorAvoider, Arc::new(SensorBehavior));
        registry.register(EntityTag::Pursuer, Arc::new(PursuitBehavior));
        registry.register(EntityTag::Harvester, Arc::new(HarvestBehavior));
        registry.register(EntityTag::Player, Arc::new(PlayerBehavior));
        registry.register(EntityTag::Trader, Arc::new(TraderBehavior));
        registry.register(EntityTag::Enemy, Arc::new(EnemyBehavior));
        registry
    }

    /// Registers `behavior` for `tag`, replacing any previous one.
    pub fn register(&mut self, tag: EntityTag, behavior: Arc<dyn Behavior>) {
        self.behaviors.insert(tag, behavior);
    }

    /// Returns the behavior for `tag`.
    #[must_use]
    pub fn get(&self, tag: EntityTag) -> Option<&dyn Behavior> {
        self.behaviors.get(&tag).map(|behavior| &**behavior)
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.behaviors.keys().copied().collect();
        tags.sort();
        f.debug_struct("BehaviorRegistry")
            .field("tags", &tags)
            .finish()
    }
}
