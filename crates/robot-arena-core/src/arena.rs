//! Arena: the world container and its tick protocol.
//!
//! The arena owns the live population, the deferred mutation queue, the
//! economy counters, the day/night clock, the RNG and the behavior registry.
//! Nothing is global; two arenas never share state.
//!
//! # Tick protocol
//!
//! One tick is always `update_all → process_deferred → draw_all`:
//!
//! - [`Arena::update_all`] advances the logical tick, releases due respawns
//!   whose spot is free into the addition queue, then runs every entity's
//!   behavior in id order. Behaviors see the whole population (including
//!   entities already staged for removal) and stage changes in the deferred
//!   queue. Membership never changes during the scan.
//! - [`Arena::process_deferred`] applies staged removals, then staged
//!   additions, and clears both.
//! - [`Arena::draw_all`] issues draw calls to a [`Canvas`].
//!
//! # Determinism
//!
//! Entities live in a `BTreeMap` keyed by monotonically increasing ids, so
//! iteration order is insertion order on every platform. All randomness comes
//! from a `ChaCha8Rng` seeded from the configuration. Two arenas built from
//! the same configuration and driven by the same calls stay identical.
//!
//! # Example
//!
//! ```
//! use robot_arena_core::arena::Arena;
//! use robot_arena_core::entity::AgentKind;
//!
//! let mut arena = Arena::default();
//! arena.seed_default_scenario();
//! let lumber = arena.add_agent(AgentKind::Lumber);
//!
//! for _ in 0..60 {
//!     arena.update_all();
//!     arena.process_deferred();
//! }
//! assert!(arena.get(lumber).is_some());
//! assert_eq!(arena.current_tick(), 60);
//! ```

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::behavior::{BehaviorRegistry, TickContext};
use crate::canvas::Canvas;
use crate::clock::{ClockTick, DayNightClock, DayNightTransition};
use crate::config::ArenaConfig;
use crate::deferred::{DeferredQueue, PendingRespawn};
use crate::economy::{Economy, EconomyNotice};
use crate::entity::components::{
    EnemyComponents, HarvestRole, HarvesterComponents, Motion, ObstacleComponents, ObstacleKind,
    PlayerComponents, PursuerComponents, ResourceComponents, ResourceKind, SensorComponents,
    TraderComponents, WandererComponents,
};
use crate::entity::{AgentKind, Body, Entity, EntityId, EntityInner, EntityTag, Spawn};
use crate::error::{ArenaError, PurchaseError, SnapshotError, UpdateError};
use crate::events::{ArenaEvent, EventLog};
use crate::geometry::{circles_overlap, Bounds};
use crate::input::InputEvent;
use crate::shop::{Catalog, Interaction, Receipt};
use crate::snapshot::ArenaSnapshot;
use crate::view::ArenaView;

// =============================================================================
// Population
// =============================================================================

/// Live entities and the bounds they move in.
#[derive(Debug, Clone)]
pub(crate) struct Population {
    pub(crate) bounds: Bounds,
    pub(crate) entities: BTreeMap<EntityId, Entity>,
}

impl Population {
    const fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            entities: BTreeMap::new(),
        }
    }
}

/// What one [`Arena::process_deferred`] call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredSummary {
    /// Ids that left the population, in id order.
    pub removed: Vec<EntityId>,
    /// Ids that joined, in queue order.
    pub added: Vec<EntityId>,
}

impl DeferredSummary {
    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Container for every entity in a simulation.
#[derive(Debug, Clone)]
pub struct Arena {
    config: ArenaConfig,
    population: Population,
    deferred: DeferredQueue,
    economy: Economy,
    events: EventLog,
    rng: ChaCha8Rng,
    behaviors: BehaviorRegistry,
    clock: DayNightClock,
    /// Logical tick, advanced at the start of each scan.
    tick: u64,
    next_id: u64,
}

impl Arena {
    /// Creates an empty arena with the built-in behaviors.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self::with_registry(config, BehaviorRegistry::with_defaults())
    }

    /// Creates an empty arena with a custom behavior registry.
    #[must_use]
    pub fn with_registry(config: ArenaConfig, behaviors: BehaviorRegistry) -> Self {
        Self {
            population: Population::new(config.bounds()),
            deferred: DeferredQueue::new(),
            economy: Economy::new(&config.economy),
            events: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            clock: DayNightClock::new(&config.clock),
            behaviors,
            tick: 0,
            next_id: 0,
            config,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Configuration the arena was built with.
    #[must_use]
    pub const fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Arena bounds.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.population.bounds
    }

    /// Arena width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.population.bounds.width
    }

    /// Arena height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.population.bounds.height
    }

    /// Current logical tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Read-only view of the live population.
    #[must_use]
    pub const fn view(&self) -> ArenaView<'_> {
        ArenaView::new(&self.population, self.tick)
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.population.entities.get(&id)
    }

    /// Mutable access to a live entity.
    ///
    /// Move it through [`Body::set_position`] to keep it inside the arena.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.population.entities.get_mut(&id)
    }

    /// Live entities in collection order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.population.entities.values()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.population.entities.len()
    }

    /// Returns true if the arena has no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.population.entities.is_empty()
    }

    /// Staged mutations.
    #[must_use]
    pub const fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    /// Wood and rock counters.
    #[must_use]
    pub const fn economy(&self) -> &Economy {
        &self.economy
    }

    /// Day/night clock.
    #[must_use]
    pub const fn clock(&self) -> &DayNightClock {
        &self.clock
    }

    /// Registered behaviors.
    #[must_use]
    pub const fn behaviors(&self) -> &BehaviorRegistry {
        &self.behaviors
    }

    /// Display name of an entity, for selection UI.
    #[must_use]
    pub fn display_name(&self, id: EntityId) -> Option<&'static str> {
        let entity = self.get(id)?;
        Some(self.behaviors.get(entity.tag())?.name(entity))
    }

    /// One-line description of an entity, for selection UI.
    #[must_use]
    pub fn description(&self, id: EntityId) -> Option<&'static str> {
        let entity = self.get(id)?;
        Some(self.behaviors.get(entity.tag())?.description(entity))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns true if a circle at `pos` intersects any live entity other than `exclude`.
    #[must_use]
    pub fn check_overlap(&self, pos: Vec2, radius: f32, exclude: Option<EntityId>) -> bool {
        self.view().check_overlap(pos, radius, exclude)
    }

    /// First entity, in collection order, whose circle contains `point`.
    #[must_use]
    pub fn find_item_at(&self, point: Vec2) -> Option<&Entity> {
        self.view().find_item_at(point)
    }

    /// The player-controlled entity, if any. The first one wins if there are several.
    #[must_use]
    pub fn player_id(&self) -> Option<EntityId> {
        self.entities()
            .find(|e| e.tag() == EntityTag::Player)
            .map(Entity::id)
    }

    fn is_spot_taken(&self, pos: Vec2, radius: f32) -> bool {
        self.check_overlap(pos, radius, None)
            || self
                .deferred
                .additions()
                .iter()
                .any(|s| circles_overlap(pos, radius, s.body.position, s.body.radius))
    }

    /// Picks a random position where a circle of `radius` overlaps nothing.
    ///
    /// Staged additions count as occupied. After the configured number of
    /// attempts the last candidate is returned anyway.
    pub fn find_free_position(&mut self, radius: f32) -> Vec2 {
        let bounds = self.bounds();
        let margin = self.config.arena.placement_margin;
        let attempts = self.config.arena.max_placement_attempts;
        let mut candidate = Vec2::new(bounds.width / 2.0, bounds.height / 2.0);
        for _ in 0..attempts {
            candidate = Vec2::new(
                margin + self.rng.gen::<f32>() * (bounds.width - 2.0 * margin),
                margin + self.rng.gen::<f32>() * (bounds.height - 2.0 * margin),
            );
            if !self.is_spot_taken(candidate, radius) {
                return candidate;
            }
        }
        tracing::warn!(
            radius,
            attempts,
            x = candidate.x,
            y = candidate.y,
            "no free position found, placing at last candidate"
        );
        candidate
    }

    // -------------------------------------------------------------------------
    // Adding entities
    // -------------------------------------------------------------------------

    fn insert(&mut self, spawn: Spawn) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        let entity = spawn.into_entity(id);
        let tag = entity.tag();
        self.population.entities.insert(id, entity);
        self.events.push(ArenaEvent::Added { id, tag });
        id
    }

    /// Adds an entity immediately. No overlap check is made.
    ///
    /// Only call this between scans; behaviors use the deferred queue.
    pub fn add_item(&mut self, spawn: Spawn) -> EntityId {
        let id = self.insert(spawn);
        tracing::debug!(entity = %id, "added entity");
        id
    }

    /// Adds a tree or rock with the configured obstacle radius.
    pub fn add_obstacle(&mut self, kind: ObstacleKind, pos: Vec2) -> EntityId {
        let radius = self.config.scenario.obstacle_radius;
        self.add_item(Spawn::new(
            Body::new(pos, radius),
            EntityInner::Obstacle(ObstacleComponents::new(kind)),
        ))
    }

    /// Adds a resource drop that becomes collectible after the configured delay.
    pub fn add_resource(&mut self, kind: ResourceKind, pos: Vec2) -> EntityId {
        let radius = self.config.scenario.obstacle_radius * self.config.harvest.drop_scale;
        let ready_at = self.tick
            + self
                .config
                .timing
                .ticks_for(self.config.harvest.resource_ready_secs);
        self.add_item(Spawn::new(
            Body::new(pos, radius),
            EntityInner::Resource(ResourceComponents::new(kind, pos, ready_at)),
        ))
    }

    /// Adds the player's robot.
    pub fn add_player(&mut self, pos: Vec2) -> EntityId {
        let agents = &self.config.agents;
        let spawn = Spawn::new(
            Body::new(pos, agents.radius),
            EntityInner::Player(PlayerComponents::new(agents.player_speed)),
        );
        self.add_item(spawn)
    }

    /// Adds a shopkeeper with the starting catalog.
    pub fn add_trader(&mut self, pos: Vec2) -> EntityId {
        let spawn = Spawn::new(
            Body::new(pos, self.config.agents.radius),
            EntityInner::Trader(TraderComponents::new(Catalog::starting(&self.config.shop))),
        );
        self.add_item(spawn)
    }

    /// Builds a robot of `kind` at `pos` heading along `heading` radians.
    #[must_use]
    pub fn agent_spawn(&self, kind: AgentKind, pos: Vec2, heading: f32) -> Spawn {
        let agents = &self.config.agents;
        let inner = match kind {
            AgentKind::Basic => EntityInner::Wanderer(WandererComponents::new(
                Motion::with_heading(heading, agents.basic_speed),
            )),
            AgentKind::Smart => EntityInner::SensorAvoider(SensorComponents::new(
                Motion::with_heading(heading, agents.smart_speed),
            )),
            AgentKind::Predator => EntityInner::Pursuer(PursuerComponents::new(
                Motion::with_heading(heading, agents.predator_speed),
            )),
            AgentKind::Lumber => EntityInner::Harvester(HarvesterComponents::new(
                HarvestRole::Lumber,
                Motion::with_heading(heading, agents.harvester_speed),
            )),
            AgentKind::Miner => EntityInner::Harvester(HarvesterComponents::new(
                HarvestRole::Miner,
                Motion::with_heading(heading, agents.harvester_speed),
            )),
        };
        Spawn::new(Body::new(pos, agents.radius), inner)
    }

    /// Builds a night enemy at `pos`.
    #[must_use]
    pub fn enemy_spawn(&self, pos: Vec2) -> Spawn {
        Spawn::new(
            Body::new(pos, self.config.agents.radius),
            EntityInner::Enemy(EnemyComponents::new(self.config.agents.enemy_speed)),
        )
    }

    /// Adds a robot at a free random position with a random heading.
    pub fn add_agent(&mut self, kind: AgentKind) -> EntityId {
        let pos = self.find_free_position(self.config.agents.radius);
        self.add_agent_at(kind, pos)
    }

    /// Adds a robot at `pos` with a random heading.
    pub fn add_agent_at(&mut self, kind: AgentKind, pos: Vec2) -> EntityId {
        let heading = self.rng.gen_range(0.0..TAU);
        let spawn = self.agent_spawn(kind, pos, heading);
        self.add_item(spawn)
    }

    /// Populates the arena with the player, the trader and the configured
    /// trees and rocks at free random positions.
    pub fn seed_default_scenario(&mut self) {
        let scenario = self.config.scenario.clone();
        self.add_player(Vec2::from(scenario.player_start));
        self.add_trader(Vec2::from(scenario.trader_position));
        for (kind, count) in [
            (ObstacleKind::Tree, scenario.trees),
            (ObstacleKind::Rock, scenario.rocks),
        ] {
            for _ in 0..count {
                let pos = self.find_free_position(scenario.obstacle_radius);
                self.add_obstacle(kind, pos);
            }
        }
        tracing::info!(entities = self.len(), "seeded default scenario");
    }

    // -------------------------------------------------------------------------
    // Deferred mutation
    // -------------------------------------------------------------------------

    /// Stages a removal. Returns true if it was not already staged.
    pub fn schedule_removal(&mut self, id: EntityId) -> bool {
        self.deferred.schedule_removal(id)
    }

    /// Stages an addition.
    pub fn schedule_addition(&mut self, spawn: Spawn) {
        self.deferred.schedule_addition(spawn);
    }

    /// Applies staged removals, then staged additions, and clears both.
    pub fn process_deferred(&mut self) -> DeferredSummary {
        let (removals, additions) = self.deferred.drain();
        let mut summary = DeferredSummary::default();

        for id in removals {
            if let Some(entity) = self.population.entities.remove(&id) {
                self.events.push(ArenaEvent::Removed {
                    id,
                    tag: entity.tag(),
                });
                summary.removed.push(id);
            }
        }
        for spawn in additions {
            summary.added.push(self.insert(spawn));
        }

        if !summary.is_empty() {
            tracing::debug!(
                tick = self.tick,
                removed = summary.removed.len(),
                added = summary.added.len(),
                "processed deferred queue"
            );
        }
        summary
    }

    // -------------------------------------------------------------------------
    // Update and draw
    // -------------------------------------------------------------------------

    fn release_due_respawns(&mut self) {
        let now = self.tick;
        let population = &self.population;
        let released = self.deferred.take_due_respawns(now, |spawn| {
            !ArenaView::new(population, now).check_overlap(
                spawn.body.position,
                spawn.body.radius,
                None,
            )
        });
        for spawn in released {
            tracing::debug!(tag = %spawn.tag(), x = spawn.body.position.x, y = spawn.body.position.y, "respawn released");
            self.deferred.schedule_addition(spawn);
        }
    }

    /// Advances the logical tick and runs every entity's behavior once.
    ///
    /// Failures are isolated: an entity whose behavior errors or produces a
    /// non-finite position keeps its previous state, an
    /// [`ArenaEvent::UpdateFailed`] is recorded, and the scan moves on.
    pub fn update_all(&mut self) {
        self.tick += 1;
        self.release_due_respawns();

        let now = self.tick;
        let ids: Vec<EntityId> = self.population.entities.keys().copied().collect();
        for id in ids {
            let Some(current) = self.population.entities.get(&id) else {
                continue;
            };
            let tag = current.tag();
            let Some(behavior) = self.behaviors.get(tag) else {
                tracing::warn!(entity = %id, %tag, "no behavior registered");
                continue;
            };
            let mut next = current.clone();

            let mut ctx = TickContext {
                view: ArenaView::new(&self.population, now),
                deferred: &mut self.deferred,
                economy: &mut self.economy,
                events: &mut self.events,
                rng: &mut self.rng,
                config: &self.config,
                behaviors: &self.behaviors,
            };
            let outcome = behavior.update(&mut next, &mut ctx).and_then(|()| {
                if next.is_finite() {
                    Ok(())
                } else {
                    Err(UpdateError::NonFiniteMotion { id })
                }
            });

            match outcome {
                Ok(()) => {
                    if let Some(slot) = self.population.entities.get_mut(&id) {
                        *slot = next;
                    }
                }
                Err(err) => {
                    tracing::warn!(entity = %id, %tag, error = %err, "update failed, keeping previous state");
                    self.events.push(ArenaEvent::UpdateFailed {
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    /// Draws the arena: border, entities in collection order, interact prompt,
    /// HUD text and the night overlay.
    pub fn draw_all(&self, canvas: &mut dyn Canvas) {
        canvas.clear();
        canvas.draw_border(self.width(), self.height());

        for entity in self.entities() {
            if let Some(behavior) = self.behaviors.get(entity.tag()) {
                behavior.draw(entity, canvas);
            }
        }

        let near_traders = self
            .entities()
            .filter_map(|e| e.inner.as_player())
            .filter_map(|p| p.near_trader);
        for trader in near_traders.filter_map(|id| self.get(id)) {
            let pos = trader.position();
            canvas.draw_key_indicator(pos.x, pos.y - trader.radius() * 2.0);
        }

        canvas.draw_text(10.0, 20.0, &format!("Hour: {:02}:00", self.clock.hour()));
        canvas.draw_text(10.0, 40.0, &format!("Wood: {}", self.economy.wood()));
        canvas.draw_text(10.0, 60.0, &format!("Rock: {}", self.economy.rock()));

        if self.clock.is_night() {
            canvas.apply_lighting_overlay(self.clock.darkness());
        }
    }

    /// Runs the destroy behavior of an entity's kind.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::UnknownEntity`] if `id` is not live and
    /// [`ArenaError::NotDestroyable`] for the player and the trader.
    pub fn destroy(&mut self, id: EntityId) -> Result<(), ArenaError> {
        let Some(entity) = self.population.entities.get(&id) else {
            return Err(ArenaError::UnknownEntity(id));
        };
        let mut ctx = TickContext {
            view: ArenaView::new(&self.population, self.tick),
            deferred: &mut self.deferred,
            economy: &mut self.economy,
            events: &mut self.events,
            rng: &mut self.rng,
            config: &self.config,
            behaviors: &self.behaviors,
        };
        ctx.destroy(entity)
    }

    /// Removes every entity, staged change and pending respawn, and restarts
    /// id allocation. Counters, the clock and the tick are kept.
    pub fn clear(&mut self) {
        let entities = std::mem::take(&mut self.population.entities);
        for (id, entity) in entities {
            self.events.push(ArenaEvent::Removed {
                id,
                tag: entity.tag(),
            });
        }
        self.deferred = DeferredQueue::new();
        self.next_id = 0;
        tracing::info!(tick = self.tick, "arena cleared");
    }

    // -------------------------------------------------------------------------
    // Player and trader
    // -------------------------------------------------------------------------

    /// Applies a key event to the player. `Interact` tries to open a shop.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<Interaction> {
        match event {
            InputEvent::Interact => Some(self.interact()),
            InputEvent::Pressed(direction) | InputEvent::Released(direction) => {
                let player = self
                    .player_id()
                    .and_then(|id| self.population.entities.get_mut(&id))
                    .and_then(|e| e.inner.as_player_mut());
                match (player, event) {
                    (Some(player), InputEvent::Pressed(_)) => player.press(direction),
                    (Some(player), _) => player.release(direction),
                    (None, _) => tracing::debug!(?event, "input ignored, no player"),
                }
                None
            }
        }
    }

    /// Opens a session with the trader the player is standing next to.
    pub fn interact(&mut self) -> Interaction {
        let near = self
            .player_id()
            .and_then(|id| self.get(id))
            .and_then(|e| e.inner.as_player())
            .and_then(|p| p.near_trader);
        match near.map(|trader| self.interact_with(trader)) {
            Some(Ok(interaction)) => interaction,
            Some(Err(err)) => {
                tracing::debug!(error = %err, "stale trader reference");
                Interaction::OutOfReach
            }
            None => Interaction::OutOfReach,
        }
    }

    /// Opens a session with `trader` regardless of distance.
    ///
    /// The catalog is refreshed from the current wood total first. While a
    /// session is open further calls return [`Interaction::AlreadyInteracting`].
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::UnknownEntity`] or [`ArenaError::WrongKind`] if
    /// `trader` is not a live trader.
    pub fn interact_with(&mut self, trader: EntityId) -> Result<Interaction, ArenaError> {
        let wood = self.economy.wood();
        let components = trader_mut(&mut self.population, trader)?;
        if components.interacting {
            tracing::debug!(%trader, "interaction ignored, session already open");
            return Ok(Interaction::AlreadyInteracting);
        }
        components.interacting = true;
        let unlocked = components.catalog.unlock(wood, &self.config.shop);
        let items = components.catalog.items().to_vec();

        self.events.push(ArenaEvent::ShopOpened { trader });
        tracing::info!(%trader, items = items.len(), unlocked, "shop opened");
        Ok(Interaction::Opened { trader, items })
    }

    /// Closes the session with `trader`.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::UnknownEntity`] or [`ArenaError::WrongKind`] if
    /// `trader` is not a live trader.
    pub fn end_interaction(&mut self, trader: EntityId) -> Result<(), ArenaError> {
        trader_mut(&mut self.population, trader)?.interacting = false;
        tracing::debug!(%trader, "shop closed");
        Ok(())
    }

    /// Buys catalog item `index` from `trader`.
    ///
    /// The price is taken from the item's counter and the robot is staged for
    /// addition next to the player (clamped into the arena).
    ///
    /// # Errors
    ///
    /// - [`PurchaseError::NoSession`] if no session is open with `trader`
    /// - [`PurchaseError::UnknownItem`] if `index` is out of range
    /// - [`PurchaseError::InsufficientFunds`] if the counter is too low; nothing changes
    /// - [`PurchaseError::Arena`] if `trader` is not a live trader
    pub fn purchase(&mut self, trader: EntityId, index: usize) -> Result<Receipt, PurchaseError> {
        let entity = self
            .population
            .entities
            .get(&trader)
            .ok_or(ArenaError::UnknownEntity(trader))?;
        let trader_pos = entity.position();
        let components = entity.inner.as_trader().ok_or(ArenaError::WrongKind {
            id: trader,
            expected: EntityTag::Trader,
            actual: entity.tag(),
        })?;
        if !components.interacting {
            return Err(PurchaseError::NoSession(trader));
        }
        let item = components
            .catalog
            .get(index)
            .cloned()
            .ok_or(PurchaseError::UnknownItem(index))?;

        let remaining = self.economy.spend(item.currency, item.cost)?;

        let anchor = self
            .player_id()
            .and_then(|id| self.get(id))
            .map_or(trader_pos, Entity::position);
        let delivery = self.bounds().clamp_center(
            anchor + Vec2::from(self.config.shop.delivery_offset),
            self.config.agents.radius,
        );
        let heading = self.rng.gen_range(0.0..TAU);
        let spawn = self.agent_spawn(item.kind, delivery, heading);
        self.deferred.schedule_addition(spawn);

        self.events.push(ArenaEvent::Purchased {
            kind: item.kind,
            cost: item.cost,
        });
        tracing::info!(kind = %item.kind, cost = item.cost, remaining, "robot purchased");
        Ok(Receipt { item, remaining })
    }

    // -------------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------------

    /// Advances the clock by one hour and applies any day/night transition.
    pub fn on_clock_tick(&mut self, tick: ClockTick) -> Option<DayNightTransition> {
        let transition = self.clock.advance();
        tracing::debug!(sequence = tick.sequence, hour = self.clock.hour(), "clock tick");
        if let Some(transition) = transition {
            self.apply_transition(transition);
        }
        transition
    }

    /// Jumps the clock to `hour` and applies any day/night transition.
    pub fn set_hour(&mut self, hour: u32) -> Option<DayNightTransition> {
        let transition = self.clock.set_hour(hour);
        if let Some(transition) = transition {
            self.apply_transition(transition);
        }
        transition
    }

    /// Stages the population change for a transition: enemies arrive at
    /// nightfall and are swept away at dawn.
    pub fn apply_transition(&mut self, transition: DayNightTransition) {
        let hour = self.clock.hour();
        match transition {
            DayNightTransition::NightStarted => {
                let radius = self.config.agents.radius;
                for _ in 0..self.config.night.enemy_count {
                    let pos = self.find_free_position(radius);
                    let spawn = self.enemy_spawn(pos);
                    self.deferred.schedule_addition(spawn);
                }
                self.events.push(ArenaEvent::NightStarted { hour });
                tracing::info!(hour, enemies = self.config.night.enemy_count, "night started");
            }
            DayNightTransition::DayStarted => {
                let enemies: Vec<EntityId> = self
                    .entities()
                    .filter(|e| e.tag() == EntityTag::Enemy)
                    .map(Entity::id)
                    .collect();
                for &id in &enemies {
                    self.deferred.schedule_removal(id);
                }
                self.events.push(ArenaEvent::DayStarted { hour });
                tracing::info!(hour, enemies = enemies.len(), "day started");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Events and notices
    // -------------------------------------------------------------------------

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<ArenaEvent> {
        self.events.take()
    }

    /// Drains one-shot economy threshold notices.
    pub fn take_notices(&mut self) -> Vec<EconomyNotice> {
        self.economy.take_notices()
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Captures the arena's persistent state.
    #[must_use]
    pub fn snapshot(&self) -> ArenaSnapshot {
        let mut economy = self.economy.clone();
        economy.take_notices();
        ArenaSnapshot {
            width: self.width(),
            height: self.height(),
            tick: self.tick,
            hour: self.clock.hour(),
            economy,
            entities: self.entities().cloned().collect(),
            respawns: self.deferred.respawns().to_vec(),
        }
    }

    /// Rebuilds an arena from a snapshot.
    ///
    /// The snapshot's dimensions override `config`. Entity ids are kept and
    /// new ids continue after the largest one. Pending respawns keep their due
    /// tick. The RNG is reseeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidDimensions`] for a non-positive size and
    /// [`SnapshotError::DuplicateId`] if two entities share an id.
    pub fn restore(snapshot: ArenaSnapshot, mut config: ArenaConfig) -> Result<Self, SnapshotError> {
        let ArenaSnapshot {
            width,
            height,
            tick,
            hour,
            economy,
            entities,
            respawns,
        } = snapshot;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SnapshotError::InvalidDimensions { width, height });
        }
        config.arena.width = width;
        config.arena.height = height;

        let mut arena = Self::new(config);
        arena.tick = tick;
        arena.clock.set_hour(hour);
        arena.economy = economy;
        for entity in entities {
            let id = entity.id();
            if arena.population.entities.insert(id, entity).is_some() {
                return Err(SnapshotError::DuplicateId(id));
            }
        }
        for PendingRespawn { due, spawn } in respawns {
            arena.deferred.schedule_respawn(due, spawn);
        }
        arena.next_id = arena
            .population
            .entities
            .keys()
            .next_back()
            .map_or(0, |id| id.as_u64() + 1);
        tracing::info!(tick, entities = arena.len(), "arena restored");
        Ok(arena)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

fn trader_mut(population: &mut Population, id: EntityId) -> Result<&mut TraderComponents, ArenaError> {
    let entity = population
        .entities
        .get_mut(&id)
        .ok_or(ArenaError::UnknownEntity(id))?;
    let actual = entity.tag();
    entity.inner.as_trader_mut().ok_or(ArenaError::WrongKind {
        id,
        expected: EntityTag::Trader,
        actual,
    })
}

// =============================================================================
// Tests
// =============================================================================
