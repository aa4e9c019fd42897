//! Arena events for shells, audio cues and tests.
//!
//! The event log does not affect simulation state. It records what happened
//! during a tick so a shell can react (play a sound, show a message) without
//! the engine knowing about those collaborators. Drain it with
//! [`Arena::take_events`](crate::arena::Arena::take_events).

use serde::{Deserialize, Serialize};

use crate::entity::components::{ObstacleKind, ResourceKind};
use crate::entity::{AgentKind, EntityId, EntityTag};

/// Something notable that happened in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArenaEvent {
    /// An entity joined the population.
    Added {
        /// New entity.
        id: EntityId,
        /// Its kind.
        tag: EntityTag,
    },
    /// An entity left the population.
    Removed {
        /// Departed entity.
        id: EntityId,
        /// Its kind.
        tag: EntityTag,
    },
    /// A harvester picked up a drop.
    ResourceCollected {
        /// Collecting harvester.
        harvester: EntityId,
        /// Drop kind.
        resource: ResourceKind,
        /// Counter value after collection.
        total: u32,
    },
    /// An obstacle was broken down into a drop.
    ObstacleBroken {
        /// The obstacle.
        obstacle: EntityId,
        /// Tree or rock.
        kind: ObstacleKind,
    },
    /// A pursuer reached its prey.
    PreyCaught {
        /// Hunter.
        pursuer: EntityId,
        /// Prey scheduled for removal.
        prey: EntityId,
    },
    /// An enemy reached a harvester.
    WorkerLost {
        /// Attacking enemy.
        enemy: EntityId,
        /// Harvester scheduled for removal.
        worker: EntityId,
    },
    /// The clock crossed into night.
    NightStarted {
        /// Hour at the transition.
        hour: u32,
    },
    /// The clock crossed into day.
    DayStarted {
        /// Hour at the transition.
        hour: u32,
    },
    /// A trader opened a session.
    ShopOpened {
        /// Trader.
        trader: EntityId,
    },
    /// A robot was bought.
    Purchased {
        /// Robot kind.
        kind: AgentKind,
        /// Price paid.
        cost: u32,
    },
    /// An entity's update failed and its previous state was kept.
    UpdateFailed {
        /// Entity whose update failed.
        id: EntityId,
        /// Error text.
        reason: String,
    },
}

/// Append-only event buffer.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ArenaEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event.
    pub fn push(&mut self, event: ArenaEvent) {
        self.events.push(event);
    }

    /// Drains and returns all recorded events in order.
    pub fn take(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[ArenaEvent] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
