//! Resource counters with one-shot threshold notices.
//!
//! Harvesters add to the counters, purchases take from them. The first time a
//! counter reaches its threshold an [`EconomyNotice`] is queued; the shell
//! drains notices with [`Arena::take_notices`](crate::arena::Arena::take_notices)
//! and prompts the player. A notice never fires twice for the same counter.

use serde::{Deserialize, Serialize};

use crate::config::EconomyConfig;
use crate::entity::components::ResourceKind;
use crate::error::PurchaseError;

/// Notification raised when a counter first reaches its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyNotice {
    /// Counter that crossed.
    pub resource: ResourceKind,
    /// Counter value at the moment it crossed.
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Counter {
    value: u32,
    threshold: u32,
    notified: bool,
}

impl Counter {
    const fn new(value: u32, threshold: u32) -> Self {
        Self {
            value,
            threshold,
            notified: false,
        }
    }
}

/// Wood and rock tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    wood: Counter,
    rock: Counter,
    #[serde(skip)]
    notices: Vec<EconomyNotice>,
}

impl Economy {
    /// Creates counters from the starting values in `config`.
    #[must_use]
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            wood: Counter::new(config.starting_wood, config.wood_threshold),
            rock: Counter::new(config.starting_rock, config.rock_threshold),
            notices: Vec::new(),
        }
    }

    const fn counter(&self, kind: ResourceKind) -> &Counter {
        match kind {
            ResourceKind::Wood => &self.wood,
            ResourceKind::Rock => &self.rock,
        }
    }

    fn counter_mut(&mut self, kind: ResourceKind) -> &mut Counter {
        match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Rock => &mut self.rock,
        }
    }

    /// Current value of a counter.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        self.counter(kind).value
    }

    /// Current wood total.
    #[must_use]
    pub const fn wood(&self) -> u32 {
        self.wood.value
    }

    /// Current rock total.
    #[must_use]
    pub const fn rock(&self) -> u32 {
        self.rock.value
    }

    /// Adds to a counter, queuing a notice if it crosses its threshold for the first time.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        let counter = self.counter_mut(kind);
        counter.value = counter.value.saturating_add(amount);
        if !counter.notified && counter.value >= counter.threshold {
            counter.notified = true;
            let total = counter.value;
            tracing::info!(resource = kind.as_str(), total, "resource threshold reached");
            self.notices.push(EconomyNotice {
                resource: kind,
                total,
            });
        }
    }

    /// Takes `amount` from a counter and returns what is left.
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::InsufficientFunds`] and leaves the counter
    /// untouched if it holds less than `amount`.
    pub fn spend(&mut self, kind: ResourceKind, amount: u32) -> Result<u32, PurchaseError> {
        let counter = self.counter_mut(kind);
        if counter.value < amount {
            return Err(PurchaseError::InsufficientFunds {
                resource: kind.as_str(),
                needed: amount,
                available: counter.value,
            });
        }
        counter.value -= amount;
        Ok(counter.value)
    }

    /// Drains queued threshold notices.
    pub fn take_notices(&mut self) -> Vec<EconomyNotice> {
        std::mem::take(&mut self.notices)
    }
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(&EconomyConfig::default())
    }
}
