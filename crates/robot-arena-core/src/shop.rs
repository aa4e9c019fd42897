//! Trader catalog and interaction results.
//!
//! A trader starts with a lumber robot on sale. Once the wood counter reaches
//! the configured unlock level, the miner robot is added the next time the
//! player opens a session. The catalog only ever grows.

use serde::{Deserialize, Serialize};

use crate::config::ShopConfig;
use crate::entity::components::ResourceKind;
use crate::entity::{AgentKind, EntityId};

/// One item on sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    /// Robot delivered on purchase.
    pub kind: AgentKind,
    /// Price.
    pub cost: u32,
    /// Counter the price is paid from.
    pub currency: ResourceKind,
}

impl ShopItem {
    /// Creates an item priced in `currency`.
    #[must_use]
    pub const fn new(kind: AgentKind, cost: u32, currency: ResourceKind) -> Self {
        Self {
            kind,
            cost,
            currency,
        }
    }
}

/// Items a trader offers, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<ShopItem>,
}

impl Catalog {
    /// Opening catalog: a lumber robot for wood.
    #[must_use]
    pub fn starting(config: &ShopConfig) -> Self {
        Self {
            items: vec![ShopItem::new(
                AgentKind::Lumber,
                config.lumber_cost,
                ResourceKind::Wood,
            )],
        }
    }

    /// Items on sale.
    #[must_use]
    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ShopItem> {
        self.items.get(index)
    }

    /// Returns true if a robot of this kind is on sale.
    #[must_use]
    pub fn offers(&self, kind: AgentKind) -> bool {
        self.items.iter().any(|item| item.kind == kind)
    }

    /// Adds items unlocked by the current wood total. Returns how many were added.
    pub fn unlock(&mut self, wood: u32, config: &ShopConfig) -> usize {
        let before = self.items.len();
        if wood >= config.miner_unlock_wood && !self.offers(AgentKind::Miner) {
            self.items.push(ShopItem::new(
                AgentKind::Miner,
                config.miner_cost,
                ResourceKind::Wood,
            ));
        }
        self.items.len() - before
    }
}

/// Result of asking a trader to interact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// A new session opened; the shell shows these items.
    Opened {
        /// Trader hosting the session.
        trader: EntityId,
        /// Items on sale for this session.
        items: Vec<ShopItem>,
    },
    /// A session is already open; nothing happened.
    AlreadyInteracting,
    /// The player is not close enough to any trader.
    OutOfReach,
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// What was bought.
    pub item: ShopItem,
    /// Counter value after paying.
    pub remaining: u32,
}
