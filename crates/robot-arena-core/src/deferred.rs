//! Deferred mutation queue.
//!
//! Behaviors never touch the live population while a scan is running. They
//! stage changes here, and [`Arena::process_deferred`](crate::arena::Arena::process_deferred)
//! applies them between the update scan and the draw pass:
//!
//! 1. every id in the removal set leaves the population
//! 2. every queued spawn is appended, in the order it was queued
//! 3. both lists are cleared
//!
//! Respawns are kept separately, keyed by the logical tick they become due.
//! The arena moves due respawns into the addition list at the start of a
//! scan, so they follow the same path as any other addition.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Spawn};

/// A spawn waiting for its tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRespawn {
    /// First tick at which the spawn may be released.
    pub due: u64,
    /// What to spawn.
    pub spawn: Spawn,
}

/// Staged additions, removals and timed respawns.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    removals: BTreeSet<EntityId>,
    additions: Vec<Spawn>,
    respawns: Vec<PendingRespawn>,
}

impl DeferredQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a removal. Scheduling the same id twice has no extra effect.
    ///
    /// Returns true if the id was not already staged.
    pub fn schedule_removal(&mut self, id: EntityId) -> bool {
        self.removals.insert(id)
    }

    /// Stages an addition.
    pub fn schedule_addition(&mut self, spawn: Spawn) {
        self.additions.push(spawn);
    }

    /// Stages a spawn to be released at or after tick `due`.
    pub fn schedule_respawn(&mut self, due: u64, spawn: Spawn) {
        self.respawns.push(PendingRespawn { due, spawn });
    }

    /// Returns true if `id` is staged for removal.
    #[must_use]
    pub fn is_removal_scheduled(&self, id: EntityId) -> bool {
        self.removals.contains(&id)
    }

    /// Staged removals.
    #[must_use]
    pub fn removals(&self) -> &BTreeSet<EntityId> {
        &self.removals
    }

    /// Staged additions, in queue order.
    #[must_use]
    pub fn additions(&self) -> &[Spawn] {
        &self.additions
    }

    /// Respawns not yet released.
    #[must_use]
    pub fn respawns(&self) -> &[PendingRespawn] {
        &self.respawns
    }

    /// Returns true if no addition or removal is staged. Respawns are not counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }

    /// Takes every due respawn for which `accept` returns true, in scheduling order.
    ///
    /// Respawns that are due but rejected stay queued and are offered again
    /// on the next call.
    pub fn take_due_respawns(
        &mut self,
        now: u64,
        mut accept: impl FnMut(&Spawn) -> bool,
    ) -> Vec<Spawn> {
        let mut released = Vec::new();
        let mut kept = Vec::with_capacity(self.respawns.len());
        for pending in self.respawns.drain(..) {
            if pending.due <= now && accept(&pending.spawn) {
                released.push(pending.spawn);
            } else {
                kept.push(pending);
            }
        }
        self.respawns = kept;
        released
    }

    /// Empties the removal and addition lists, returning their contents.
    pub(crate) fn drain(&mut self) -> (BTreeSet<EntityId>, Vec<Spawn>) {
        (
            std::mem::take(&mut self.removals),
            std::mem::take(&mut self.additions),
        )
    }
}
