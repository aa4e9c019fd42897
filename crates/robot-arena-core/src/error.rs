//! Error types for the arena engine.
//!
//! Each concern has its own enum so callers can match on exactly the failures
//! an operation can produce:
//!
//! - [`ArenaError`]: caller-side contract violations against the arena
//! - [`UpdateError`]: a single entity's update went wrong; isolated by the scan
//! - [`PurchaseError`]: a declined trader transaction
//! - [`ConfigError`]: configuration loading and validation
//! - [`SnapshotError`]: persistence failures

use thiserror::Error;

use crate::entity::{EntityId, EntityTag};

/// Contract violations reported by [`Arena`](crate::arena::Arena) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// The entity kind has no destroy behavior (player, trader).
    #[error("entity {id} of kind {tag} cannot be destroyed")]
    NotDestroyable {
        /// The entity the caller tried to destroy.
        id: EntityId,
        /// Its kind.
        tag: EntityTag,
    },
    /// No live entity has this id.
    #[error("entity {0} is not in the arena")]
    UnknownEntity(EntityId),
    /// The entity exists but is not of the kind the operation needs.
    #[error("entity {id} is a {actual}, expected a {expected}")]
    WrongKind {
        /// The entity passed in.
        id: EntityId,
        /// The kind the operation works on.
        expected: EntityTag,
        /// The kind it actually is.
        actual: EntityTag,
    },
}

/// Failure of one entity's update during a population scan.
///
/// The scan logs these and keeps the entity's previous state; they never
/// escape [`Arena::update_all`](crate::arena::Arena::update_all).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpdateError {
    /// Movement produced a NaN or infinite position or velocity.
    #[error("entity {id} produced non-finite motion")]
    NonFiniteMotion {
        /// The offending entity.
        id: EntityId,
    },
    /// The entity's components do not match its registered behavior.
    #[error("entity {id} has no {expected} components")]
    ComponentMismatch {
        /// The offending entity.
        id: EntityId,
        /// The kind the behavior expected.
        expected: EntityTag,
    },
    /// No behavior is registered for the entity's kind.
    #[error("no behavior registered for {0}")]
    MissingBehavior(EntityTag),
}

/// Reasons a trader declines a purchase. No state changes when returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// The player cannot afford the item.
    #[error("insufficient {resource}: need {needed}, have {available}")]
    InsufficientFunds {
        /// Counter the price is paid in.
        resource: &'static str,
        /// Price of the item.
        needed: u32,
        /// Current counter value.
        available: u32,
    },
    /// The catalog has no such item.
    #[error("item {0} is not in the catalog")]
    UnknownItem(usize),
    /// The trader has no open interaction session.
    #[error("trader {0} has no open session")]
    NoSession(EntityId),
    /// The arena operation underneath failed.
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Errors from loading or validating an [`ArenaConfig`](crate::config::ArenaConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML was malformed or had wrong types.
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    /// The configuration could not be written as TOML.
    #[error("failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// A value was out of range.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Errors from saving or restoring an [`ArenaSnapshot`](crate::snapshot::ArenaSnapshot).
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot could not be encoded or decoded.
    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot file could not be read or written.
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    /// Two entities in the snapshot share an id.
    #[error("snapshot contains duplicate entity id {0}")]
    DuplicateId(EntityId),
    /// The snapshot's dimensions are unusable.
    #[error("snapshot has invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Stored width.
        width: f32,
        /// Stored height.
        height: f32,
    },
}
