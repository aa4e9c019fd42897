//! Cross-module tests for the arena engine.
//!
//! - `helpers.rs`: factory functions used here and by per-module unit tests
//! - `integration.rs`: end-to-end scenarios through the tick protocol
//! - `determinism.rs`: equal seeds and inputs give equal arenas
//! - `properties.rs`: proptest invariants (containment, scan stability, overlap)

mod determinism;
pub(crate) mod helpers;
mod integration;
mod properties;
