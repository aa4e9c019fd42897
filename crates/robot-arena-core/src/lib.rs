//! # Robot Arena Core
//!
//! Deterministic simulation engine for a bounded 2D arena of robots,
//! obstacles and resource drops.
//!
//! ## Architecture
//!
//! - **Entities**: one tagged record per object ([`entity::Entity`]), holding a
//!   circular [`entity::Body`] and kind-specific components
//! - **Behaviors**: per-kind strategies ([`behavior::Behavior`]) that read the
//!   population through an [`view::ArenaView`] and stage changes in the
//!   [`deferred::DeferredQueue`]
//! - **Arena**: owns the population and runs the tick protocol
//!   `update_all → process_deferred → draw_all`
//! - **Driver**: [`simulation::Simulation`] adds pause, speed and the
//!   day/night clock hand-off
//!
//! Rendering, windowing and audio stay outside the crate. The engine talks to
//! them through the [`canvas::Canvas`] trait, [`input::InputEvent`] values and
//! the drained [`events::ArenaEvent`] log.
//!
//! ## Usage
//!
//! ```
//! use robot_arena_core::{Arena, ArenaConfig, RecordingCanvas};
//! use robot_arena_core::entity::AgentKind;
//!
//! let mut arena = Arena::new(ArenaConfig::default());
//! arena.seed_default_scenario();
//! arena.add_agent(AgentKind::Lumber);
//!
//! let mut canvas = RecordingCanvas::new();
//! for _ in 0..60 {
//!     arena.update_all();
//!     arena.process_deferred();
//!     arena.draw_all(&mut canvas);
//! }
//! assert!(canvas.sprites().count() > 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod behavior;
pub mod behaviors;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod deferred;
pub mod economy;
pub mod entity;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod shop;
pub mod simulation;
pub mod snapshot;
pub mod view;

#[cfg(test)]
mod tests;

pub use arena::{Arena, DeferredSummary};
pub use behavior::{Behavior, BehaviorRegistry, TickContext};
pub use canvas::{Canvas, RecordingCanvas, SpriteKind};
pub use clock::{ClockThread, ClockTick, DayNightClock, DayNightTransition};
pub use config::ArenaConfig;
pub use entity::{AgentKind, Body, Entity, EntityId, EntityTag, Spawn};
pub use error::{ArenaError, ConfigError, PurchaseError, SnapshotError, UpdateError};
pub use events::ArenaEvent;
pub use input::{Direction, InputEvent};
pub use simulation::Simulation;
pub use snapshot::ArenaSnapshot;
