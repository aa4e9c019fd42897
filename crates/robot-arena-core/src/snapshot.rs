//! Arena persistence.
//!
//! An [`ArenaSnapshot`] captures what a player would expect to survive a save:
//! dimensions, tick, hour, counters, every live entity with its id, and the
//! obstacles still waiting to respawn. Per-tick caches (targets, harvester
//! task, sensor alert, animation frames, trader session) are skipped during
//! serialization and rebuilt by the next update. Staged additions and removals
//! are not saved; take the snapshot between ticks.
//!
//! Build one with [`Arena::snapshot`](crate::arena::Arena::snapshot) and turn it
//! back into an arena with [`Arena::restore`](crate::arena::Arena::restore).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::deferred::PendingRespawn;
use crate::economy::Economy;
use crate::entity::Entity;
use crate::error::SnapshotError;

/// Serializable state of an arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    /// Arena width.
    pub width: f32,
    /// Arena height.
    pub height: f32,
    /// Logical tick at capture.
    pub tick: u64,
    /// Clock hour at capture.
    pub hour: u32,
    /// Wood and rock counters.
    pub economy: Economy,
    /// Live entities in collection order.
    pub entities: Vec<Entity>,
    /// Broken obstacles waiting to come back, in scheduling order.
    #[serde(default)]
    pub respawns: Vec<PendingRespawn>,
}

impl ArenaSnapshot {
    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the snapshot as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] or [`SnapshotError::Json`].
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a JSON snapshot from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] or [`SnapshotError::Json`].
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::config::ArenaConfig;
    use crate::entity::components::ObstacleKind;
    use crate::entity::EntityTag;
    use crate::input::{Direction, InputEvent};
    use glam::Vec2;

    fn busy_arena() -> Arena {
        let mut arena = Arena::default();
        arena.seed_default_scenario();
        arena.add_agent(crate::entity::AgentKind::Lumber);
        arena.add_agent(crate::entity::AgentKind::Smart);
        for _ in 0..30 {
            arena.update_all();
            arena.process_deferred();
        }
        arena
    }

    #[test]
    fn json_round_trip_preserves_entities() {
        let arena = busy_arena();
        let snapshot = arena.snapshot();
        let back = ArenaSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(back.entities.len(), arena.len());
        assert_eq!(back.tick, 30);
        for (saved, live) in back.entities.iter().zip(arena.entities()) {
            assert_eq!(saved.id(), live.id());
            assert_eq!(saved.tag(), live.tag());
            assert_eq!(saved.position(), live.position());
        }
    }

    #[test]
    fn transient_state_resets_on_load() {
        let mut arena = Arena::default();
        let player = arena.add_player(Vec2::new(400.0, 300.0));
        arena.handle_input(InputEvent::Pressed(Direction::Up));
        arena.update_all();

        let snapshot = ArenaSnapshot::from_json(&arena.snapshot().to_json().unwrap()).unwrap();
        let restored = Arena::restore(snapshot, ArenaConfig::default()).unwrap();
        let components = restored.get(player).and_then(|e| e.inner.as_player()).unwrap();
        assert!(components.keys.is_empty());
        assert_eq!(components.moving, None);
        assert_eq!(components.facing, Direction::Up);
    }

    #[test]
    fn restore_continues_id_sequence() {
        let mut arena = Arena::default();
        arena.add_obstacle(ObstacleKind::Tree, Vec2::new(100.0, 100.0));
        let last = arena.add_obstacle(ObstacleKind::Rock, Vec2::new(300.0, 100.0));

        let mut restored = Arena::restore(arena.snapshot(), ArenaConfig::default()).unwrap();
        let fresh = restored.add_obstacle(ObstacleKind::Tree, Vec2::new(500.0, 100.0));
        assert!(fresh > last);
        assert_eq!(restored.view().count(EntityTag::Obstacle), 3);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut arena = Arena::default();
        arena.add_obstacle(ObstacleKind::Tree, Vec2::new(100.0, 100.0));
        let mut snapshot = arena.snapshot();
        snapshot.entities.push(snapshot.entities[0].clone());
        assert!(matches!(
            Arena::restore(snapshot, ArenaConfig::default()),
            Err(SnapshotError::DuplicateId(_))
        ));
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let mut snapshot = Arena::default().snapshot();
        snapshot.width = 0.0;
        assert!(matches!(
            Arena::restore(snapshot, ArenaConfig::default()),
            Err(SnapshotError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn save_and_load_file() {
        let path = std::env::temp_dir().join(format!("arena-snapshot-{}.json", std::process::id()));
        let snapshot = busy_arena().snapshot();
        snapshot.save(&path).unwrap();
        let loaded = ArenaSnapshot::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.entities.len(), snapshot.entities.len());
        assert_eq!(loaded.economy, snapshot.economy);
    }
}
