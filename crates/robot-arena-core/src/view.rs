//! `ArenaView` provides read-only access to the live population.
//!
//! Behaviors receive an [`ArenaView`] through their
//! [`TickContext`](crate::behavior::TickContext). The view borrows the
//! population immutably, so a behavior can read every other entity (including
//! ones already scheduled for removal) but can only change the world by
//! staging mutations in the deferred queue.
//!
//! All scans walk the population in id order, which is insertion order. When
//! two candidates tie on distance the earlier one wins because comparisons use
//! strict `<`.
//!
//! # Example
//!
//! ```
//! use robot_arena_core::arena::Arena;
//! use robot_arena_core::entity::components::ObstacleKind;
//! use glam::Vec2;
//!
//! let mut arena = Arena::default();
//! let tree = arena.add_obstacle(ObstacleKind::Tree, Vec2::new(100.0, 100.0));
//!
//! let view = arena.view();
//! assert!(view.check_overlap(Vec2::new(120.0, 100.0), 10.0, None));
//! assert!(!view.check_overlap(Vec2::new(120.0, 100.0), 10.0, Some(tree)));
//! assert_eq!(view.find_item_at(Vec2::new(100.0, 100.0)).map(|e| e.id()), Some(tree));
//! ```

use glam::Vec2;

use crate::arena::Population;
use crate::entity::{Body, Entity, EntityId, EntityTag};
use crate::geometry::{circles_overlap, collides_buffered, distance, Bounds};

/// Read-only view of the arena population for one tick.
#[derive(Debug, Clone, Copy)]
pub struct ArenaView<'a> {
    population: &'a Population,
    tick: u64,
}

impl<'a> ArenaView<'a> {
    pub(crate) const fn new(population: &'a Population, tick: u64) -> Self {
        Self { population, tick }
    }

    /// Arena bounds.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.population.bounds
    }

    /// Logical tick the view was taken at.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.population.entities.get(&id)
    }

    /// Returns true if `id` is in the live population.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.population.entities.contains_key(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.population.entities.len()
    }

    /// Returns true if the population is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.population.entities.is_empty()
    }

    /// Live entities in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        self.population.entities.values()
    }

    /// Number of live entities of one kind.
    #[must_use]
    pub fn count(&self, tag: EntityTag) -> usize {
        self.iter().filter(|e| e.tag() == tag).count()
    }

    /// Returns true if a circle at `pos` intersects any live entity other than `exclude`.
    ///
    /// Touching circles do not count as overlapping.
    #[must_use]
    pub fn check_overlap(&self, pos: Vec2, radius: f32, exclude: Option<EntityId>) -> bool {
        self.iter().any(|entity| {
            Some(entity.id()) != exclude
                && circles_overlap(pos, radius, entity.position(), entity.radius())
        })
    }

    /// First entity, in collection order, whose circle contains `point`.
    #[must_use]
    pub fn find_item_at(&self, point: Vec2) -> Option<&'a Entity> {
        self.iter()
            .find(|entity| distance(point, entity.position()) <= entity.radius())
    }

    /// Nearest entity to `from` matching `pred`, excluding `exclude`.
    #[must_use]
    pub fn nearest(
        &self,
        from: Vec2,
        exclude: Option<EntityId>,
        mut pred: impl FnMut(&Entity) -> bool,
    ) -> Option<&'a Entity> {
        let mut best: Option<(&'a Entity, f32)> = None;
        for entity in self.iter() {
            if Some(entity.id()) == exclude || !pred(entity) {
                continue;
            }
            let d = distance(from, entity.position());
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((entity, d));
            }
        }
        best.map(|(entity, _)| entity)
    }

    /// First entity other than `id` that `body` collides with, using the buffered test.
    #[must_use]
    pub fn first_collision(
        &self,
        id: EntityId,
        body: &Body,
        mut filter: impl FnMut(&Entity) -> bool,
    ) -> Option<&'a Entity> {
        self.iter().find(|other| {
            other.id() != id
                && filter(other)
                && collides_buffered(body.position, body.radius, other.position(), other.radius())
        })
    }
}
