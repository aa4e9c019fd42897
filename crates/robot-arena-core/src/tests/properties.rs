//! Property tests for arena invariants.

use glam::Vec2;
use proptest::prelude::*;

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::entity::components::{HarvestRole, ObstacleKind};
use crate::entity::{AgentKind, Entity, EntityId, EntityTag};

use super::helpers::{run_ticks, spawn_harvester, spawn_wanderer};

fn agent_kind() -> impl Strategy<Value = AgentKind> {
    prop_oneof![
        Just(AgentKind::Basic),
        Just(AgentKind::Smart),
        Just(AgentKind::Predator),
        Just(AgentKind::Lumber),
        Just(AgentKind::Miner),
    ]
}

fn arena_with(seed: u64, kinds: &[AgentKind]) -> Arena {
    let mut arena = Arena::new(ArenaConfig {
        seed,
        ..ArenaConfig::default()
    });
    arena.seed_default_scenario();
    for &kind in kinds {
        arena.add_agent(kind);
    }
    arena
}

fn ids(arena: &Arena) -> Vec<EntityId> {
    arena.entities().map(Entity::id).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn entities_stay_inside_bounds(
        seed in any::<u64>(),
        kinds in prop::collection::vec(agent_kind(), 1..8),
    ) {
        let mut arena = arena_with(seed, &kinds);
        let bounds = arena.bounds();
        for _ in 0..200 {
            arena.update_all();
            for entity in arena.entities() {
                prop_assert!(
                    bounds.contains_circle(entity.position(), entity.radius()),
                    "{:?} left the arena", entity
                );
            }
            arena.process_deferred();
        }
    }

    #[test]
    fn update_never_changes_membership(
        seed in any::<u64>(),
        kinds in prop::collection::vec(agent_kind(), 1..8),
    ) {
        let mut arena = arena_with(seed, &kinds);
        for _ in 0..100 {
            let before = ids(&arena);
            arena.update_all();
            prop_assert_eq!(&before, &ids(&arena));
            arena.process_deferred();
        }
    }

    #[test]
    fn second_process_deferred_is_a_no_op(
        seed in any::<u64>(),
        kinds in prop::collection::vec(agent_kind(), 1..8),
        ticks in 1u64..150,
    ) {
        let mut arena = arena_with(seed, &kinds);
        run_ticks(&mut arena, ticks);
        arena.update_all();
        arena.process_deferred();
        let after_first = ids(&arena);
        prop_assert!(arena.process_deferred().is_empty());
        prop_assert_eq!(after_first, ids(&arena));
    }

    #[test]
    fn overlap_ignores_insertion_order(
        circles in prop::collection::vec((30.0f32..770.0, 30.0f32..570.0), 1..12),
        point in (0.0f32..800.0, 0.0f32..600.0),
        radius in 1.0f32..60.0,
    ) {
        let mut forward = Arena::default();
        let mut backward = Arena::default();
        for &(x, y) in &circles {
            forward.add_obstacle(ObstacleKind::Rock, Vec2::new(x, y));
        }
        for &(x, y) in circles.iter().rev() {
            backward.add_obstacle(ObstacleKind::Rock, Vec2::new(x, y));
        }
        let point = Vec2::new(point.0, point.1);
        prop_assert_eq!(
            forward.check_overlap(point, radius, None),
            backward.check_overlap(point, radius, None)
        );
    }

    #[test]
    fn overlap_is_symmetric_between_wanderers(
        a in (20.0f32..780.0, 20.0f32..580.0),
        b in (20.0f32..780.0, 20.0f32..580.0),
    ) {
        let mut arena = Arena::default();
        let first = spawn_wanderer(&mut arena, Vec2::new(a.0, a.1), Vec2::ZERO);
        let second = spawn_wanderer(&mut arena, Vec2::new(b.0, b.1), Vec2::ZERO);
        let view = arena.view();
        prop_assert_eq!(
            view.check_overlap(Vec2::new(a.0, a.1), 20.0, Some(first)),
            view.check_overlap(Vec2::new(b.0, b.1), 20.0, Some(second))
        );
    }

    #[test]
    fn lone_harvester_breaks_its_obstacle(
        start in (40.0f32..760.0, 40.0f32..560.0),
        target in (40.0f32..760.0, 40.0f32..560.0),
    ) {
        let start = Vec2::new(start.0, start.1);
        let target = Vec2::new(target.0, target.1);
        let mut arena = Arena::default();
        spawn_harvester(&mut arena, HarvestRole::Lumber, start);
        let tree = arena.add_obstacle(ObstacleKind::Tree, target);

        let speed = arena.config().agents.harvester_speed;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let budget = (start.distance(target) / speed).ceil() as u64 + 10;
        let mut broken = false;
        for _ in 0..budget {
            arena.update_all();
            broken |= arena.deferred().is_removal_scheduled(tree);
            arena.process_deferred();
            if broken {
                break;
            }
        }
        prop_assert!(broken);
        prop_assert_eq!(arena.view().count(EntityTag::Resource), 1);
    }
}
