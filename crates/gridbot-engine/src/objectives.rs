//! Objective validation over a final world state.

use crate::world::WorldState;
use gridbot_types::{LevelDefinition, Objective};

/// Which declared objectives a finished run satisfied.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveReport {
    pub satisfied: Vec<Objective>,
    pub failed: Vec<Objective>,
}

impl ObjectiveReport {
    /// True iff no objective failed.
    pub fn all_satisfied(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Evaluate every declared objective against the final world. Objectives
/// are boolean; overall success requires zero failures.
pub fn validate(world: &WorldState, level: &LevelDefinition) -> ObjectiveReport {
    let mut satisfied = Vec::new();
    let mut failed = Vec::new();
    for objective in &level.objectives {
        if is_satisfied(world, level, objective) {
            satisfied.push(objective.clone());
        } else {
            failed.push(objective.clone());
        }
    }
    ObjectiveReport { satisfied, failed }
}

fn is_satisfied(world: &WorldState, level: &LevelDefinition, objective: &Objective) -> bool {
    match objective {
        Objective::Reach { pos } => world.pose.pos == *pos,
        Objective::Collect { kind, count } => world.inventory_count(*kind) >= *count,
        Objective::CollectAll { kinds } => level
            .collectibles
            .iter()
            .filter(|c| kinds.contains(&c.kind))
            .all(|c| world.collected.contains(&c.id)),
        Objective::Activate { lever } => world.active_levers.contains(lever),
        // Reserved for future negative constraints.
        Objective::Avoid => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbot_types::{Collectible, CollectibleKind, Direction, GridPos, Pose};

    fn level_with(objectives: Vec<Objective>) -> LevelDefinition {
        LevelDefinition {
            rows: 3,
            cols: 3,
            start: Pose::new(GridPos::new(0, 0), Direction::East),
            obstacles: Vec::new(),
            collectibles: vec![
                Collectible {
                    id: "gem-1".into(),
                    pos: GridPos::new(1, 0),
                    kind: CollectibleKind::Gem,
                },
                Collectible {
                    id: "gem-2".into(),
                    pos: GridPos::new(2, 0),
                    kind: CollectibleKind::Gem,
                },
            ],
            levers: Vec::new(),
            objectives,
            optimal_blocks: 1,
            base_reward: 5,
        }
    }

    #[test]
    fn reach_compares_final_position() {
        let target = GridPos::new(2, 2);
        let level = level_with(vec![Objective::Reach { pos: target }]);
        let mut world = WorldState::new(&level);
        assert!(!validate(&world, &level).all_satisfied());
        world.pose.pos = target;
        assert!(validate(&world, &level).all_satisfied());
    }

    #[test]
    fn collect_requires_the_declared_count() {
        let level = level_with(vec![Objective::Collect {
            kind: CollectibleKind::Gem,
            count: 2,
        }]);
        let mut world = WorldState::new(&level);
        world.inventory.push(CollectibleKind::Gem);
        assert!(!validate(&world, &level).all_satisfied());
        world.inventory.push(CollectibleKind::Gem);
        assert!(validate(&world, &level).all_satisfied());
    }

    #[test]
    fn collect_all_requires_every_declared_id_of_the_kinds() {
        let level = level_with(vec![Objective::CollectAll {
            kinds: vec![CollectibleKind::Gem],
        }]);
        let mut world = WorldState::new(&level);
        world.collected.insert("gem-1".into());
        assert!(!validate(&world, &level).all_satisfied());
        world.collected.insert("gem-2".into());
        assert!(validate(&world, &level).all_satisfied());
    }

    #[test]
    fn activate_checks_toggle_membership() {
        let level = level_with(vec![Objective::Activate {
            lever: "gate".into(),
        }]);
        let mut world = WorldState::new(&level);
        assert!(!validate(&world, &level).all_satisfied());
        world.active_levers.insert("gate".into());
        assert!(validate(&world, &level).all_satisfied());
    }

    #[test]
    fn avoid_is_trivially_satisfied() {
        let level = level_with(vec![Objective::Avoid]);
        let world = WorldState::new(&level);
        let report = validate(&world, &level);
        assert!(report.all_satisfied());
        assert_eq!(report.satisfied.len(), 1);
    }

    #[test]
    fn report_splits_mixed_outcomes() {
        let level = level_with(vec![
            Objective::Avoid,
            Objective::Reach {
                pos: GridPos::new(2, 2),
            },
        ]);
        let world = WorldState::new(&level);
        let report = validate(&world, &level);
        assert_eq!(report.satisfied, vec![Objective::Avoid]);
        assert_eq!(
            report.failed,
            vec![Objective::Reach {
                pos: GridPos::new(2, 2)
            }]
        );
    }
}
