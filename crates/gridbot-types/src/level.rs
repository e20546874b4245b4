//! Level data model: grid, poses, obstacles, collectibles, levers, objectives.
//!
//! A [`LevelDefinition`] is immutable content authored outside the engine and
//! delivered as a JSON document. [`LevelDefinition::validate`] runs once on
//! load, before any execution touches the level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// ══════════════════════════════════════════════════════════════════════════════
// Grid geometry
// ══════════════════════════════════════════════════════════════════════════════

/// A cell coordinate. `x` is the column and `y` the row; `(0, 0)` is the
/// top-left cell and `y` grows southward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell reached by applying `(dx, dy)` once.
    pub fn offset(self, (dx, dy): (i32, i32)) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal directions the agent can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Unit cell delta for one step in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// 90° clockwise.
    pub fn turned_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// 90° counter-clockwise.
    pub fn turned_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// 180° rotation, used for backward movement.
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }
}

/// Agent position plus facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    pub pos: GridPos,
    pub facing: Direction,
}

impl Pose {
    pub fn new(pos: GridPos, facing: Direction) -> Self {
        Self { pos, facing }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Level entities
// ══════════════════════════════════════════════════════════════════════════════

/// Obstacle kinds placed by level content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Blocks movement, cannot be pushed.
    Wall,
    /// Blocks movement, can be pushed one cell by `push-obstacle`.
    Boulder,
    /// Decorative only — never blocks.
    Shrub,
}

impl ObstacleKind {
    pub fn blocks_movement(self) -> bool {
        matches!(self, Self::Wall | Self::Boulder)
    }

    pub fn is_pushable(self) -> bool {
        matches!(self, Self::Boulder)
    }
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wall => "wall",
            Self::Boulder => "boulder",
            Self::Shrub => "shrub",
        };
        f.write_str(name)
    }
}

/// A placed obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: GridPos,
    pub kind: ObstacleKind,
}

/// Collectible item kinds. `Chest` is the kind `open-container` operates on;
/// the rest are taken by `collect-item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    Gem,
    Key,
    Coin,
    Chest,
}

impl fmt::Display for CollectibleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gem => "gem",
            Self::Key => "key",
            Self::Coin => "coin",
            Self::Chest => "chest",
        };
        f.write_str(name)
    }
}

/// A placed collectible. Ids are unique within a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: String,
    pub pos: GridPos,
    pub kind: CollectibleKind,
}

/// A placed lever the agent can toggle while standing on its cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lever {
    pub id: String,
    pub pos: GridPos,
}

// ══════════════════════════════════════════════════════════════════════════════
// Objectives
// ══════════════════════════════════════════════════════════════════════════════

/// A declarative goal the run must satisfy for success. Objectives are
/// boolean — there is no partial credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Objective {
    /// Final agent position equals the target.
    Reach { pos: GridPos },
    /// Inventory holds at least `count` items of `kind`.
    Collect { kind: CollectibleKind, count: u32 },
    /// Every declared collectible of the named kinds has been picked up.
    CollectAll { kinds: Vec<CollectibleKind> },
    /// The named lever is toggled on at the end of the run.
    Activate { lever: String },
    /// Reserved for future negative constraints; trivially satisfied.
    Avoid,
}

// ══════════════════════════════════════════════════════════════════════════════
// Level definition
// ══════════════════════════════════════════════════════════════════════════════

/// Immutable description of one level, supplied by content storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub rows: u32,
    pub cols: u32,
    pub start: Pose,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub collectibles: Vec<Collectible>,
    #[serde(default)]
    pub levers: Vec<Lever>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    /// Designated minimal block count, for scoring.
    pub optimal_blocks: u32,
    /// Base reward multiplied by the star count.
    pub base_reward: u32,
}

impl LevelDefinition {
    /// True iff the position lies within the grid.
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.cols as i32 && pos.y < self.rows as i32
    }

    /// Decode a level document and validate it.
    pub fn from_json(doc: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(doc)?;
        level.validate()?;
        Ok(level)
    }

    /// Encode as a JSON document.
    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Structural validation of a freshly loaded level document.
    ///
    /// Checks grid size, that every placed entity and objective target lies
    /// in bounds, collectible id uniqueness, and that `activate` objectives
    /// reference declared levers.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(LevelError::EmptyGrid);
        }
        if !self.contains(self.start.pos) {
            return Err(LevelError::StartOutOfBounds(self.start.pos));
        }
        for obstacle in &self.obstacles {
            if !self.contains(obstacle.pos) {
                return Err(LevelError::EntityOutOfBounds {
                    entity: "obstacle",
                    pos: obstacle.pos,
                });
            }
        }
        let mut seen = BTreeSet::new();
        for collectible in &self.collectibles {
            if !self.contains(collectible.pos) {
                return Err(LevelError::EntityOutOfBounds {
                    entity: "collectible",
                    pos: collectible.pos,
                });
            }
            if !seen.insert(collectible.id.as_str()) {
                return Err(LevelError::DuplicateCollectible(collectible.id.clone()));
            }
        }
        for lever in &self.levers {
            if !self.contains(lever.pos) {
                return Err(LevelError::EntityOutOfBounds {
                    entity: "lever",
                    pos: lever.pos,
                });
            }
        }
        for objective in &self.objectives {
            match objective {
                Objective::Reach { pos } if !self.contains(*pos) => {
                    return Err(LevelError::ObjectiveOutOfBounds(*pos));
                }
                Objective::Activate { lever } => {
                    if !self.levers.iter().any(|l| l.id == *lever) {
                        return Err(LevelError::UnknownLever(lever.clone()));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// A malformed or inconsistent level document.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("start pose {0} is outside the grid")]
    StartOutOfBounds(GridPos),

    #[error("{entity} at {pos} is outside the grid")]
    EntityOutOfBounds { entity: &'static str, pos: GridPos },

    #[error("duplicate collectible id '{0}'")]
    DuplicateCollectible(String),

    #[error("objective target {0} is outside the grid")]
    ObjectiveOutOfBounds(GridPos),

    #[error("objective references unknown lever '{0}'")]
    UnknownLever(String),

    #[error("invalid level document: {0}")]
    Document(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_level() -> LevelDefinition {
        LevelDefinition {
            rows: 3,
            cols: 3,
            start: Pose::new(GridPos::new(0, 0), Direction::East),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            levers: Vec::new(),
            objectives: Vec::new(),
            optimal_blocks: 3,
            base_reward: 10,
        }
    }

    #[test]
    fn turning_right_cycles_through_the_ring() {
        let mut dir = Direction::North;
        for _ in 0..4 {
            dir = dir.turned_right();
        }
        assert_eq!(dir, Direction::North);
        assert_eq!(Direction::North.turned_right(), Direction::East);
        assert_eq!(Direction::West.turned_right(), Direction::North);
    }

    #[test]
    fn turning_left_is_the_inverse_of_turning_right() {
        for dir in [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ] {
            assert_eq!(dir.turned_right().turned_left(), dir);
        }
    }

    #[test]
    fn opposite_is_a_double_right_turn() {
        for dir in [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ] {
            assert_eq!(dir.opposite(), dir.turned_right().turned_right());
        }
    }

    #[test]
    fn deltas_cancel_with_their_opposites() {
        for dir in [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ] {
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn shrubs_do_not_block_and_only_boulders_push() {
        assert!(ObstacleKind::Wall.blocks_movement());
        assert!(ObstacleKind::Boulder.blocks_movement());
        assert!(!ObstacleKind::Shrub.blocks_movement());
        assert!(ObstacleKind::Boulder.is_pushable());
        assert!(!ObstacleKind::Wall.is_pushable());
        assert!(!ObstacleKind::Shrub.is_pushable());
    }

    #[test]
    fn validate_accepts_a_minimal_level() {
        assert!(minimal_level().validate().is_ok());
    }

    #[test]
    fn validate_rejects_start_outside_grid() {
        let mut level = minimal_level();
        level.start.pos = GridPos::new(3, 0);
        assert!(matches!(
            level.validate(),
            Err(LevelError::StartOutOfBounds(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_grid() {
        let mut level = minimal_level();
        level.rows = 0;
        assert!(matches!(level.validate(), Err(LevelError::EmptyGrid)));
    }

    #[test]
    fn validate_rejects_duplicate_collectible_ids() {
        let mut level = minimal_level();
        level.collectibles = vec![
            Collectible {
                id: "gem-1".into(),
                pos: GridPos::new(1, 1),
                kind: CollectibleKind::Gem,
            },
            Collectible {
                id: "gem-1".into(),
                pos: GridPos::new(2, 2),
                kind: CollectibleKind::Gem,
            },
        ];
        assert!(matches!(
            level.validate(),
            Err(LevelError::DuplicateCollectible(id)) if id == "gem-1"
        ));
    }

    #[test]
    fn validate_rejects_activate_of_unknown_lever() {
        let mut level = minimal_level();
        level.objectives = vec![Objective::Activate {
            lever: "gate".into(),
        }];
        assert!(matches!(
            level.validate(),
            Err(LevelError::UnknownLever(id)) if id == "gate"
        ));
    }

    #[test]
    fn level_document_round_trips_through_json() {
        let mut level = minimal_level();
        level.obstacles = vec![Obstacle {
            pos: GridPos::new(1, 1),
            kind: ObstacleKind::Wall,
        }];
        level.objectives = vec![Objective::Reach {
            pos: GridPos::new(2, 2),
        }];
        let doc = level.to_json().unwrap();
        let decoded = LevelDefinition::from_json(&doc).unwrap();
        assert_eq!(decoded, level);
    }

    #[test]
    fn level_document_uses_stable_wire_names() {
        let doc = r#"{
            "rows": 2,
            "cols": 2,
            "start": { "pos": { "x": 0, "y": 0 }, "facing": "east" },
            "obstacles": [{ "pos": { "x": 1, "y": 1 }, "kind": "boulder" }],
            "objectives": [{ "type": "reach", "pos": { "x": 1, "y": 0 } }],
            "optimal_blocks": 1,
            "base_reward": 5
        }"#;
        let level = LevelDefinition::from_json(doc).unwrap();
        assert_eq!(level.start.facing, Direction::East);
        assert_eq!(level.obstacles[0].kind, ObstacleKind::Boulder);
        assert_eq!(
            level.objectives[0],
            Objective::Reach {
                pos: GridPos::new(1, 0)
            }
        );
    }
}
