//! World runtime state: the mutable half of a run.
//!
//! Created fresh from a [`LevelDefinition`] at run start, owned exclusively
//! by that run, discarded on reset. Query helpers never mutate — the
//! interpreter applies every mutation itself.

use gridbot_types::{
    BlockInstance, Collectible, CollectibleKind, GridPos, Lever, LevelDefinition, Obstacle, Pose,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Mutable state of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldState {
    /// Agent position plus facing.
    pub pose: Pose,
    /// Acquired item kinds, in collection order.
    pub inventory: Vec<CollectibleKind>,
    /// Learner variables. Unset names read as 0.
    pub variables: BTreeMap<String, f64>,
    /// Procedure bodies captured by `define-procedure`, by name.
    pub procedures: BTreeMap<String, Vec<BlockInstance>>,
    /// Every pose the agent has occupied, starting with the start pose.
    /// Committed moves append; turns only change `pose.facing`.
    pub path: Vec<Pose>,
    /// Metered steps so far — progress reporting and the infinite-loop
    /// guard share this counter. Monotonic.
    pub steps: u64,
    /// Levers currently toggled on. Toggling twice reverts to off.
    pub active_levers: BTreeSet<String>,
    /// Ids of collectibles already picked up.
    pub collected: BTreeSet<String>,
    /// Obstacles for this run. Starts as a copy of the level's list;
    /// `push-obstacle` relocates entries here for the run's remainder.
    pub obstacles: Vec<Obstacle>,
    rows: u32,
    cols: u32,
}

impl WorldState {
    /// Fresh state at the level's start pose.
    pub fn new(level: &LevelDefinition) -> Self {
        Self {
            pose: level.start,
            inventory: Vec::new(),
            variables: BTreeMap::new(),
            procedures: BTreeMap::new(),
            path: vec![level.start],
            steps: 0,
            active_levers: BTreeSet::new(),
            collected: BTreeSet::new(),
            obstacles: level.obstacles.clone(),
            rows: level.rows,
            cols: level.cols,
        }
    }

    /// True iff the position lies within the grid.
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.cols as i32 && pos.y < self.rows as i32
    }

    /// True iff a blocking-kind obstacle occupies the cell. Decorative
    /// kinds never block.
    pub fn is_blocked(&self, pos: GridPos) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.pos == pos && o.kind.blocks_movement())
    }

    /// The obstacle at a cell, if any.
    pub fn obstacle_at(&self, pos: GridPos) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.pos == pos)
    }

    pub(crate) fn obstacle_at_mut(&mut self, pos: GridPos) -> Option<&mut Obstacle> {
        self.obstacles.iter_mut().find(|o| o.pos == pos)
    }

    /// The uncollected collectible at a cell, if any.
    pub fn collectible_at<'lvl>(
        &self,
        level: &'lvl LevelDefinition,
        pos: GridPos,
    ) -> Option<&'lvl Collectible> {
        level
            .collectibles
            .iter()
            .find(|c| c.pos == pos && !self.collected.contains(&c.id))
    }

    /// The lever at a cell, if any.
    pub fn lever_at<'lvl>(&self, level: &'lvl LevelDefinition, pos: GridPos) -> Option<&'lvl Lever> {
        level.levers.iter().find(|l| l.pos == pos)
    }

    /// The cell directly ahead of the agent.
    pub fn cell_ahead(&self) -> GridPos {
        self.pose.pos.offset(self.pose.facing.delta())
    }

    /// Inventory count of one kind.
    pub fn inventory_count(&self, kind: CollectibleKind) -> u32 {
        self.inventory.iter().filter(|k| **k == kind).count() as u32
    }
}
