//! The learner's program: a tree of block instances.
//!
//! The editing UI assembles these and hands the tree to the engine as a JSON
//! document. Parameter kinds and bounds are encoded directly in the typed
//! [`BlockKind`] variants.

use crate::level::CollectibleKind;
use serde::{Deserialize, Serialize};

/// One node of the learner's assembled program.
///
/// `children` is meaningful only for the container kinds ([`BlockKind::Repeat`],
/// [`BlockKind::RepeatUntil`], [`BlockKind::If`],
/// [`BlockKind::DefineProcedure`]); the editor never attaches children
/// elsewhere and the engine ignores them if it does. Children belong to
/// exactly one parent — the tree has no sharing and no cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    /// Editor-assigned id, unique per instance.
    pub id: String,
    #[serde(flatten)]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockInstance>,
}

impl BlockInstance {
    /// A leaf block.
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            children: Vec::new(),
        }
    }

    /// A container block with a nested body.
    pub fn with_children(
        id: impl Into<String>,
        kind: BlockKind,
        children: Vec<BlockInstance>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            children,
        }
    }
}

/// What a block does, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    MoveForward { steps: u32 },
    MoveBackward { steps: u32 },
    TurnRight,
    TurnLeft,
    CollectItem { kind: CollectibleKind },
    OpenContainer,
    PushObstacle,
    ToggleLever,
    Repeat { times: u32 },
    RepeatUntil { condition: Condition },
    If { condition: Condition },
    DefineProcedure { name: String },
    CallProcedure { name: String },
    CreateVariable { name: String },
    SetVariable { name: String, value: f64 },
    ChangeVariable { name: String, delta: f64 },
}

/// A sensor predicate, evaluated without mutating the world and without
/// consuming a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// A blocking-kind obstacle occupies the in-bounds cell ahead.
    ObstacleAhead,
    /// An uncollected collectible occupies the in-bounds cell ahead.
    CollectibleAhead,
    /// Compare a learner variable against a literal. Unset names read as 0.
    Variable {
        name: String,
        op: CompareOp,
        value: f64,
    },
}

/// Comparison operator for variable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl CompareOp {
    pub fn apply(self, left: f64, right: f64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::NotEq => left != right,
            Self::Less => left < right,
            Self::LessEq => left <= right,
            Self::Greater => left > right,
            Self::GreaterEq => left >= right,
        }
    }
}

/// Total number of block instances in a program tree — the scorer's
/// block-count input.
pub fn block_count(blocks: &[BlockInstance]) -> u32 {
    blocks.iter().map(|b| 1 + block_count(&b.children)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_count_includes_nested_children() {
        let program = vec![
            BlockInstance::with_children(
                "b1",
                BlockKind::Repeat { times: 3 },
                vec![
                    BlockInstance::new("b2", BlockKind::MoveForward { steps: 1 }),
                    BlockInstance::new("b3", BlockKind::TurnRight),
                ],
            ),
            BlockInstance::new("b4", BlockKind::MoveForward { steps: 2 }),
        ];
        assert_eq!(block_count(&program), 4);
    }

    #[test]
    fn block_count_of_empty_program_is_zero() {
        assert_eq!(block_count(&[]), 0);
    }

    #[test]
    fn compare_op_covers_all_orderings() {
        assert!(CompareOp::Eq.apply(2.0, 2.0));
        assert!(CompareOp::NotEq.apply(2.0, 3.0));
        assert!(CompareOp::Less.apply(1.0, 2.0));
        assert!(CompareOp::LessEq.apply(2.0, 2.0));
        assert!(CompareOp::Greater.apply(3.0, 2.0));
        assert!(CompareOp::GreaterEq.apply(2.0, 2.0));
        assert!(!CompareOp::Less.apply(2.0, 2.0));
    }

    #[test]
    fn block_documents_use_stable_wire_names() {
        let block = BlockInstance::with_children(
            "b1",
            BlockKind::Repeat { times: 2 },
            vec![BlockInstance::new(
                "b2",
                BlockKind::MoveForward { steps: 3 },
            )],
        );
        let doc = serde_json::to_string(&block).unwrap();
        assert!(doc.contains(r#""type":"repeat""#));
        assert!(doc.contains(r#""type":"move_forward""#));
        assert!(doc.contains(r#""steps":3"#));
        let decoded: BlockInstance = serde_json::from_str(&doc).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn leaf_blocks_omit_the_children_field() {
        let block = BlockInstance::new("b1", BlockKind::TurnLeft);
        let doc = serde_json::to_string(&block).unwrap();
        assert!(!doc.contains("children"));
        let decoded: BlockInstance = serde_json::from_str(&doc).unwrap();
        assert!(decoded.children.is_empty());
    }

    #[test]
    fn condition_documents_round_trip() {
        let kind = BlockKind::RepeatUntil {
            condition: Condition::Variable {
                name: "count".into(),
                op: CompareOp::GreaterEq,
                value: 3.0,
            },
        };
        let block = BlockInstance::new("b1", kind);
        let doc = serde_json::to_string(&block).unwrap();
        let decoded: BlockInstance = serde_json::from_str(&doc).unwrap();
        assert_eq!(decoded, block);
    }
}
