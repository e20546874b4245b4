//! The immutable result of a run that executed to completion.

use crate::level::Objective;
use serde::{Deserialize, Serialize};

/// Outcome of a completed run, produced once by the engine controller after
/// validation and scoring. The progression layer persists it and grants
/// experience/currency externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True iff every declared objective was satisfied.
    pub success: bool,
    /// Star rating, always 1–3.
    pub stars: u8,
    /// `base_reward * stars`.
    pub reward: u32,
    pub satisfied: Vec<Objective>,
    pub failed: Vec<Objective>,
    /// Whether the program used at most the level's optimal block count.
    pub is_optimal: bool,
}
