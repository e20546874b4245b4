//! Runtime error taxonomy for the execution engine.
//!
//! Every kind maps to a distinct, stable token so the presentation layer can
//! localize and contextualize failures without parsing message text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a fatal runtime failure. Any of these ends the run — no
/// retry, no partial continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunErrorKind {
    /// Movement would leave the grid.
    OutOfBounds,
    /// Movement target is blocked by an obstacle.
    Collision,
    /// An action block's precondition is unmet.
    InvalidAction,
    /// The global step ceiling was exceeded.
    InfiniteLoop,
    /// Reference to an undefined procedure.
    SyntaxError,
}

impl fmt::Display for RunErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Must match the serialized token — hosts dispatch on either.
        let token = match self {
            Self::OutOfBounds => "out_of_bounds",
            Self::Collision => "collision",
            Self::InvalidAction => "invalid_action",
            Self::InfiniteLoop => "infinite_loop",
            Self::SyntaxError => "syntax_error",
        };
        f.write_str(token)
    }
}

/// A fatal runtime error. Carries the index of the offending top-level block
/// so the editor can highlight it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} at block {block_index}: {detail}")]
pub struct RunError {
    pub kind: RunErrorKind,
    /// Index of the top-level block that was executing when the run failed.
    pub block_index: usize,
    /// Human-readable diagnostic. Never required for dispatch.
    pub detail: String,
}

impl RunError {
    pub fn new(kind: RunErrorKind, block_index: usize, detail: impl Into<String>) -> Self {
        Self {
            kind,
            block_index,
            detail: detail.into(),
        }
    }
}

/// Controller-level rejection: the run never started, so there is no
/// offending block and no [`RunError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot run an empty program")]
    EmptyProgram,
}
