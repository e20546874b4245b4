//! Engine controller: lifecycle state machine over the interpreter.
//!
//! Owns start/stop/reset, exposes observable state for the UI, and turns a
//! finished interpretation into an [`ExecutionResult`] via the objective
//! validator and outcome scorer.

use crate::interpreter::{Interpreter, Unwind};
use crate::objectives;
use crate::pacing::{Pacing, StepObserver};
use crate::scoring;
use crate::world::WorldState;
use gridbot_types::{
    block_count, BlockInstance, EngineError, ExecutionResult, LevelDefinition, RunError,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle states of the engine.
///
/// `Aborted` is transient: a cancelled run passes through it and settles in
/// `Idle` before [`Engine::run`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Running,
    Succeeded,
    Failed,
    Aborted,
}

/// How a non-rejected run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunVerdict {
    /// The program ran to completion. `success` inside tells whether the
    /// objectives were met — a clean run with unmet objectives lands here,
    /// not in [`RunVerdict::Trapped`].
    Completed(ExecutionResult),
    /// A runtime fault stopped the run.
    Trapped(RunError),
    /// `stop()` was observed; no result was produced.
    Cancelled,
}

/// Cloneable handle that cancels the in-flight run from a step observer or
/// another thread.
#[derive(Debug, Clone)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    /// Request cancellation. Observed at the next suspension point or loop
    /// iteration.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

enum RunStop {
    Trapped(RunError),
    Cancelled,
}

/// Owns the engine lifecycle for one level.
///
/// At most one run is in flight per instance; preventing overlapping `run`
/// calls is the caller's responsibility — the controller neither queues nor
/// rejects them beyond the cancellation flag.
pub struct Engine {
    level: LevelDefinition,
    state: EngineState,
    world: WorldState,
    pacing: Pacing,
    abort: Arc<AtomicBool>,
    last_error: Option<RunError>,
    last_result: Option<ExecutionResult>,
}

impl Engine {
    pub fn new(level: LevelDefinition) -> Self {
        let world = WorldState::new(&level);
        Self {
            level,
            state: EngineState::Idle,
            world,
            pacing: Pacing::default(),
            abort: Arc::new(AtomicBool::new(false)),
            last_error: None,
            last_result: None,
        }
    }

    // ── Observable state ─────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    /// The typed error recorded by the most recent trapped run.
    pub fn last_error(&self) -> Option<&RunError> {
        self.last_error.as_ref()
    }

    /// The result recorded by the most recent completed run.
    pub fn last_result(&self) -> Option<&ExecutionResult> {
        self.last_result.as_ref()
    }

    pub fn set_pacing(&mut self, pacing: Pacing) {
        self.pacing = pacing;
    }

    /// A handle for cancelling from a step observer or another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(self.abort.clone())
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Request cancellation of the in-flight run. Not an error: the run
    /// discards its work and no result is produced.
    pub fn stop(&self) {
        self.abort.store(true, Ordering::Relaxed);
        debug!("stop requested");
    }

    /// Force `Idle` and restore the world to the level's start pose.
    /// Implicitly cancels a run the host drives elsewhere.
    pub fn reset(&mut self) {
        self.abort.store(true, Ordering::Relaxed);
        self.state = EngineState::Idle;
        self.world = WorldState::new(&self.level);
        self.last_error = None;
        self.last_result = None;
        debug!("engine reset");
    }

    /// Execute a program against a fresh world.
    ///
    /// Rejects empty programs outright. Otherwise drives the interpreter
    /// over the top-level blocks in order, then validates objectives and
    /// scores the outcome. See [`RunVerdict`] for the three ways a run
    /// ends.
    pub fn run(
        &mut self,
        program: &[BlockInstance],
        hints_used: u32,
        observer: &mut dyn StepObserver,
    ) -> Result<RunVerdict, EngineError> {
        if program.is_empty() {
            return Err(EngineError::EmptyProgram);
        }

        self.abort.store(false, Ordering::Relaxed);
        self.state = EngineState::Running;
        self.last_error = None;
        self.last_result = None;
        let mut world = WorldState::new(&self.level);
        info!(blocks = program.len(), "run started");

        match self.drive(program, &mut world, observer) {
            Ok(()) => {
                self.world = world;
                let report = objectives::validate(&self.world, &self.level);
                let score = scoring::score(
                    block_count(program),
                    self.level.optimal_blocks,
                    hints_used,
                );
                let success = report.all_satisfied();
                let result = ExecutionResult {
                    success,
                    stars: score.stars,
                    reward: self.level.base_reward * u32::from(score.stars),
                    satisfied: report.satisfied,
                    failed: report.failed,
                    is_optimal: score.is_optimal,
                };
                self.state = if success {
                    EngineState::Succeeded
                } else {
                    EngineState::Failed
                };
                info!(
                    success,
                    stars = result.stars,
                    steps = self.world.steps,
                    "run completed"
                );
                self.last_result = Some(result.clone());
                Ok(RunVerdict::Completed(result))
            }
            Err(RunStop::Trapped(error)) => {
                self.world = world;
                warn!(kind = %error.kind, block = error.block_index, "run trapped");
                self.state = EngineState::Failed;
                self.last_error = Some(error.clone());
                Ok(RunVerdict::Trapped(error))
            }
            Err(RunStop::Cancelled) => {
                // Pass through the transient aborted state, discard the
                // run's world, and settle in idle with nothing recorded.
                self.state = EngineState::Aborted;
                info!("run cancelled");
                self.world = WorldState::new(&self.level);
                self.state = EngineState::Idle;
                Ok(RunVerdict::Cancelled)
            }
        }
    }

    fn drive(
        &self,
        program: &[BlockInstance],
        world: &mut WorldState,
        observer: &mut dyn StepObserver,
    ) -> Result<(), RunStop> {
        let mut interpreter =
            Interpreter::new(&self.level, world, observer, self.pacing, &self.abort);
        for (index, block) in program.iter().enumerate() {
            if self.abort.load(Ordering::Relaxed) {
                return Err(RunStop::Cancelled);
            }
            debug!(index, block = %block.id, "executing top-level block");
            match interpreter.run_block(block) {
                Ok(()) => {}
                Err(Unwind::Fault(kind, detail)) => {
                    return Err(RunStop::Trapped(RunError::new(kind, index, detail)));
                }
                Err(Unwind::Cancelled) => return Err(RunStop::Cancelled),
            }
        }
        Ok(())
    }
}
