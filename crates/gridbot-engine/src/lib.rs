//! Gridbot execution engine.
//!
//! Takes a learner's block program and a [`LevelDefinition`], interprets the
//! program against a simulated grid world, suspends to the host after every
//! visible step for animation pacing, and produces a deterministic
//! [`ExecutionResult`].
//!
//! The engine is a single logical thread of control: the interpreter is a
//! synchronous tree-walk that cooperatively yields a [`WorldState`] snapshot
//! at each suspension point. Cancellation is polled, never preemptive.
//!
//! [`LevelDefinition`]: gridbot_types::LevelDefinition
//! [`ExecutionResult`]: gridbot_types::ExecutionResult

mod controller;
mod interpreter;
mod objectives;
mod pacing;
mod scoring;
mod world;

pub use controller::{AbortHandle, Engine, EngineState, RunVerdict};
pub use interpreter::STEP_CEILING;
pub use objectives::{validate, ObjectiveReport};
pub use pacing::{NullObserver, Pacing, StepObserver, BASE_STEP_DELAY, REDUCED_MOTION_DELAY};
pub use scoring::{score, Score};
pub use world::WorldState;
