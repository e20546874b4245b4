//! Recursive block interpreter.
//!
//! Walks a block tree against a [`WorldState`], charging the step meter and
//! suspending to the host after every visible effect. Runtime faults and
//! observed cancellation both unwind through [`Unwind`]; the controller
//! turns faults into [`RunError`](gridbot_types::RunError)s and cancellation
//! into an aborted run.

use crate::pacing::{Pacing, StepObserver};
use crate::world::WorldState;
use gridbot_types::{
    BlockInstance, BlockKind, CollectibleKind, Condition, LevelDefinition, RunErrorKind,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// Upper bound on metered steps for an entire run, nested repeats and
/// procedure calls included. Learner-supplied repeat counts and recursion
/// are unbounded in principle; this counter is the only guard.
pub const STEP_CEILING: u64 = 1000;

/// Why execution stopped early.
#[derive(Debug)]
pub(crate) enum Unwind {
    /// Runtime fault: the kind plus a human-readable diagnostic.
    Fault(RunErrorKind, String),
    /// The abort flag was observed at a poll point.
    Cancelled,
}

impl Unwind {
    fn fault(kind: RunErrorKind, detail: impl Into<String>) -> Self {
        Self::Fault(kind, detail.into())
    }
}

pub(crate) type Flow = Result<(), Unwind>;

/// One run's interpreter. Borrows the world for the duration of the run;
/// there is no parallel execution of blocks.
pub(crate) struct Interpreter<'a> {
    level: &'a LevelDefinition,
    world: &'a mut WorldState,
    observer: &'a mut dyn StepObserver,
    pacing: Pacing,
    abort: &'a AtomicBool,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(
        level: &'a LevelDefinition,
        world: &'a mut WorldState,
        observer: &'a mut dyn StepObserver,
        pacing: Pacing,
        abort: &'a AtomicBool,
    ) -> Self {
        Self {
            level,
            world,
            observer,
            pacing,
            abort,
        }
    }

    /// Execute one top-level block and everything nested under it.
    pub(crate) fn run_block(&mut self, block: &BlockInstance) -> Flow {
        self.exec(block)
    }

    fn run_sequence(&mut self, blocks: &[BlockInstance]) -> Flow {
        for block in blocks {
            self.exec(block)?;
        }
        Ok(())
    }

    fn exec(&mut self, block: &BlockInstance) -> Flow {
        match &block.kind {
            BlockKind::MoveForward { steps } => self.exec_move(*steps, false),
            BlockKind::MoveBackward { steps } => self.exec_move(*steps, true),
            BlockKind::TurnRight => self.exec_turn(true),
            BlockKind::TurnLeft => self.exec_turn(false),
            BlockKind::CollectItem { kind } => self.exec_collect(*kind),
            BlockKind::OpenContainer => self.exec_collect(CollectibleKind::Chest),
            BlockKind::PushObstacle => self.exec_push(),
            BlockKind::ToggleLever => self.exec_toggle(),
            BlockKind::Repeat { times } => self.exec_repeat(*times, &block.children),
            BlockKind::RepeatUntil { condition } => {
                self.exec_repeat_until(condition, &block.children)
            }
            BlockKind::If { condition } => {
                if self.eval_condition(condition) {
                    self.run_sequence(&block.children)
                } else {
                    Ok(())
                }
            }
            BlockKind::DefineProcedure { name } => {
                // Captured at definition time; charges nothing and does not
                // execute the body.
                self.world
                    .procedures
                    .insert(name.clone(), block.children.clone());
                Ok(())
            }
            BlockKind::CallProcedure { name } => self.exec_call(name),
            BlockKind::CreateVariable { name } => {
                self.tick()?;
                self.world.variables.insert(name.clone(), 0.0);
                Ok(())
            }
            BlockKind::SetVariable { name, value } => {
                self.tick()?;
                self.world.variables.insert(name.clone(), *value);
                Ok(())
            }
            BlockKind::ChangeVariable { name, delta } => {
                self.tick()?;
                let slot = self.world.variables.entry(name.clone()).or_insert(0.0);
                *slot += *delta;
                Ok(())
            }
        }
    }

    // ── Metering & suspension ────────────────────────────────────────────

    /// Charge one metered step; traps the moment the ceiling is exceeded.
    fn tick(&mut self) -> Flow {
        self.world.steps += 1;
        if self.world.steps > STEP_CEILING {
            return Err(Unwind::fault(
                RunErrorKind::InfiniteLoop,
                format!("step ceiling of {STEP_CEILING} exceeded"),
            ));
        }
        Ok(())
    }

    /// Poll the abort flag without emitting anything.
    fn check_abort(&self) -> Flow {
        if self.abort.load(Ordering::Relaxed) {
            Err(Unwind::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Suspension point, reached after every visible effect: poll the abort
    /// flag first, then hand the host a snapshot plus the pacing delay.
    /// Once cancellation is observed no further snapshots are emitted.
    fn suspend(&mut self) -> Flow {
        self.check_abort()?;
        let pause = self.pacing.step_delay();
        self.observer.on_step(self.world, pause);
        Ok(())
    }

    // ── Primitive actions ────────────────────────────────────────────────

    fn exec_move(&mut self, steps: u32, backward: bool) -> Flow {
        for _ in 0..steps {
            let dir = if backward {
                self.world.pose.facing.opposite()
            } else {
                self.world.pose.facing
            };
            let target = self.world.pose.pos.offset(dir.delta());
            if !self.world.in_bounds(target) {
                return Err(Unwind::fault(
                    RunErrorKind::OutOfBounds,
                    format!(
                        "move to {target} leaves the {}x{} grid",
                        self.level.cols, self.level.rows
                    ),
                ));
            }
            if self.world.is_blocked(target) {
                return Err(Unwind::fault(
                    RunErrorKind::Collision,
                    format!("cell {target} is blocked"),
                ));
            }
            self.world.pose.pos = target;
            self.world.path.push(self.world.pose);
            self.tick()?;
            self.suspend()?;
        }
        Ok(())
    }

    fn exec_turn(&mut self, clockwise: bool) -> Flow {
        let facing = self.world.pose.facing;
        self.world.pose.facing = if clockwise {
            facing.turned_right()
        } else {
            facing.turned_left()
        };
        self.tick()?;
        self.suspend()
    }

    fn exec_collect(&mut self, kind: CollectibleKind) -> Flow {
        let pos = self.world.pose.pos;
        let Some(collectible) = self.world.collectible_at(self.level, pos) else {
            return Err(Unwind::fault(
                RunErrorKind::InvalidAction,
                format!("nothing to pick up at {pos}"),
            ));
        };
        if collectible.kind != kind {
            return Err(Unwind::fault(
                RunErrorKind::InvalidAction,
                format!("expected a {kind} at {pos}, found a {}", collectible.kind),
            ));
        }
        let id = collectible.id.clone();
        self.world.inventory.push(kind);
        self.world.collected.insert(id);
        self.tick()?;
        self.suspend()
    }

    fn exec_push(&mut self) -> Flow {
        let ahead = self.world.cell_ahead();
        let beyond = ahead.offset(self.world.pose.facing.delta());
        match self.world.obstacle_at(ahead) {
            Some(obstacle) if obstacle.kind.is_pushable() => {}
            Some(obstacle) => {
                return Err(Unwind::fault(
                    RunErrorKind::InvalidAction,
                    format!("the {} at {ahead} cannot be pushed", obstacle.kind),
                ));
            }
            None => {
                return Err(Unwind::fault(
                    RunErrorKind::InvalidAction,
                    format!("nothing to push at {ahead}"),
                ));
            }
        }
        if !self.world.in_bounds(beyond) || self.world.is_blocked(beyond) {
            return Err(Unwind::fault(
                RunErrorKind::InvalidAction,
                format!("no free cell behind the obstacle at {ahead}"),
            ));
        }
        if let Some(obstacle) = self.world.obstacle_at_mut(ahead) {
            obstacle.pos = beyond;
        }
        self.tick()?;
        self.suspend()
    }

    fn exec_toggle(&mut self) -> Flow {
        let pos = self.world.pose.pos;
        let Some(lever) = self.world.lever_at(self.level, pos) else {
            return Err(Unwind::fault(
                RunErrorKind::InvalidAction,
                format!("no lever at {pos}"),
            ));
        };
        let id = lever.id.clone();
        // Toggle semantics: flipping twice reverts to off.
        if !self.world.active_levers.remove(&id) {
            self.world.active_levers.insert(id);
        }
        self.tick()?;
        self.suspend()
    }

    // ── Control flow ─────────────────────────────────────────────────────

    fn exec_repeat(&mut self, times: u32, children: &[BlockInstance]) -> Flow {
        for _ in 0..times {
            self.check_abort()?;
            // Each iteration is metered so an empty body cannot spin past
            // the ceiling unchecked.
            self.tick()?;
            self.run_sequence(children)?;
        }
        Ok(())
    }

    fn exec_repeat_until(&mut self, condition: &Condition, children: &[BlockInstance]) -> Flow {
        loop {
            self.check_abort()?;
            if self.eval_condition(condition) {
                return Ok(());
            }
            self.tick()?;
            self.run_sequence(children)?;
        }
    }

    fn exec_call(&mut self, name: &str) -> Flow {
        // Dynamic scoping: the captured body runs against the caller's
        // world, variables included. Recursion is legal; each call is
        // metered so bare self-recursion hits the ceiling instead of the
        // stack.
        let Some(body) = self.world.procedures.get(name).cloned() else {
            return Err(Unwind::fault(
                RunErrorKind::SyntaxError,
                format!("procedure '{name}' is not defined"),
            ));
        };
        self.tick()?;
        self.run_sequence(&body)
    }

    // ── Conditions ───────────────────────────────────────────────────────

    /// Side-effect free; charges no step.
    fn eval_condition(&self, condition: &Condition) -> bool {
        match condition {
            Condition::ObstacleAhead => {
                let ahead = self.world.cell_ahead();
                self.world.in_bounds(ahead) && self.world.is_blocked(ahead)
            }
            Condition::CollectibleAhead => {
                let ahead = self.world.cell_ahead();
                self.world.in_bounds(ahead)
                    && self.world.collectible_at(self.level, ahead).is_some()
            }
            Condition::Variable { name, op, value } => {
                let current = self.world.variables.get(name).copied().unwrap_or(0.0);
                op.apply(current, *value)
            }
        }
    }
}
