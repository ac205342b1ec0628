//! Step engine: a small state machine over a solution.
//!
//! `submit` is a pure transition. It reads the current state and returns a
//! new one alongside the validation outcome; the receiver is never touched,
//! so retried or duplicated calls cannot corrupt a shared instance.
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::solver::DivisionSolution;
use crate::step::Step;
use crate::validator::{ValidationOutcome, validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnginePhase {
    Pending,
    Complete,
}

/// Snapshot of a learner working through one solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEngineState {
    pub solution: DivisionSolution,
    pub current_step_index: usize,
    /// Wrong submissions on the current step.
    pub current_attempts: u32,
    /// Wrong submissions across the whole problem.
    pub total_incorrect_attempts: u32,
    pub completed: bool,
}

/// A transition result: the successor state and what was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub state: StepEngineState,
    pub outcome: ValidationOutcome,
}

impl StepEngineState {
    /// Initial pending state at step zero.
    #[must_use]
    pub fn new(solution: DivisionSolution) -> Self {
        let completed = solution.steps.is_empty();
        Self {
            solution,
            current_step_index: 0,
            current_attempts: 0,
            total_incorrect_attempts: 0,
            completed,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> EnginePhase {
        if self.completed {
            EnginePhase::Complete
        } else {
            EnginePhase::Pending
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.solution.steps
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        if self.completed {
            return None;
        }
        self.solution.steps.get(self.current_step_index)
    }

    #[must_use]
    pub fn remaining_steps(&self) -> usize {
        self.solution
            .steps
            .len()
            .saturating_sub(self.current_step_index)
    }

    /// Fraction of steps answered correctly, in `[0, 1]`.
    #[must_use]
    pub fn progress_fraction(&self) -> f32 {
        let total = self.solution.steps.len();
        if total == 0 {
            return 1.0;
        }
        let done = u16::try_from(self.current_step_index.min(total)).unwrap_or(u16::MAX);
        let total = u16::try_from(total).unwrap_or(u16::MAX);
        f32::from(done) / f32::from(total)
    }

    /// Check `value` against the current step and return the next state.
    ///
    /// A correct answer resets the per-step attempt count and advances; the
    /// last correct answer completes the problem. A wrong answer stays put
    /// and bumps both attempt counters.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyComplete`] once the problem is finished.
    pub fn submit(&self, value: &str) -> Result<Submission, EngineError> {
        if self.completed {
            return Err(EngineError::AlreadyComplete);
        }
        let outcome = validate(
            &self.solution,
            self.current_step_index,
            value,
            self.current_attempts,
        )?;

        let mut next = self.clone();
        if outcome.correct {
            next.current_attempts = 0;
            next.current_step_index += 1;
            next.completed = outcome.is_complete;
        } else {
            next.current_attempts = next.current_attempts.saturating_add(1);
            next.total_incorrect_attempts = next.total_incorrect_attempts.saturating_add(1);
        }
        Ok(Submission {
            state: next,
            outcome,
        })
    }

    /// Fresh pending state over the same solution.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self::new(self.solution.clone())
    }
}
