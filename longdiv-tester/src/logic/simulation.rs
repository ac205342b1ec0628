use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use longdiv_game::{
    DifficultyTable, DivisionProblem, DivisionSolution, FixedClock, PlayerProgress,
    PracticeConfig, PracticeSession, RemainderMode, RewardConfig, UnlockedReward,
    numbers::u64_to_f64,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::learner::LearnerStrategy;

/// Problems per run when neither the plan nor the CLI says otherwise.
pub const DEFAULT_PROBLEMS_PER_RUN: u32 = 12;

/// Timestamp every simulated reward is earned at, so reports are reproducible.
const SIMULATION_EPOCH_SECS: i64 = 1_704_067_200;

/// Plan describing how a simulated learner session should run.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: LearnerStrategy,
    pub problems: u32,
    pub remainder_mode: RemainderMode,
    pub table: Option<DifficultyTable>,
    pub pinned_level: Option<u8>,
    pub saved_progress: Option<fn() -> Value>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: LearnerStrategy) -> Self {
        Self {
            strategy,
            problems: DEFAULT_PROBLEMS_PER_RUN,
            remainder_mode: RemainderMode::Forbid,
            table: None,
            pinned_level: None,
            saved_progress: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_problems(mut self, problems: u32) -> Self {
        self.problems = problems;
        self
    }

    #[must_use]
    pub const fn with_remainder_mode(mut self, mode: RemainderMode) -> Self {
        self.remainder_mode = mode;
        self
    }

    /// Start from a raw save file instead of fresh progress.
    #[must_use]
    pub fn with_saved_progress(mut self, saved: fn() -> Value) -> Self {
        self.saved_progress = Some(saved);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    /// Apply command-line overrides on top of the scenario's own settings.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &SimulationOverrides) -> Self {
        if let Some(problems) = overrides.problems {
            self.problems = problems;
        }
        if let Some(mode) = overrides.remainder_mode {
            self.remainder_mode = mode;
        }
        if let Some(table) = &overrides.table {
            self.table = Some(table.clone());
        }
        self
    }
}

/// Settings the CLI can force onto every scenario.
#[derive(Debug, Clone, Default)]
pub struct SimulationOverrides {
    pub problems: Option<u32>,
    pub remainder_mode: Option<RemainderMode>,
    pub table: Option<DifficultyTable>,
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// One problem as the simulated learner worked it.
#[derive(Debug, Clone)]
pub struct ProblemRecord {
    pub problem: DivisionProblem,
    pub solution: DivisionSolution,
    pub submissions: u32,
    pub incorrect_attempts: u32,
    pub hints_seen: u32,
    pub total_solved_after: u32,
    pub level_after: u8,
    pub leveled_up: bool,
    pub newly_unlocked: Vec<UnlockedReward>,
}

/// Aggregate numbers for one run, as written to reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunMetrics {
    pub problems_solved: u32,
    pub total_steps: u64,
    pub total_submissions: u64,
    pub incorrect_attempts: u64,
    pub hints_seen: u64,
    pub accuracy: f64,
    pub level_ups: u32,
    pub final_level: u8,
    pub rewards_unlocked: usize,
    pub draws: u64,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: LearnerStrategy,
    pub pinned_level: Option<u8>,
    pub config: PracticeConfig,
    pub clock: FixedClock,
    pub starting_progress: PlayerProgress,
    pub discarded_on_load: usize,
    pub problems: Vec<ProblemRecord>,
    pub final_progress: PlayerProgress,
    pub metrics: RunMetrics,
}

/// Headless deterministic runner for practice sessions.
#[derive(Debug, Clone, Copy)]
pub struct LearnerSimulator {
    verbose: bool,
}

impl LearnerSimulator {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run `plan` with `seed`, driving one session answer by answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved progress is unusable or the engine
    /// rejects a configuration or submission.
    pub fn run_plan(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        code_level: Option<u8>,
    ) -> Result<SimulationSummary> {
        let config = PracticeConfig {
            remainder_mode: plan.remainder_mode,
            table: plan.table.clone().unwrap_or_default(),
            rewards: RewardConfig::default_config(),
        };
        let clock = FixedClock(simulation_epoch());

        let (starting_progress, discarded_on_load) = match plan.saved_progress {
            Some(saved) => {
                let update = PlayerProgress::from_json_lenient(
                    &saved(),
                    &config.table,
                    &config.rewards,
                    &clock,
                )
                .context("saved progress rejected")?;
                (update.progress, update.discarded_rewards)
            }
            None => (PlayerProgress::default(), 0),
        };

        let pinned_level = plan.pinned_level.or(code_level);
        let mut session = match pinned_level {
            Some(level) => PracticeSession::with_pinned_level(
                config.clone(),
                starting_progress.clone(),
                seed,
                level,
            )?,
            None => PracticeSession::new(config.clone(), starting_progress.clone(), seed)?,
        };
        let mut policy = plan.strategy.create_policy(seed);

        let mut problems = Vec::new();
        for _ in 0..plan.problems {
            let solution = session.engine().solution.clone();
            let divisor = solution.problem.divisor;
            let mut submissions = 0_u32;
            let mut hints_seen = 0_u32;
            let solved = loop {
                let step = session
                    .engine()
                    .current_step()
                    .cloned()
                    .context("engine has no pending step")?;
                let answer = policy.answer(&step, divisor, session.engine().current_attempts);
                let turn = session.submit(&answer, &clock)?;
                submissions += 1;
                if turn.outcome.hint.is_some() {
                    hints_seen += 1;
                }
                if let Some(solved) = turn.solved {
                    break solved;
                }
            };

            if self.verbose {
                log::debug!(
                    "{} solved {} with {} mistake(s) (level {})",
                    policy.name(),
                    solved.problem.label(),
                    solved.incorrect_attempts,
                    solved.level
                );
            }
            problems.push(ProblemRecord {
                problem: solved.problem,
                solution,
                submissions,
                incorrect_attempts: solved.incorrect_attempts,
                hints_seen,
                total_solved_after: solved.total_solved,
                level_after: solved.level,
                leveled_up: solved.leveled_up,
                newly_unlocked: solved.newly_unlocked,
            });
        }

        let draws = session.draws();
        let final_level = session.level();
        let final_progress = session.into_progress();
        let metrics = compute_metrics(&problems, &final_progress, final_level, draws);
        Ok(SimulationSummary {
            seed,
            strategy: plan.strategy,
            pinned_level,
            config,
            clock,
            starting_progress,
            discarded_on_load,
            problems,
            final_progress,
            metrics,
        })
    }
}

fn simulation_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(SIMULATION_EPOCH_SECS, 0).unwrap_or_default()
}

fn compute_metrics(
    problems: &[ProblemRecord],
    progress: &PlayerProgress,
    final_level: u8,
    draws: u64,
) -> RunMetrics {
    let mut metrics = RunMetrics {
        final_level,
        rewards_unlocked: progress.unlocked_rewards.len(),
        draws,
        ..RunMetrics::default()
    };
    for record in problems {
        metrics.problems_solved += 1;
        metrics.total_steps += u64::try_from(record.solution.steps.len()).unwrap_or(u64::MAX);
        metrics.total_submissions += u64::from(record.submissions);
        metrics.incorrect_attempts += u64::from(record.incorrect_attempts);
        metrics.hints_seen += u64::from(record.hints_seen);
        metrics.level_ups += u32::from(record.leveled_up);
    }
    if metrics.total_submissions > 0 {
        metrics.accuracy = ratio(metrics.total_steps, metrics.total_submissions);
    }
    metrics
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    u64_to_f64(numerator) / u64_to_f64(denominator)
}
