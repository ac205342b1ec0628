//! A practice session: one learner working through a stream of problems.
//!
//! The session owns the whole loop. Progression picks the tier, the generator
//! samples a problem, the solver expands it, and the step engine takes answers
//! one at a time. When the last step is answered the solve is recorded,
//! rewards are resolved, and the next problem is generated.
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::constants::LOG_PROBLEM_SOLVED;
use crate::engine::StepEngineState;
use crate::error::{ConfigError, EngineError};
use crate::generator::{Difficulty, ProblemGenerator, RemainderMode};
use crate::problem::DivisionProblem;
use crate::progress::PlayerProgress;
use crate::random::SeededRandom;
use crate::rewards::{RewardConfig, UnlockedReward};
use crate::solver::solve;
use crate::tiers::DifficultyTable;
use crate::validator::ValidationOutcome;

/// Everything that shapes a session besides the learner's own progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeConfig {
    #[serde(default)]
    pub remainder_mode: RemainderMode,
    #[serde(default)]
    pub table: DifficultyTable,
    #[serde(default)]
    pub rewards: RewardConfig,
}

impl PracticeConfig {
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate()?;
        self.rewards.validate()
    }

    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any section is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// What happened when a problem was finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedProblem {
    pub problem: DivisionProblem,
    pub incorrect_attempts: u32,
    pub total_solved: u32,
    pub level: u8,
    pub leveled_up: bool,
    pub newly_unlocked: Vec<UnlockedReward>,
    pub next_problem: DivisionProblem,
}

/// Result of one answer submitted to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTurn {
    pub outcome: ValidationOutcome,
    /// Present only when this answer finished the problem.
    pub solved: Option<SolvedProblem>,
}

#[derive(Debug, Clone)]
pub struct PracticeSession {
    config: PracticeConfig,
    progress: PlayerProgress,
    random: SeededRandom,
    pinned_level: Option<u8>,
    engine: StepEngineState,
    solved_this_session: u32,
}

impl PracticeSession {
    /// Start a session whose difficulty follows the learner's solved count.
    ///
    /// # Errors
    ///
    /// Returns an error if the first problem cannot be generated.
    pub fn new(
        config: PracticeConfig,
        progress: PlayerProgress,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::build(config, progress, seed, None)
    }

    /// Start a session that stays on `level` regardless of progress.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownLevel`] if the table has no such level.
    pub fn with_pinned_level(
        config: PracticeConfig,
        progress: PlayerProgress,
        seed: u64,
        level: u8,
    ) -> Result<Self, EngineError> {
        config.table.tier(level)?;
        Self::build(config, progress, seed, Some(level))
    }

    fn build(
        config: PracticeConfig,
        progress: PlayerProgress,
        seed: u64,
        pinned_level: Option<u8>,
    ) -> Result<Self, EngineError> {
        let mut random = SeededRandom::from_user_seed(seed);
        let difficulty = Self::difficulty_for(pinned_level, &progress);
        let problem = ProblemGenerator::new(&config.table).generate(
            difficulty,
            config.remainder_mode,
            &mut random,
        )?;
        let engine = StepEngineState::new(solve(&problem)?);
        Ok(Self {
            config,
            progress,
            random,
            pinned_level,
            engine,
            solved_this_session: 0,
        })
    }

    fn difficulty_for(pinned_level: Option<u8>, progress: &PlayerProgress) -> Difficulty {
        pinned_level.map_or(Difficulty::SolvedCount(progress.total_solved), Difficulty::Level)
    }

    /// Answer the current step.
    ///
    /// # Errors
    ///
    /// Fails only if the next problem cannot be generated after a solve. The
    /// session is then left exactly as it was before the call, with the final
    /// step still pending, so the same answer can be submitted again.
    pub fn submit<C>(&mut self, value: &str, clock: &C) -> Result<SessionTurn, EngineError>
    where
        C: Clock + ?Sized,
    {
        let submission = self.engine.submit(value)?;
        let outcome = submission.outcome;
        if !outcome.is_complete {
            self.engine = submission.state;
            return Ok(SessionTurn {
                outcome,
                solved: None,
            });
        }

        let problem = submission.state.solution.problem.clone();
        let incorrect_attempts = submission.state.total_incorrect_attempts;
        let update = self.progress.record_solve(
            incorrect_attempts,
            &self.config.table,
            &self.config.rewards,
            clock,
        );

        let mut random = self.random.clone();
        let next_problem = self.generate_next(&update.progress, &mut random)?;
        let next_engine = StepEngineState::new(solve(&next_problem)?);

        self.random = random;
        self.engine = next_engine;
        self.progress = update.progress;
        self.solved_this_session = self.solved_this_session.saturating_add(1);
        log::debug!(
            "{LOG_PROBLEM_SOLVED}: {} solved with {incorrect_attempts} mistake(s), total {}",
            problem.id,
            self.progress.total_solved
        );
        Ok(SessionTurn {
            outcome,
            solved: Some(SolvedProblem {
                problem,
                incorrect_attempts,
                total_solved: self.progress.total_solved,
                level: update.level,
                leveled_up: update.leveled_up,
                newly_unlocked: update.newly_unlocked,
                next_problem,
            }),
        })
    }

    fn generate_next(
        &self,
        progress: &PlayerProgress,
        random: &mut SeededRandom,
    ) -> Result<DivisionProblem, EngineError> {
        let difficulty = Self::difficulty_for(self.pinned_level, progress);
        ProblemGenerator::new(&self.config.table).generate(
            difficulty,
            self.config.remainder_mode,
            random,
        )
    }

    /// Start the current problem over from its first step.
    pub fn retry_problem(&mut self) {
        self.engine = self.engine.reset();
    }

    #[must_use]
    pub const fn config(&self) -> &PracticeConfig {
        &self.config
    }

    #[must_use]
    pub const fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    #[must_use]
    pub const fn engine(&self) -> &StepEngineState {
        &self.engine
    }

    #[must_use]
    pub const fn current_problem(&self) -> &DivisionProblem {
        &self.engine.solution.problem
    }

    /// Level of the problem currently on the board.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.engine.solution.problem.difficulty_level
    }

    #[must_use]
    pub const fn pinned_level(&self) -> Option<u8> {
        self.pinned_level
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.random.seed()
    }

    /// Random draws consumed so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.random.draws()
    }

    #[must_use]
    pub const fn solved_this_session(&self) -> u32 {
        self.solved_this_session
    }

    /// Consume the session, returning the learner's progress.
    #[must_use]
    pub fn into_progress(self) -> PlayerProgress {
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::engine::EnginePhase;
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 2, 29, 16, 30, 0).unwrap())
    }

    fn solve_current(session: &mut PracticeSession) -> SolvedProblem {
        loop {
            let answer = session
                .engine()
                .current_step()
                .map(|step| step.answer().to_string())
                .unwrap();
            let turn = session.submit(&answer, &clock()).unwrap();
            if let Some(solved) = turn.solved {
                return solved;
            }
        }
    }

    #[test]
    fn same_seed_same_problems() {
        let a = PracticeSession::new(PracticeConfig::default(), PlayerProgress::default(), 99).unwrap();
        let b = PracticeSession::new(PracticeConfig::default(), PlayerProgress::default(), 99).unwrap();
        assert_eq!(a.current_problem(), b.current_problem());
        assert_eq!(a.level(), 1);
    }

    #[test]
    fn solving_advances_progress_and_deals_next_problem() {
        let mut session =
            PracticeSession::new(PracticeConfig::default(), PlayerProgress::default(), 3).unwrap();
        let first = session.current_problem().clone();
        let solved = solve_current(&mut session);
        assert_eq!(solved.problem, first);
        assert_eq!(solved.total_solved, 1);
        assert_eq!(solved.incorrect_attempts, 0);
        assert_eq!(session.current_problem(), &solved.next_problem);
        assert_eq!(session.solved_this_session(), 1);
        assert_eq!(session.engine().current_step_index, 0);
    }

    #[test]
    fn level_follows_solved_count() {
        let progress = PlayerProgress {
            total_solved: 9,
            ..PlayerProgress::default()
        };
        let mut session = PracticeSession::new(PracticeConfig::default(), progress, 5).unwrap();
        assert_eq!(session.level(), 1);
        let solved = solve_current(&mut session);
        assert!(solved.leveled_up);
        assert_eq!(solved.next_problem.difficulty_level, 2);
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn failed_generation_keeps_the_solve_pending() {
        let mut session =
            PracticeSession::new(PracticeConfig::default(), PlayerProgress::default(), 17).unwrap();
        let problem = session.current_problem().clone();
        let draws = session.draws();
        let last = session.engine().steps().len() - 1;
        while session.engine().current_step_index < last {
            let answer = session.engine().current_step().unwrap().answer().to_string();
            assert!(session.submit(&answer, &clock()).unwrap().solved.is_none());
        }
        let final_answer = session.engine().current_step().unwrap().answer().to_string();

        session.pinned_level = Some(9);
        assert_eq!(
            session.submit(&final_answer, &clock()).unwrap_err(),
            EngineError::UnknownLevel { level: 9 }
        );
        assert_eq!(session.progress().total_solved, 0);
        assert_eq!(session.solved_this_session(), 0);
        assert_eq!(session.draws(), draws);
        assert_eq!(session.engine().phase(), EnginePhase::Pending);
        assert_eq!(session.engine().current_step_index, last);

        session.pinned_level = None;
        let turn = session.submit(&final_answer, &clock()).unwrap();
        let solved = turn.solved.unwrap();
        assert_eq!(solved.problem, problem);
        assert_eq!(solved.total_solved, 1);
        assert_eq!(session.progress().total_solved, 1);
    }

    #[test]
    fn pinned_level_ignores_progress() {
        let progress = PlayerProgress {
            total_solved: 80,
            ..PlayerProgress::default()
        };
        let mut session =
            PracticeSession::with_pinned_level(PracticeConfig::default(), progress, 5, 2).unwrap();
        assert_eq!(session.level(), 2);
        let solved = solve_current(&mut session);
        assert_eq!(solved.next_problem.difficulty_level, 2);

        assert_eq!(
            PracticeSession::with_pinned_level(
                PracticeConfig::default(),
                PlayerProgress::default(),
                5,
                9
            )
            .unwrap_err(),
            EngineError::UnknownLevel { level: 9 }
        );
    }

    #[test]
    fn retry_resets_current_problem_only() {
        let mut session =
            PracticeSession::new(PracticeConfig::default(), PlayerProgress::default(), 8).unwrap();
        let first = session.engine().current_step().unwrap().answer().to_string();
        session.submit(&first, &clock()).unwrap();
        session.submit("not a number", &clock()).unwrap();
        assert_eq!(session.engine().current_step_index, 1);
        session.retry_problem();
        assert_eq!(session.engine().current_step_index, 0);
        assert_eq!(session.engine().total_incorrect_attempts, 0);
        assert_eq!(session.progress().total_solved, 0);
    }

    #[test]
    fn config_from_json_fills_defaults() {
        let cfg = PracticeConfig::from_json(r#"{"remainder_mode": "require"}"#).unwrap();
        assert_eq!(cfg.remainder_mode, RemainderMode::Require);
        assert_eq!(cfg.table, DifficultyTable::default_table());
        assert!(matches!(
            PracticeConfig::from_json(r#"{"rewards": {"interval": 0, "catalog": [{"slug": "a", "name": "A"}]}}"#),
            Err(ConfigError::ZeroRewardInterval)
        ));
    }
}
