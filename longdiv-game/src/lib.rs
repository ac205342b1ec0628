//! Long-division practice engine
//!
//! Platform-agnostic core of a game that teaches long division step by step.
//! This crate generates tiered problems, expands them into the written
//! "bus-stop" procedure, checks learner answers with rotating hints, tracks
//! progression, and reconciles milestone rewards. It performs no I/O; callers
//! inject randomness, time, and storage.

pub mod clock;
pub mod constants;
pub mod engine;
pub mod error;
pub mod generator;
pub mod numbers;
pub mod problem;
pub mod progress;
pub mod progression;
pub mod random;
pub mod rewards;
pub mod seed;
pub mod session;
pub mod solver;
pub mod step;
pub mod tiers;
pub mod validator;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{EnginePhase, StepEngineState, Submission};
pub use error::{ConfigError, EngineError};
pub use generator::{Difficulty, ProblemGenerator, RemainderMode};
pub use problem::DivisionProblem;
pub use progress::{PlayerProgress, ProgressUpdate};
pub use progression::{
    ProgressionSnapshot, level_for_solved_count, next_level, parse_solved_count,
    problems_until_next_tier, progression_snapshot, tier_for_solved_count,
};
pub use random::{SeededRandom, UnitRandom, derive_stream_seed};
pub use rewards::{
    RewardConfig, RewardIdentity, RewardResolution, RewardTemplate, UnlockedReward,
    resolve_rewards, resolve_rewards_from_json,
};
pub use seed::{decode_practice_code, encode_practice_code, generate_code_from_entropy};
pub use session::{PracticeConfig, PracticeSession, SessionTurn, SolvedProblem};
pub use solver::{DivisionSolution, solve};
pub use step::{Step, StepDetail, StepKind};
pub use tiers::{DifficultyTable, DifficultyTier};
pub use validator::{Hint, ValidationOutcome, validate};

/// Trait for abstracting save/load of learner progress
/// Platform-specific implementations should provide this
pub trait ProgressStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save progress under a profile name
    ///
    /// # Errors
    ///
    /// Returns an error if the progress cannot be saved.
    fn save_progress(&self, profile: &str, progress: &PlayerProgress) -> Result<(), Self::Error>;

    /// Load progress for a profile
    ///
    /// # Errors
    ///
    /// Returns an error if the progress cannot be loaded.
    fn load_progress(&self, profile: &str) -> Result<Option<PlayerProgress>, Self::Error>;

    /// Delete a profile's progress
    ///
    /// # Errors
    ///
    /// Returns an error if the progress cannot be deleted.
    fn delete_progress(&self, profile: &str) -> Result<(), Self::Error>;
}

/// Main engine binding a configuration to a progress store
pub struct PracticeEngine<S>
where
    S: ProgressStore,
{
    config: PracticeConfig,
    storage: S,
}

impl<S> PracticeEngine<S>
where
    S: ProgressStore,
{
    /// Create a new engine with the provided configuration and storage
    pub const fn new(config: PracticeConfig, storage: S) -> Self {
        Self { config, storage }
    }

    #[must_use]
    pub const fn config(&self) -> &PracticeConfig {
        &self.config
    }

    /// Save a learner's progress
    ///
    /// # Errors
    ///
    /// Returns an error if the progress cannot be saved.
    pub fn save_progress(&self, profile: &str, progress: &PlayerProgress) -> Result<(), S::Error> {
        self.storage.save_progress(profile, progress)
    }

    /// Load a learner's progress, healing its reward list
    ///
    /// # Errors
    ///
    /// Returns an error if the progress cannot be loaded.
    pub fn load_progress<C>(&self, profile: &str, clock: &C) -> anyhow::Result<Option<PlayerProgress>>
    where
        C: Clock + ?Sized,
        S::Error: Into<anyhow::Error>,
    {
        let Some(progress) = self.storage.load_progress(profile).map_err(Into::into)? else {
            return Ok(None);
        };
        let update = progress.reconcile(&self.config.table, &self.config.rewards, clock);
        Ok(Some(update.progress))
    }

    /// Delete a learner's progress
    ///
    /// # Errors
    ///
    /// Returns an error if the progress cannot be deleted.
    pub fn delete_progress(&self, profile: &str) -> Result<(), S::Error> {
        self.storage.delete_progress(profile)
    }

    /// Start a session for `progress` seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the first problem cannot be generated.
    pub fn start_session(
        &self,
        progress: PlayerProgress,
        seed: u64,
    ) -> Result<PracticeSession, EngineError> {
        PracticeSession::new(self.config.clone(), progress, seed)
    }

    /// Start a session from a practice code such as `L2-COMET42`.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is malformed or names an unknown level.
    pub fn start_from_code(
        &self,
        progress: PlayerProgress,
        code: &str,
    ) -> anyhow::Result<PracticeSession> {
        let (level, seed) = decode_practice_code(code)
            .ok_or_else(|| anyhow::anyhow!("invalid practice code: {code}"))?;
        Ok(PracticeSession::with_pinned_level(
            self.config.clone(),
            progress,
            seed,
            level,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, PlayerProgress>>>,
    }

    impl ProgressStore for MemoryStorage {
        type Error = Infallible;

        fn save_progress(&self, profile: &str, progress: &PlayerProgress) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(profile.to_string(), progress.clone());
            Ok(())
        }

        fn load_progress(&self, profile: &str) -> Result<Option<PlayerProgress>, Self::Error> {
            Ok(self.saves.borrow().get(profile).cloned())
        }

        fn delete_progress(&self, profile: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(profile);
            Ok(())
        }
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
    }

    #[test]
    fn engine_saves_and_heals_progress() {
        let engine = PracticeEngine::new(PracticeConfig::default(), MemoryStorage::default());
        let progress = PlayerProgress {
            total_solved: 11,
            ..PlayerProgress::default()
        };
        engine.save_progress("ada", &progress).unwrap();

        let loaded = engine.load_progress("ada", &clock()).unwrap().expect("save exists");
        assert_eq!(loaded.total_solved, 11);
        assert_eq!(loaded.unlocked_rewards.len(), 2);
        assert!(engine.load_progress("missing", &clock()).unwrap().is_none());

        engine.delete_progress("ada").unwrap();
        assert!(engine.load_progress("ada", &clock()).unwrap().is_none());
    }

    #[test]
    fn sessions_start_from_progress_or_code() {
        let engine = PracticeEngine::new(PracticeConfig::default(), MemoryStorage::default());
        let session = engine
            .start_session(
                PlayerProgress {
                    total_solved: 30,
                    ..PlayerProgress::default()
                },
                1,
            )
            .unwrap();
        assert_eq!(session.level(), 3);

        let session = engine
            .start_from_code(PlayerProgress::default(), "L4-PRIME11")
            .unwrap();
        assert_eq!(session.level(), 4);
        assert_eq!(session.pinned_level(), Some(4));
        assert!(engine.start_from_code(PlayerProgress::default(), "L9-PRIME11").is_err());
        assert!(engine.start_from_code(PlayerProgress::default(), "garbage").is_err());
    }
}
