//! Problem generation keyed to a difficulty tier.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;
use twox_hash::XxHash64;

use crate::constants::{
    LOG_GENERATION_EXHAUSTED, LOG_GENERATION_RESAMPLE, MAX_GENERATION_ATTEMPTS,
    MIN_GENERATED_DIVISOR, PROBLEM_ID_PREFIX,
};
use crate::error::EngineError;
use crate::problem::DivisionProblem;
use crate::progression::level_for_solved_count;
use crate::random::{UnitRandom, sample_inclusive};
use crate::tiers::{DifficultyTable, DifficultyTier};

/// Whether generated problems may leave a remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemainderMode {
    /// Only exact divisions.
    #[default]
    Forbid,
    /// Only divisions with a non-zero remainder.
    Require,
    /// Whatever the sampled pair produces.
    Allow,
}

impl RemainderMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forbid => "forbid",
            Self::Require => "require",
            Self::Allow => "allow",
        }
    }
}

impl fmt::Display for RemainderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemainderMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forbid" => Ok(Self::Forbid),
            "require" => Ok(Self::Require),
            "allow" => Ok(Self::Allow),
            _ => Err(()),
        }
    }
}

/// How the caller names the difficulty of the next problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Level(u8),
    /// Resolved through progression first.
    SolvedCount(u32),
}

/// Samples problems from a tier table.
#[derive(Debug, Clone, Copy)]
pub struct ProblemGenerator<'a> {
    table: &'a DifficultyTable,
    max_attempts: u32,
}

impl<'a> ProblemGenerator<'a> {
    #[must_use]
    pub const fn new(table: &'a DifficultyTable) -> Self {
        Self {
            table,
            max_attempts: MAX_GENERATION_ATTEMPTS,
        }
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Level a difficulty key resolves to.
    #[must_use]
    pub fn resolve_level(&self, difficulty: Difficulty) -> u8 {
        match difficulty {
            Difficulty::Level(level) => level,
            Difficulty::SolvedCount(solved) => level_for_solved_count(self.table, solved),
        }
    }

    /// Generate one problem.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownLevel`] for levels outside the table and
    /// [`EngineError::GenerationExhausted`] when the tier's ranges never admit
    /// the requested remainder mode.
    pub fn generate<R>(
        &self,
        difficulty: Difficulty,
        mode: RemainderMode,
        random: &mut R,
    ) -> Result<DivisionProblem, EngineError>
    where
        R: UnitRandom + ?Sized,
    {
        let level = self.resolve_level(difficulty);
        let tier = self.table.tier(level)?;

        for attempt in 1..=self.max_attempts {
            if let Some((dividend, divisor)) = sample_operands(tier, mode, random) {
                let nonce = sample_inclusive(random, 0, u64::from(u32::MAX));
                let id = problem_id(level, dividend, divisor, nonce);
                if attempt > 1 {
                    log::debug!(
                        "{LOG_GENERATION_RESAMPLE}: level {level} {mode} accepted after {attempt} attempts"
                    );
                }
                return DivisionProblem::new(id, dividend, divisor, level);
            }
        }

        log::warn!(
            "{LOG_GENERATION_EXHAUSTED}: level {level} {mode} gave up after {} attempts",
            self.max_attempts
        );
        Err(EngineError::GenerationExhausted {
            level,
            mode,
            attempts: self.max_attempts,
        })
    }
}

/// One sampling round; `None` means the pair was rejected and must be redrawn.
fn sample_operands<R>(tier: &DifficultyTier, mode: RemainderMode, random: &mut R) -> Option<(u64, u64)>
where
    R: UnitRandom + ?Sized,
{
    let (divisor_low, divisor_high) = tier.divisor_bounds();
    let divisor_low = divisor_low.max(MIN_GENERATED_DIVISOR);
    if divisor_low > divisor_high {
        return None;
    }
    let divisor = sample_inclusive(random, divisor_low, divisor_high);
    let (dividend_low, dividend_high) = tier.dividend_bounds();

    let dividend = match mode {
        RemainderMode::Forbid => {
            let quotient_low = dividend_low.div_ceil(divisor).max(1);
            let quotient_high = dividend_high / divisor;
            if quotient_low > quotient_high {
                return None;
            }
            divisor * sample_inclusive(random, quotient_low, quotient_high)
        }
        RemainderMode::Require | RemainderMode::Allow => {
            sample_inclusive(random, dividend_low, dividend_high)
        }
    };

    if dividend < divisor {
        return None;
    }
    if mode == RemainderMode::Require && dividend % divisor == 0 {
        return None;
    }
    Some((dividend, divisor))
}

fn problem_id(level: u8, dividend: u64, divisor: u64, nonce: u64) -> String {
    let mut hasher = XxHash64::with_seed(u64::from(level));
    hasher.write_u64(dividend);
    hasher.write_u64(divisor);
    hasher.write_u64(nonce);
    format!("{PROBLEM_ID_PREFIX}-{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbers::digit_count;
    use crate::random::SeededRandom;
    use crate::tiers::DifficultyTier;

    #[test]
    fn forbid_yields_exact_problems_within_digit_ranges() {
        let table = DifficultyTable::default_table();
        let generator = ProblemGenerator::new(&table);
        let mut random = SeededRandom::from_user_seed(11);
        for level in 1..=table.max_level() {
            let tier = *table.tier(level).unwrap();
            for _ in 0..200 {
                let problem = generator
                    .generate(Difficulty::Level(level), RemainderMode::Forbid, &mut random)
                    .unwrap();
                assert_eq!(problem.remainder, 0);
                assert!(!problem.allow_remainder);
                assert!(problem.divisor >= MIN_GENERATED_DIVISOR);
                let dd = digit_count(problem.dividend);
                let vd = digit_count(problem.divisor);
                assert!((tier.min_dividend_digits..=tier.max_dividend_digits).contains(&dd));
                assert!((tier.min_divisor_digits..=tier.max_divisor_digits).contains(&vd));
                assert!(problem.validate().is_ok());
            }
        }
    }

    #[test]
    fn require_always_leaves_a_remainder() {
        let table = DifficultyTable::default_table();
        let generator = ProblemGenerator::new(&table);
        let mut random = SeededRandom::from_user_seed(5);
        for _ in 0..300 {
            let problem = generator
                .generate(Difficulty::Level(2), RemainderMode::Require, &mut random)
                .unwrap();
            assert_ne!(problem.remainder, 0);
            assert!(problem.allow_remainder);
        }
    }

    #[test]
    fn allow_reaches_both_outcomes_and_flags_match() {
        let table = DifficultyTable::default_table();
        let generator = ProblemGenerator::new(&table);
        let mut random = SeededRandom::from_user_seed(99);
        let mut exact = 0;
        let mut inexact = 0;
        for _ in 0..500 {
            let problem = generator
                .generate(Difficulty::Level(1), RemainderMode::Allow, &mut random)
                .unwrap();
            assert_eq!(problem.allow_remainder, problem.dividend % problem.divisor != 0);
            if problem.allow_remainder {
                inexact += 1;
            } else {
                exact += 1;
            }
        }
        assert!(exact > 0 && inexact > 0);
    }

    #[test]
    fn solved_count_key_agrees_with_progression() {
        let table = DifficultyTable::default_table();
        let generator = ProblemGenerator::new(&table);
        for solved in [0, 9, 10, 24, 25, 49, 50, 400] {
            let mut random = SeededRandom::from_user_seed(u64::from(solved));
            let problem = generator
                .generate(Difficulty::SolvedCount(solved), RemainderMode::Allow, &mut random)
                .unwrap();
            assert_eq!(problem.difficulty_level, level_for_solved_count(&table, solved));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let table = DifficultyTable::default_table();
        let generator = ProblemGenerator::new(&table);
        let mut first = SeededRandom::from_user_seed(2024);
        let mut second = SeededRandom::from_user_seed(2024);
        for _ in 0..20 {
            let a = generator.generate(Difficulty::Level(4), RemainderMode::Allow, &mut first);
            let b = generator.generate(Difficulty::Level(4), RemainderMode::Allow, &mut second);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn scripted_closure_drives_generation() {
        let table = DifficultyTable::default_table();
        let generator = ProblemGenerator::new(&table);
        // Divisor 2..=9 at 0.25 -> 4; quotient 3..=24 at 0.9 -> 22; then the id nonce.
        let mut script = [0.25, 0.9, 0.1].into_iter();
        let mut random = move || script.next().unwrap_or(0.0);
        let problem = generator
            .generate(Difficulty::Level(1), RemainderMode::Forbid, &mut random)
            .unwrap();
        assert_eq!((problem.dividend, problem.divisor, problem.quotient), (88, 4, 22));
        assert!(problem.id.starts_with("div-"));
    }

    #[test]
    fn impossible_ranges_exhaust_instead_of_looping() {
        // A source pinned near 1.0 always draws 9 ÷ 9, which never leaves a remainder.
        let table = DifficultyTable::new(vec![DifficultyTier {
            level: 1,
            min_dividend_digits: 1,
            max_dividend_digits: 1,
            min_divisor_digits: 1,
            max_divisor_digits: 1,
            minimum_solved_count: 0,
        }])
        .unwrap();
        let generator = ProblemGenerator::new(&table).with_max_attempts(25);
        let mut always_high = || 0.999;
        assert_eq!(
            generator.generate(Difficulty::Level(1), RemainderMode::Require, &mut always_high),
            Err(EngineError::GenerationExhausted {
                level: 1,
                mode: RemainderMode::Require,
                attempts: 25,
            })
        );
        assert_eq!(
            generator.generate(Difficulty::Level(3), RemainderMode::Allow, &mut always_high),
            Err(EngineError::UnknownLevel { level: 3 })
        );
    }
}
