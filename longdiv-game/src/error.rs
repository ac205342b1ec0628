//! Error taxonomy for the engine.
//!
//! Invalid arguments are caller bugs and surface immediately. Incorrect learner
//! answers and corrupted reward lists are not errors and never appear here.
use thiserror::Error;

use crate::generator::RemainderMode;

/// Invalid-argument conditions raised by engine operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("problem id must not be blank")]
    BlankProblemId,
    #[error("problem {id}: divisor must be positive")]
    ZeroDivisor { id: String },
    #[error(
        "problem {id}: {divisor} × {quotient} + {remainder} does not equal dividend {dividend}"
    )]
    InconsistentProblem {
        id: String,
        dividend: u64,
        divisor: u64,
        quotient: u64,
        remainder: u64,
    },
    #[error("problem {id}: remainder {remainder} must be smaller than divisor {divisor}")]
    RemainderOutOfRange {
        id: String,
        remainder: u64,
        divisor: u64,
    },
    #[error("problem {id}: allow_remainder flag is {flag} but remainder is {remainder}")]
    RemainderFlagMismatch {
        id: String,
        flag: bool,
        remainder: u64,
    },
    #[error("difficulty level {level} is not in the tier table")]
    UnknownLevel { level: u8 },
    #[error("solved count must be a non-negative integer (got {value})")]
    InvalidSolvedCount { value: String },
    #[error("step index {index} is out of range for {len} steps")]
    StepOutOfRange { index: usize, len: usize },
    #[error("problem is already complete; reset before submitting again")]
    AlreadyComplete,
    #[error(
        "no {mode} problem found for level {level} after {attempts} attempts; check the tier ranges"
    )]
    GenerationExhausted {
        level: u8,
        mode: RemainderMode,
        attempts: u32,
    },
}

/// Errors raised when tier tables or reward configs violate their invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tier table must contain at least one level")]
    EmptyTable,
    #[error("tier levels must run 1..=n without gaps (position {position} has level {level})")]
    LevelSequence { position: usize, level: u8 },
    #[error("first tier must start at 0 solved problems (got {threshold})")]
    FirstThreshold { threshold: u32 },
    #[error("solved thresholds must strictly ascend (level {level}: {threshold} <= {previous})")]
    ThresholdOrder {
        level: u8,
        threshold: u32,
        previous: u32,
    },
    #[error("level {level}: {field} digit range {min}..={max} is invalid")]
    DigitRange {
        level: u8,
        field: &'static str,
        min: u8,
        max: u8,
    },
    #[error("level {level}: divisor may have at most {max} digits to fit the dividend")]
    DivisorWiderThanDividend { level: u8, max: u8 },
    #[error("reward interval must be at least 1")]
    ZeroRewardInterval,
    #[error("reward catalog must not be empty")]
    EmptyRewardCatalog,
    #[error("reward catalog entry {position} has a blank slug or name")]
    BlankRewardTemplate { position: usize },
    #[error("reward slug `{slug}` appears more than once")]
    DuplicateRewardSlug { slug: String },
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
