//! Division problems as produced by the generator and consumed by the solver.
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// An immutable division exercise.
///
/// Invariant: `dividend == divisor * quotient + remainder` with
/// `remainder < divisor`, and `allow_remainder == (remainder != 0)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DivisionProblem {
    pub id: String,
    pub dividend: u64,
    pub divisor: u64,
    pub quotient: u64,
    pub remainder: u64,
    pub difficulty_level: u8,
    pub allow_remainder: bool,
}

impl DivisionProblem {
    /// Build a problem, deriving quotient and remainder from the operands.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank id or a zero divisor.
    pub fn new(
        id: impl Into<String>,
        dividend: u64,
        divisor: u64,
        difficulty_level: u8,
    ) -> Result<Self, EngineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EngineError::BlankProblemId);
        }
        if divisor == 0 {
            return Err(EngineError::ZeroDivisor { id });
        }
        let remainder = dividend % divisor;
        Ok(Self {
            id,
            dividend,
            divisor,
            quotient: dividend / divisor,
            remainder,
            difficulty_level,
            allow_remainder: remainder != 0,
        })
    }

    /// Check every field invariant. Problems arriving from storage or other
    /// callers go through this before anything is derived from them.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id.trim().is_empty() {
            return Err(EngineError::BlankProblemId);
        }
        if self.divisor == 0 {
            return Err(EngineError::ZeroDivisor {
                id: self.id.clone(),
            });
        }
        if self.remainder >= self.divisor {
            return Err(EngineError::RemainderOutOfRange {
                id: self.id.clone(),
                remainder: self.remainder,
                divisor: self.divisor,
            });
        }
        let recomposed = self
            .divisor
            .checked_mul(self.quotient)
            .and_then(|product| product.checked_add(self.remainder));
        if recomposed != Some(self.dividend) {
            return Err(EngineError::InconsistentProblem {
                id: self.id.clone(),
                dividend: self.dividend,
                divisor: self.divisor,
                quotient: self.quotient,
                remainder: self.remainder,
            });
        }
        if self.allow_remainder != (self.remainder != 0) {
            return Err(EngineError::RemainderFlagMismatch {
                id: self.id.clone(),
                flag: self.allow_remainder,
                remainder: self.remainder,
            });
        }
        Ok(())
    }

    /// `"7035 ÷ 5"`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ÷ {}", self.dividend, self.divisor)
    }
}
