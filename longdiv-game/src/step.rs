//! Atomic steps of the long-division procedure.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which arithmetic move a step asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    QuotientDigit,
    MultiplyResult,
    SubtractionResult,
    BringDown,
}

impl StepKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QuotientDigit => "quotient-digit",
            Self::MultiplyResult => "multiply-result",
            Self::SubtractionResult => "subtraction-result",
            Self::BringDown => "bring-down",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operands the learner is working with for each kind of step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StepDetail {
    /// How many times the divisor fits into `working_number`.
    QuotientDigit { working_number: u64 },
    /// Divisor times `quotient_digit`.
    MultiplyResult { quotient_digit: u64 },
    /// `working_number - product`.
    SubtractionResult { working_number: u64, product: u64 },
    /// Next dividend digit appended to the running remainder.
    BringDown {
        digit_brought_down: u8,
        new_working_number: u64,
    },
}

impl StepDetail {
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::QuotientDigit { .. } => StepKind::QuotientDigit,
            Self::MultiplyResult { .. } => StepKind::MultiplyResult,
            Self::SubtractionResult { .. } => StepKind::SubtractionResult,
            Self::BringDown { .. } => StepKind::BringDown,
        }
    }
}

/// One step of a solution. Produced once by the solver and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub problem_id: String,
    pub sequence_index: usize,
    pub expected_value: u64,
    /// Index of the rightmost dividend digit involved, counted from the left.
    pub digit_position: usize,
    #[serde(flatten)]
    pub detail: StepDetail,
}

impl Step {
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        self.detail.kind()
    }

    /// Value a submission is checked against. Bring-down steps ask for the
    /// digit being brought down, not the resulting working number.
    #[must_use]
    pub fn answer(&self) -> u64 {
        match self.detail {
            StepDetail::BringDown {
                digit_brought_down, ..
            } => u64::from(digit_brought_down),
            _ => self.expected_value,
        }
    }

    /// Working number produced by a bring-down step.
    #[must_use]
    pub const fn new_working_number(&self) -> Option<u64> {
        match self.detail {
            StepDetail::BringDown {
                new_working_number, ..
            } => Some(new_working_number),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bring_down() -> Step {
        Step {
            id: "p-s03".to_string(),
            problem_id: "p".to_string(),
            sequence_index: 3,
            expected_value: 4,
            digit_position: 1,
            detail: StepDetail::BringDown {
                digit_brought_down: 4,
                new_working_number: 4,
            },
        }
    }

    #[test]
    fn bring_down_answers_with_the_digit() {
        let step = bring_down();
        assert_eq!(step.kind(), StepKind::BringDown);
        assert_eq!(step.answer(), 4);
        assert_eq!(step.new_working_number(), Some(4));
    }

    #[test]
    fn serializes_with_kebab_case_kind_tag() {
        let value = serde_json::to_value(bring_down()).unwrap();
        assert_eq!(value["kind"], "bring-down");
        assert_eq!(value["digit_brought_down"], 4);
        let back: Step = serde_json::from_value(value).unwrap();
        assert_eq!(back, bring_down());
        assert_eq!(StepKind::SubtractionResult.to_string(), "subtraction-result");
    }
}
