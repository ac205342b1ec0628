//! Pure answer checking for a single step.
use serde::{Deserialize, Serialize};

use crate::constants::HINT_ROTATION;
use crate::error::EngineError;
use crate::solver::DivisionSolution;
use crate::step::{Step, StepDetail, StepKind};

/// Feedback attached to an incorrect submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub step_kind: StepKind,
    pub entered_value: String,
    pub expected_value: u64,
    pub attempt_number: u32,
    pub message: String,
}

/// Result of checking one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub correct: bool,
    pub entered_value: String,
    pub expected_value: u64,
    pub step: Step,
    pub hint: Option<Hint>,
    /// `None` once the final step has been answered correctly.
    pub next_step_index: Option<usize>,
    pub is_complete: bool,
}

/// Check `entered` against step `step_index` of `solution`.
///
/// Input is trimmed and read as an unsigned integer; anything unparsable is
/// simply wrong. Bring-down steps compare against the digit brought down.
///
/// # Errors
///
/// Returns [`EngineError::StepOutOfRange`] if `step_index` is not a valid step.
pub fn validate(
    solution: &DivisionSolution,
    step_index: usize,
    entered: &str,
    attempt_number: u32,
) -> Result<ValidationOutcome, EngineError> {
    let len = solution.steps.len();
    let step = solution
        .steps
        .get(step_index)
        .ok_or(EngineError::StepOutOfRange {
            index: step_index,
            len,
        })?;

    let entered_value = entered.trim().to_string();
    let expected_value = step.answer();
    let correct = entered_value.parse::<u64>().ok() == Some(expected_value);

    if correct {
        let next = step_index + 1;
        let is_complete = next == len;
        return Ok(ValidationOutcome {
            correct,
            entered_value,
            expected_value,
            step: step.clone(),
            hint: None,
            next_step_index: (!is_complete).then_some(next),
            is_complete,
        });
    }

    let hint = Hint {
        step_kind: step.kind(),
        entered_value: entered_value.clone(),
        expected_value,
        attempt_number,
        message: hint_message(step, solution.problem.divisor, attempt_number),
    };
    Ok(ValidationOutcome {
        correct,
        entered_value,
        expected_value,
        step: step.clone(),
        hint: Some(hint),
        next_step_index: Some(step_index),
        is_complete: false,
    })
}

/// Rotating hint text for a step, keyed by `attempt_number mod HINT_ROTATION`.
#[must_use]
pub fn hint_message(step: &Step, divisor: u64, attempt_number: u32) -> String {
    let variant = usize::try_from(attempt_number).unwrap_or(0) % HINT_ROTATION;
    let answer = step.answer();
    match (step.detail, variant) {
        (StepDetail::QuotientDigit { working_number }, 0) => {
            format!("How many times does {divisor} fit into {working_number}?")
        }
        (StepDetail::QuotientDigit { working_number }, 1) => format!(
            "Count up in {divisor}s and stop before you pass {working_number}. How many jumps was that?"
        ),
        (StepDetail::QuotientDigit { working_number }, _) => format!(
            "{divisor} × {answer} = {} is the biggest fit that stays at or under {working_number}.",
            divisor * answer
        ),
        (StepDetail::MultiplyResult { quotient_digit }, 0) => {
            format!("Multiply the digit you just wrote, {quotient_digit}, by {divisor}.")
        }
        (StepDetail::MultiplyResult { quotient_digit }, 1) => {
            format!("What is {divisor} × {quotient_digit}?")
        }
        (StepDetail::MultiplyResult { quotient_digit }, _) => format!(
            "Add {divisor} to itself {quotient_digit} times: that makes {answer}."
        ),
        (
            StepDetail::SubtractionResult {
                working_number,
                product,
            },
            0,
        ) => format!("Take {product} away from {working_number}."),
        (StepDetail::SubtractionResult { product, .. }, 1) => format!(
            "Subtract the number under the line ({product}) from the number above it."
        ),
        (
            StepDetail::SubtractionResult {
                working_number,
                product,
            },
            _,
        ) => format!("{working_number} − {product} = {answer}. It must be smaller than {divisor}."),
        (StepDetail::BringDown { .. }, 0) => {
            "Bring down the next digit of the dividend.".to_string()
        }
        (StepDetail::BringDown { .. }, 1) => {
            "Look at the dividend: which digit comes right after the ones you have used?"
                .to_string()
        }
        (
            StepDetail::BringDown {
                digit_brought_down,
                new_working_number,
            },
            _,
        ) => format!(
            "The next digit is {digit_brought_down}; writing it beside the remainder makes {new_working_number}."
        ),
    }
}
