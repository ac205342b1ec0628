//! Bus-stop long division, one atomic step at a time.
//!
//! The solver mirrors the written method: take leading dividend digits until
//! the working number reaches the divisor, then repeat quotient digit,
//! multiply, subtract, and bring down until the dividend is used up. A
//! working number smaller than the divisor still produces an explicit zero
//! quotient digit, and the sequence always ends on a subtraction whose value
//! is the remainder.
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::numbers::decimal_digits;
use crate::problem::DivisionProblem;
use crate::step::{Step, StepDetail, StepKind};

/// A problem together with its ordered steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionSolution {
    pub problem: DivisionProblem,
    pub steps: Vec<Step>,
}

impl DivisionSolution {
    /// Quotient digits in emission order, concatenated.
    #[must_use]
    pub fn quotient_digits(&self) -> String {
        self.steps_of_kind(StepKind::QuotientDigit)
            .map(|step| step.expected_value.to_string())
            .collect()
    }

    /// Value of the closing subtraction step.
    #[must_use]
    pub fn final_remainder(&self) -> Option<u64> {
        self.steps
            .last()
            .filter(|step| step.kind() == StepKind::SubtractionResult)
            .map(|step| step.expected_value)
    }

    pub fn steps_of_kind(&self, kind: StepKind) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(move |step| step.kind() == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Decompose a problem into its long-division steps.
///
/// # Errors
///
/// Returns an error if the problem fails [`DivisionProblem::validate`]; no
/// steps are produced in that case.
pub fn solve(problem: &DivisionProblem) -> Result<DivisionSolution, EngineError> {
    problem.validate()?;

    let digits = decimal_digits(problem.dividend);
    let divisor = problem.divisor;
    let mut builder = StepBuilder::new(&problem.id);

    let mut position = 0;
    let mut working = u64::from(digits[0]);
    while working < divisor && position + 1 < digits.len() {
        position += 1;
        working = working * 10 + u64::from(digits[position]);
    }

    loop {
        let quotient_digit = working / divisor;
        builder.push(
            quotient_digit,
            position,
            StepDetail::QuotientDigit {
                working_number: working,
            },
        );

        let product = divisor * quotient_digit;
        builder.push(product, position, StepDetail::MultiplyResult { quotient_digit });

        let remainder = working - product;
        builder.push(
            remainder,
            position,
            StepDetail::SubtractionResult {
                working_number: working,
                product,
            },
        );

        if position + 1 >= digits.len() {
            break;
        }
        position += 1;
        let digit = digits[position];
        working = remainder * 10 + u64::from(digit);
        builder.push(
            u64::from(digit),
            position,
            StepDetail::BringDown {
                digit_brought_down: digit,
                new_working_number: working,
            },
        );
    }

    let solution = DivisionSolution {
        problem: problem.clone(),
        steps: builder.finish(),
    };
    debug_assert_eq!(solution.quotient_digits(), problem.quotient.to_string());
    debug_assert_eq!(solution.final_remainder(), Some(problem.remainder));
    Ok(solution)
}

struct StepBuilder<'a> {
    problem_id: &'a str,
    steps: Vec<Step>,
}

impl<'a> StepBuilder<'a> {
    fn new(problem_id: &'a str) -> Self {
        Self {
            problem_id,
            steps: Vec::new(),
        }
    }

    fn push(&mut self, expected_value: u64, digit_position: usize, detail: StepDetail) {
        let sequence_index = self.steps.len();
        self.steps.push(Step {
            id: format!("{}-s{sequence_index:02}", self.problem_id),
            problem_id: self.problem_id.to_string(),
            sequence_index,
            expected_value,
            digit_position,
            detail,
        });
    }

    fn finish(self) -> Vec<Step> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved(dividend: u64, divisor: u64) -> DivisionSolution {
        let problem = DivisionProblem::new("t", dividend, divisor, 1).unwrap();
        solve(&problem).unwrap()
    }

    fn shape(solution: &DivisionSolution) -> Vec<(StepKind, u64)> {
        solution
            .steps
            .iter()
            .map(|step| (step.kind(), step.expected_value))
            .collect()
    }

    #[test]
    fn eighty_four_by_four() {
        use StepKind::*;
        let solution = solved(84, 4);
        assert_eq!(
            shape(&solution),
            vec![
                (QuotientDigit, 2),
                (MultiplyResult, 8),
                (SubtractionResult, 0),
                (BringDown, 4),
                (QuotientDigit, 1),
                (MultiplyResult, 4),
                (SubtractionResult, 0),
            ]
        );
        assert_eq!(solution.steps[3].new_working_number(), Some(4));
        assert_eq!(solution.steps[3].digit_position, 1);
    }

    #[test]
    fn zero_quotient_digit_is_emitted() {
        let solution = solved(7035, 5);
        assert_eq!(solution.len(), 15);
        assert_eq!(solution.quotient_digits(), "1407");
        assert_eq!(solution.final_remainder(), Some(0));
        let third_round = &solution.steps[8];
        assert_eq!(third_round.kind(), StepKind::QuotientDigit);
        assert_eq!(third_round.expected_value, 0);
        assert_eq!(
            third_round.detail,
            StepDetail::QuotientDigit { working_number: 3 }
        );
    }

    #[test]
    fn leading_digits_accumulate_before_first_step() {
        let solution = solved(10_000, 100);
        assert_eq!(solution.len(), 11);
        assert_eq!(solution.steps[0].digit_position, 2);
        assert_eq!(solution.quotient_digits(), "100");

        let solution = solved(100, 100);
        assert_eq!(solution.len(), 3);
        assert_eq!(solution.steps[0].digit_position, 2);
    }

    #[test]
    fn dividend_smaller_than_divisor_yields_single_zero_round() {
        let solution = solved(7, 9);
        assert_eq!(solution.quotient_digits(), "0");
        assert_eq!(solution.final_remainder(), Some(7));
        assert_eq!(solution.len(), 3);

        let solution = solved(0, 3);
        assert_eq!(solution.quotient_digits(), "0");
        assert_eq!(solution.final_remainder(), Some(0));
    }

    #[test]
    fn ids_and_positions_are_ordered() {
        let solution = solved(48_213, 37);
        for (idx, step) in solution.steps.iter().enumerate() {
            assert_eq!(step.sequence_index, idx);
            assert_eq!(step.problem_id, "t");
        }
        assert!(
            solution
                .steps
                .windows(2)
                .all(|pair| pair[0].digit_position <= pair[1].digit_position)
        );
        assert_eq!(solution.steps[0].id, "t-s00");
        assert_eq!(solution.quotient_digits(), (48_213 / 37).to_string());
        assert_eq!(solution.final_remainder(), Some(48_213 % 37));
    }

    #[test]
    fn malformed_problem_fails_before_any_step() {
        let mut problem = DivisionProblem::new("t", 84, 4, 1).unwrap();
        problem.divisor = 0;
        assert!(matches!(solve(&problem), Err(EngineError::ZeroDivisor { .. })));
        problem.divisor = 4;
        problem.id = String::new();
        assert_eq!(solve(&problem), Err(EngineError::BlankProblemId));
    }
}
