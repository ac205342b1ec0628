use longdiv_game::{
    Difficulty, DifficultyTable, DivisionProblem, EngineError, EnginePhase, ProblemGenerator,
    RemainderMode, SeededRandom, StepEngineState, StepKind, level_for_solved_count, next_level,
    problems_until_next_tier, solve,
};

fn solution_for(dividend: u64, divisor: u64) -> longdiv_game::DivisionSolution {
    let problem = DivisionProblem::new("fixture", dividend, divisor, 1).unwrap();
    solve(&problem).unwrap()
}

#[test]
fn quotient_digits_and_final_remainder_hold_for_generated_problems() {
    let table = DifficultyTable::default_table();
    let generator = ProblemGenerator::new(&table);
    let mut random = SeededRandom::from_user_seed(0x00C0_FFEE);
    for mode in [RemainderMode::Forbid, RemainderMode::Require, RemainderMode::Allow] {
        for level in 1..=table.max_level() {
            for _ in 0..50 {
                let problem = generator
                    .generate(Difficulty::Level(level), mode, &mut random)
                    .unwrap();
                let solution = solve(&problem).unwrap();
                let quotient: String = solution
                    .steps_of_kind(StepKind::QuotientDigit)
                    .map(|step| step.expected_value.to_string())
                    .collect();
                assert_eq!(quotient, problem.quotient.to_string(), "{}", problem.label());

                let last = solution.steps.last().unwrap();
                assert_eq!(last.kind(), StepKind::SubtractionResult);
                assert_eq!(last.expected_value, problem.remainder);

                assert!(
                    solution
                        .steps
                        .windows(2)
                        .all(|pair| pair[0].digit_position <= pair[1].digit_position
                            && pair[0].sequence_index + 1 == pair[1].sequence_index)
                );
            }
        }
    }
}

#[test]
fn eighty_four_divided_by_four() {
    let solution = solution_for(84, 4);
    let shape: Vec<_> = solution
        .steps
        .iter()
        .map(|step| (step.kind(), step.answer()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (StepKind::QuotientDigit, 2),
            (StepKind::MultiplyResult, 8),
            (StepKind::SubtractionResult, 0),
            (StepKind::BringDown, 4),
            (StepKind::QuotientDigit, 1),
            (StepKind::MultiplyResult, 4),
            (StepKind::SubtractionResult, 0),
        ]
    );
    assert_eq!(solution.steps[3].new_working_number(), Some(4));
}

#[test]
fn zero_quotient_digit_is_its_own_step() {
    let solution = solution_for(7035, 5);
    assert_eq!(solution.len(), 15);
    assert_eq!(solution.quotient_digits(), "1407");
    assert_eq!(solution.final_remainder(), Some(0));
    let round_three = &solution.steps[8];
    assert_eq!(round_three.kind(), StepKind::QuotientDigit);
    assert_eq!(round_three.expected_value, 0);
}

#[test]
fn leading_digits_accumulate_before_first_step() {
    let solution = solution_for(10_000, 100);
    assert_eq!(solution.len(), 11);
    assert_eq!(solution.steps[0].kind(), StepKind::QuotientDigit);
    assert_eq!(solution.steps[0].digit_position, 2);
    assert_eq!(solution.quotient_digits(), "100");
}

#[test]
fn progression_boundaries_are_exact_and_top_level_is_sticky() {
    let table = DifficultyTable::default_table();
    for (solved, level) in [(0, 1), (9, 1), (10, 2), (24, 2), (25, 3), (49, 3), (50, 4), (1_000, 4)] {
        assert_eq!(level_for_solved_count(&table, solved), level, "solved {solved}");
    }
    assert_eq!(next_level(&table, 50), None);
    assert_eq!(problems_until_next_tier(&table, 50), None);
    assert_eq!(problems_until_next_tier(&table, 24), Some(1));
}

#[test]
fn engine_retry_semantics() {
    let mut state = StepEngineState::new(solution_for(84, 4));
    for expected_attempts in 1..=3 {
        let submission = state.submit("7").unwrap();
        assert!(!submission.outcome.correct);
        assert!(submission.outcome.hint.is_some());
        state = submission.state;
        assert_eq!(state.current_step_index, 0);
        assert_eq!(state.current_attempts, expected_attempts);
    }
    assert_eq!(state.total_incorrect_attempts, 3);

    let submission = state.submit("2").unwrap();
    assert!(submission.outcome.correct);
    state = submission.state;
    assert_eq!(state.current_attempts, 0);
    assert_eq!(state.current_step_index, 1);

    for answer in ["8", "0", "4", "1", "4", "0"] {
        state = state.submit(answer).unwrap().state;
    }
    assert!(state.completed);
    assert_eq!(state.phase(), EnginePhase::Complete);
    assert_eq!(state.total_incorrect_attempts, 3);
    assert_eq!(state.submit("0").unwrap_err(), EngineError::AlreadyComplete);
}

#[test]
fn solved_count_and_level_keys_agree() {
    let table = DifficultyTable::default_table();
    let generator = ProblemGenerator::new(&table);
    for solved in [0, 9, 10, 25, 49, 50, 300] {
        let mut by_count = SeededRandom::from_user_seed(u64::from(solved));
        let mut by_level = SeededRandom::from_user_seed(u64::from(solved));
        let level = level_for_solved_count(&table, solved);
        let a = generator
            .generate(Difficulty::SolvedCount(solved), RemainderMode::Forbid, &mut by_count)
            .unwrap();
        let b = generator
            .generate(Difficulty::Level(level), RemainderMode::Forbid, &mut by_level)
            .unwrap();
        assert_eq!(a, b);
    }
}
