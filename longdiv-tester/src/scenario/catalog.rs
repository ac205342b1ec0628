use anyhow::{Result, anyhow, ensure};
use longdiv_game::{
    RemainderMode, RewardConfig, StepKind, level_for_solved_count, resolve_rewards,
};
use serde_json::{Value, json};

use super::TestScenario;
use crate::logic::learner::MAX_ATTEMPTS_PER_STEP;
use crate::logic::{LearnerStrategy, SimulationPlan, SimulationSummary};

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "smoke",
            "Smoke",
            "perfect learner solves a short set without a single miss",
            SimulationPlan::new(LearnerStrategy::Perfect)
                .with_expectation(no_mistakes_expectation)
                .with_expectation(remainder_policy_expectation),
        ),
        TestScenario::new(
            "solver-invariants",
            "Solver Invariants",
            "quotient digits, final remainder, and digit positions hold for every problem",
            SimulationPlan::new(LearnerStrategy::Careless)
                .with_problems(20)
                .with_remainder_mode(RemainderMode::Allow)
                .with_expectation(solver_invariants_expectation)
                .with_expectation(remainder_policy_expectation),
        ),
        TestScenario::new(
            "progression",
            "Tier Progression",
            "levels follow the threshold table exactly and never regress",
            SimulationPlan::new(LearnerStrategy::Perfect)
                .with_problems(55)
                .with_expectation(progression_expectation),
        ),
        TestScenario::new(
            "reward-idempotence",
            "Reward Idempotence",
            "rewards unlock on every milestone and re-resolving changes nothing",
            SimulationPlan::new(LearnerStrategy::Careless)
                .with_problems(23)
                .with_expectation(reward_milestone_expectation)
                .with_expectation(reward_idempotence_expectation),
        ),
        TestScenario::new(
            "corrupted-save",
            "Corrupted Save Recovery",
            "a save with a duplicated reward is truncated, refilled, and kept canonical",
            SimulationPlan::new(LearnerStrategy::Perfect)
                .with_problems(8)
                .with_saved_progress(corrupted_save)
                .with_expectation(corrupted_save_expectation)
                .with_expectation(reward_idempotence_expectation),
        ),
        TestScenario::new(
            "attempt-accounting",
            "Attempt Accounting",
            "struggling learner's misses, hints, and submissions add up",
            SimulationPlan::new(LearnerStrategy::Struggling)
                .with_problems(15)
                .with_expectation(attempt_accounting_expectation),
        ),
        TestScenario::new(
            "guesser",
            "Guessing Learner",
            "random guessing still finishes every problem",
            SimulationPlan::new(LearnerStrategy::Guesser)
                .with_problems(4)
                .with_expectation(guesser_expectation)
                .with_expectation(attempt_accounting_expectation),
        ),
        TestScenario::new(
            "remainder-policy",
            "Remainder Policy",
            "require mode only deals problems with a remainder",
            SimulationPlan::new(LearnerStrategy::Careless)
                .with_problems(20)
                .with_remainder_mode(RemainderMode::Require)
                .with_expectation(remainder_policy_expectation)
                .with_expectation(solver_invariants_expectation),
        ),
    ]
}

fn no_mistakes_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.metrics.incorrect_attempts == 0,
        "perfect learner made {} mistakes",
        summary.metrics.incorrect_attempts
    );
    for record in &summary.problems {
        ensure!(
            record.submissions as usize == record.solution.steps.len(),
            "{}: {} submissions for {} steps",
            record.problem.label(),
            record.submissions,
            record.solution.steps.len()
        );
    }
    Ok(())
}

fn remainder_policy_expectation(summary: &SimulationSummary) -> Result<()> {
    let mode = summary.config.remainder_mode;
    for record in &summary.problems {
        let problem = &record.problem;
        let ok = match mode {
            RemainderMode::Forbid => problem.remainder == 0,
            RemainderMode::Require => problem.remainder > 0,
            RemainderMode::Allow => true,
        };
        ensure!(ok, "{} violates remainder mode {mode}", problem.label());
        ensure!(
            problem.allow_remainder == (problem.remainder != 0),
            "{} has a stale remainder flag",
            problem.label()
        );
        ensure!(problem.divisor >= 2, "{} has a trivial divisor", problem.label());
    }
    Ok(())
}

fn solver_invariants_expectation(summary: &SimulationSummary) -> Result<()> {
    for record in &summary.problems {
        let problem = &record.problem;
        let steps = &record.solution.steps;
        ensure!(
            problem.divisor * problem.quotient + problem.remainder == problem.dividend,
            "{} does not recompose",
            problem.label()
        );

        let digits: String = steps
            .iter()
            .filter(|step| step.kind() == StepKind::QuotientDigit)
            .map(|step| step.expected_value.to_string())
            .collect();
        ensure!(
            digits == problem.quotient.to_string(),
            "{}: quotient digits {digits} != {}",
            problem.label(),
            problem.quotient
        );

        let last = steps
            .last()
            .ok_or_else(|| anyhow!("{} has no steps", problem.label()))?;
        ensure!(
            last.kind() == StepKind::SubtractionResult && last.expected_value == problem.remainder,
            "{}: last step is {} = {}, remainder {}",
            problem.label(),
            last.kind(),
            last.expected_value,
            problem.remainder
        );

        for pair in steps.windows(2) {
            ensure!(
                pair[0].digit_position <= pair[1].digit_position,
                "{}: digit position went backwards at step {}",
                problem.label(),
                pair[1].sequence_index
            );
        }
    }
    Ok(())
}

fn progression_expectation(summary: &SimulationSummary) -> Result<()> {
    let table = &summary.config.table;
    let mut solved_before = summary.starting_progress.total_solved;
    let mut previous_level = level_for_solved_count(table, solved_before);

    for record in &summary.problems {
        let dealt = record.problem.difficulty_level;
        let expected_dealt = summary
            .pinned_level
            .unwrap_or_else(|| level_for_solved_count(table, solved_before));
        ensure!(
            dealt == expected_dealt,
            "problem after {solved_before} solves was level {dealt}, expected {expected_dealt}"
        );

        let level = level_for_solved_count(table, record.total_solved_after);
        ensure!(
            record.level_after == level,
            "level {} at {} solved, expected {level}",
            record.level_after,
            record.total_solved_after
        );
        ensure!(level >= previous_level, "level regressed from {previous_level} to {level}");
        ensure!(
            record.leveled_up == (level > previous_level),
            "level-up flag wrong at {} solved",
            record.total_solved_after
        );

        previous_level = level;
        solved_before = record.total_solved_after;
    }
    Ok(())
}

fn reward_milestone_expectation(summary: &SimulationSummary) -> Result<()> {
    let interval = summary.config.rewards.interval;
    for record in &summary.problems {
        let on_milestone = record.total_solved_after % interval == 0;
        ensure!(
            record.newly_unlocked.is_empty() != on_milestone,
            "unlock mismatch at {} solved",
            record.total_solved_after
        );
    }
    let expected = summary.final_progress.total_solved / interval;
    ensure!(
        summary.final_progress.unlocked_rewards.len() == expected as usize,
        "{} rewards for {} solved",
        summary.final_progress.unlocked_rewards.len(),
        summary.final_progress.total_solved
    );
    Ok(())
}

fn reward_idempotence_expectation(summary: &SimulationSummary) -> Result<()> {
    let progress = &summary.final_progress;
    let resolution = resolve_rewards(
        &summary.config.rewards,
        progress.total_solved,
        &progress.unlocked_rewards,
        &summary.clock,
    );
    ensure!(
        resolution.newly_unlocked_rewards.is_empty(),
        "re-resolving unlocked {} more rewards",
        resolution.newly_unlocked_rewards.len()
    );
    ensure!(
        resolution.discarded_out_of_order_rewards == 0,
        "re-resolving discarded {} rewards",
        resolution.discarded_out_of_order_rewards
    );
    Ok(())
}

fn corrupted_save() -> Value {
    let first = RewardConfig::default_config().reward_for_milestone(1);
    let entry = json!({
        "reward_id": first.reward_id,
        "name": first.name,
        "image_path": first.image_path,
        "earned_at": "2023-11-05T08:00:00Z",
        "milestone_solved_count": first.milestone_solved_count,
    });
    json!({
        "total_solved": 17,
        "total_incorrect_attempts": 6,
        "unlocked_rewards": [entry.clone(), entry],
    })
}

fn corrupted_save_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.discarded_on_load == 1,
        "expected one discarded reward on load, got {}",
        summary.discarded_on_load
    );
    let start = &summary.starting_progress;
    ensure!(start.total_solved == 17, "solved count changed on load");
    ensure!(
        start.unlocked_rewards.len() == 3,
        "expected 3 rewards after healing, got {}",
        start.unlocked_rewards.len()
    );
    ensure!(
        start.unlocked_rewards[0].earned_at.to_rfc3339().starts_with("2023-11-05"),
        "valid prefix lost its original timestamp"
    );

    for (index, reward) in summary.final_progress.unlocked_rewards.iter().enumerate() {
        let milestone = u32::try_from(index + 1)?;
        let identity = summary.config.rewards.reward_for_milestone(milestone);
        ensure!(
            reward.reward_id == identity.reward_id && reward.name == identity.name,
            "reward {} is {} / {}, expected {} / {}",
            index + 1,
            reward.reward_id,
            reward.name,
            identity.reward_id,
            identity.name
        );
    }
    Ok(())
}

fn attempt_accounting_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut incorrect_total = 0_u64;
    for record in &summary.problems {
        let steps = u32::try_from(record.solution.steps.len())?;
        ensure!(
            record.submissions == steps + record.incorrect_attempts,
            "{}: {} submissions, {steps} steps, {} misses",
            record.problem.label(),
            record.submissions,
            record.incorrect_attempts
        );
        ensure!(
            record.hints_seen == record.incorrect_attempts,
            "{}: {} hints for {} misses",
            record.problem.label(),
            record.hints_seen,
            record.incorrect_attempts
        );
        incorrect_total += u64::from(record.incorrect_attempts);
    }
    let recorded = summary.final_progress.total_incorrect_attempts
        - summary.starting_progress.total_incorrect_attempts;
    ensure!(
        recorded == incorrect_total,
        "progress recorded {recorded} misses, problems saw {incorrect_total}"
    );
    Ok(())
}

fn guesser_expectation(summary: &SimulationSummary) -> Result<()> {
    let finished = summary.final_progress.total_solved - summary.starting_progress.total_solved;
    ensure!(
        finished as usize == summary.problems.len(),
        "guesser finished {finished} of {} problems",
        summary.problems.len()
    );
    for record in &summary.problems {
        let cap = record.solution.steps.len() * (MAX_ATTEMPTS_PER_STEP as usize + 1);
        ensure!(
            record.submissions as usize <= cap,
            "{}: {} submissions exceeds cap {cap}",
            record.problem.label(),
            record.submissions
        );
    }
    Ok(())
}
