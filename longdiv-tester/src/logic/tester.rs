use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::seeds::SeedInfo;
use crate::logic::simulation::{
    LearnerSimulator, RunMetrics, SimulationOverrides, SimulationPlan, SimulationSummary,
};
use crate::scenario::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub strategy: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
    #[serde(skip_deserializing)]
    pub runs: Vec<RunRecord>,
}

/// Per-iteration metrics row, one line of the CSV report.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub scenario_name: String,
    pub strategy: String,
    pub seed_code: String,
    pub seed_value: u64,
    pub passed: bool,
    pub metrics: RunMetrics,
}

pub struct LogicTester {
    verbose: bool,
    overrides: SimulationOverrides,
}

impl LogicTester {
    pub const fn new(verbose: bool, overrides: SimulationOverrides) -> Self {
        Self { verbose, overrides }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let plan = scenario.plan.clone().with_overrides(&self.overrides);
        let mut results = Vec::new();

        for seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (learner: {} seed: {})",
                    scenario.name.bright_white(),
                    plan.strategy,
                    seed.display_code()
                );
            }

            results.push(self.run_single_scenario(scenario, &plan, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        plan: &SimulationPlan,
        seed: &SeedInfo,
        iterations: usize,
    ) -> ScenarioResult {
        let simulator = LearnerSimulator::new(self.verbose);
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut runs = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed
                .seed
                .wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = simulator
                .run_plan(plan, iteration_seed, seed.level)
                .and_then(|summary| evaluate_expectations(plan, &summary).map(|()| summary));

            match outcome {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) solved:{} level:{} rewards:{}",
                            i + 1,
                            iterations,
                            summary.metrics.problems_solved,
                            summary.metrics.final_level,
                            summary.metrics.rewards_unlocked
                        );
                    }
                    runs.push(run_record(scenario, plan, seed, &summary, true));
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (learner {}, seed {}): {err:#}",
                        i + 1,
                        plan.strategy,
                        iteration_seed
                    );
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            format!("{err:#}").red()
                        );
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            strategy: plan.strategy.label().to_string(),
            seed: seed.seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
            runs,
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> anyhow::Result<()> {
    for expectation in &plan.expectations {
        expectation.evaluate(summary)?;
    }
    Ok(())
}

fn run_record(
    scenario: &TestScenario,
    plan: &SimulationPlan,
    seed: &SeedInfo,
    summary: &SimulationSummary,
    passed: bool,
) -> RunRecord {
    RunRecord {
        scenario_name: scenario.name.clone(),
        strategy: plan.strategy.label().to_string(),
        seed_code: seed.display_code(),
        seed_value: summary.seed,
        passed,
        metrics: summary.metrics.clone(),
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|ms| Duration::from_millis(u64::try_from(ms).unwrap_or(0)))
            .collect())
    }
}
