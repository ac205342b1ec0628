pub mod catalog;

use crate::logic::SimulationPlan;
use catalog::catalog_scenarios;

/// Logic test scenario: a simulation plan plus its expectations.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: String,
    pub description: &'static str,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(
        key: &'static str,
        name: impl Into<String>,
        description: &'static str,
        plan: SimulationPlan,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            description,
            plan,
        }
    }
}

/// `(key, description)` for every registered scenario, in run order.
#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog_scenarios()
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = name.trim().to_lowercase();
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}
