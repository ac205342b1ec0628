pub mod learner;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use learner::LearnerStrategy;
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use simulation::{LearnerSimulator, SimulationOverrides, SimulationPlan, SimulationSummary};
pub use tester::*;
