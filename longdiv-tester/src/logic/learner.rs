use std::fmt;
use std::str::FromStr;

use longdiv_game::{Step, StepKind, derive_stream_seed};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// After this many misses on one step every learner looks up the answer.
pub const MAX_ATTEMPTS_PER_STEP: u32 = 25;

const LEARNER_STREAM_TAG: &[u8] = b"learner";

/// Policy interface for simulated learners.
pub trait LearnerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Produce an answer for `step`, given how many times it was already missed.
    fn answer(&mut self, step: &Step, divisor: u64, attempt: u32) -> String;
}

/// Built-in learner strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LearnerStrategy {
    Perfect,
    Careless,
    Struggling,
    Guesser,
}

impl LearnerStrategy {
    pub const ALL: [Self; 4] = [Self::Perfect, Self::Careless, Self::Struggling, Self::Guesser];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Careless => "Careless",
            Self::Struggling => "Struggling",
            Self::Guesser => "Guesser",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn LearnerPolicy + Send> {
        let rng = ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, LEARNER_STREAM_TAG));
        match self {
            Self::Perfect => Box::new(PerfectLearner),
            Self::Careless => Box::new(SlippingLearner {
                name: "Careless",
                slip_chance: 0.1,
                rng,
            }),
            Self::Struggling => Box::new(SlippingLearner {
                name: "Struggling",
                slip_chance: 0.45,
                rng,
            }),
            Self::Guesser => Box::new(GuessingLearner { rng }),
        }
    }
}

impl fmt::Display for LearnerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LearnerStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.label().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

struct PerfectLearner;

/// Answers correctly except for random slips, each off by one.
struct SlippingLearner {
    name: &'static str,
    slip_chance: f64,
    rng: ChaCha20Rng,
}

/// Knows nothing and guesses inside a plausible range until it lands.
struct GuessingLearner {
    rng: ChaCha20Rng,
}

impl LearnerPolicy for PerfectLearner {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn answer(&mut self, step: &Step, _divisor: u64, _attempt: u32) -> String {
        step.answer().to_string()
    }
}

impl LearnerPolicy for SlippingLearner {
    fn name(&self) -> &'static str {
        self.name
    }

    fn answer(&mut self, step: &Step, _divisor: u64, attempt: u32) -> String {
        // Each retry is a little more careful.
        let chance = self.slip_chance / f64::from(attempt + 1);
        if attempt >= MAX_ATTEMPTS_PER_STEP || !self.rng.gen_bool(chance) {
            return step.answer().to_string();
        }
        let expected = step.answer();
        let wrong = if expected == 0 || self.rng.gen_bool(0.5) {
            expected + 1
        } else {
            expected - 1
        };
        wrong.to_string()
    }
}

impl LearnerPolicy for GuessingLearner {
    fn name(&self) -> &'static str {
        "Guesser"
    }

    fn answer(&mut self, step: &Step, divisor: u64, attempt: u32) -> String {
        if attempt >= MAX_ATTEMPTS_PER_STEP {
            return step.answer().to_string();
        }
        let upper = guess_ceiling(step, divisor);
        let guess = self.rng.gen_range(0..=upper);
        guess.to_string()
    }
}

fn guess_ceiling(step: &Step, divisor: u64) -> u64 {
    match step.kind() {
        StepKind::QuotientDigit | StepKind::BringDown => 9,
        StepKind::SubtractionResult => divisor.saturating_sub(1),
        StepKind::MultiplyResult => divisor.saturating_mul(9),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use longdiv_game::{DivisionProblem, solve};

    fn steps() -> (Vec<Step>, u64) {
        let problem = DivisionProblem::new("learner", 48_213, 37, 4).unwrap();
        (solve(&problem).unwrap().steps, problem.divisor)
    }

    #[test]
    fn perfect_learner_never_slips() {
        let (steps, divisor) = steps();
        let mut policy = LearnerStrategy::Perfect.create_policy(1);
        for step in &steps {
            let answer = policy.answer(step, divisor, 0);
            assert_eq!(answer, step.answer().to_string());
        }
    }

    #[test]
    fn every_learner_gives_up_guessing_at_the_cap() {
        let (steps, divisor) = steps();
        for strategy in LearnerStrategy::ALL {
            let mut policy = strategy.create_policy(9);
            for step in &steps {
                let answer = policy.answer(step, divisor, MAX_ATTEMPTS_PER_STEP);
                assert_eq!(answer, step.answer().to_string(), "{strategy}");
            }
        }
    }

    #[test]
    fn policies_are_deterministic_per_seed() {
        let (steps, divisor) = steps();
        let run = |seed| {
            let mut policy = LearnerStrategy::Struggling.create_policy(seed);
            steps
                .iter()
                .map(|step| policy.answer(step, divisor, 0))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn strategy_names_parse() {
        assert_eq!("careless".parse(), Ok(LearnerStrategy::Careless));
        assert_eq!(" GUESSER ".parse(), Ok(LearnerStrategy::Guesser));
        assert!("lucky".parse::<LearnerStrategy>().is_err());
    }
}
