//! Difficulty tier table shared by the generator and progression.
//!
//! One ordered table holds both views of a level: the digit ranges used when
//! sampling problems and the lifetime solved count that unlocks the level.
//! Generation and progression always read the same table, so they cannot
//! disagree about what a level means.
use serde::{Deserialize, Serialize};

use crate::constants::MAX_TIER_DIGITS;
use crate::error::{ConfigError, EngineError};
use crate::numbers::digit_bounds;

/// A single difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTier {
    pub level: u8,
    pub min_dividend_digits: u8,
    pub max_dividend_digits: u8,
    pub min_divisor_digits: u8,
    pub max_divisor_digits: u8,
    /// Lifetime solved problems required to reach this level.
    pub minimum_solved_count: u32,
}

impl DifficultyTier {
    const fn new(
        level: u8,
        dividend_digits: (u8, u8),
        divisor_digits: (u8, u8),
        minimum_solved_count: u32,
    ) -> Self {
        Self {
            level,
            min_dividend_digits: dividend_digits.0,
            max_dividend_digits: dividend_digits.1,
            min_divisor_digits: divisor_digits.0,
            max_divisor_digits: divisor_digits.1,
            minimum_solved_count,
        }
    }

    /// Inclusive dividend bounds implied by the digit range.
    #[must_use]
    pub fn dividend_bounds(&self) -> (u64, u64) {
        digit_bounds(self.min_dividend_digits, self.max_dividend_digits)
    }

    /// Inclusive divisor bounds implied by the digit range.
    #[must_use]
    pub fn divisor_bounds(&self) -> (u64, u64) {
        digit_bounds(self.min_divisor_digits, self.max_divisor_digits)
    }
}

const REFERENCE_TIERS: [DifficultyTier; 4] = [
    // 84 ÷ 4
    DifficultyTier::new(1, (2, 2), (1, 1), 0),
    // 372 ÷ 6
    DifficultyTier::new(2, (3, 3), (1, 1), 10),
    // 7035 ÷ 5
    DifficultyTier::new(3, (3, 4), (1, 1), 25),
    // 48_213 ÷ 37
    DifficultyTier::new(4, (4, 5), (2, 2), 50),
];

/// Ordered, validated list of tiers. Level 1 always begins at zero solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct DifficultyTable {
    tiers: Vec<DifficultyTier>,
}

#[derive(Serialize, Deserialize)]
struct RawTable {
    tiers: Vec<DifficultyTier>,
}

impl TryFrom<RawTable> for DifficultyTable {
    type Error = ConfigError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        Self::new(raw.tiers)
    }
}

impl From<DifficultyTable> for RawTable {
    fn from(table: DifficultyTable) -> Self {
        Self { tiers: table.tiers }
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self::default_table()
    }
}

impl DifficultyTable {
    /// Build a table, rejecting anything that breaks the ordering invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated invariant.
    pub fn new(tiers: Vec<DifficultyTier>) -> Result<Self, ConfigError> {
        validate_tiers(&tiers)?;
        Ok(Self { tiers })
    }

    /// The reference deployment's four levels.
    #[must_use]
    pub fn default_table() -> Self {
        Self {
            tiers: REFERENCE_TIERS.to_vec(),
        }
    }

    /// Load a table from JSON of the form `{"tiers": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the table is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawTable = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Re-check the ordering invariants. Tables built through `new`, `from_json`
    /// or deserialization already hold them.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tiers(&self.tiers)
    }

    #[must_use]
    pub fn tiers(&self) -> &[DifficultyTier] {
        &self.tiers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Highest level in the table; promotion stops here.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        self.tiers.last().map_or(1, |tier| tier.level)
    }

    /// Look up a tier by level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownLevel`] when the level is not in the table.
    pub fn tier(&self, level: u8) -> Result<&DifficultyTier, EngineError> {
        usize::from(level)
            .checked_sub(1)
            .and_then(|idx| self.tiers.get(idx))
            .ok_or(EngineError::UnknownLevel { level })
    }
}

fn validate_tiers(tiers: &[DifficultyTier]) -> Result<(), ConfigError> {
    let first = tiers.first().ok_or(ConfigError::EmptyTable)?;
    if first.minimum_solved_count != 0 {
        return Err(ConfigError::FirstThreshold {
            threshold: first.minimum_solved_count,
        });
    }

    let mut previous: Option<u32> = None;
    for (position, tier) in tiers.iter().enumerate() {
        if usize::from(tier.level) != position + 1 {
            return Err(ConfigError::LevelSequence {
                position,
                level: tier.level,
            });
        }
        if let Some(previous) = previous
            && tier.minimum_solved_count <= previous
        {
            return Err(ConfigError::ThresholdOrder {
                level: tier.level,
                threshold: tier.minimum_solved_count,
                previous,
            });
        }
        previous = Some(tier.minimum_solved_count);

        check_digits(tier.level, "dividend", tier.min_dividend_digits, tier.max_dividend_digits)?;
        check_digits(tier.level, "divisor", tier.min_divisor_digits, tier.max_divisor_digits)?;
        if tier.max_divisor_digits > tier.max_dividend_digits {
            return Err(ConfigError::DivisorWiderThanDividend {
                level: tier.level,
                max: tier.max_dividend_digits,
            });
        }
    }
    Ok(())
}

fn check_digits(level: u8, field: &'static str, min: u8, max: u8) -> Result<(), ConfigError> {
    if min == 0 || min > max || max > MAX_TIER_DIGITS {
        return Err(ConfigError::DigitRange {
            level,
            field,
            min,
            max,
        });
    }
    Ok(())
}
