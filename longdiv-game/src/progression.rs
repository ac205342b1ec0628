//! Difficulty progression from lifetime solved count.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::MAX_SOLVED_COUNT;
use crate::error::EngineError;
use crate::tiers::{DifficultyTable, DifficultyTier};

/// Tier whose threshold is the largest one not above `solved`.
#[must_use]
pub fn tier_for_solved_count(table: &DifficultyTable, solved: u32) -> &DifficultyTier {
    let tiers = table.tiers();
    let reached = tiers.partition_point(|tier| tier.minimum_solved_count <= solved);
    // Level 1 starts at zero, so at least one tier is always reached.
    &tiers[reached.saturating_sub(1)]
}

/// Level for a lifetime solved count. The top level is terminal.
#[must_use]
pub fn level_for_solved_count(table: &DifficultyTable, solved: u32) -> u8 {
    tier_for_solved_count(table, solved).level
}

/// Following level, or `None` at the terminal level.
#[must_use]
pub fn next_level(table: &DifficultyTable, solved: u32) -> Option<u8> {
    next_tier(table, solved).map(|tier| tier.level)
}

/// Problems still needed to reach the next threshold, or `None` at the top.
#[must_use]
pub fn problems_until_next_tier(table: &DifficultyTable, solved: u32) -> Option<u32> {
    next_tier(table, solved).map(|tier| tier.minimum_solved_count - solved)
}

fn next_tier(table: &DifficultyTable, solved: u32) -> Option<&DifficultyTier> {
    let current = tier_for_solved_count(table, solved).level;
    table.tier(current.checked_add(1)?).ok()
}

/// Everything a progress display needs, in one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionSnapshot {
    pub solved: u32,
    pub level: u8,
    pub next_level: Option<u8>,
    pub problems_until_next_tier: Option<u32>,
}

#[must_use]
pub fn progression_snapshot(table: &DifficultyTable, solved: u32) -> ProgressionSnapshot {
    ProgressionSnapshot {
        solved,
        level: level_for_solved_count(table, solved),
        next_level: next_level(table, solved),
        problems_until_next_tier: problems_until_next_tier(table, solved),
    }
}

/// Read a solved count from untrusted JSON.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSolvedCount`] for negative, fractional,
/// non-numeric values, or counts above [`MAX_SOLVED_COUNT`].
pub fn parse_solved_count(value: &Value) -> Result<u32, EngineError> {
    value
        .as_u64()
        .and_then(|count| u32::try_from(count).ok())
        .filter(|count| *count <= MAX_SOLVED_COUNT)
        .ok_or_else(|| EngineError::InvalidSolvedCount {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boundaries_promote_exactly_on_threshold() {
        let table = DifficultyTable::default_table();
        let cases = [
            (0, 1),
            (9, 1),
            (10, 2),
            (24, 2),
            (25, 3),
            (49, 3),
            (50, 4),
            (5_000, 4),
            (u32::MAX, 4),
        ];
        for (solved, level) in cases {
            assert_eq!(level_for_solved_count(&table, solved), level, "solved {solved}");
        }
    }

    #[test]
    fn gaps_and_next_levels() {
        let table = DifficultyTable::default_table();
        assert_eq!(problems_until_next_tier(&table, 0), Some(10));
        assert_eq!(problems_until_next_tier(&table, 24), Some(1));
        assert_eq!(problems_until_next_tier(&table, 50), None);
        assert_eq!(next_level(&table, 12), Some(3));
        assert_eq!(next_level(&table, 77), None);

        let snapshot = progression_snapshot(&table, 30);
        assert_eq!(snapshot.level, 3);
        assert_eq!(snapshot.next_level, Some(4));
        assert_eq!(snapshot.problems_until_next_tier, Some(20));
    }

    #[test]
    fn untrusted_counts_must_be_non_negative_integers() {
        assert_eq!(parse_solved_count(&json!(12)), Ok(12));
        assert_eq!(
            parse_solved_count(&json!(MAX_SOLVED_COUNT)),
            Ok(MAX_SOLVED_COUNT)
        );
        assert!(parse_solved_count(&json!(MAX_SOLVED_COUNT + 1)).is_err());
        for bad in [json!(-1), json!(2.5), json!("7"), json!(null), json!(u64::MAX), json!(u32::MAX)] {
            assert!(matches!(
                parse_solved_count(&bad),
                Err(EngineError::InvalidSolvedCount { .. })
            ));
        }
    }
}
