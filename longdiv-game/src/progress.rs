//! Lifetime player progress: solved count, mistakes, and unlocked rewards.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Clock;
use crate::constants::{LOG_LEVEL_UP, MAX_SOLVED_COUNT};
use crate::error::EngineError;
use crate::progression::{level_for_solved_count, parse_solved_count};
use crate::rewards::{RewardConfig, UnlockedReward, resolve_rewards, resolve_rewards_from_json};
use crate::tiers::DifficultyTable;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub total_solved: u32,
    #[serde(default)]
    pub total_incorrect_attempts: u64,
    #[serde(default)]
    pub unlocked_rewards: Vec<UnlockedReward>,
}

/// Result of folding one event into progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub progress: PlayerProgress,
    pub newly_unlocked: Vec<UnlockedReward>,
    pub previous_level: u8,
    pub level: u8,
    pub leveled_up: bool,
    pub discarded_rewards: usize,
}

impl PlayerProgress {
    #[must_use]
    pub fn level(&self, table: &DifficultyTable) -> u8 {
        level_for_solved_count(table, self.total_solved)
    }

    /// Count one more solved problem and resolve any rewards it earns.
    #[must_use]
    pub fn record_solve<C>(
        &self,
        incorrect_attempts: u32,
        table: &DifficultyTable,
        rewards: &RewardConfig,
        clock: &C,
    ) -> ProgressUpdate
    where
        C: Clock + ?Sized,
    {
        let previous_level = self.level(table);
        let total_solved = self.total_solved.saturating_add(1).min(MAX_SOLVED_COUNT);
        let resolution = resolve_rewards(rewards, total_solved, &self.unlocked_rewards, clock);
        let progress = Self {
            total_solved,
            total_incorrect_attempts: self
                .total_incorrect_attempts
                .saturating_add(u64::from(incorrect_attempts)),
            unlocked_rewards: resolution.unlocked_rewards,
        };
        let level = progress.level(table);
        if level > previous_level {
            log::debug!("{LOG_LEVEL_UP}: {previous_level} -> {level} at {total_solved} solved");
        }
        ProgressUpdate {
            progress,
            newly_unlocked: resolution.newly_unlocked_rewards,
            previous_level,
            level,
            leveled_up: level > previous_level,
            discarded_rewards: resolution.discarded_out_of_order_rewards,
        }
    }

    /// Re-derive the reward list from the solved count, healing a loaded save.
    #[must_use]
    pub fn reconcile<C>(&self, table: &DifficultyTable, rewards: &RewardConfig, clock: &C) -> ProgressUpdate
    where
        C: Clock + ?Sized,
    {
        let level = self.level(table);
        let resolution = resolve_rewards(rewards, self.total_solved, &self.unlocked_rewards, clock);
        ProgressUpdate {
            progress: Self {
                unlocked_rewards: resolution.unlocked_rewards,
                ..self.clone()
            },
            newly_unlocked: resolution.newly_unlocked_rewards,
            previous_level: level,
            level,
            leveled_up: false,
            discarded_rewards: resolution.discarded_out_of_order_rewards,
        }
    }

    /// Decode a raw save value without trusting its reward list.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSolvedCount`] when `total_solved` is
    /// missing, negative, fractional, or not a number.
    pub fn from_json_lenient<C>(
        raw: &Value,
        table: &DifficultyTable,
        rewards: &RewardConfig,
        clock: &C,
    ) -> Result<ProgressUpdate, EngineError>
    where
        C: Clock + ?Sized,
    {
        let total_solved = parse_solved_count(raw.get("total_solved").unwrap_or(&Value::Null))?;
        let total_incorrect_attempts = raw
            .get("total_incorrect_attempts")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let resolution = resolve_rewards_from_json(
            rewards,
            total_solved,
            raw.get("unlocked_rewards").unwrap_or(&Value::Null),
            clock,
        );
        let level = level_for_solved_count(table, total_solved);
        Ok(ProgressUpdate {
            progress: Self {
                total_solved,
                total_incorrect_attempts,
                unlocked_rewards: resolution.unlocked_rewards,
            },
            newly_unlocked: resolution.newly_unlocked_rewards,
            previous_level: level,
            level,
            leveled_up: false,
            discarded_rewards: resolution.discarded_out_of_order_rewards,
        })
    }
}
