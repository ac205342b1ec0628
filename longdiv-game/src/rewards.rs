//! Milestone rewards earned every few solved problems.
//!
//! Reward identity is a pure function of the milestone number. Persisted
//! unlock lists are untrusted: the resolver keeps only the longest prefix that
//! matches the canonical sequence, drops the rest, and fills forward to the
//! ceiling implied by the solved count. Resolving its own output again is a
//! no-op.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::clock::Clock;
use crate::constants::{
    DEFAULT_REWARD_INTERVAL, LOG_REWARDS_TRUNCATED, LOG_REWARDS_UNLOCKED, MAX_REWARD_MILESTONES,
    REWARD_ASSET_DIR, REWARD_ID_PREFIX,
};
use crate::error::ConfigError;

/// A collectible in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTemplate {
    pub slug: String,
    pub name: String,
}

const DEFAULT_CATALOG: [(&str, &str); 12] = [
    ("comet-cat", "Comet Cat"),
    ("quotient-quokka", "Quotient Quokka"),
    ("remainder-raccoon", "Remainder Raccoon"),
    ("digit-dragon", "Digit Dragon"),
    ("divisor-dolphin", "Divisor Dolphin"),
    ("bus-stop-badger", "Bus Stop Badger"),
    ("zero-zebra", "Zero Zebra"),
    ("multiply-moth", "Multiply Moth"),
    ("subtraction-seal", "Subtraction Seal"),
    ("bring-down-bear", "Bring-Down Bear"),
    ("place-value-puffin", "Place Value Puffin"),
    ("long-division-lynx", "Long Division Lynx"),
];

/// Reward cadence and catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "RewardConfig::default_interval")]
    pub interval: u32,
    pub catalog: Vec<RewardTemplate>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Canonical identity of the reward for one milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardIdentity {
    pub reward_id: String,
    pub name: String,
    pub image_path: String,
    pub milestone_solved_count: u32,
}

impl RewardConfig {
    const fn default_interval() -> u32 {
        DEFAULT_REWARD_INTERVAL
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self {
            interval: DEFAULT_REWARD_INTERVAL,
            catalog: DEFAULT_CATALOG
                .iter()
                .map(|(slug, name)| RewardTemplate {
                    slug: (*slug).to_string(),
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }

    /// Load and validate a reward config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the config is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::ZeroRewardInterval);
        }
        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyRewardCatalog);
        }
        let mut seen = HashSet::new();
        for (position, template) in self.catalog.iter().enumerate() {
            if template.slug.trim().is_empty() || template.name.trim().is_empty() {
                return Err(ConfigError::BlankRewardTemplate { position });
            }
            if !seen.insert(template.slug.as_str()) {
                return Err(ConfigError::DuplicateRewardSlug {
                    slug: template.slug.clone(),
                });
            }
        }
        Ok(())
    }

    /// Highest milestone earned at `total_solved`, capped at [`MAX_REWARD_MILESTONES`].
    #[must_use]
    pub fn milestone_ceiling(&self, total_solved: u32) -> u32 {
        (total_solved / self.interval.max(1)).min(MAX_REWARD_MILESTONES)
    }

    /// Reward for milestone `milestone` (1-based). Wraps the catalog, adding a
    /// cycle suffix to the name on later laps.
    #[must_use]
    pub fn reward_for_milestone(&self, milestone: u32) -> RewardIdentity {
        let index = usize::try_from(milestone.saturating_sub(1)).unwrap_or(0);
        let len = self.catalog.len().max(1);
        let lap = index / len;
        let (slug, base_name) = self
            .catalog
            .get(index % len)
            .map_or(("reward", "Reward"), |t| (t.slug.as_str(), t.name.as_str()));
        let name = if lap == 0 {
            base_name.to_string()
        } else {
            format!("{base_name} #{}", lap + 1)
        };
        RewardIdentity {
            reward_id: format!("{REWARD_ID_PREFIX}-{milestone:03}"),
            name,
            image_path: format!("{REWARD_ASSET_DIR}/{slug}.png"),
            milestone_solved_count: milestone.saturating_mul(self.interval),
        }
    }
}

/// A reward the player has earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedReward {
    pub reward_id: String,
    pub name: String,
    pub image_path: String,
    pub earned_at: DateTime<Utc>,
    pub milestone_solved_count: u32,
}

impl UnlockedReward {
    fn earned(identity: RewardIdentity, earned_at: DateTime<Utc>) -> Self {
        Self {
            reward_id: identity.reward_id,
            name: identity.name,
            image_path: identity.image_path,
            earned_at,
            milestone_solved_count: identity.milestone_solved_count,
        }
    }

    fn matches(&self, identity: &RewardIdentity) -> bool {
        self.reward_id == identity.reward_id
            && self.name == identity.name
            && self.image_path == identity.image_path
            && self.milestone_solved_count == identity.milestone_solved_count
    }
}

/// Reconciled unlock state plus what changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardResolution {
    pub unlocked_rewards: Vec<UnlockedReward>,
    pub newly_unlocked_rewards: Vec<UnlockedReward>,
    pub highest_earned_reward_number: u32,
    pub next_reward_number: u32,
    /// Solved count at which the next reward unlocks.
    pub next_reward_at: u32,
    pub discarded_out_of_order_rewards: usize,
}

impl RewardResolution {
    #[must_use]
    pub fn problems_until_next_reward(&self, total_solved: u32) -> u32 {
        self.next_reward_at.saturating_sub(total_solved)
    }
}

/// Reconcile a persisted unlock list against the current solved count.
pub fn resolve_rewards<C>(
    cfg: &RewardConfig,
    total_solved: u32,
    existing: &[UnlockedReward],
    clock: &C,
) -> RewardResolution
where
    C: Clock + ?Sized,
{
    let ceiling = cfg.milestone_ceiling(total_solved);
    let kept = valid_prefix_len(cfg, ceiling, existing);
    let discarded = existing.len() - kept;
    if discarded > 0 {
        log::warn!(
            "{LOG_REWARDS_TRUNCATED}: kept {kept} of {} persisted rewards (ceiling {ceiling})",
            existing.len()
        );
    }

    let mut unlocked: Vec<UnlockedReward> = existing[..kept].to_vec();
    let first_new = u32::try_from(kept).map_or(u32::MAX, |k| k.saturating_add(1));
    let mut newly = Vec::new();
    if first_new <= ceiling {
        let earned_at = clock.now();
        for milestone in first_new..=ceiling {
            newly.push(UnlockedReward::earned(
                cfg.reward_for_milestone(milestone),
                earned_at,
            ));
        }
        log::debug!(
            "{LOG_REWARDS_UNLOCKED}: {} new reward(s) at {total_solved} solved",
            newly.len()
        );
    }
    unlocked.extend(newly.iter().cloned());

    let next_reward_number = ceiling.saturating_add(1);
    RewardResolution {
        unlocked_rewards: unlocked,
        newly_unlocked_rewards: newly,
        highest_earned_reward_number: ceiling,
        next_reward_number,
        next_reward_at: next_reward_number.saturating_mul(cfg.interval),
        discarded_out_of_order_rewards: discarded,
    }
}

/// Same as [`resolve_rewards`], for a raw JSON value straight from a save file.
///
/// Entries are decoded in order; the first entry that does not decode ends the
/// usable prefix. `null` is an empty list; any other non-array value counts as
/// one discarded entry.
pub fn resolve_rewards_from_json<C>(
    cfg: &RewardConfig,
    total_solved: u32,
    existing: &Value,
    clock: &C,
) -> RewardResolution
where
    C: Clock + ?Sized,
{
    let (decoded, undecodable) = match existing {
        Value::Null => (Vec::new(), 0),
        Value::Array(items) => {
            let decoded: Vec<UnlockedReward> = items
                .iter()
                .map_while(|item| serde_json::from_value(item.clone()).ok())
                .collect();
            let undecodable = items.len() - decoded.len();
            (decoded, undecodable)
        }
        _ => (Vec::new(), 1),
    };
    let mut resolution = resolve_rewards(cfg, total_solved, &decoded, clock);
    resolution.discarded_out_of_order_rewards += undecodable;
    resolution
}

fn valid_prefix_len(cfg: &RewardConfig, ceiling: u32, existing: &[UnlockedReward]) -> usize {
    existing
        .iter()
        .zip(1..=ceiling)
        .take_while(|(reward, milestone)| reward.matches(&cfg.reward_for_milestone(*milestone)))
        .count()
}
