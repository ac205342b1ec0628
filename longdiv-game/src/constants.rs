//! Centralized tuning constants for the long-division engine.
//!
//! These values define the deterministic math of the practice loop. Keeping
//! them together means difficulty and reward pacing only change through
//! reviewed code, not through ad-hoc literals scattered across modules.

// Generation ----------------------------------------------------------------
/// Smallest divisor the generator will ever produce.
pub const MIN_GENERATED_DIVISOR: u64 = 2;
/// Upper bound on resampling before generation reports a configuration error.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10_000;
/// Digit ceiling for tier ranges so every sampled dividend fits in a `u64`.
pub const MAX_TIER_DIGITS: u8 = 18;
/// Domain tag for the problem stream of a seeded session.
pub(crate) const PROBLEM_STREAM_TAG: &[u8] = b"problems";
/// Prefix for generated problem identifiers.
pub(crate) const PROBLEM_ID_PREFIX: &str = "div";

// Progress ------------------------------------------------------------------
/// Largest lifetime solved count accepted from a save; recording stops here.
pub const MAX_SOLVED_COUNT: u32 = 1_000_000;

// Validation ----------------------------------------------------------------
/// Number of distinct hint messages per step kind.
pub const HINT_ROTATION: usize = 3;

// Rewards -------------------------------------------------------------------
/// Solved problems between reward milestones.
pub const DEFAULT_REWARD_INTERVAL: u32 = 5;
/// Highest milestone the resolver will materialize; larger ceilings are clamped.
pub const MAX_REWARD_MILESTONES: u32 = 10_000;
/// Directory prefix for reward artwork assets.
pub(crate) const REWARD_ASSET_DIR: &str = "rewards";
/// Prefix for reward identifiers.
pub(crate) const REWARD_ID_PREFIX: &str = "reward";

// Logging keys --------------------------------------------------------------
pub(crate) const LOG_GENERATION_RESAMPLE: &str = "log.generator.resample";
pub(crate) const LOG_GENERATION_EXHAUSTED: &str = "log.generator.exhausted";
pub(crate) const LOG_REWARDS_TRUNCATED: &str = "log.rewards.truncated";
pub(crate) const LOG_REWARDS_UNLOCKED: &str = "log.rewards.unlocked";
pub(crate) const LOG_LEVEL_UP: &str = "log.progress.level-up";
pub(crate) const LOG_PROBLEM_SOLVED: &str = "log.session.solved";
