//! Runtime configuration structures and loaders.
use std::env;

use battle_core::{CorrectivePolicy, TrackerConfig};

/// Configuration shared by the scheduler and the battle log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub tracker: TrackerConfig,
    /// Rounds played by [`BattleScheduler::run`] before giving up.
    ///
    /// [`BattleScheduler::run`]: crate::BattleScheduler::run
    pub max_rounds: u32,
    /// Number of entries the battle log keeps before dropping the oldest.
    pub log_capacity: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_MAX_ROUNDS: u32 = 20;
    pub const DEFAULT_LOG_CAPACITY: usize = 256;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_CORRECTIVE_POLICY` - `unresolved-only` or `all-members` (default: unresolved-only)
    /// - `BATTLE_MAX_ROUNDS` - Round limit for a full battle run (default: 20)
    /// - `BATTLE_LOG_CAPACITY` - Battle log capacity (default: 256)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(policy) = read_env::<CorrectivePolicy>("BATTLE_CORRECTIVE_POLICY") {
            config.tracker.corrective_policy = policy;
        }

        if let Some(rounds) = read_env::<u32>("BATTLE_MAX_ROUNDS") {
            config.max_rounds = rounds.max(1);
        }

        if let Some(capacity) = read_env::<usize>("BATTLE_LOG_CAPACITY") {
            config.log_capacity = capacity.max(1);
        }

        config
    }

    pub fn with_policy(mut self, policy: CorrectivePolicy) -> Self {
        self.tracker.corrective_policy = policy;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            log_capacity: Self::DEFAULT_LOG_CAPACITY,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
