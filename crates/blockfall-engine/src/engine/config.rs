use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

use super::bag::PieceSeed;

/// Maximum number of pieces shown in the next queue.
pub const MAX_NEXT_QUEUE_LEN: usize = 7;

/// Tunables for a [`GameSession`](super::GameSession).
///
/// Missing fields take their default values when deserialized, so a config
/// file only needs to name what it changes:
///
/// ```
/// use blockfall_engine::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "next_queue_len": 3 }"#).unwrap();
/// assert_eq!(config.next_queue_len, 3);
/// assert_eq!(config.lock_delay_ms, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Pieces visible in the next queue (1..=7).
    pub next_queue_len: usize,
    /// Lock-delay duration in milliseconds.
    pub lock_delay_ms: u64,
    /// Grounded move/rotate resets allowed before a forced lock.
    pub max_lock_resets: u32,
    /// Countdown length; `None` plays untimed.
    pub time_limit_secs: Option<u64>,
    /// Seed of the piece randomizer; random when absent.
    pub seed: Option<PieceSeed>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            next_queue_len: 5,
            lock_delay_ms: 500,
            max_lock_resets: 15,
            time_limit_secs: Some(120),
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_NEXT_QUEUE_LEN).contains(&self.next_queue_len) {
            return Err(ConfigError::NextQueueLength {
                len: self.next_queue_len,
                max: MAX_NEXT_QUEUE_LEN,
            });
        }
        if self.lock_delay_ms == 0 {
            return Err(ConfigError::ZeroLockDelay);
        }
        if self.time_limit_secs == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(())
    }

    #[must_use]
    pub fn lock_delay(&self) -> Duration {
        Duration::from_millis(self.lock_delay_ms)
    }
}
