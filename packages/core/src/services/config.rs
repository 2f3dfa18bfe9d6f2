//! Outline configuration
//!
//! One flat record covering the tree guards, the renormalization schedule and
//! the sync worker's flush/retry budget. Every field has a default, so a JSON
//! document only needs the keys it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::services::error::ConfigError;
use crate::services::persistence::RetryPolicy;
use crate::tree::{TreeLimits, MAX_ITEMS_IN_LEVEL2, MAX_LEVEL, MAX_POS, PRECISION_DIGITS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Period of the scheduled renormalization pass (default: 20 seconds)
    pub renormalize_interval_secs: u64,
    /// Quiet period after the last wake before a pass runs (default: 500ms)
    pub renormalize_debounce_ms: u64,
    /// Period of the dirty-set flush (default: 10 seconds)
    pub flush_interval_secs: u64,
    /// Push attempts per batch before giving up (default: 10)
    pub max_push_attempts: u32,
    /// First retry delay, doubled per attempt (default: 100ms)
    pub retry_base_delay_ms: u64,
    /// Ceiling for the retry delay (default: 5 seconds)
    pub retry_max_delay_ms: u64,
    pub precision_digits: usize,
    pub max_level: usize,
    pub max_items_in_level2: usize,
    pub max_pos: f64,
    pub renormalize_pinned: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            renormalize_interval_secs: 20,
            renormalize_debounce_ms: 500,
            flush_interval_secs: 10,
            max_push_attempts: 10,
            retry_base_delay_ms: 100,
            retry_max_delay_ms: 5000,
            precision_digits: PRECISION_DIGITS,
            max_level: MAX_LEVEL,
            max_items_in_level2: MAX_ITEMS_IN_LEVEL2,
            max_pos: MAX_POS,
            renormalize_pinned: true,
        }
    }
}

impl OutlineConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.renormalize_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "renormalize_interval_secs",
                "must be greater than zero",
            ));
        }
        if self.flush_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "flush_interval_secs",
                "must be greater than zero",
            ));
        }
        if self.max_push_attempts == 0 {
            return Err(ConfigError::invalid(
                "max_push_attempts",
                "at least one attempt is required",
            ));
        }
        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            return Err(ConfigError::invalid(
                "retry_base_delay_ms",
                format!(
                    "{} exceeds retry_max_delay_ms ({})",
                    self.retry_base_delay_ms, self.retry_max_delay_ms
                ),
            ));
        }
        if self.precision_digits == 0 {
            return Err(ConfigError::invalid(
                "precision_digits",
                "must be greater than zero",
            ));
        }
        if self.max_level == 0 {
            return Err(ConfigError::invalid("max_level", "must be greater than zero"));
        }
        if self.max_items_in_level2 == 0 {
            return Err(ConfigError::invalid(
                "max_items_in_level2",
                "must be greater than zero",
            ));
        }
        if !self.max_pos.is_finite() || self.max_pos <= 0.0 {
            return Err(ConfigError::invalid(
                "max_pos",
                format!("{} is not a positive finite number", self.max_pos),
            ));
        }
        Ok(())
    }

    pub fn tree_limits(&self) -> TreeLimits {
        TreeLimits {
            max_level: self.max_level,
            max_items_in_level2: self.max_items_in_level2,
            max_pos: self.max_pos,
            precision_digits: self.precision_digits,
            renormalize_pinned: self.renormalize_pinned,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_push_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    pub fn renormalize_interval(&self) -> Duration {
        Duration::from_secs(self.renormalize_interval_secs)
    }

    pub fn renormalize_debounce(&self) -> Duration {
        Duration::from_millis(self.renormalize_debounce_ms)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}
