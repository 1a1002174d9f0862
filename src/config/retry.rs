use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Basic retry policy template
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct BackoffPolicy {
    /// Maximum number of attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Backoff base (unit: milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff time (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl BackoffPolicy {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    fn validate(
        &self,
        name: &str,
    ) -> Result<()> {
        if self.base_delay_ms > self.max_delay_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "retry.{name}: base_delay_ms({}) must not exceed max_delay_ms({})",
                self.base_delay_ms, self.max_delay_ms
            ))));
        }
        Ok(())
    }
}

/// Divide strategies by operation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryPolicies {
    /// Retrying `cast_vote` after a timeout or transient storage failure
    #[serde(default)]
    pub cast_vote: BackoffPolicy,

    /// Compare-and-swap attempts when writing a recounted total
    #[serde(default = "default_recount_attempts")]
    pub recount_attempts: usize,
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            cast_vote: BackoffPolicy::default(),
            recount_attempts: default_recount_attempts(),
        }
    }
}

impl RetryPolicies {
    pub fn validate(&self) -> Result<()> {
        self.cast_vote.validate("cast_vote")?;
        if self.recount_attempts == 0 {
            return Err(Error::Config(ConfigError::Message(
                "retry.recount_attempts must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_max_retries() -> usize {
    3
}
fn default_base_delay_ms() -> u64 {
    50
}
fn default_max_delay_ms() -> u64 {
    1000
}
fn default_recount_attempts() -> usize {
    16
}
