use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Settings for the advisory "has voted" cache in front of the ledger.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Maximum number of (poll, voter) pairs kept in memory. Once reached,
    /// new pairs are simply not cached.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cache_enabled: default_cache_enabled(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cache_enabled && self.cache_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "ledger.cache_capacity must be greater than 0 when the cache is enabled".into(),
            )));
        }
        Ok(())
    }
}

fn default_cache_enabled() -> bool {
    true
}
fn default_cache_capacity() -> usize {
    100_000
}
