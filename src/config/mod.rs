//! Configuration management for the vote engine.
//!
//! Provides hierarchical configuration loading from multiple sources with priority:
//! 1. Default values (hardcoded)
//! 2. `config/vote.toml`
//! 3. File named by the `CONFIG_PATH` environment variable
//! 4. Environment variables prefixed with `VOTE__` (highest priority)

mod ledger;
mod results;
mod retry;
mod storage;
pub use ledger::*;
pub use results::*;
pub use retry::*;
pub use storage::*;


//---
use std::env;
use std::path::PathBuf;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Durable store location and sled tuning
    #[serde(default)]
    pub storage: StorageConfig,
    /// Advisory vote cache
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Who may see tallies, and when
    #[serde(default)]
    pub results: ResultsConfig,
    /// Retry policies for transient failures
    #[serde(default)]
    pub retry: RetryPolicies,
    /// Where the binary writes its log file
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            ledger: LedgerConfig::default(),
            results: ResultsConfig::default(),
            retry: RetryPolicies::default(),
            log_dir: default_log_dir(),
        }
    }
}

impl Settings {
    /// Load configuration from every source, highest priority last.
    pub fn load() -> Result<Self> {
        let mut config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/vote").required(false));

        if let Ok(path) = env::var("CONFIG_PATH") {
            config = config.add_source(File::with_name(&path).required(true));
        }

        config = config.add_source(
            Environment::with_prefix("VOTE")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = config.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Layers an extra file on top of the current values.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path).required(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::Message("log_dir cannot be empty".into())));
        }
        self.storage.validate()?;
        self.ledger.validate()?;
        self.retry.validate()?;
        Ok(())
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp/vote-engine/logs")
}
