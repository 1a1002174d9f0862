use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the sled database
    #[serde(default = "default_db_dir")]
    pub db_root_dir: PathBuf,

    /// sled page cache size
    #[serde(default = "default_cache_capacity_bytes")]
    pub cache_capacity_bytes: u64,

    /// Background flush interval. `None` disables periodic flushing.
    #[serde(default = "default_flush_every_ms")]
    pub flush_every_ms: Option<u64>,

    /// Upper bound for a single storage call issued by `cast_vote`.
    /// A call exceeding it has an unknown outcome.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_root_dir: default_db_dir(),
            cache_capacity_bytes: default_cache_capacity_bytes(),
            flush_every_ms: default_flush_every_ms(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.db_root_dir.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "storage.db_root_dir cannot be empty".into(),
            )));
        }
        if self.op_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "storage.op_timeout_ms must be at least 1ms".into(),
            )));
        }
        if self.flush_every_ms == Some(0) {
            return Err(Error::Config(ConfigError::Message(
                "storage.flush_every_ms cannot be 0, omit it to disable flushing".into(),
            )));
        }
        Ok(())
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

fn default_db_dir() -> PathBuf {
    PathBuf::from("/tmp/vote-engine/db")
}
fn default_cache_capacity_bytes() -> u64 {
    64 * 1024 * 1024 //64MB
}
fn default_flush_every_ms() -> Option<u64> {
    Some(3)
}
fn default_op_timeout_ms() -> u64 {
    2_000
}
