mod sled_adapter;
mod vote_store;


use std::path::Path;

#[doc(hidden)]
pub use sled_adapter::*;
pub use vote_store::*;
use tracing::debug;
use tracing::warn;

use crate::StorageConfig;
use crate::StorageError;

/// Opens the sled database backing every ledger relation.
pub fn init_sled_db(config: &StorageConfig) -> std::result::Result<sled::Db, StorageError> {
    init_sled_db_at(&config.db_root_dir, config)
}

pub fn init_sled_db_at(
    db_root_path: impl AsRef<Path> + std::fmt::Debug,
    config: &StorageConfig,
) -> std::result::Result<sled::Db, StorageError> {
    debug!("init_sled_db from path: {:?}", &db_root_path);

    let vote_db_path = db_root_path.as_ref().join("vote_ledger");

    sled::Config::default()
        .path(&vote_db_path)
        .cache_capacity(config.cache_capacity_bytes)
        .flush_every_ms(config.flush_every_ms)
        .use_compression(true)
        .compression_factor(1)
        .open()
        .map_err(|e| {
            warn!(
                "Try to open DB at this location: {:?} and failed: {:?}",
                vote_db_path, e
            );
            StorageError::PathError {
                path: vote_db_path.clone(),
                source: std::io::Error::other(e),
            }
        })
}
