use std::sync::Arc;

use tempfile::TempDir;

use crate::init_sled_db_at;
use crate::Candidates;
use crate::Poll;
use crate::SledVoteStore;
use crate::StorageConfig;
use crate::Transition;
use crate::VoteStore;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Opens a fresh sled store under a temporary directory.
///
/// The returned `TempDir` must outlive the store.
pub(crate) fn temp_store() -> (TempDir, Arc<SledVoteStore>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db = init_sled_db_at(dir.path(), &StorageConfig::default()).expect("open sled db");
    let store = SledVoteStore::new(Arc::new(db)).expect("open vote store");
    (dir, Arc::new(store))
}

/// Creates a poll with the default candidates and activates it.
pub(crate) fn active_poll(store: &impl VoteStore) -> Poll {
    let poll = store.create_poll(Candidates::default()).expect("create poll");
    store
        .apply_transition(poll.id, Transition::Activate)
        .expect("activate poll")
}
