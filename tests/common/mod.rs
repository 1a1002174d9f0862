use std::sync::Arc;

use tempfile::TempDir;
use vote_engine::Candidates;
use vote_engine::EngineBuilder;
use vote_engine::Poll;
use vote_engine::Settings;
use vote_engine::VoteEngine;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for integration test.");
}

/// Settings rooted in `dir`, with a storage timeout generous enough for
/// heavily contended tests.
pub fn settings_in(dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.storage.db_root_dir = dir.path().to_path_buf();
    settings.storage.op_timeout_ms = 30_000;
    settings
}

pub fn open_engine(dir: &TempDir) -> Arc<VoteEngine> {
    Arc::new(
        EngineBuilder::from_settings(settings_in(dir))
            .build()
            .expect("build engine"),
    )
}

pub fn new_active_poll(engine: &VoteEngine) -> Poll {
    let poll = engine.create_poll(Candidates::default()).expect("create poll");
    engine.activate(poll.id).expect("activate poll")
}
