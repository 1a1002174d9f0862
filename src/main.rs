use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;

use tracing::error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use vote_engine::EngineBuilder;
use vote_engine::Result;
use vote_engine::Settings;
use vote_engine::StorageError;

fn main() -> Result<()> {
    let settings = Settings::load()?;

    // Initializing Logs
    let _guard = init_observability(&settings.log_dir)?;

    let engine = EngineBuilder::from_settings(settings).build()?;

    match engine.reconcile() {
        Ok(corrected) => info!(corrected, "startup reconciliation finished"),
        Err(e) => {
            error!("startup reconciliation failed: {:?}", e);
            return Err(e);
        }
    }

    let stats = engine.stats()?;
    info!(
        polls = stats.total,
        draft = stats.draft,
        active = stats.active,
        completed = stats.completed,
        votes = stats.total_votes,
        "ledger stats"
    );

    let flushed = engine.flush()?;
    info!(flushed, "ledger flushed, exiting");
    Ok(())
}

pub fn init_observability(log_dir: &Path) -> Result<WorkerGuard> {
    let log_file = open_file_for_append(&log_dir.join("vote-engine.log"))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();

    Ok(guard)
}

fn open_file_for_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::PathError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StorageError::PathError {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(file)
}
