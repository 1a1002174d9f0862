//! Builder for a [`VoteEngine`].
//!
//! ## Example
//! ```ignore
//! let engine = EngineBuilder::new(Some("config/prod"))?
//!     .build()?;
//! engine.reconcile()?;
//! ```

use std::sync::Arc;

use tracing::info;

use super::VoteEngine;
use crate::init_sled_db;
use crate::LifecycleController;
use crate::Result;
use crate::Settings;
use crate::SledVoteStore;
use crate::TallyEngine;
use crate::VoteLedger;
use crate::VoteService;
use crate::VoteStore;

pub struct EngineBuilder {
    pub(super) settings: Settings,
}

impl EngineBuilder {
    /// Loads settings from every configured source, then layers
    /// `config_path` on top when given.
    pub fn new(config_path: Option<&str>) -> Result<Self> {
        let mut settings = Settings::load()?;
        if let Some(p) = config_path {
            info!("with_override_config from: {}", &p);
            settings = settings.with_override_config(p)?;
        }
        Ok(Self::from_settings(settings))
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Opens the sled database under `storage.db_root_dir` and builds the
    /// engine on top of it.
    pub fn build(self) -> Result<VoteEngine<SledVoteStore>> {
        self.settings.validate()?;
        let db = init_sled_db(&self.settings.storage)?;
        let store = SledVoteStore::new(Arc::new(db))?;
        self.build_with_store(Arc::new(store))
    }

    /// Builds the engine on a caller-provided store.
    pub fn build_with_store<S: VoteStore>(
        self,
        store: Arc<S>,
    ) -> Result<VoteEngine<S>> {
        self.settings.validate()?;
        let settings = self.settings;

        let lifecycle = LifecycleController::new(store.clone());
        let ledger = Arc::new(VoteLedger::new(store.clone(), &settings.ledger));
        let tally = Arc::new(TallyEngine::new(store.clone(), settings.retry.recount_attempts));
        let service = VoteService::new(
            ledger.clone(),
            tally.clone(),
            settings.storage.op_timeout(),
            settings.retry.cast_vote,
        );

        info!(
            visibility = ?settings.results.visibility,
            cache_enabled = settings.ledger.cache_enabled,
            "vote engine ready"
        );
        Ok(VoteEngine {
            store,
            lifecycle,
            ledger,
            tally,
            service,
            visibility: settings.results.visibility,
        })
    }
}
