//! # vote-engine
//!
//! An embedded vote-integrity engine. It keeps polls on a strict
//! `Draft -> Active -> Completed` lifecycle, records at most one vote per
//! (poll, voter) and keeps every poll's cached total equal to its ledger,
//! under any interleaving of concurrent callers.
//!
//! ```ignore
//! let engine = EngineBuilder::new(None)?.build()?;
//! let poll = engine.create_poll(Candidates::default())?;
//! engine.activate(poll.id)?;
//! let receipt = engine.cast_vote(poll.id, VoterId(42), CandidateId::FIRST).await?;
//! ```

mod config;
mod constants;
mod engine;
mod errors;
mod ledger;
mod lifecycle;
mod metrics;
mod service;
mod storage;
mod tally;
mod types;
pub mod utils;

pub use config::*;
pub use engine::*;
pub use errors::*;
pub use ledger::*;
pub use lifecycle::*;
pub use metrics::*;
pub use service::*;
pub use storage::*;
pub use tally::*;
pub use types::*;
pub use utils::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
