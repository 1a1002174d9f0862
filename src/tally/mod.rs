//! Tally Engine: per-candidate and total counts, always derived from the
//! vote ledger.

mod outcome;
mod tally_engine;

pub use outcome::*;
pub use tally_engine::*;
