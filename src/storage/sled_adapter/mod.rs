// Submodule declaration
// -----------------------------------------------------------------------------
mod sled_vote_store;


// Re-export
// -----------------------------------------------------------------------------
pub use sled_vote_store::*;
