//! Vote Ledger: append-only, uniqueness-enforcing record of votes.
//!
//! Three layers answer "has this voter already voted here?":
//! 1. [`VoteCache`], an in-memory latency optimization
//! 2. a store lookup used as a fast pre-check
//! 3. the store's unique (poll, voter) constraint, enforced atomically
//!    inside `record`
//!
//! Only the third layer may reject a write on its own authority.

mod vote_cache;
mod vote_ledger;

pub use vote_cache::*;
pub use vote_ledger::*;
