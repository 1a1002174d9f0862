//! The collaborator-facing surface of the vote engine.
//!
//! [`EngineBuilder`] assembles a [`VoteEngine`] from [`crate::Settings`]:
//! it opens the sled store by default and accepts any other [`crate::VoteStore`].

mod builder;
mod vote_engine;

pub use builder::*;
pub use vote_engine::*;
