use dashmap::DashSet;
use tracing::trace;

use crate::LedgerConfig;
use crate::PollId;
use crate::VoterId;

/// Advisory set of (poll, voter) pairs known to have voted.
///
/// Only positive facts are cached, and a recorded vote is never removed
/// from the ledger by normal operation, so an entry can only go stale when
/// its poll is deleted. A miss says nothing: callers fall through to the
/// store, and the store's uniqueness constraint stays the only authority
/// for rejecting a write.
#[derive(Debug)]
pub struct VoteCache {
    voted: DashSet<(PollId, VoterId)>,
    enabled: bool,
    capacity: usize,
}

impl VoteCache {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            voted: DashSet::new(),
            enabled: config.cache_enabled,
            capacity: config.cache_capacity,
        }
    }

    pub fn contains(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
    ) -> bool {
        self.enabled && self.voted.contains(&(poll_id, voter_id))
    }

    /// Marks the pair as voted. Silently skipped once the cache is full.
    pub fn remember(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
    ) {
        if !self.enabled {
            return;
        }
        if self.voted.len() >= self.capacity && !self.voted.contains(&(poll_id, voter_id)) {
            trace!(%poll_id, %voter_id, "vote cache full, entry not cached");
            return;
        }
        self.voted.insert((poll_id, voter_id));
    }

    /// Drops every entry of a deleted poll.
    pub fn forget_poll(
        &self,
        poll_id: PollId,
    ) {
        self.voted.retain(|(p, _)| *p != poll_id);
    }

    pub fn clear(&self) {
        self.voted.clear();
    }

    pub fn len(&self) -> usize {
        self.voted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voted.is_empty()
    }
}
