//! sled-backed [`VoteStore`].
//!
//! The `votes` tree is keyed by `poll_id ‖ voter_id`, so the composite key
//! itself is the uniqueness constraint: `record_vote` checks and inserts it
//! inside one multi-tree transaction that also re-reads the poll record and
//! rewrites its cached total. sled transactions are serializable, so two
//! concurrent attempts for the same key cannot both commit, and a vote
//! racing a lifecycle transition is ordered entirely before or after it.

use std::sync::Arc;

use sled::transaction::ConflictableTransactionError;
use sled::transaction::ConflictableTransactionResult;
use sled::transaction::TransactionError;
use sled::transaction::TransactionalTree;
use sled::Transactional;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;

use crate::constants::POLLS_TREE;
use crate::constants::VOTER_POLLS_TREE;
use crate::constants::VOTES_TREE;
use crate::convert::ballot_key;
use crate::convert::safe_kv;
use crate::convert::split_pair_key;
use crate::convert::voter_poll_key;
use crate::Ballot;
use crate::Candidates;
use crate::Error;
use crate::Poll;
use crate::PollId;
use crate::PollState;
use crate::Result;
use crate::StorageError;
use crate::Transition;
use crate::Vote;
use crate::VoteError;
use crate::VoteId;
use crate::VoteStore;
use crate::VoterId;

#[derive(Clone)]
pub struct SledVoteStore {
    db: Arc<sled::Db>,
    polls: sled::Tree,
    votes: sled::Tree,
    voter_polls: sled::Tree,
}

impl std::fmt::Debug for SledVoteStore {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SledVoteStore")
            .field("polls", &self.polls.len())
            .field("votes", &self.votes.len())
            .finish()
    }
}

impl SledVoteStore {
    pub fn new(db: Arc<sled::Db>) -> Result<Self> {
        let polls = db.open_tree(POLLS_TREE)?;
        let votes = db.open_tree(VOTES_TREE)?;
        let voter_polls = db.open_tree(VOTER_POLLS_TREE)?;
        info!(
            polls = polls.len(),
            votes = votes.len(),
            "sled vote store opened"
        );
        Ok(Self {
            db,
            polls,
            votes,
            voter_polls,
        })
    }

    fn next_id(&self) -> Result<u64> {
        // sled ids start at 0; 0 is reserved as "invalid" by callers
        Ok(self.db.generate_id()? + 1)
    }
}

impl VoteStore for SledVoteStore {
    fn create_poll(
        &self,
        candidates: Candidates,
    ) -> Result<Poll> {
        let poll = Poll::new(PollId(self.next_id()?), candidates);
        self.polls.insert(safe_kv(poll.id.0), encode(&poll)?)?;
        debug!(poll_id = %poll.id, "poll created");
        Ok(poll)
    }

    fn get_poll(
        &self,
        poll_id: PollId,
    ) -> Result<Option<Poll>> {
        match self.polls.get(safe_kv(poll_id.0))? {
            Some(v) => Ok(Some(decode(&v)?)),
            None => Ok(None),
        }
    }

    fn list_polls(&self) -> Result<Vec<Poll>> {
        self.polls
            .iter()
            .map(|item| {
                let (_, v) = item?;
                decode(&v)
            })
            .collect()
    }

    fn apply_transition(
        &self,
        poll_id: PollId,
        transition: Transition,
    ) -> Result<Poll> {
        let key = safe_kv(poll_id.0);
        let result = self.polls.transaction(|polls| -> ConflictableTransactionResult<Poll, Error> {
            let poll = read_poll(polls, poll_id)?;
            let next = abort_on(transition.apply(poll_id, poll.state))?;
            let updated = Poll { state: next, ..poll };
            polls.insert(&key[..], abort_on(encode(&updated))?)?;
            Ok(updated)
        });
        let updated = from_tx(result)?;
        info!(%poll_id, state = %updated.state, "poll transitioned");
        Ok(updated)
    }

    fn delete_poll(
        &self,
        poll_id: PollId,
    ) -> Result<usize> {
        let key = safe_kv(poll_id.0);
        // Removing the poll record first closes the poll to new votes: every
        // vote transaction re-reads it and fails with PollNotFound.
        from_tx(self.polls.transaction(|polls| -> ConflictableTransactionResult<(), Error> {
            read_poll(polls, poll_id)?;
            polls.remove(&key[..])?;
            Ok(())
        }))?;

        let mut voters = Vec::new();
        for item in self.votes.scan_prefix(key) {
            let (k, _) = item?;
            let (_, voter) = split_pair_key(&k)?;
            voters.push(VoterId(voter));
        }

        from_tx((&self.votes, &self.voter_polls).transaction(
            |(votes, voter_polls)| -> ConflictableTransactionResult<(), Error> {
                for voter_id in &voters {
                    votes.remove(&ballot_key(poll_id, *voter_id)[..])?;
                    voter_polls.remove(&voter_poll_key(*voter_id, poll_id)[..])?;
                }
                Ok(())
            },
        ))?;

        info!(%poll_id, votes = voters.len(), "poll deleted with its votes");
        Ok(voters.len())
    }

    fn record_vote(
        &self,
        ballot: Ballot,
    ) -> Result<Vote> {
        let Ballot {
            poll_id,
            voter_id,
            candidate_id,
        } = ballot;
        let poll_key = safe_kv(poll_id.0);
        let vote_key = ballot_key(poll_id, voter_id);
        let index_key = voter_poll_key(voter_id, poll_id);
        // Allocated up front; an aborted attempt only leaves a gap in the ids.
        let vote_id = VoteId(self.next_id()?);

        let result = (&self.polls, &self.votes, &self.voter_polls).transaction(
            |(polls, votes, voter_polls)| -> ConflictableTransactionResult<Vote, Error> {
                let poll = read_poll(polls, poll_id)?;
                if !poll.candidates.contains(candidate_id) {
                    return abort(
                        VoteError::InvalidCandidate {
                            poll_id,
                            candidate_id,
                        }
                        .into(),
                    );
                }
                if poll.state != PollState::Active {
                    return abort(
                        VoteError::PollNotActive {
                            poll_id,
                            state: poll.state,
                        }
                        .into(),
                    );
                }
                if votes.get(&vote_key[..])?.is_some() {
                    return abort(StorageError::UniqueViolation { poll_id, voter_id }.into());
                }

                let vote = Vote {
                    id: vote_id,
                    poll_id,
                    voter_id,
                    candidate_id,
                };
                votes.insert(&vote_key[..], abort_on(encode(&vote))?)?;
                voter_polls.insert(&index_key[..], safe_kv(vote_id.0).to_vec())?;

                // Same serializable snapshot as the insert above: the total
                // moves with the ledger row, never on its own.
                let updated = Poll {
                    total_votes: poll.total_votes + 1,
                    ..poll
                };
                polls.insert(&poll_key[..], abort_on(encode(&updated))?)?;
                Ok(vote)
            },
        );

        match from_tx(result) {
            Ok(vote) => {
                trace!(%poll_id, %voter_id, vote_id = %vote.id, "vote row committed");
                Ok(vote)
            }
            Err(e) => {
                if e.is_retryable() {
                    error!(%poll_id, %voter_id, "record_vote storage failure: {:?}", e);
                }
                Err(e)
            }
        }
    }

    fn find_vote(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
    ) -> Result<Option<Vote>> {
        match self.votes.get(ballot_key(poll_id, voter_id))? {
            Some(v) => Ok(Some(decode(&v)?)),
            None => Ok(None),
        }
    }

    fn votes_for_poll(
        &self,
        poll_id: PollId,
    ) -> Result<Vec<Vote>> {
        self.votes
            .scan_prefix(safe_kv(poll_id.0))
            .map(|item| {
                let (_, v) = item?;
                decode(&v)
            })
            .collect()
    }

    fn polls_voted_by(
        &self,
        voter_id: VoterId,
    ) -> Result<Vec<PollId>> {
        self.voter_polls
            .scan_prefix(safe_kv(voter_id.0))
            .map(|item| {
                let (k, _) = item?;
                let (_, poll) = split_pair_key(&k)?;
                Ok(PollId(poll))
            })
            .collect()
    }

    fn replace_total(
        &self,
        expected: &Poll,
        total: u64,
    ) -> Result<bool> {
        let updated = Poll {
            total_votes: total,
            ..expected.clone()
        };
        let swapped = self.polls.compare_and_swap(
            safe_kv(expected.id.0),
            Some(encode(expected)?),
            Some(encode(&updated)?),
        )?;
        Ok(swapped.is_ok())
    }

    fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

fn read_poll(
    polls: &TransactionalTree,
    poll_id: PollId,
) -> ConflictableTransactionResult<Poll, Error> {
    match polls.get(&safe_kv(poll_id.0)[..])? {
        Some(v) => abort_on(decode(&v)),
        None => abort(Error::PollNotFound(poll_id)),
    }
}

fn abort<T>(e: Error) -> ConflictableTransactionResult<T, Error> {
    Err(ConflictableTransactionError::Abort(e))
}

fn abort_on<T>(r: Result<T>) -> ConflictableTransactionResult<T, Error> {
    r.map_err(ConflictableTransactionError::Abort)
}

fn from_tx<T>(r: std::result::Result<T, TransactionError<Error>>) -> Result<T> {
    match r {
        Ok(v) => Ok(v),
        Err(TransactionError::Abort(e)) => Err(e),
        Err(TransactionError::Storage(e)) => Err(e.into()),
    }
}
