//! Vote Engine Error Hierarchy
//!
//! Business outcomes (duplicate vote, inactive poll, lifecycle misuse) are
//! kept apart from infrastructure failures so callers can tell "you already
//! voted" from "try again later".

use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

use crate::CandidateId;
use crate::PollId;
use crate::PollState;
use crate::VoterId;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (storage, timeouts, background tasks)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Vote casting rejected for a business reason
    #[error(transparent)]
    Vote(#[from] VoteError),

    /// Illegal poll lifecycle transitions
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Poll {0} not found")]
    PollNotFound(PollId),

    /// Caller supplied a malformed identifier
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    /// Candidate not registered on the poll. Not retryable.
    #[error("Candidate {candidate_id} is not registered on poll {poll_id}")]
    InvalidCandidate {
        poll_id: PollId,
        candidate_id: CandidateId,
    },

    /// Poll is Draft or Completed. May become castable once activated.
    #[error("Poll {poll_id} is not accepting votes (state: {state})")]
    PollNotActive { poll_id: PollId, state: PollState },

    /// Voter already has a recorded vote in this poll.
    #[error("Voter {voter_id} has already voted in poll {poll_id}")]
    DuplicateVote { poll_id: PollId, voter_id: VoterId },

    /// Results are not visible to this voter yet.
    #[error("Results of poll {poll_id} are hidden from voter {voter_id}")]
    ResultsHidden { poll_id: PollId, voter_id: VoterId },
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid transition {from} -> {to} for poll {poll_id}")]
    InvalidTransition {
        poll_id: PollId,
        from: PollState,
        to: PollState,
    },

    #[error("Poll {0} is already active")]
    AlreadyActive(PollId),

    #[error("Poll {0} is already completed")]
    AlreadyCompleted(PollId),

    /// Completed is terminal; nothing leaves it.
    #[error("Poll {0} is completed and cannot change state")]
    TerminalState(PollId),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    /// Storage call did not finish in time. The outcome is unknown.
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Error occurred at path: {path}")]
    PathError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization failures for persisted records
    #[error(transparent)]
    BincodeError(#[from] bincode::Error),

    /// Embedded database errors
    #[error("Embedded database error: {0}")]
    DbError(String),

    #[error("Data corruption detected at {location}")]
    DataCorruption { location: String },

    /// The (poll, voter) composite key already exists in the ledger.
    #[error("Unique constraint violated for voter {voter_id} in poll {poll_id}")]
    UniqueViolation { poll_id: PollId, voter_id: VoterId },
}

impl Error {
    /// Transient infrastructure failures. Safe to retry a whole `cast_vote`
    /// because casting is idempotent per (poll, voter).
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::System(SystemError::Timeout(_)) => true,
            Error::System(SystemError::TaskFailed(_)) => true,
            Error::System(SystemError::Storage(e)) => matches!(
                e,
                StorageError::IoError(_) | StorageError::PathError { .. } | StorageError::DbError(_)
            ),
            _ => false,
        }
    }

    pub fn is_duplicate_vote(&self) -> bool {
        matches!(self, Error::Vote(VoteError::DuplicateVote { .. }))
    }

    /// The raw storage-level conflict signal, before it is mapped to
    /// [`VoteError::DuplicateVote`].
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Error::System(SystemError::Storage(StorageError::UniqueViolation { .. }))
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::System(SystemError::Timeout(_)))
    }
}

// ============== Conversion Implementations ============== //
impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::System(SystemError::Storage(e))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        StorageError::BincodeError(e).into()
    }
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        StorageError::DbError(err.to_string()).into()
    }
}

impl From<JoinError> for Error {
    fn from(err: JoinError) -> Self {
        SystemError::TaskFailed(err).into()
    }
}

