//! Error types for the review manager

use std::fmt;

use thiserror::Error;

/// Result type alias for review manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Team,
    User,
    PullRequest,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Team => write!(f, "team"),
            Entity::User => write!(f, "user"),
            Entity::PullRequest => write!(f, "pull request"),
        }
    }
}

/// Error type for review manager operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or empty input
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Team or pull request ID collision
    #[error("{0} {1} already exists")]
    AlreadyExists(Entity, String),

    /// Unknown team, user or pull request
    #[error("{0} {1} not found")]
    NotFound(Entity, String),

    /// Reassign target is not a current reviewer
    #[error("user {user_id} is not assigned to pull request {pull_request_id}")]
    NotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    /// Reassign attempted on a merged pull request
    #[error("pull request {0} is already merged")]
    PrMerged(String),

    /// No eligible replacement reviewer
    #[error("no active replacement candidate for pull request {0}")]
    NoCandidate(String),

    /// Store or transaction failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code for the boundary layer
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) => "BAD_REQUEST",
            Error::AlreadyExists(Entity::Team, _) => "TEAM_EXISTS",
            Error::AlreadyExists(Entity::User, _) => "USER_EXISTS",
            Error::AlreadyExists(Entity::PullRequest, _) => "PR_EXISTS",
            Error::NotFound(..) => "NOT_FOUND",
            Error::NotAssigned { .. } => "NOT_ASSIGNED",
            Error::PrMerged(_) => "PR_MERGED",
            Error::NoCandidate(_) => "NO_CANDIDATE",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is an infrastructure failure rather than a domain error
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }

    /// Message safe to show callers; internal details are withheld
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "internal error".to_string()
        } else {
            self.to_string()
        }
    }

    /// Process exit status for command line consumers
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Internal(_) => 1,
            Error::BadRequest(_) => 2,
            Error::NotFound(..) => 3,
            Error::AlreadyExists(..)
            | Error::NotAssigned { .. }
            | Error::PrMerged(_)
            | Error::NoCandidate(_) => 4,
        }
    }

    pub(crate) fn bad_request(msg: impl Into<String>) -> Self {
        Error::BadRequest(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
