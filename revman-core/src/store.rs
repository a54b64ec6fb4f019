//! Store-facing capabilities consumed by the assignment engine
//!
//! The engine never talks to a concrete storage technology. It asks a
//! [`TransactionRunner`] for a [`Transaction`] handle, runs one operation's
//! reads and writes against it, and hands the outcome to [`finish`].
//! Dropping a handle without committing discards everything staged on it,
//! so an early return or a cancelled future never leaves partial state.

use async_trait::async_trait;
use tracing::warn;

use crate::model::{PullRequest, PullRequestShort, Team, User};
use crate::Result;

/// Team existence
#[async_trait]
pub trait TeamDirectory: Send {
    /// Insert the team row, failing with `AlreadyExists` if the name is taken
    async fn add_team(&mut self, team: &Team) -> Result<()>;

    /// Fetch the team row (members are not populated)
    async fn get_team(&mut self, team_name: &str) -> Result<Team>;
}

/// Users, their status and team membership
#[async_trait]
pub trait UserDirectory: Send {
    /// Insert or update every member of the team
    async fn upsert_users(&mut self, team: &Team) -> Result<()>;

    async fn get_user(&mut self, user_id: &str) -> Result<User>;

    /// All members of a team, ordered by user ID
    async fn team_members(&mut self, team_name: &str) -> Result<Vec<User>>;

    /// IDs of active members of `team_name` other than `user_id`, ordered by user ID
    async fn active_team_members(&mut self, user_id: &str, team_name: &str)
        -> Result<Vec<String>>;

    /// Toggle the active flag, failing with `NotFound` for unknown users
    async fn set_active(&mut self, user_id: &str, is_active: bool) -> Result<()>;
}

/// Pull requests and their reviewer relation
#[async_trait]
pub trait PullRequestStore: Send {
    /// Insert an open pull request, failing with `AlreadyExists` on ID collision
    async fn create_pull_request(
        &mut self,
        pull_request_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest>;

    /// Add reviewers without further checks
    async fn assign_reviewers(&mut self, pull_request_id: &str, reviewers: &[String])
        -> Result<()>;

    async fn get_pull_request(&mut self, pull_request_id: &str) -> Result<PullRequest>;

    /// Mark an open pull request as merged, returning the number of rows changed
    ///
    /// Zero means the pull request is either already merged or missing.
    async fn merge_if_open(&mut self, pull_request_id: &str) -> Result<u64>;

    /// Swap one reviewer for another in place
    async fn replace_reviewer(
        &mut self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()>;

    /// Pull requests the user is currently assigned to review
    async fn reviews_of(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>>;
}

/// One atomic unit of work across all three stores
#[async_trait]
pub trait Transaction: TeamDirectory + UserDirectory + PullRequestStore {
    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Source of transaction handles
#[async_trait]
pub trait TransactionRunner: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// Commit on success, roll back on failure
///
/// A failed rollback is logged and the original error is returned, since the
/// handle is released either way and nothing was committed.
pub async fn finish<T>(tx: Box<dyn Transaction>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
