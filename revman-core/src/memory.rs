//! In-memory implementation of the store capabilities.
//!
//! All state lives in one map set behind a `tokio` mutex. A transaction
//! holds the lock for its whole lifetime and works on a private copy, which
//! replaces the shared state on commit. Transactions are therefore fully
//! serialized, and dropping one discards its copy.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::model::{PrStatus, PullRequest, PullRequestShort, Team, User};
use crate::store::{PullRequestStore, TeamDirectory, Transaction, TransactionRunner, UserDirectory};
use crate::{Entity, Error, Result};

#[derive(Debug, Clone, Default)]
struct State {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    pull_requests: BTreeMap<String, PullRequest>,
}

/// In-memory store.
///
/// Cloning yields another handle to the same state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_next_assignment: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `assign_reviewers` call fail with an internal error
    pub fn fail_next_assignment(&self) {
        self.fail_next_assignment.store(true, Ordering::SeqCst);
    }

    /// Committed pull request, bypassing the transaction machinery
    pub async fn committed_pull_request(&self, pull_request_id: &str) -> Option<PullRequest> {
        self.state.lock().await.pull_requests.get(pull_request_id).cloned()
    }
}

#[async_trait]
impl TransactionRunner for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            working,
            fail_assignment: Arc::clone(&self.fail_next_assignment),
        }))
    }
}

/// Transaction over [`InMemoryStore`]
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<State>,
    working: State,
    fail_assignment: Arc<AtomicBool>,
}

#[async_trait]
impl TeamDirectory for InMemoryTransaction {
    async fn add_team(&mut self, team: &Team) -> Result<()> {
        if !self.working.teams.insert(team.team_name.clone()) {
            return Err(Error::AlreadyExists(Entity::Team, team.team_name.clone()));
        }
        Ok(())
    }

    async fn get_team(&mut self, team_name: &str) -> Result<Team> {
        if self.working.teams.contains(team_name) {
            Ok(Team::new(team_name))
        } else {
            Err(Error::NotFound(Entity::Team, team_name.to_string()))
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryTransaction {
    async fn upsert_users(&mut self, team: &Team) -> Result<()> {
        for member in &team.members {
            self.working.users.insert(
                member.user_id.clone(),
                User::from_member(member, &team.team_name),
            );
        }
        Ok(())
    }

    async fn get_user(&mut self, user_id: &str) -> Result<User> {
        self.working
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(Entity::User, user_id.to_string()))
    }

    async fn team_members(&mut self, team_name: &str) -> Result<Vec<User>> {
        Ok(self
            .working
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .cloned()
            .collect())
    }

    async fn active_team_members(
        &mut self,
        user_id: &str,
        team_name: &str,
    ) -> Result<Vec<String>> {
        Ok(self
            .working
            .users
            .values()
            .filter(|u| u.team_name == team_name && u.is_active && u.user_id != user_id)
            .map(|u| u.user_id.clone())
            .collect())
    }

    async fn set_active(&mut self, user_id: &str, is_active: bool) -> Result<()> {
        let user = self
            .working
            .users
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(Entity::User, user_id.to_string()))?;
        user.is_active = is_active;
        Ok(())
    }
}

#[async_trait]
impl PullRequestStore for InMemoryTransaction {
    async fn create_pull_request(
        &mut self,
        pull_request_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        if self.working.pull_requests.contains_key(pull_request_id) {
            return Err(Error::AlreadyExists(
                Entity::PullRequest,
                pull_request_id.to_string(),
            ));
        }
        let pr = PullRequest::open(pull_request_id, name, author_id);
        self.working
            .pull_requests
            .insert(pull_request_id.to_string(), pr.clone());
        Ok(pr)
    }

    async fn assign_reviewers(
        &mut self,
        pull_request_id: &str,
        reviewers: &[String],
    ) -> Result<()> {
        if self.fail_assignment.swap(false, Ordering::SeqCst) {
            return Err(Error::Internal("injected assignment failure".to_string()));
        }
        let pr = self
            .working
            .pull_requests
            .get_mut(pull_request_id)
            .ok_or_else(|| Error::NotFound(Entity::PullRequest, pull_request_id.to_string()))?;
        pr.assigned_reviewers.extend(reviewers.iter().cloned());
        Ok(())
    }

    async fn get_pull_request(&mut self, pull_request_id: &str) -> Result<PullRequest> {
        self.working
            .pull_requests
            .get(pull_request_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(Entity::PullRequest, pull_request_id.to_string()))
    }

    async fn merge_if_open(&mut self, pull_request_id: &str) -> Result<u64> {
        match self.working.pull_requests.get_mut(pull_request_id) {
            Some(pr) if pr.status == PrStatus::Open => {
                pr.status = PrStatus::Merged;
                pr.merged_at = Some(Utc::now());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn replace_reviewer(
        &mut self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()> {
        let pr = self
            .working
            .pull_requests
            .get_mut(pull_request_id)
            .ok_or_else(|| Error::NotFound(Entity::PullRequest, pull_request_id.to_string()))?;
        for reviewer in pr.assigned_reviewers.iter_mut() {
            if reviewer == old_reviewer_id {
                *reviewer = new_reviewer_id.to_string();
            }
        }
        Ok(())
    }

    async fn reviews_of(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        Ok(self
            .working
            .pull_requests
            .values()
            .filter(|pr| pr.is_reviewed_by(user_id))
            .map(PullRequest::short)
            .collect())
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
