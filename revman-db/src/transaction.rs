//! Store capabilities over SQLite transactions

use async_trait::async_trait;
use revman_core::{
    Entity, Error, PullRequest, PullRequestShort, PullRequestStore, Result, Team, TeamDirectory,
    Transaction, TransactionRunner, User, UserDirectory,
};
use sqlx::{Sqlite, SqlitePool};

use crate::error::DbError;
use crate::repos::{pull_requests, teams, users};

/// Hands out one SQLite transaction per engine operation
#[derive(Clone)]
pub struct SqliteTransactions {
    pool: SqlitePool,
}

impl SqliteTransactions {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRunner for SqliteTransactions {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Claim the write lock up front so concurrent operations wait on the
        // busy timeout instead of failing when a reader upgrades to a writer.
        sqlx::query("UPDATE teams SET team_name = team_name WHERE 0")
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        Ok(Box::new(SqliteTransaction { tx }))
    }
}

/// One open SQLite transaction
///
/// Dropping it without calling `commit` rolls everything back.
pub struct SqliteTransaction {
    tx: sqlx::Transaction<'static, Sqlite>,
}

#[async_trait]
impl TeamDirectory for SqliteTransaction {
    async fn add_team(&mut self, team: &Team) -> Result<()> {
        if !teams::insert(&mut self.tx, &team.team_name).await? {
            return Err(Error::AlreadyExists(Entity::Team, team.team_name.clone()));
        }
        Ok(())
    }

    async fn get_team(&mut self, team_name: &str) -> Result<Team> {
        if teams::exists(&mut self.tx, team_name).await? {
            Ok(Team::new(team_name))
        } else {
            Err(Error::NotFound(Entity::Team, team_name.to_string()))
        }
    }
}

#[async_trait]
impl UserDirectory for SqliteTransaction {
    async fn upsert_users(&mut self, team: &Team) -> Result<()> {
        for member in &team.members {
            users::upsert(&mut self.tx, &User::from_member(member, &team.team_name)).await?;
        }
        Ok(())
    }

    async fn get_user(&mut self, user_id: &str) -> Result<User> {
        users::get(&mut self.tx, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(Entity::User, user_id.to_string()))
    }

    async fn team_members(&mut self, team_name: &str) -> Result<Vec<User>> {
        Ok(users::list_by_team(&mut self.tx, team_name).await?)
    }

    async fn active_team_members(
        &mut self,
        user_id: &str,
        team_name: &str,
    ) -> Result<Vec<String>> {
        Ok(users::active_ids_in_team(&mut self.tx, team_name, user_id).await?)
    }

    async fn set_active(&mut self, user_id: &str, is_active: bool) -> Result<()> {
        if users::set_active(&mut self.tx, user_id, is_active).await? == 0 {
            return Err(Error::NotFound(Entity::User, user_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PullRequestStore for SqliteTransaction {
    async fn create_pull_request(
        &mut self,
        pull_request_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        pull_requests::insert(&mut self.tx, pull_request_id, name, author_id)
            .await?
            .ok_or_else(|| Error::AlreadyExists(Entity::PullRequest, pull_request_id.to_string()))
    }

    async fn assign_reviewers(
        &mut self,
        pull_request_id: &str,
        reviewers: &[String],
    ) -> Result<()> {
        Ok(pull_requests::add_reviewers(&mut self.tx, pull_request_id, reviewers).await?)
    }

    async fn get_pull_request(&mut self, pull_request_id: &str) -> Result<PullRequest> {
        pull_requests::get(&mut self.tx, pull_request_id)
            .await?
            .ok_or_else(|| Error::NotFound(Entity::PullRequest, pull_request_id.to_string()))
    }

    async fn merge_if_open(&mut self, pull_request_id: &str) -> Result<u64> {
        Ok(pull_requests::merge_if_open(&mut self.tx, pull_request_id).await?)
    }

    async fn replace_reviewer(
        &mut self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()> {
        let changed = pull_requests::replace_reviewer(
            &mut self.tx,
            pull_request_id,
            old_reviewer_id,
            new_reviewer_id,
        )
        .await?;
        if changed == 0 {
            return Err(Error::NotAssigned {
                pull_request_id: pull_request_id.to_string(),
                user_id: old_reviewer_id.to_string(),
            });
        }
        Ok(())
    }

    async fn reviews_of(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        Ok(pull_requests::list_reviewed_by(&mut self.tx, user_id).await?)
    }
}

#[async_trait]
impl Transaction for SqliteTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(DbError::from)?;
        Ok(())
    }
}
