//! Team creation and lookup

use tracing::{info, instrument};

use super::AssignmentEngine;
use crate::model::{Team, User};
use crate::store::{finish, Transaction, TransactionRunner};
use crate::{validate, Result};

impl<T: TransactionRunner> AssignmentEngine<T> {
    /// Create a team and upsert all of its members
    ///
    /// Members that already exist are moved into the new team with the
    /// submitted name and status.
    #[instrument(skip(self, team), fields(team_name = %team.team_name))]
    pub async fn add_team(&self, team: &Team) -> Result<Team> {
        validate::team(team)?;

        self.bounded(async {
            let mut tx = self.transactions.begin().await?;
            let outcome = add_within(&mut *tx, team).await;
            finish(tx, outcome).await
        })
        .await?;

        info!(members = team.members.len(), "Team created");
        Ok(team.clone())
    }

    /// Fetch a team with its current members
    #[instrument(skip(self))]
    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        validate::require_non_empty("team_name", team_name)?;

        self.bounded(async {
            let mut tx = self.transactions.begin().await?;
            let outcome = get_within(&mut *tx, team_name).await;
            finish(tx, outcome).await
        })
        .await
    }
}

async fn add_within(tx: &mut dyn Transaction, team: &Team) -> Result<()> {
    tx.add_team(team).await?;
    tx.upsert_users(team).await
}

async fn get_within(tx: &mut dyn Transaction, team_name: &str) -> Result<Team> {
    let mut team = tx.get_team(team_name).await?;
    team.members = tx
        .team_members(team_name)
        .await?
        .iter()
        .map(User::to_member)
        .collect();
    Ok(team)
}
