//! Create, reassign and merge

use tracing::{debug, info, instrument};

use super::selection;
use super::AssignmentEngine;
use crate::model::{PullRequest, Reassignment};
use crate::store::{finish, Transaction, TransactionRunner};
use crate::{validate, Error, Result};

impl<T: TransactionRunner> AssignmentEngine<T> {
    /// Create a pull request and assign its initial reviewers
    ///
    /// Reviewers are drawn from the other active members of the author's
    /// team: none, the only candidate, or two distinct random candidates.
    #[instrument(skip(self))]
    pub async fn create_pull_request(
        &self,
        pull_request_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        validate::pull_request(pull_request_id, name, author_id)?;

        let pr = self
            .bounded(async {
                let mut tx = self.transactions.begin().await?;
                let outcome = self
                    .create_within(&mut *tx, pull_request_id, name, author_id)
                    .await;
                finish(tx, outcome).await
            })
            .await?;

        info!(
            pull_request_id = %pr.pull_request_id,
            reviewers = ?pr.assigned_reviewers,
            "Pull request created"
        );
        Ok(pr)
    }

    async fn create_within(
        &self,
        tx: &mut dyn Transaction,
        pull_request_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        let author = tx.get_user(author_id).await?;
        let candidates = tx
            .active_team_members(author_id, &author.team_name)
            .await?;
        debug!(team = %author.team_name, candidates = candidates.len(), "Selecting reviewers");

        let reviewers = {
            let mut rng = self.rng.lock().await;
            selection::pick_reviewers(&candidates, &mut *rng)
        };

        let mut pr = tx
            .create_pull_request(pull_request_id, name, author_id)
            .await?;
        tx.assign_reviewers(&pr.pull_request_id, &reviewers).await?;
        pr.assigned_reviewers = reviewers;
        Ok(pr)
    }

    /// Replace one reviewer with a random eligible member of their team
    ///
    /// Eligibility is resolved from the outgoing reviewer's present team and
    /// excludes the author and every current reviewer.
    #[instrument(skip(self))]
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment> {
        validate::reassignment(pull_request_id, old_reviewer_id)?;

        let reassignment = self
            .bounded(async {
                let mut tx = self.transactions.begin().await?;
                let outcome = self
                    .reassign_within(&mut *tx, pull_request_id, old_reviewer_id)
                    .await;
                finish(tx, outcome).await
            })
            .await?;

        info!(
            pull_request_id = %reassignment.pull_request_id,
            old_reviewer = %old_reviewer_id,
            new_reviewer = %reassignment.replaced_by,
            "Reviewer reassigned"
        );
        Ok(reassignment)
    }

    async fn reassign_within(
        &self,
        tx: &mut dyn Transaction,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment> {
        let outgoing = tx.get_user(old_reviewer_id).await?;
        let pr = tx.get_pull_request(pull_request_id).await?;

        if pr.is_merged() {
            return Err(Error::PrMerged(pull_request_id.to_string()));
        }
        if !pr.is_reviewed_by(old_reviewer_id) {
            return Err(Error::NotAssigned {
                pull_request_id: pull_request_id.to_string(),
                user_id: old_reviewer_id.to_string(),
            });
        }

        let members = tx
            .active_team_members(old_reviewer_id, &outgoing.team_name)
            .await?;
        let eligible = selection::eligible_replacements(members, &pr);
        debug!(team = %outgoing.team_name, eligible = eligible.len(), "Selecting replacement");

        let replacement = {
            let mut rng = self.rng.lock().await;
            selection::pick_replacement(&eligible, &mut *rng)
        }
        .ok_or_else(|| Error::NoCandidate(pull_request_id.to_string()))?;

        tx.replace_reviewer(pull_request_id, old_reviewer_id, &replacement)
            .await?;

        Ok(Reassignment {
            pull_request_id: pull_request_id.to_string(),
            replaced_by: replacement,
        })
    }

    /// Mark a pull request as merged
    ///
    /// Idempotent: merging an already merged pull request returns it
    /// unchanged. Only a missing pull request is an error.
    #[instrument(skip(self))]
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> Result<PullRequest> {
        validate::require_non_empty("pull_request_id", pull_request_id)?;

        self.bounded(async {
            let mut tx = self.transactions.begin().await?;
            let outcome = merge_within(&mut *tx, pull_request_id).await;
            finish(tx, outcome).await
        })
        .await
    }
}

async fn merge_within(tx: &mut dyn Transaction, pull_request_id: &str) -> Result<PullRequest> {
    let changed = tx.merge_if_open(pull_request_id).await?;
    // zero rows: already merged or missing, the fetch tells which
    let pr = tx.get_pull_request(pull_request_id).await?;

    if changed > 0 {
        info!(pull_request_id, "Pull request merged");
    } else {
        debug!(pull_request_id, "Pull request was already merged");
    }
    Ok(pr)
}
