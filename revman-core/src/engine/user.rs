//! User status and review reports

use tracing::{info, instrument};

use super::AssignmentEngine;
use crate::model::{ReviewReport, User};
use crate::store::{finish, TransactionRunner};
use crate::{validate, Result};

impl<T: TransactionRunner> AssignmentEngine<T> {
    /// Toggle a user's active flag and return the updated user
    ///
    /// Existing review assignments are left untouched.
    #[instrument(skip(self))]
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        validate::require_non_empty("user_id", user_id)?;

        let user = self
            .bounded(async {
                let mut tx = self.transactions.begin().await?;
                let outcome = match tx.set_active(user_id, is_active).await {
                    Ok(()) => tx.get_user(user_id).await,
                    Err(err) => Err(err),
                };
                finish(tx, outcome).await
            })
            .await?;

        info!(user_id, is_active, "User status updated");
        Ok(user)
    }

    /// List the pull requests a user currently reviews
    ///
    /// Unknown users get an empty report.
    #[instrument(skip(self))]
    pub async fn review_report(&self, user_id: &str) -> Result<ReviewReport> {
        validate::require_non_empty("user_id", user_id)?;

        let pull_requests = self
            .bounded(async {
                let mut tx = self.transactions.begin().await?;
                let outcome = tx.reviews_of(user_id).await;
                finish(tx, outcome).await
            })
            .await?;

        Ok(ReviewReport {
            user_id: user_id.to_string(),
            pull_requests,
        })
    }
}
