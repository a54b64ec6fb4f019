//! Pull request and reviewer rows

use chrono::{DateTime, Utc};
use revman_core::{PrStatus, PullRequest, PullRequestShort};
use sqlx::{FromRow, SqliteConnection};

use crate::error::{DbError, Result};

#[derive(Debug, FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    fn into_pull_request(self, assigned_reviewers: Vec<String>) -> Result<PullRequest> {
        Ok(PullRequest {
            status: parse_status(&self.status)?,
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            assigned_reviewers,
            created_at: Some(self.created_at),
            merged_at: self.merged_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PullRequestShortRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
}

fn parse_status(status: &str) -> Result<PrStatus> {
    status
        .parse()
        .map_err(|_| DbError::InvalidData(format!("unknown pull request status '{}'", status)))
}

/// Insert an open pull request, returning `None` if the ID is taken
pub async fn insert(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    name: &str,
    author_id: &str,
) -> Result<Option<PullRequest>> {
    let row = sqlx::query_as::<_, PullRequestRow>(
        r#"
        INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (pull_request_id) DO NOTHING
        RETURNING pull_request_id, pull_request_name, author_id, status, created_at, merged_at
        "#,
    )
    .bind(pull_request_id)
    .bind(name)
    .bind(author_id)
    .bind(PrStatus::Open.as_str())
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|row| row.into_pull_request(Vec::new())).transpose()
}

/// Append reviewers after any already assigned
pub async fn add_reviewers(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    reviewers: &[String],
) -> Result<()> {
    for reviewer_id in reviewers {
        sqlx::query(
            r#"
            INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id, position)
            VALUES (?, ?, (SELECT COUNT(*) FROM pull_request_reviewers WHERE pull_request_id = ?))
            "#,
        )
        .bind(pull_request_id)
        .bind(reviewer_id)
        .bind(pull_request_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Reviewer IDs in assignment order
pub async fn reviewers(conn: &mut SqliteConnection, pull_request_id: &str) -> Result<Vec<String>> {
    sqlx::query_scalar(
        r#"
        SELECT reviewer_id
        FROM pull_request_reviewers
        WHERE pull_request_id = ?
        ORDER BY position
        "#,
    )
    .bind(pull_request_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(Into::into)
}

/// Get a pull request together with its reviewers
pub async fn get(conn: &mut SqliteConnection, pull_request_id: &str) -> Result<Option<PullRequest>> {
    let row = sqlx::query_as::<_, PullRequestRow>(
        r#"
        SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
        FROM pull_requests
        WHERE pull_request_id = ?
        "#,
    )
    .bind(pull_request_id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let assigned = reviewers(conn, pull_request_id).await?;
            row.into_pull_request(assigned).map(Some)
        }
        None => Ok(None),
    }
}

/// Flip an open pull request to merged, returning the number of rows changed
pub async fn merge_if_open(conn: &mut SqliteConnection, pull_request_id: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE pull_requests
        SET status = ?, merged_at = ?
        WHERE pull_request_id = ? AND status = ?
        "#,
    )
    .bind(PrStatus::Merged.as_str())
    .bind(Utc::now())
    .bind(pull_request_id)
    .bind(PrStatus::Open.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Swap a reviewer in place, keeping their position
pub async fn replace_reviewer(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    old_reviewer_id: &str,
    new_reviewer_id: &str,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE pull_request_reviewers
        SET reviewer_id = ?
        WHERE pull_request_id = ? AND reviewer_id = ?
        "#,
    )
    .bind(new_reviewer_id)
    .bind(pull_request_id)
    .bind(old_reviewer_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Pull requests a user is assigned to review, any status
pub async fn list_reviewed_by(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<PullRequestShort>> {
    let rows = sqlx::query_as::<_, PullRequestShortRow>(
        r#"
        SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
        FROM pull_requests pr
        JOIN pull_request_reviewers r ON r.pull_request_id = pr.pull_request_id
        WHERE r.reviewer_id = ?
        ORDER BY pr.pull_request_id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(PullRequestShort {
                status: parse_status(&row.status)?,
                pull_request_id: row.pull_request_id,
                pull_request_name: row.pull_request_name,
                author_id: row.author_id,
            })
        })
        .collect()
}
