//! Team rows

use sqlx::SqliteConnection;

use crate::error::Result;

/// Insert a team, returning `false` if the name is already taken
pub async fn insert(conn: &mut SqliteConnection, team_name: &str) -> Result<bool> {
    let inserted: Option<String> = sqlx::query_scalar(
        r#"
        INSERT INTO teams (team_name)
        VALUES (?)
        ON CONFLICT (team_name) DO NOTHING
        RETURNING team_name
        "#,
    )
    .bind(team_name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(inserted.is_some())
}

/// Check whether a team exists
pub async fn exists(conn: &mut SqliteConnection, team_name: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM teams WHERE team_name = ?")
        .bind(team_name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(found.is_some())
}
