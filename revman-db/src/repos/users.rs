//! User rows

use revman_core::User;
use sqlx::{FromRow, SqliteConnection};

use crate::error::Result;

#[derive(Debug, FromRow)]
struct UserRow {
    user_id: String,
    username: String,
    team_name: String,
    is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

/// Insert a user or overwrite name, team and status of an existing one
pub async fn upsert(conn: &mut SqliteConnection, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, username, team_name, is_active)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            username = excluded.username,
            team_name = excluded.team_name,
            is_active = excluded.is_active
        "#,
    )
    .bind(&user.user_id)
    .bind(&user.username)
    .bind(&user.team_name)
    .bind(user.is_active)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Get a user by ID
pub async fn get(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(User::from))
}

/// List all members of a team
pub async fn list_by_team(conn: &mut SqliteConnection, team_name: &str) -> Result<Vec<User>> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, username, team_name, is_active
        FROM users
        WHERE team_name = ?
        ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(User::from).collect())
}

/// IDs of the active members of a team, leaving out one user
pub async fn active_ids_in_team(
    conn: &mut SqliteConnection,
    team_name: &str,
    excluding: &str,
) -> Result<Vec<String>> {
    sqlx::query_scalar(
        r#"
        SELECT user_id
        FROM users
        WHERE team_name = ? AND is_active = 1 AND user_id != ?
        ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .bind(excluding)
    .fetch_all(&mut *conn)
    .await
    .map_err(Into::into)
}

/// Set the active flag, returning the number of rows changed
pub async fn set_active(conn: &mut SqliteConnection, user_id: &str, is_active: bool) -> Result<u64> {
    let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
        .bind(is_active)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
