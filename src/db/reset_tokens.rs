//! Password reset token operations

use super::models::DbResetToken;
use super::pool::{DbError, DbPool};
use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use tracing::info;

fn row_to_token(row: &Row) -> DbResetToken {
    DbResetToken {
        id: row.get("id"),
        user_id: row.get("user_id"),
        token: row.get("token"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}

/// Repository for password reset tokens
pub struct ResetTokenRepository {
    pool: DbPool,
}

impl ResetTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        ResetTokenRepository { pool }
    }

    /// Store a freshly generated token for a user
    pub async fn create(
        &self,
        user_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let client = self.pool.get().await?;

        client
            .execute(
                r#"
                INSERT INTO password_reset_tokens (user_id, token, expires_at)
                VALUES ($1, $2, $3)
                "#,
                &[&user_id, &token, &expires_at],
            )
            .await?;

        info!(user_id = %user_id, expires_at = %expires_at, "Password reset token created");

        Ok(())
    }

    /// Find a token that matches and has not yet expired.
    ///
    /// Consumed tokens are deleted and expired tokens are filtered out here,
    /// so callers cannot distinguish the two cases.
    pub async fn find_valid(&self, token: &str) -> Result<Option<DbResetToken>, DbError> {
        let client = self.pool.get().await?;

        let row = client
            .query_opt(
                r#"
                SELECT id, user_id, token, expires_at, created_at
                FROM password_reset_tokens
                WHERE token = $1 AND expires_at > NOW()
                "#,
                &[&token],
            )
            .await?;

        Ok(row.as_ref().map(row_to_token))
    }

    /// Delete a consumed token so it cannot be reused
    pub async fn delete(&self, token: &str) -> Result<u64, DbError> {
        let client = self.pool.get().await?;

        let deleted = client
            .execute(
                "DELETE FROM password_reset_tokens WHERE token = $1",
                &[&token],
            )
            .await?;

        Ok(deleted)
    }
}
