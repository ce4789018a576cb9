//! User table operations

use super::models::DbUser;
use super::pool::{DbError, DbPool};
use tokio_postgres::Row;
use tracing::info;

const USER_COLUMNS: &str =
    "user_id, email, password_hash, subscription_type, ai_questions_used, created_at, updated_at";

fn row_to_user(row: &Row) -> DbUser {
    DbUser {
        user_id: row.get("user_id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        subscription_type: row.get("subscription_type"),
        ai_questions_used: row.get("ai_questions_used"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Repository for user operations
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        UserRepository { pool }
    }

    /// Insert a new user on the free tier.
    ///
    /// Uniqueness of user_id and email is enforced by the store; a racing
    /// duplicate surfaces as a unique-violation `DbError`, which callers
    /// translate to a conflict response.
    pub async fn create(
        &self,
        user_id: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<DbUser, DbError> {
        let client = self.pool.get().await?;

        let stmt = format!(
            r#"
            INSERT INTO users (user_id, email, password_hash, subscription_type, ai_questions_used)
            VALUES ($1, $2, $3, 'free', 0)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = client
            .query_one(stmt.as_str(), &[&user_id, &email, &password_hash])
            .await?;

        info!(user_id = %user_id, "User created");

        Ok(row_to_user(&row))
    }

    /// Look up a user by identifier
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<DbUser>, DbError> {
        let client = self.pool.get().await?;

        let stmt = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = client.query_opt(stmt.as_str(), &[&user_id]).await?;

        Ok(row.as_ref().map(row_to_user))
    }

    /// Look up a user by normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, DbError> {
        let client = self.pool.get().await?;

        let stmt = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = client.query_opt(stmt.as_str(), &[&email]).await?;

        Ok(row.as_ref().map(row_to_user))
    }

    /// Replace the stored password hash and bump the update timestamp
    pub async fn update_password(&self, user_id: &str, password_hash: &str) -> Result<u64, DbError> {
        let client = self.pool.get().await?;

        let updated = client
            .execute(
                "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE user_id = $2",
                &[&password_hash, &user_id],
            )
            .await?;

        info!(user_id = %user_id, hash_len = password_hash.len(), "Password updated");

        Ok(updated)
    }

    /// Set the subscription tier. Idempotent; re-applying the same tier is a
    /// no-op row update.
    pub async fn set_subscription(&self, user_id: &str, tier: &str) -> Result<u64, DbError> {
        let client = self.pool.get().await?;

        let updated = client
            .execute(
                "UPDATE users SET subscription_type = $1, updated_at = NOW() WHERE user_id = $2",
                &[&tier, &user_id],
            )
            .await?;

        info!(user_id = %user_id, tier = %tier, "Subscription updated");

        Ok(updated)
    }
}
