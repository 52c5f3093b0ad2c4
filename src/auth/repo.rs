use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::User;

/// Persistence for the `users` table.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_remember_token(&self, token: &str) -> anyhow::Result<Option<User>>;
    /// Only matches while `reset_token_expires` is strictly after `now`.
    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>>;
    /// Returns `None` when the email is already taken.
    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>>;
    async fn set_remember_token(&self, id: i64, token: &str) -> anyhow::Result<()>;
    async fn set_reset_token(
        &self,
        id: i64,
        token: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<()>;
    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()>;
    /// Stores the new hash and clears both reset fields, but only if `token`
    /// is still the user's reset token. Returns whether a row changed.
    async fn complete_password_reset(
        &self,
        id: i64,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password AS password_hash, remember_token,
                   reset_token, reset_token_expires, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password AS password_hash, remember_token,
                   reset_token, reset_token_expires, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_remember_token(&self, token: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password AS password_hash, remember_token,
                   reset_token, reset_token_expires, created_at
            FROM users
            WHERE remember_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .context("find user by remember token")?;
        Ok(user)
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password AS password_hash, remember_token,
                   reset_token, reset_token_expires, created_at
            FROM users
            WHERE reset_token = $1 AND reset_token_expires > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("find user by reset token")?;
        Ok(user)
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password AS password_hash, remember_token,
                      reset_token, reset_token_expires, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn set_remember_token(&self, id: i64, token: &str) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE users SET remember_token = $1 WHERE id = $2"#)
            .bind(token)
            .bind(id)
            .execute(&self.db)
            .await
            .context("store remember token")?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: i64,
        token: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET reset_token = $1, reset_token_expires = $2
             WHERE id = $3
            "#,
        )
        .bind(token)
        .bind(expires)
        .bind(id)
        .execute(&self.db)
        .await
        .context("store reset token")?;
        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE users SET password = $1 WHERE id = $2"#)
            .bind(password_hash)
            .bind(id)
            .execute(&self.db)
            .await
            .context("update password")?;
        Ok(())
    }

    async fn complete_password_reset(
        &self,
        id: i64,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET password = $1, reset_token = NULL, reset_token_expires = NULL
             WHERE id = $2 AND reset_token = $3
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .bind(token)
        .execute(&self.db)
        .await
        .context("complete password reset")?;
        Ok(result.rows_affected() == 1)
    }
}
