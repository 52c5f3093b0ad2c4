use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password_async, verify_password_async},
        repo::UserRepo,
        repo_types::User,
        validation::{validate_email, validate_password},
    },
    config::PasswordPolicy,
    error::{AppError, AppResult},
};

pub const RESET_TOKEN_LEN: usize = 16;

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub remember_token: Option<String>,
}

/// Registration, login and password lifecycle over a [`UserRepo`].
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    policy: PasswordPolicy,
    reset_ttl: TimeDuration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, policy: PasswordPolicy, reset_ttl: TimeDuration) -> Self {
        Self {
            users,
            policy,
            reset_ttl,
        }
    }

    /// Not idempotent: a retried request after a lost response reports a
    /// duplicate email.
    pub async fn register(&self, email: &str, password: &str) -> AppResult<User> {
        let email = email.trim();

        let mut errors = validate_email(email);
        errors.extend(validate_password(password, self.policy));
        if !errors.is_empty() {
            warn!(count = errors.len(), "registration validation failed");
            return Err(AppError::Validation(errors));
        }

        if self.users.find_by_email(email).await?.is_some() {
            warn!(%email, "email already registered");
            return Err(AppError::DuplicateEmail);
        }

        let hash = hash_password_async(password.to_owned()).await?;

        // A concurrent registration can still win the unique index.
        let user = self
            .users
            .create(email, &hash)
            .await?
            .ok_or(AppError::DuplicateEmail)?;

        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(user)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> AppResult<LoginOutcome> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            warn!(%email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password_async(password.to_owned(), user.password_hash.clone()).await? {
            warn!(user_id = user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let remember_token = if remember_me {
            let token = Uuid::new_v4().simple().to_string();
            self.users.set_remember_token(user.id, &token).await?;
            debug!(user_id = user.id, "remember token issued");
            Some(token)
        } else {
            None
        };

        info!(user_id = user.id, remember_me, "user logged in");
        Ok(LoginOutcome {
            user,
            remember_token,
        })
    }

    pub async fn check_remember_token(&self, token: &str) -> AppResult<User> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::validation("Token is required"));
        }
        match self.users.find_by_remember_token(token).await? {
            Some(user) => {
                debug!(user_id = user.id, "remember token accepted");
                Ok(user)
            }
            None => {
                warn!("unknown remember token");
                Err(AppError::InvalidToken)
            }
        }
    }

    /// Issues a fresh reset token, replacing any earlier one. The caller is
    /// responsible for delivering it out of band.
    pub async fn forgot_password(&self, email: &str) -> AppResult<(User, String)> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!(%email, "password reset for unknown email");
            return Err(AppError::UserNotFound);
        };

        let token = generate_reset_token();
        let expires = OffsetDateTime::now_utc() + self.reset_ttl;
        self.users.set_reset_token(user.id, &token, expires).await?;

        info!(user_id = user.id, %expires, "reset token issued");
        Ok((user, token))
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::InvalidOrExpiredToken);
        }

        let now = OffsetDateTime::now_utc();
        let Some(user) = self.users.find_by_reset_token(token, now).await? else {
            warn!("invalid or expired reset token");
            return Err(AppError::InvalidOrExpiredToken);
        };

        let errors = validate_password(new_password, self.policy);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let hash = hash_password_async(new_password.to_owned()).await?;
        if !self
            .users
            .complete_password_reset(user.id, token, &hash)
            .await?
        {
            // Consumed by a concurrent reset between lookup and update.
            return Err(AppError::InvalidOrExpiredToken);
        }

        info!(user_id = user.id, "password reset");
        Ok(())
    }

    pub async fn update_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            return Err(AppError::UserNotFound);
        };

        if !verify_password_async(current_password.to_owned(), user.password_hash.clone()).await?
        {
            warn!(user_id, "update password with wrong current password");
            return Err(AppError::InvalidCredentials);
        }

        let errors = validate_password(new_password, self.policy);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let hash = hash_password_async(new_password.to_owned()).await?;
        self.users.update_password(user_id, &hash).await?;

        info!(user_id, "password updated");
        Ok(())
    }
}

fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}
