use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Optional session token from `Authorization: Bearer <token>`.
///
/// Holds the verified user id when a token was sent. A missing header is
/// accepted unless `require_session_token` is configured; a header that is
/// present but invalid is always rejected.
#[derive(Debug, Clone, Copy)]
pub struct Session(pub Option<i64>);

impl Session {
    /// A verified session may only act on its own user id.
    pub fn authorize(&self, user_id: i64) -> AppResult<()> {
        match self.0 {
            Some(sub) if sub != user_id => {
                warn!(session_user = sub, requested_user = user_id, "session user mismatch");
                Err(AppError::Forbidden)
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
            if state.config.require_session_token {
                return Err(AppError::InvalidToken);
            }
            return Ok(Session(None));
        };

        let auth = header.to_str().map_err(|_| AppError::InvalidToken)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::InvalidToken)?;

        let claims = state.session_keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired session token");
            AppError::InvalidToken
        })?;

        Ok(Session(Some(claims.sub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, Request};

    async fn extract(state: &AppState, auth: Option<&str>) -> AppResult<Session> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Session::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn missing_header_is_anonymous_by_default() {
        let state = AppState::fake();
        let session = extract(&state, None).await.unwrap();
        assert!(session.0.is_none());
        assert!(session.authorize(99).is_ok());
    }

    #[tokio::test]
    async fn missing_header_rejected_when_required() {
        let mut config = crate::config::AppConfig::for_tests();
        config.require_session_token = true;
        let (state, _) = AppState::fake_with(config);
        let err = extract(&state, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn valid_token_binds_user() {
        let state = AppState::fake();
        let token = state.session_keys.sign(5).unwrap();
        let session = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(session.0, Some(5));
        assert!(session.authorize(5).is_ok());
        assert!(matches!(session.authorize(6), Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn garbage_token_rejected() {
        let state = AppState::fake();
        let err = extract(&state, Some("Bearer nope")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
        let err = extract(&state, Some("Basic abc")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
