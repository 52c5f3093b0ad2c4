use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            CheckRememberTokenRequest, ForgotPasswordRequest, LoginRequest, LoginResponse,
            LoginUser, MessageResponse, PublicUser, RegisterRequest, RegisterResponse,
            ResetPasswordRequest, SessionResponse, UpdatePasswordRequest,
        },
        extractors::Session,
    },
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/check-remember-token", post(check_remember_token))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/update-password", post(update_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state.auth.register(&payload.email, &payload.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let outcome = state
        .auth
        .login(&payload.email, &payload.password, payload.remember_me)
        .await?;

    let session_token = state.session_keys.sign(outcome.user.id)?;

    Ok(Json(LoginResponse {
        message: "Logged in successfully".into(),
        user: LoginUser {
            id: outcome.user.id,
            email: outcome.user.email,
            remember_token: outcome.remember_token,
        },
        session_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn check_remember_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CheckRememberTokenRequest>,
) -> AppResult<Json<SessionResponse>> {
    let user = state.auth.check_remember_token(&payload.token).await?;

    let session_token = state.session_keys.sign(user.id)?;

    Ok(Json(SessionResponse {
        message: "Token is valid".into(),
        user: PublicUser::from(&user),
        session_token,
    }))
}

/// The reset token goes to the notifier only; it never appears in the response.
#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (user, token) = state.auth.forgot_password(&payload.email).await?;
    state.notifier.send_reset_token(&user.email, &token).await?;
    Ok(Json(MessageResponse::new("Reset code sent")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth
        .reset_password(&payload.token, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

#[instrument(skip(state, session, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    session: Session,
    AppJson(payload): AppJson<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = payload
        .user_id
        .ok_or_else(|| AppError::validation("userId is required"))?;
    session.authorize(user_id)?;

    state
        .auth
        .update_password(user_id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
