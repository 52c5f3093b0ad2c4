use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{extractors::Session, MessageResponse},
    dashboard::{
        dto::{
            CreateRecordRequest, CreatedRecordResponse, ListParams, UpdateRecordRequest,
            UserIdParams,
        },
        repo_types::DashboardRecord,
    },
    error::{AppError, AppResult},
    extract::{AppJson, AppQuery},
    state::AppState,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard-data", get(list_records).post(create_record))
        .route(
            "/api/dashboard-data/:id",
            put(update_record).delete(delete_record),
        )
}

fn require_user_id(user_id: Option<i64>) -> AppResult<i64> {
    user_id.ok_or_else(|| AppError::validation("userId is required"))
}

#[instrument(skip(state, session))]
pub async fn list_records(
    State(state): State<AppState>,
    session: Session,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<Json<Vec<DashboardRecord>>> {
    let user_id = require_user_id(params.user_id)?;
    session.authorize(user_id)?;

    let records = state.dashboard.list(user_id, params.list_query()).await?;
    Ok(Json(records))
}

#[instrument(skip(state, session, payload))]
pub async fn create_record(
    State(state): State<AppState>,
    session: Session,
    AppJson(payload): AppJson<CreateRecordRequest>,
) -> AppResult<(StatusCode, Json<CreatedRecordResponse>)> {
    let user_id = require_user_id(payload.user_id)?;
    session.authorize(user_id)?;

    let record = state.dashboard.create(user_id, payload.into_input()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedRecordResponse {
            message: "Record added successfully".into(),
            data: record,
        }),
    ))
}

#[instrument(skip(state, session, payload))]
pub async fn update_record(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateRecordRequest>,
) -> AppResult<Json<DashboardRecord>> {
    let user_id = require_user_id(payload.user_id)?;
    session.authorize(user_id)?;

    let record = state
        .dashboard
        .update(id, user_id, payload.into_input())
        .await?;
    Ok(Json(record))
}

#[instrument(skip(state, session))]
pub async fn delete_record(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    AppQuery(params): AppQuery<UserIdParams>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = require_user_id(params.user_id)?;
    session.authorize(user_id)?;

    state.dashboard.delete(id, user_id).await?;
    Ok(Json(MessageResponse::new("Record deleted")))
}
