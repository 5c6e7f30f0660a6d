use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    state::AppState,
    users::{
        dto::{UpsertUserRequest, UpsertedUser, UserProfile},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(upsert_user))
        .route("/api/users/email/:email", get(get_user_by_email))
}

#[instrument(skip(state))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    Ok(Json(UserProfile {
        id: user.id,
        email: user.email,
        name: user.name,
        grade: user.grade,
        board: user.board,
    }))
}

#[instrument(skip(state, payload))]
pub async fn upsert_user(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpsertedUser>, AppError> {
    let Json(body) = payload.map_err(|e| {
        warn!(error = %e, "unreadable user body");
        AppError::bad_request("Invalid JSON body")
    })?;

    let UpsertUserRequest(input) = UpsertUserRequest::from_json(&body).map_err(|e| {
        warn!(error = %e, "invalid user payload");
        e
    })?;

    let user = User::upsert(&state.db, &input).await?;

    info!(user_id = user.id, email = %user.email, "user upserted");
    Ok(Json(UpsertedUser {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}
