use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    signals::{
        dto::{parse_batch, MessageResponse, SignalView},
        repo_types::Signal,
    },
    state::AppState,
};

pub fn signal_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signals/batch", post(save_signals_batch))
        .route("/api/signals/user/:user_id", get(list_signals_for_user))
}

/// POST /api/signals/batch: all items are validated up front, then written in one transaction.
#[instrument(skip(state, payload))]
pub async fn save_signals_batch(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(body) = payload.map_err(|e| {
        warn!(error = %e, "unreadable signal batch");
        AppError::bad_request("Invalid payload")
    })?;

    let items = parse_batch(&body).map_err(|e| {
        warn!(error = %e, "rejected signal batch");
        e
    })?;

    let written = Signal::insert_batch(&state.db, &items).await?;

    info!(count = written, "signals saved");
    Ok(Json(MessageResponse {
        message: "Signals saved successfully",
    }))
}

#[instrument(skip(state))]
pub async fn list_signals_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<SignalView>>, AppError> {
    let user_id: i64 = user_id
        .parse()
        .map_err(|_| AppError::bad_request("Invalid userId"))?;

    let signals = Signal::list_by_user(&state.db, user_id).await?;
    Ok(Json(signals.into_iter().map(SignalView::from).collect()))
}
