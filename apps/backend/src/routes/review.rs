//! Review session endpoints

use axum::{extract::State, Extension, Json};
use verse_core::QueueRequest;

use crate::error::Result;
use crate::models::{GradeRequest, GradeResponse, QueueResponse};
use crate::routes::auth::AuthenticatedAccount;
use crate::services::review;
use crate::AppState;

/// POST /api/review/queue
pub async fn queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Json(payload): Json<QueueRequest>,
) -> Result<Json<QueueResponse>> {
    let response = review::queue(&state, auth.account_id, payload).await?;
    Ok(Json(response))
}

/// POST /api/review/grade
pub async fn grade(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Json(payload): Json<GradeRequest>,
) -> Result<Json<GradeResponse>> {
    let response = review::grade(&state, auth.account_id, payload).await?;
    Ok(Json(response))
}
