//! Account registration and status endpoints

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::{AccountStatusResponse, RegisterRequest, RegisterResponse};
use crate::routes::auth::AuthenticatedAccount;
use crate::AppState;

/// POST /api/account/register
/// Creates an account with an empty profile and returns its token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Option<RegisterRequest>>,
) -> Result<Json<RegisterResponse>> {
    let name = payload.and_then(|p| p.name);
    let account = state.store.create_account(name.as_deref(), state.now()).await?;

    tracing::info!("Registered new account: {}", account.id);

    Ok(Json(RegisterResponse {
        account_id: account.id,
        token: account.token,
    }))
}

/// GET /api/account/status
pub async fn status(
    Extension(auth): Extension<AuthenticatedAccount>,
    State(state): State<AppState>,
) -> Result<Json<AccountStatusResponse>> {
    let account = state
        .store
        .get_account_by_token(&auth.token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(AccountStatusResponse {
        account_id: account.id,
        name: account.name,
        created_at: account.created_at,
        last_seen_at: account.last_seen_at,
    }))
}
