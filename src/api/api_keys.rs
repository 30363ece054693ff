//! API key management endpoints
//!
//! Every operation is scoped to the [`CurrentUser`]; keys owned by someone
//! else are reported as not found.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiError;
use crate::api::json::Json;
use crate::api::state::AppState;
use crate::keys::generate_api_key;
use crate::models::{ApiKey, ApiKeyUpdate, NewApiKey};

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// GET /api/api-keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ApiKey>>, ApiError> {
    let user_id = user.id.clone();
    let keys = state
        .with_storage(move |storage| storage.list_api_keys(&user_id))
        .await?
        .map_err(|e| ApiError::storage("Failed to fetch API keys", e))?;

    debug!(user_id = %user.id, count = keys.len(), "Listed API keys");
    Ok(Json(keys))
}

/// POST /api/api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<NewApiKey>,
) -> Result<Json<ApiKey>, ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let user_id = user.id.clone();
    let key = state
        .with_storage(move |storage| {
            storage.create_api_key(&user_id, &request, &generate_api_key())
        })
        .await?
        .map_err(|e| ApiError::storage("Failed to create API key", e))?;

    info!(user_id = %user.id, key_id = %key.id, "API key created");
    Ok(Json(key))
}

/// GET /api/api-keys/{id}
pub async fn get_api_key(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiKey>, ApiError> {
    let key = state
        .with_storage(move |storage| storage.get_api_key(&id, &user.id))
        .await?
        .map_err(|e| ApiError::storage("Failed to fetch API key", e))?
        .ok_or_else(|| ApiError::not_found("API key not found"))?;

    Ok(Json(key))
}

/// PATCH /api/api-keys/{id}
pub async fn update_api_key(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(update): Json<ApiKeyUpdate>,
) -> Result<Json<ApiKey>, ApiError> {
    if update.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    update.validate().map_err(ApiError::bad_request)?;

    let user_id = user.id.clone();
    let key = state
        .with_storage(move |storage| storage.update_api_key(&id, &user_id, &update))
        .await?
        .map_err(|e| ApiError::storage("Failed to update API key", e))?
        .ok_or_else(|| ApiError::not_found("API key not found"))?;

    info!(user_id = %user.id, key_id = %key.id, "API key updated");
    Ok(Json(key))
}

/// DELETE /api/api-keys/{id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (key_id, user_id) = (id.clone(), user.id.clone());
    let deleted = state
        .with_storage(move |storage| storage.delete_api_key(&key_id, &user_id))
        .await?
        .map_err(|e| ApiError::storage("Failed to delete API key", e))?;

    if !deleted {
        return Err(ApiError::not_found("API key not found"));
    }

    info!(user_id = %user.id, key_id = %id, "API key deleted");
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    #[serde(default)]
    pub api_key: String,
}

/// POST /api/validate-key
///
/// Checks that a key exists without counting a use against it.
pub async fn validate_key(
    State(state): State<AppState>,
    Json(request): Json<ValidateKeyRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let key = request.api_key.trim().to_string();
    if key.is_empty() {
        return Err(ApiError::unauthorized("Invalid API key"));
    }

    state
        .with_storage(move |storage| storage.find_api_key(&key))
        .await?
        .map_err(|e| ApiError::storage("Internal server error", e))?
        .ok_or_else(|| ApiError::unauthorized("Invalid API key"))?;

    Ok(Json(SuccessResponse { success: true }))
}
