//! User registration endpoints

use axum::extract::State;
use tracing::info;

use crate::api::auth::CurrentUser;
use crate::api::error::ApiError;
use crate::api::json::Json;
use crate::api::state::AppState;
use crate::models::{NewUser, User};

/// POST /api/users
///
/// Registers the user on first sign-in. Calling it again for a known email
/// returns the existing record unchanged.
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }

    let user = state
        .with_storage(move |storage| storage.upsert_user(&request))
        .await?
        .map_err(|e| ApiError::storage("Failed to register user", e))?;

    info!(user_id = %user.id, "User registered");
    Ok(Json(user))
}

/// GET /api/users/me
pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
