use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::api_keys;
use super::git_insight;
use super::health;
use super::state::AppState;
use super::users;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Registration and identity
        .route("/api/users", post(users::register_user))
        .route("/api/users/me", get(users::current_user))
        // Key management for the signed-in user
        .route(
            "/api/api-keys",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route(
            "/api/api-keys/{id}",
            get(api_keys::get_api_key)
                .patch(api_keys::update_api_key)
                .delete(api_keys::delete_api_key),
        )
        // Key-authenticated endpoints
        .route("/api/validate-key", post(api_keys::validate_key))
        .route("/api/git-insight", post(git_insight::git_insight))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
