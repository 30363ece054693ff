//! The key-gated repository insight endpoint

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use tracing::info;

use crate::api::auth::api_key_from_headers;
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::keys::{increment_api_key_usage, validate_api_key_and_rate_limit, KeyRejection};
use crate::models::GitInsight;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitInsightRequest {
    #[serde(default)]
    pub github_url: Option<String>,
}

/// POST /api/git-insight
///
/// The key is checked and charged before the body is read, so a request with
/// a bad body still counts as a use.
pub async fn git_insight(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GitInsight>, ApiError> {
    let raw_key = api_key_from_headers(&headers).to_string();
    let (key, usage) = state
        .with_storage(move |storage| {
            let key = validate_api_key_and_rate_limit(storage, &raw_key)?;
            let usage = increment_api_key_usage(storage, &key)?;
            Ok::<_, KeyRejection>((key, usage))
        })
        .await??;
    info!(key_id = %key.id, usage, "Git insight request accepted");

    let request: GitInsightRequest = if body.is_empty() {
        GitInsightRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?
    };

    let github_url = request
        .github_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("GitHub URL is required"))?;

    let insight = state.pipeline.analyze(&github_url).await?;
    Ok(Json(insight))
}
