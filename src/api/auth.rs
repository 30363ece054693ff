//! Request identity extractors

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::models::User;

/// Header carrying the signed-in user's email, set by the identity proxy in
/// front of this service.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Header carrying the caller's API key on proxied endpoints.
pub const API_KEY_HEADER: &str = "x-api-key";

/// The registered user making the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = header_str(&parts.headers, USER_EMAIL_HEADER)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?
            .to_string();

        let user = state
            .with_storage(move |storage| storage.get_user_by_email(&email))
            .await?
            .map_err(|e| ApiError::storage("Failed to look up user", e))?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        Ok(CurrentUser(user))
    }
}

/// API key from the `x-api-key` header; empty when absent.
pub fn api_key_from_headers(headers: &HeaderMap) -> &str {
    header_str(headers, API_KEY_HEADER).unwrap_or_default()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_header_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, "  git-insight-abc ".parse().unwrap());
        assert_eq!(api_key_from_headers(&headers), "git-insight-abc");
    }

    #[test]
    fn test_missing_api_key_header_is_empty() {
        assert_eq!(api_key_from_headers(&HeaderMap::new()), "");
    }
}
