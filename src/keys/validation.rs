use thiserror::Error;

use crate::error::Error;
use crate::models::ApiKey;
use crate::storage::Storage;

/// Why a proxied call was refused before any upstream work happened.
#[derive(Error, Debug)]
pub enum KeyRejection {
    #[error("API key is required")]
    Missing,

    #[error("Invalid API key")]
    Invalid,

    #[error("Rate limit exceeded")]
    RateLimited { usage: u64, limit: u64 },

    #[error("Failed to update usage count")]
    UsageUpdate(#[source] Error),

    #[error("Failed to verify API key")]
    Lookup(#[source] Error),
}

/// Resolve `raw_key` to its record and check the usage cap.
///
/// The cap is only consulted when `limit_enabled` is set and a limit value
/// is stored.
pub fn validate_api_key_and_rate_limit(
    storage: &Storage,
    raw_key: &str,
) -> Result<ApiKey, KeyRejection> {
    let raw_key = raw_key.trim();
    if raw_key.is_empty() {
        return Err(KeyRejection::Missing);
    }

    let key = storage
        .find_api_key(raw_key)
        .map_err(KeyRejection::Lookup)?
        .ok_or(KeyRejection::Invalid)?;

    if let Some(limit) = key.effective_limit() {
        if key.usage >= limit {
            tracing::info!(key_id = %key.id, usage = key.usage, limit, "API key over its limit");
            return Err(KeyRejection::RateLimited {
                usage: key.usage,
                limit,
            });
        }
    }

    Ok(key)
}

/// Count one use of `key`. Returns the new usage.
///
/// The increment re-checks the limit inside the same statement, so two
/// requests racing past validation cannot both take the last slot.
pub fn increment_api_key_usage(storage: &Storage, key: &ApiKey) -> Result<u64, KeyRejection> {
    match storage.increment_usage(&key.id) {
        Ok(Some(usage)) => {
            tracing::debug!(key_id = %key.id, usage, "API key usage incremented");
            Ok(usage)
        }
        Ok(None) => {
            // The row may have been deleted between validation and increment.
            let current = storage
                .find_api_key(&key.key)
                .map_err(KeyRejection::UsageUpdate)?
                .ok_or(KeyRejection::Invalid)?;
            Err(KeyRejection::RateLimited {
                usage: current.usage,
                limit: current.effective_limit().unwrap_or(current.usage),
            })
        }
        Err(e) => {
            tracing::error!(key_id = %key.id, error = %e, "Failed to update usage count");
            Err(KeyRejection::UsageUpdate(e))
        }
    }
}
