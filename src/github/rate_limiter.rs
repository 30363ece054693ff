use reqwest::header::HeaderMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Tracks GitHub's `x-ratelimit-*` headers so an exhausted budget fails fast
/// instead of hammering the API until the window resets.
pub struct RateLimiter {
    state: Mutex<RateLimitState>,
}

struct RateLimitState {
    remaining: Option<u32>,
    reset_at: Option<Instant>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RateLimitState {
                remaining: None,
                reset_at: None,
            }),
        }
    }

    /// Err with the seconds until reset when the last response reported an
    /// empty budget and the window has not rolled over yet.
    pub async fn check(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.remaining != Some(0) {
            return Ok(());
        }

        match state.reset_at {
            Some(reset_at) if reset_at > Instant::now() => {
                let wait = reset_at - Instant::now();
                tracing::warn!("GitHub rate limit exhausted, resets in {:?}", wait);
                Err(Error::RateLimited(wait.as_secs().max(1)))
            }
            _ => {
                state.remaining = None;
                state.reset_at = None;
                Ok(())
            }
        }
    }

    pub async fn update_from_headers(&self, headers: &HeaderMap) {
        let Some(remaining) = header_number::<u32>(headers, "x-ratelimit-remaining") else {
            return;
        };
        let reset = header_number::<u64>(headers, "x-ratelimit-reset");

        let mut state = self.state.lock().await;
        state.remaining = Some(remaining);
        state.reset_at = reset.and_then(|reset_timestamp| {
            let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
            (reset_timestamp > now)
                .then(|| Instant::now() + Duration::from_secs(reset_timestamp - now))
        });

        if remaining < 10 {
            tracing::debug!("GitHub rate limit low: {} requests remaining", remaining);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
