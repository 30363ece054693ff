pub mod client;
pub mod rate_limiter;
pub mod url;

pub use client::GitHubClient;
pub use rate_limiter::RateLimiter;
pub use url::parse_github_url;
