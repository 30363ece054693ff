pub mod api_keys;
pub mod auth;
pub mod error;
pub mod git_insight;
pub mod health;
pub mod json;
pub mod router;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use json::Json;
pub use router::create_router;
pub use state::AppState;
