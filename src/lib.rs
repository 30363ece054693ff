pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod llm;
pub mod keys;
pub mod analysis;
pub mod storage;
pub mod api;

pub use config::{Config, LLMConfig};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use llm::{ClaudeProvider, LLMProvider, OpenAIProvider};
pub use analysis::InsightPipeline;
pub use storage::Storage;
pub use api::{create_router, AppState};
