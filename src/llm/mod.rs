pub mod provider;
pub mod openai;
pub mod claude;
pub mod prompts;
pub mod parser;

use std::sync::Arc;

use crate::config::{LLMBackend, LLMConfig};
use crate::error::Result;

pub use provider::LLMProvider;
pub use openai::OpenAIProvider;
pub use claude::ClaudeProvider;

pub fn provider_from_config(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match config.backend {
        LLMBackend::OpenAI => Arc::new(OpenAIProvider::new(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )?),
        LLMBackend::Anthropic => Arc::new(ClaudeProvider::new(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )?),
    };
    tracing::info!("Using {} for README analysis", provider.name());
    Ok(provider)
}
