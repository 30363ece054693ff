use crate::error::{Error, Result};
use std::env;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LLMBackend {
    OpenAI,
    Anthropic,
}

impl std::str::FromStr for LLMBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(Error::Config(format!("Unknown LLM_PROVIDER: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub backend: LLMBackend,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "gitinsight.db".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let github_token = env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());

        let github_api_url = env::var("GITHUB_API_URL")
            .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string());

        Ok(Self {
            database_path,
            host,
            port,
            github_token,
            github_api_url,
            llm: LLMConfig::from_env()?,
        })
    }
}

impl LLMConfig {
    pub fn from_env() -> Result<Self> {
        let backend = match env::var("LLM_PROVIDER") {
            Ok(v) => v.parse()?,
            Err(_) => LLMBackend::OpenAI,
        };

        let key_var = match backend {
            LLMBackend::OpenAI => "OPENAI_API_KEY",
            LLMBackend::Anthropic => "ANTHROPIC_API_KEY",
        };
        let api_key = env::var(key_var)
            .map_err(|_| Error::Config(format!("{} environment variable not set", key_var)))?;

        Ok(Self {
            backend,
            api_key,
            model: env::var("LLM_MODEL").ok(),
            base_url: env::var("LLM_BASE_URL").ok(),
        })
    }
}
