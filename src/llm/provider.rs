use async_trait::async_trait;
use crate::error::Result;
use crate::models::ReadmeAnalysis;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn analyze_readme(&self, readme: &str) -> Result<ReadmeAnalysis>;
    fn name(&self) -> &str;
}
