use std::sync::Arc;

use crate::error::Result;
use crate::github::{parse_github_url, GitHubClient};
use crate::llm::LLMProvider;
use crate::models::{GitInsight, RepositoryInsight};

/// GitHub fetches followed by the README summary for one repository URL.
pub struct InsightPipeline {
    github: GitHubClient,
    llm: Arc<dyn LLMProvider>,
}

impl InsightPipeline {
    pub fn new(github: GitHubClient, llm: Arc<dyn LLMProvider>) -> Self {
        Self { github, llm }
    }

    pub async fn analyze(&self, github_url: &str) -> Result<GitInsight> {
        let (owner, repo) = parse_github_url(github_url)?;
        tracing::info!("Analyzing repository {}/{}", owner, repo);

        let (stats, readme, contributors, latest_release) = tokio::join!(
            self.github.fetch_repo_stats(&owner, &repo),
            self.github.fetch_readme(&owner, &repo),
            self.github.fetch_contributors(&owner, &repo),
            self.github.fetch_latest_release(&owner, &repo),
        );

        // Repository errors win over README errors so a missing repo is
        // always reported as missing, whichever fetch finished first.
        let stats = stats?;
        let readme = readme?;
        let contributors = contributors?;

        tracing::debug!(
            "Fetched {}/{}: {} README chars, {} contributors",
            owner,
            repo,
            readme.len(),
            contributors.len()
        );

        let analysis = self.llm.analyze_readme(&readme).await?;

        Ok(GitInsight {
            repository: RepositoryInsight {
                owner,
                repo,
                url: github_url.to_string(),
                stats,
                contributors,
                latest_release,
            },
            analysis,
        })
    }
}
