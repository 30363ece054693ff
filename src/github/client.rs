use reqwest::{header, Client, Response, StatusCode};

use crate::error::{Error, Result};
use crate::github::rate_limiter::RateLimiter;
use crate::models::{
    Contributor, GitHubContributor, GitHubRelease, GitHubRepository, LatestRelease, RepoStats,
};

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

/// File names tried in order when looking for a README.
pub const README_VARIANTS: [&str; 4] = ["README.md", "README.mdx", "readme.md", "readme.mdx"];

pub const MAX_CONTRIBUTORS: u32 = 10;

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    pub fn with_base_url(token: Option<&str>, base_url: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("gitinsight/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, path: &str, accept: &'static str) -> Result<Response> {
        self.rate_limiter.check().await?;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, accept)
            .send()
            .await?;
        self.rate_limiter.update_from_headers(response.headers()).await;

        Ok(response)
    }

    /// Raw README text, trying each of [`README_VARIANTS`] until one exists.
    pub async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<String> {
        for variant in README_VARIANTS {
            let path = format!("/repos/{}/{}/contents/{}", owner, repo, variant);
            let response = self.get(&path, ACCEPT_RAW).await?;

            if response.status().is_success() {
                tracing::debug!("Found {} for {}/{}", variant, owner, repo);
                return Ok(response.text().await?);
            }
        }

        Err(Error::ReadmeNotFound(format!("{}/{}", owner, repo)))
    }

    pub async fn fetch_repo_stats(&self, owner: &str, repo: &str) -> Result<RepoStats> {
        let response = self.get(&format!("/repos/{}/{}", owner, repo), ACCEPT_JSON).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::RepoNotFound(format!("{}/{}", owner, repo)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch repository stats for {}/{}: {} - {}",
                owner, repo, status, body
            )));
        }

        let raw: GitHubRepository = response.json().await?;
        Ok(raw.into())
    }

    pub async fn fetch_contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>> {
        let path = format!(
            "/repos/{}/{}/contributors?per_page={}",
            owner, repo, MAX_CONTRIBUTORS
        );
        let response = self.get(&path, ACCEPT_JSON).await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch contributors stats for {}/{}: {}",
                owner, repo, status
            )));
        }

        // GitHub answers 204 with no body for empty repositories
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        let contributors: Vec<GitHubContributor> = response.json().await?;
        Ok(contributors
            .into_iter()
            .take(MAX_CONTRIBUTORS as usize)
            .map(Contributor::from)
            .collect())
    }

    /// Latest published release; `None` when there is none or the lookup fails.
    pub async fn fetch_latest_release(&self, owner: &str, repo: &str) -> Option<LatestRelease> {
        let path = format!("/repos/{}/{}/releases/latest", owner, repo);
        let response = match self.get(&path, ACCEPT_JSON).await {
            Ok(r) if r.status().is_success() => r,
            Ok(_) => return None,
            Err(e) => {
                tracing::debug!("Latest release lookup failed for {}/{}: {}", owner, repo, e);
                return None;
            }
        };

        response
            .json::<GitHubRelease>()
            .await
            .ok()
            .map(LatestRelease::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::with_base_url(Some("test-token"), &server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_readme_falls_back_through_variants() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/contents/readme.md"))
            .and(header_eq("accept", ACCEPT_RAW))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Demo"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.fetch_readme("octo", "demo").await.unwrap(), "# Demo");
    }

    #[tokio::test]
    async fn test_fetch_readme_not_found() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        assert!(matches!(
            client.fetch_readme("octo", "empty").await,
            Err(Error::ReadmeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_repo_stats_maps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo"))
            .and(header_eq("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "stargazers_count": 10,
                "forks_count": 2,
                "subscribers_count": 4,
                "open_issues_count": 1,
                "updated_at": "2024-02-01T00:00:00Z",
                "default_branch": "main",
                "language": "Rust",
                "topics": ["cli"],
                "size": 99,
                "has_wiki": false,
                "archived": true,
                "created_at": "2023-01-01T00:00:00Z",
                "homepage": "https://demo.dev",
                "license": null
            })))
            .mount(&server)
            .await;

        let stats = client_for(&server)
            .await
            .fetch_repo_stats("octo", "demo")
            .await
            .unwrap();
        assert_eq!(stats.stars, 10);
        assert_eq!(stats.language.as_deref(), Some("Rust"));
        assert!(stats.is_archived);
        assert!(stats.license.is_none());
    }

    #[tokio::test]
    async fn test_fetch_repo_stats_not_found() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        assert!(matches!(
            client.fetch_repo_stats("octo", "missing").await,
            Err(Error::RepoNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_contributors_requests_ten() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/contributors"))
            .and(query_param("per_page", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"login": "alice", "contributions": 40, "html_url": "https://github.com/alice", "avatar_url": "https://a/1"},
                {"login": "bob", "contributions": 3, "html_url": "https://github.com/bob", "avatar_url": "https://a/2"}
            ])))
            .mount(&server)
            .await;

        let contributors = client_for(&server)
            .await
            .fetch_contributors("octo", "demo")
            .await
            .unwrap();
        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors[0].username, "alice");
        assert_eq!(contributors[1].profile_url, "https://github.com/bob");
    }

    #[tokio::test]
    async fn test_fetch_latest_release_absent_is_none() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        assert!(client.fetch_latest_release("octo", "demo").await.is_none());
    }

    #[tokio::test]
    async fn test_exhausted_rate_limit_blocks_next_call() {
        let server = MockServer::start().await;
        let reset = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 600;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", reset.to_string().as_str()),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.fetch_repo_stats("octo", "demo").await.is_err());
        assert!(matches!(
            client.fetch_contributors("octo", "demo").await,
            Err(Error::RateLimited(_))
        ));
    }
}
