use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::ReadmeAnalysis;

/// Raw `/repos/{owner}/{repo}` payload, reduced to the fields we report.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub subscribers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    pub updated_at: DateTime<Utc>,
    pub default_branch: String,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub homepage: Option<String>,
    pub license: Option<GitHubLicense>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLicense {
    pub key: String,
    pub name: String,
    pub spdx_id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubContributor {
    pub login: String,
    pub contributions: u64,
    pub html_url: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub html_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepoStats {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub last_update: DateTime<Utc>,
    pub default_branch: String,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub size: u64,
    pub has_wiki: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub homepage: Option<String>,
    pub license: Option<License>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub key: String,
    pub name: String,
    pub spdx_id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub username: String,
    pub contributions: u64,
    pub profile_url: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatestRelease {
    pub tag_name: String,
    pub name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
}

impl From<GitHubRepository> for RepoStats {
    fn from(repo: GitHubRepository) -> Self {
        Self {
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            watchers: repo.subscribers_count,
            open_issues: repo.open_issues_count,
            last_update: repo.updated_at,
            default_branch: repo.default_branch,
            language: repo.language,
            topics: repo.topics,
            size: repo.size,
            has_wiki: repo.has_wiki,
            is_archived: repo.archived,
            created_at: repo.created_at,
            homepage: repo.homepage,
            license: repo.license.map(|l| License {
                key: l.key,
                name: l.name,
                spdx_id: l.spdx_id,
                url: l.url,
            }),
        }
    }
}

impl From<GitHubContributor> for Contributor {
    fn from(c: GitHubContributor) -> Self {
        Self {
            username: c.login,
            contributions: c.contributions,
            profile_url: c.html_url,
            avatar_url: c.avatar_url,
        }
    }
}

impl From<GitHubRelease> for LatestRelease {
    fn from(r: GitHubRelease) -> Self {
        Self {
            tag_name: r.tag_name,
            name: r.name,
            published_at: r.published_at,
            url: r.html_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInsight {
    pub owner: String,
    pub repo: String,
    pub url: String,
    pub stats: RepoStats,
    pub contributors: Vec<Contributor>,
    pub latest_release: Option<LatestRelease>,
}

/// Body returned by `/api/git-insight`: repository data with the README
/// analysis fields flattened alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitInsight {
    pub repository: RepositoryInsight,
    #[serde(flatten)]
    pub analysis: ReadmeAnalysis,
}
