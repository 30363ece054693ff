use crate::error::{Error, Result};

const GITHUB_HOST: &str = "github.com/";

/// Split a repository URL such as `https://github.com/rust-lang/cargo.git`
/// into `(owner, repo)`.
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    let invalid = || Error::InvalidGitHubUrl(url.to_string());

    let start = url.find(GITHUB_HOST).ok_or_else(invalid)? + GITHUB_HOST.len();
    let mut segments = url[start..].split('/');

    let owner = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let repo = segments.next().ok_or_else(invalid)?;

    // drop any query string or fragment glued to the repo segment
    let repo = repo.split(['?', '#']).next().unwrap_or_default();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if repo.is_empty() {
        return Err(invalid());
    }

    Ok((owner.to_string(), repo.to_string()))
}
