//! GitHub REST client.
//!
//! Thin wrapper over the v3 REST API. Construction validates that a token is
//! configured and builds the HTTP client; no request is made until a method
//! is called.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;

use crate::config::GithubConfig;
use crate::error::{OpsError, Result};

/// Repository metadata, as returned by `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub default_branch: String,
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
    #[serde(rename = "forks_count")]
    pub forks: u64,
    pub private: bool,
}

/// Pull request summary, as returned by `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub user: PullRequestAuthor,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestAuthor {
    pub login: String,
}

#[derive(Debug)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let token = config
            .token
            .as_deref()
            .ok_or_else(|| OpsError::Config("GitHub token not configured".to_string()))?;

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| OpsError::Config("GitHub token contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("opsdeck"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a repository by `owner/name`.
    pub async fn get_repo(&self, full_name: &str) -> Result<Repo> {
        let url = format!("{}/repos/{}", self.api_url, full_name);
        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(OpsError::NotFound(format!("repository '{}'", full_name)));
        }
        let repo = response.error_for_status()?.json().await?;
        Ok(repo)
    }

    /// List pull requests for a repository.
    pub async fn list_pull_requests(
        &self,
        full_name: &str,
        state: &str,
    ) -> Result<Vec<PullRequest>> {
        let url = format!("{}/repos/{}/pulls", self.api_url, full_name);
        let pulls = self
            .http
            .get(&url)
            .query(&[("state", state)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(pulls)
    }
}
