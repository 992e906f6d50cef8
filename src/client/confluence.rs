//! Confluence REST client.
//!
//! Same credential shape and auth scheme as Jira; separate client because
//! the two services are configured and versioned independently.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;

use crate::config::ConfluenceConfig;
use crate::error::{OpsError, Result};

/// A wiki page summary from the content search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    results: Vec<Page>,
}

#[derive(Debug)]
pub struct ConfluenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConfluenceClient {
    pub fn new(config: &ConfluenceConfig) -> Result<Self> {
        let (url, username, token) = match (&config.url, &config.username, &config.token) {
            (Some(url), Some(username), Some(token)) => (url, username, token),
            _ => {
                return Err(OpsError::Config(
                    "Confluence configuration incomplete: url, username and token are required"
                        .to_string(),
                ))
            }
        };

        let credentials = BASE64.encode(format!("{}:{}", username, token));
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Basic {}", credentials)).map_err(|_| {
            OpsError::Config("Confluence credentials contain invalid characters".to_string())
        })?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up a page by space key and title.
    pub async fn get_page(&self, space: &str, title: &str) -> Result<Page> {
        let url = format!("{}/rest/api/content", self.base_url);
        let results: SearchResults = self
            .http
            .get(&url)
            .query(&[("spaceKey", space), ("title", title)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        results
            .results
            .into_iter()
            .next()
            .ok_or_else(|| OpsError::NotFound(format!("page '{}' in space '{}'", title, space)))
    }
}
