//! Jira REST client.
//!
//! Thin wrapper over the Jira Cloud v2 REST API using Basic auth
//! (username + API token). Construction validates the credential triple;
//! no request is made until a method is called.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::config::JiraConfig;
use crate::error::{OpsError, Result};

/// The key of a freshly created issue, e.g. `PROJ-123`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

#[derive(Debug)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let mut missing = Vec::new();
        if config.url.is_none() {
            missing.push("url");
        }
        if config.username.is_none() {
            missing.push("username");
        }
        if config.token.is_none() {
            missing.push("token");
        }
        if !missing.is_empty() {
            return Err(OpsError::Config(format!(
                "Jira configuration incomplete: missing {}",
                missing.join(", ")
            )));
        }

        let url = config.url.as_deref().unwrap_or_default();
        let username = config.username.as_deref().unwrap_or_default();
        let token = config.token.as_deref().unwrap_or_default();

        let credentials = BASE64.encode(format!("{}:{}", username, token));
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Basic {}", credentials))
            .map_err(|_| OpsError::Config("Jira credentials contain invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    /// Create an issue and return its key.
    pub async fn create_issue(
        &self,
        project_key: &str,
        summary: &str,
        description: &str,
        issue_type: &str,
    ) -> Result<CreatedIssue> {
        let url = format!("{}/rest/api/2/issue", self.base_url);
        let body = json!({
            "fields": {
                "project": { "key": project_key },
                "summary": summary,
                "description": description,
                "issuetype": { "name": issue_type },
            }
        });
        let issue = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reports_all_missing_fields() {
        let err = JiraClient::new(&JiraConfig::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("url"));
        assert!(msg.contains("username"));
        assert!(msg.contains("token"));
    }

    #[test]
    fn test_new_reports_partial_missing_fields() {
        let config = JiraConfig {
            url: Some("https://jira.example.com".to_string()),
            username: Some("ops@example.com".to_string()),
            token: None,
        };
        let err = JiraClient::new(&config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("token"));
        assert!(!msg.contains("username"));
    }

    #[test]
    fn test_new_with_complete_config() {
        let config = JiraConfig {
            url: Some("https://jira.example.com/".to_string()),
            username: Some("ops@example.com".to_string()),
            token: Some("secret".to_string()),
        };
        let client = JiraClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://jira.example.com");
    }

    #[test]
    fn test_created_issue_deserialization() {
        let json = r#"{"id": "10042", "key": "OPS-7", "self": "https://jira.example.com/rest/api/2/issue/10042"}"#;
        let issue: CreatedIssue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.key, "OPS-7");
        assert_eq!(issue.id, "10042");
    }
}
