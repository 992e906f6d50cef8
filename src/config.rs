//! Configuration for OpsDeck
//!
//! All service credentials and plugin policy live in a single JSON config
//! file (`~/.opsdeck/config.json` by default, overridable via the
//! `OPSDECK_CONFIG` environment variable). Every field is optional with a
//! serde default so a missing or partial file still yields a usable config;
//! well-known environment variables overlay the file so tokens never have to
//! be written to disk.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{OpsError, Result};

/// GitHub API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token. Overlaid by `GITHUB_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,

    /// API base URL, for GitHub Enterprise installs.
    #[serde(default = "default_github_api")]
    pub api_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_api(),
        }
    }
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

/// Jira server credentials. All three fields are required to construct the
/// Jira client; which ones are missing is reported at first use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Confluence server credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfluenceConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Kubernetes access settings. The client shells out to `kubectl`, so only
/// the context selection lives here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubernetesConfig {
    /// kubeconfig context to use. Overlaid by `KUBE_CONTEXT`.
    #[serde(default)]
    pub context: Option<String>,
}

/// SSH defaults applied to every target host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// Login user. Overlaid by `SSH_USER`. `None` lets ssh pick the
    /// local username.
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// Per-host overrides keyed by hostname.
    #[serde(default)]
    pub hosts: HashMap<String, SshHostConfig>,
}

/// Per-host SSH overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SshHostConfig {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: None,
            port: default_ssh_port(),
            hosts: HashMap::new(),
        }
    }
}

fn default_ssh_port() -> u16 {
    22
}

/// Plugin policy: which providers from the built-in set are permitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Allowlist of plugin names. If empty, all providers are allowed.
    #[serde(default)]
    pub allowed: Vec<String>,

    /// Blocklist of plugin names. Takes precedence over the allowlist.
    #[serde(default)]
    pub blocked: Vec<String>,
}

impl PluginConfig {
    /// Check whether a plugin name is permitted by the allow/block lists.
    pub fn is_permitted(&self, name: &str) -> bool {
        if self.blocked.iter().any(|b| b == name) {
            return false;
        }
        if self.allowed.is_empty() {
            return true;
        }
        self.allowed.iter().any(|a| a == name)
    }
}

/// Top-level OpsDeck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub confluence: ConfluenceConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub ssh: SshConfig,
    #[serde(default)]
    pub plugins: PluginConfig,
}

impl Config {
    /// Load configuration from the default location, then apply the
    /// environment overlay. A missing config file is not an error.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            OpsError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| OpsError::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Resolve the config file path: `$OPSDECK_CONFIG` if set, otherwise
    /// `~/.opsdeck/config.json`.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = env::var("OPSDECK_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".opsdeck").join("config.json"))
    }

    /// Overlay well-known environment variables onto the loaded file.
    /// Environment always wins over file contents.
    pub fn apply_env(&mut self) {
        if let Ok(token) = env::var("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Ok(url) = env::var("JIRA_URL") {
            self.jira.url = Some(url);
        }
        if let Ok(username) = env::var("JIRA_USERNAME") {
            self.jira.username = Some(username);
        }
        if let Ok(token) = env::var("JIRA_TOKEN") {
            self.jira.token = Some(token);
        }
        if let Ok(url) = env::var("CONFLUENCE_URL") {
            self.confluence.url = Some(url);
        }
        if let Ok(username) = env::var("CONFLUENCE_USERNAME") {
            self.confluence.username = Some(username);
        }
        if let Ok(token) = env::var("CONFLUENCE_TOKEN") {
            self.confluence.token = Some(token);
        }
        if let Ok(context) = env::var("KUBE_CONTEXT") {
            self.kubernetes.context = Some(context);
        }
        if let Ok(user) = env::var("SSH_USER") {
            self.ssh.user = Some(user);
        }
    }
}
