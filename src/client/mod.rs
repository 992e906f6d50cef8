//! Shared service client facade for OpsDeck
//!
//! The `ClientFacade` is the single access point plugins use to reach
//! external services. It owns one lazily-constructed client per capability
//! (and one per target host for SSH) and shields plugins from credential and
//! connection wiring. Constructing the facade performs no I/O; a client is
//! built on first access and cached for the rest of the invocation, so an
//! invocation that touches no service pays no setup cost.
//!
//! # Architecture
//!
//! - **github / jira / confluence**: thin REST wrappers over `reqwest`
//! - **kubernetes / docker / ssh**: thin wrappers over the respective CLI
//!   binaries via `tokio::process`
//!
//! Each capability has its own typed accessor so a typo in a capability name
//! is a compile error inside the crate; the string-keyed path (`ensure`)
//! exists for callers that receive capability names as user input.

mod confluence;
mod docker;
mod github;
mod jira;
mod kubernetes;
mod ssh;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::Config;
use crate::error::{OpsError, Result};

pub use confluence::ConfluenceClient;
pub use docker::{ContainerInfo, DockerClient};
pub use github::{GithubClient, PullRequest, PullRequestAuthor, Repo};
pub use jira::{CreatedIssue, JiraClient};
pub use kubernetes::{KubernetesClient, PodInfo};
pub use ssh::SshClient;

/// The fixed, closed set of capability names plugins may rely on.
/// Adding a capability is a host-side change, not a plugin extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Github,
    Jira,
    Confluence,
    Kubernetes,
    Docker,
    Ssh,
}

impl Capability {
    /// All recognized capabilities, in declaration order.
    pub const ALL: [Capability; 6] = [
        Capability::Github,
        Capability::Jira,
        Capability::Confluence,
        Capability::Kubernetes,
        Capability::Docker,
        Capability::Ssh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Github => "github",
            Capability::Jira => "jira",
            Capability::Confluence => "confluence",
            Capability::Kubernetes => "kubernetes",
            Capability::Docker => "docker",
            Capability::Ssh => "ssh",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "github" => Ok(Capability::Github),
            "jira" => Ok(Capability::Jira),
            "confluence" => Ok(Capability::Confluence),
            "kubernetes" => Ok(Capability::Kubernetes),
            "docker" => Ok(Capability::Docker),
            "ssh" => Ok(Capability::Ssh),
            other => Err(OpsError::UnknownCapability(other.to_string())),
        }
    }
}

/// Lazily-initializing access point for all service capabilities.
///
/// One facade per process, shared by reference (`Arc`) across all plugin
/// instances. Repeated access to the same capability (or the same SSH target)
/// returns the cached client rather than reconnecting.
pub struct ClientFacade {
    config: Config,
    github: OnceCell<Arc<GithubClient>>,
    jira: OnceCell<Arc<JiraClient>>,
    confluence: OnceCell<Arc<ConfluenceClient>>,
    kubernetes: OnceCell<Arc<KubernetesClient>>,
    docker: OnceCell<Arc<DockerClient>>,
    ssh: Mutex<HashMap<String, Arc<SshClient>>>,
}

impl ClientFacade {
    /// Create the facade. Performs no network or subprocess I/O.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            github: OnceCell::new(),
            jira: OnceCell::new(),
            confluence: OnceCell::new(),
            kubernetes: OnceCell::new(),
            docker: OnceCell::new(),
            ssh: Mutex::new(HashMap::new()),
        }
    }

    /// Get the GitHub client, constructing it on first access.
    pub fn github(&self) -> Result<Arc<GithubClient>> {
        self.github
            .get_or_try_init(|| {
                debug!(capability = "github", "initializing client");
                GithubClient::new(&self.config.github)
                    .map(Arc::new)
                    .map_err(|e| OpsError::capability_init("github", e))
            })
            .cloned()
    }

    /// Get the Jira client, constructing it on first access.
    pub fn jira(&self) -> Result<Arc<JiraClient>> {
        self.jira
            .get_or_try_init(|| {
                debug!(capability = "jira", "initializing client");
                JiraClient::new(&self.config.jira)
                    .map(Arc::new)
                    .map_err(|e| OpsError::capability_init("jira", e))
            })
            .cloned()
    }

    /// Get the Confluence client, constructing it on first access.
    pub fn confluence(&self) -> Result<Arc<ConfluenceClient>> {
        self.confluence
            .get_or_try_init(|| {
                debug!(capability = "confluence", "initializing client");
                ConfluenceClient::new(&self.config.confluence)
                    .map(Arc::new)
                    .map_err(|e| OpsError::capability_init("confluence", e))
            })
            .cloned()
    }

    /// Get the Kubernetes client, constructing it on first access.
    pub fn kubernetes(&self) -> Result<Arc<KubernetesClient>> {
        self.kubernetes
            .get_or_try_init(|| {
                debug!(capability = "kubernetes", "initializing client");
                Ok(Arc::new(KubernetesClient::new(&self.config.kubernetes)))
            })
            .cloned()
    }

    /// Get the Docker client, constructing it on first access.
    pub fn docker(&self) -> Result<Arc<DockerClient>> {
        self.docker
            .get_or_try_init(|| {
                debug!(capability = "docker", "initializing client");
                Ok(Arc::new(DockerClient::new()))
            })
            .cloned()
    }

    /// Get the SSH client for a target host, constructing it on first access.
    ///
    /// Each distinct hostname gets its own cached client; connections to
    /// different targets are never conflated.
    pub fn ssh(&self, host: &str) -> Result<Arc<SshClient>> {
        if host.trim().is_empty() {
            return Err(OpsError::capability_init("ssh", "empty target host"));
        }
        let mut cache = self
            .ssh
            .lock()
            .map_err(|_| OpsError::capability_init("ssh", "client cache poisoned"))?;
        if let Some(client) = cache.get(host) {
            return Ok(Arc::clone(client));
        }
        debug!(capability = "ssh", host, "initializing client");
        let client = Arc::new(SshClient::new(host, &self.config.ssh));
        cache.insert(host.to_string(), Arc::clone(&client));
        Ok(client)
    }

    /// Parse a capability name and force its initialization.
    ///
    /// This is the string-keyed entry point for callers holding a
    /// user-supplied capability name. `ssh` cannot be initialized this way
    /// because it is parameterized by a target host.
    pub fn ensure(&self, name: &str) -> Result<Capability> {
        let capability = Capability::from_str(name)?;
        match capability {
            Capability::Github => {
                self.github()?;
            }
            Capability::Jira => {
                self.jira()?;
            }
            Capability::Confluence => {
                self.confluence()?;
            }
            Capability::Kubernetes => {
                self.kubernetes()?;
            }
            Capability::Docker => {
                self.docker()?;
            }
            Capability::Ssh => {
                return Err(OpsError::capability_init(
                    "ssh",
                    "requires a target host; use ClientFacade::ssh(host)",
                ));
            }
        }
        Ok(capability)
    }

    /// The configuration the facade was constructed with.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, GithubConfig};

    fn config_with_github_token() -> Config {
        Config {
            github: GithubConfig {
                token: Some("ghp_test".to_string()),
                api_url: "https://api.github.com".to_string(),
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_capability_from_str_recognized() {
        for cap in Capability::ALL {
            assert_eq!(Capability::from_str(cap.as_str()).unwrap(), cap);
        }
    }

    #[test]
    fn test_capability_from_str_unknown() {
        let err = Capability::from_str("gitlab").unwrap_err();
        assert!(matches!(err, OpsError::UnknownCapability(name) if name == "gitlab"));
    }

    #[test]
    fn test_facade_construction_does_no_init() {
        let facade = ClientFacade::new(Config::default());
        assert!(facade.github.get().is_none());
        assert!(facade.jira.get().is_none());
        assert!(facade.ssh.lock().unwrap().is_empty());
    }

    #[test]
    fn test_github_access_is_idempotent() {
        let facade = ClientFacade::new(config_with_github_token());
        let first = facade.github().unwrap();
        let second = facade.github().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_github_without_token_fails() {
        let facade = ClientFacade::new(Config::default());
        let err = facade.github().unwrap_err();
        assert!(matches!(
            err,
            OpsError::CapabilityInit { ref capability, .. } if capability == "github"
        ));
    }

    #[test]
    fn test_failed_init_is_retried_on_next_access() {
        // OnceCell does not cache failures, so fixing config between
        // invocations (new facade) or a transient failure does not poison
        // the capability within one.
        let facade = ClientFacade::new(Config::default());
        assert!(facade.github().is_err());
        assert!(facade.github().is_err());
        assert!(facade.github.get().is_none());
    }

    #[test]
    fn test_jira_incomplete_config_fails_with_capability_init() {
        let mut config = Config::default();
        config.jira.url = Some("https://jira.example.com".to_string());
        // username and token still missing
        let facade = ClientFacade::new(config);
        let err = facade.jira().unwrap_err();
        assert!(matches!(
            err,
            OpsError::CapabilityInit { ref capability, .. } if capability == "jira"
        ));
    }

    #[test]
    fn test_docker_and_kubernetes_need_no_config() {
        let facade = ClientFacade::new(Config::default());
        assert!(facade.docker().is_ok());
        assert!(facade.kubernetes().is_ok());
    }

    #[test]
    fn test_ssh_cached_per_host() {
        let facade = ClientFacade::new(Config::default());
        let a1 = facade.ssh("web1.internal").unwrap();
        let a2 = facade.ssh("web1.internal").unwrap();
        let b = facade.ssh("web2.internal").unwrap();

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));
    }

    #[test]
    fn test_ssh_empty_host_rejected() {
        let facade = ClientFacade::new(Config::default());
        assert!(facade.ssh("").is_err());
        assert!(facade.ssh("   ").is_err());
    }

    #[test]
    fn test_ensure_unknown_capability() {
        let facade = ClientFacade::new(Config::default());
        let err = facade.ensure("bogus").unwrap_err();
        assert!(matches!(err, OpsError::UnknownCapability(_)));
    }

    #[test]
    fn test_ensure_initializes_capability() {
        let facade = ClientFacade::new(config_with_github_token());
        assert_eq!(facade.ensure("github").unwrap(), Capability::Github);
        assert!(facade.github.get().is_some());
    }

    #[test]
    fn test_ensure_ssh_requires_target() {
        let facade = ClientFacade::new(Config::default());
        let err = facade.ensure("ssh").unwrap_err();
        assert!(matches!(
            err,
            OpsError::CapabilityInit { ref capability, .. } if capability == "ssh"
        ));
    }
}
