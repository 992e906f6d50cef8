//! Docker client.
//!
//! Wraps the `docker` CLI. `docker ps --format '{{json .}}'` emits one JSON
//! object per line, which keeps parsing trivial without pulling in the
//! engine API.

use serde::Deserialize;
use tokio::process::Command;

use crate::error::{OpsError, Result};

/// A running container, one line of `docker ps` JSON output.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerInfo {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Names")]
    pub names: String,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "Status")]
    pub status: String,
}

pub struct DockerClient;

impl DockerClient {
    pub fn new() -> Self {
        Self
    }

    /// List running containers.
    pub async fn ps(&self) -> Result<Vec<ContainerInfo>> {
        let output = Command::new("docker")
            .args(["ps", "--format", "{{json .}}"])
            .output()
            .await
            .map_err(|e| OpsError::CommandExecution(format!("failed to spawn docker: {}", e)))?;

        if !output.status.success() {
            return Err(OpsError::CommandExecution(format!(
                "docker ps failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_ps_output(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for DockerClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_ps_output(stdout: &str) -> Result<Vec<ContainerInfo>> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(OpsError::from))
        .collect()
}
