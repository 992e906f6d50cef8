//! Kubernetes client.
//!
//! Shells out to `kubectl` rather than speaking to the API server directly,
//! which keeps cluster auth (kubeconfig, exec credential plugins) entirely
//! out of this process. Construction records the context; the binary is
//! spawned only when a method runs.

use serde::Deserialize;
use tokio::process::Command;

use crate::config::KubernetesConfig;
use crate::error::{OpsError, Result};

/// A pod summary extracted from `kubectl get pods -o json`.
#[derive(Debug, Clone)]
pub struct PodInfo {
    pub name: String,
    pub phase: String,
    pub ready_containers: usize,
    pub total_containers: usize,
}

#[derive(Deserialize)]
struct PodList {
    items: Vec<Pod>,
}

#[derive(Deserialize)]
struct Pod {
    metadata: PodMetadata,
    spec: PodSpec,
    status: PodStatus,
}

#[derive(Deserialize)]
struct PodMetadata {
    name: String,
}

#[derive(Deserialize)]
struct PodSpec {
    containers: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct PodStatus {
    #[serde(default)]
    phase: Option<String>,
    #[serde(default, rename = "containerStatuses")]
    container_statuses: Vec<ContainerStatus>,
}

#[derive(Deserialize)]
struct ContainerStatus {
    ready: bool,
}

pub struct KubernetesClient {
    context: Option<String>,
}

impl KubernetesClient {
    pub fn new(config: &KubernetesConfig) -> Self {
        Self {
            context: config.context.clone(),
        }
    }

    /// List pods in a namespace.
    pub async fn get_pods(&self, namespace: &str) -> Result<Vec<PodInfo>> {
        let stdout = self
            .run_kubectl(&["get", "pods", "-n", namespace, "-o", "json"])
            .await?;
        let list: PodList = serde_json::from_str(&stdout)?;
        Ok(list
            .items
            .into_iter()
            .map(|pod| PodInfo {
                name: pod.metadata.name,
                phase: pod.status.phase.unwrap_or_else(|| "Unknown".to_string()),
                ready_containers: pod
                    .status
                    .container_statuses
                    .iter()
                    .filter(|c| c.ready)
                    .count(),
                total_containers: pod.spec.containers.len(),
            })
            .collect())
    }

    async fn run_kubectl(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("kubectl");
        if let Some(context) = &self.context {
            cmd.arg("--context").arg(context);
        }
        cmd.args(args);

        let output = cmd.output().await.map_err(|e| {
            OpsError::CommandExecution(format!("failed to spawn kubectl: {}", e))
        })?;
        if !output.status.success() {
            return Err(OpsError::CommandExecution(format!(
                "kubectl {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_records_context() {
        let client = KubernetesClient::new(&KubernetesConfig {
            context: Some("staging".to_string()),
        });
        assert_eq!(client.context.as_deref(), Some("staging"));
    }

    #[test]
    fn test_pod_list_parsing() {
        let json = r#"{
            "items": [
                {
                    "metadata": { "name": "api-5f6d" },
                    "spec": { "containers": [{}, {}] },
                    "status": {
                        "phase": "Running",
                        "containerStatuses": [
                            { "ready": true },
                            { "ready": false }
                        ]
                    }
                },
                {
                    "metadata": { "name": "pending-pod" },
                    "spec": { "containers": [{}] },
                    "status": {}
                }
            ]
        }"#;
        let list: PodList = serde_json::from_str(json).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].metadata.name, "api-5f6d");
        assert_eq!(list.items[0].spec.containers.len(), 2);
        assert!(list.items[1].status.phase.is_none());
        assert!(list.items[1].status.container_statuses.is_empty());
    }
}
