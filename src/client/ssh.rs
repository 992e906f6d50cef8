//! SSH client.
//!
//! Wraps the system `ssh` binary, one client per target host. Construction
//! resolves the effective user and port from the global SSH config plus any
//! per-host override; no connection is opened until `run` is called.

use tokio::process::Command;

use crate::config::SshConfig;
use crate::error::{OpsError, Result};

pub struct SshClient {
    host: String,
    user: Option<String>,
    port: u16,
}

impl SshClient {
    pub fn new(host: &str, config: &SshConfig) -> Self {
        let override_ = config.hosts.get(host);
        Self {
            host: host.to_string(),
            user: override_
                .and_then(|h| h.user.clone())
                .or_else(|| config.user.clone()),
            port: override_.and_then(|h| h.port).unwrap_or(config.port),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Run a command on the remote host and return its stdout.
    pub async fn run(&self, command: &str) -> Result<String> {
        let output = Command::new("ssh")
            .args(self.base_args())
            .arg(command)
            .output()
            .await
            .map_err(|e| OpsError::CommandExecution(format!("failed to spawn ssh: {}", e)))?;

        if !output.status.success() {
            return Err(OpsError::CommandExecution(format!(
                "ssh {} '{}' failed: {}",
                self.host,
                command,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-p".to_string(),
            self.port.to_string(),
        ];
        if let Some(user) = &self.user {
            args.push("-l".to_string());
            args.push(user.clone());
        }
        args.push(self.host.clone());
        args
    }
}
