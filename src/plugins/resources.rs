//! Resource listing plugin.
//!
//! Read-only views over the infrastructure capabilities: GitHub pull
//! requests, Kubernetes pods, Docker containers, and ad-hoc remote
//! execution over SSH.

use std::sync::Arc;

use crate::client::ClientFacade;
use crate::error::Result;

use super::registry::Registrar;
use super::types::{
    handler, CommandContext, CommandProvider, CommandSpec, ParamKind, ParamSpec, ParamValue,
};

pub struct ResourcesPlugin {
    client: Arc<ClientFacade>,
}

impl ResourcesPlugin {
    pub fn new(client: Arc<ClientFacade>) -> Self {
        Self { client }
    }
}

impl CommandProvider for ResourcesPlugin {
    fn name(&self) -> &str {
        "resources"
    }

    fn setup(&self, registrar: &mut Registrar<'_>) -> Result<()> {
        let client = Arc::clone(&self.client);
        registrar.command(
            CommandSpec::new(
                "pull-requests",
                "List GitHub pull requests",
                handler(move |ctx| {
                    let client = Arc::clone(&client);
                    async move { pull_requests(client, ctx).await }
                }),
            )
            .param(ParamSpec::required(
                "repo",
                ParamKind::String,
                "Repository (owner/name)",
            ))
            .param(ParamSpec::optional(
                "state",
                ParamKind::Choice(vec![
                    "open".to_string(),
                    "closed".to_string(),
                    "all".to_string(),
                ]),
                Some(ParamValue::Str("open".to_string())),
                "Pull request state",
            )),
        )?;

        let client = Arc::clone(&self.client);
        registrar.command(
            CommandSpec::new(
                "pods",
                "List Kubernetes pods in a namespace",
                handler(move |ctx| {
                    let client = Arc::clone(&client);
                    async move { pods(client, ctx).await }
                }),
            )
            .param(ParamSpec::required(
                "namespace",
                ParamKind::String,
                "Kubernetes namespace",
            )),
        )?;

        let client = Arc::clone(&self.client);
        registrar.command(CommandSpec::new(
            "containers",
            "List running Docker containers",
            handler(move |_ctx| {
                let client = Arc::clone(&client);
                async move { containers(client).await }
            }),
        ))?;

        let client = Arc::clone(&self.client);
        registrar.command(
            CommandSpec::new(
                "remote-exec",
                "Run a command on a remote host over SSH",
                handler(move |ctx| {
                    let client = Arc::clone(&client);
                    async move { remote_exec(client, ctx).await }
                }),
            )
            .param(ParamSpec::required("host", ParamKind::String, "Target host"))
            .param(ParamSpec::required(
                "command",
                ParamKind::String,
                "Command to run",
            )),
        )?;

        Ok(())
    }
}

async fn pull_requests(client: Arc<ClientFacade>, ctx: CommandContext) -> Result<()> {
    let repo = ctx.str("repo")?;
    let state = ctx.str("state")?;

    let github = client.github()?;
    let pulls = github.list_pull_requests(repo, state).await?;

    if pulls.is_empty() {
        println!("No {} pull requests in {}", state, repo);
        return Ok(());
    }
    for pr in pulls {
        println!(
            "#{:<5} [{}] {} ({}, updated {})",
            pr.number, pr.state, pr.title, pr.user.login, pr.updated_at
        );
    }
    Ok(())
}

async fn pods(client: Arc<ClientFacade>, ctx: CommandContext) -> Result<()> {
    let namespace = ctx.str("namespace")?;

    let kubernetes = client.kubernetes()?;
    let pods = kubernetes.get_pods(namespace).await?;

    if pods.is_empty() {
        println!("No pods in namespace {}", namespace);
        return Ok(());
    }
    for pod in pods {
        println!(
            "{:<50} {}/{} {}",
            pod.name, pod.ready_containers, pod.total_containers, pod.phase
        );
    }
    Ok(())
}

async fn containers(client: Arc<ClientFacade>) -> Result<()> {
    let docker = client.docker()?;
    let containers = docker.ps().await?;

    if containers.is_empty() {
        println!("No running containers");
        return Ok(());
    }
    for container in containers {
        println!(
            "{:<14} {:<24} {:<32} {}",
            container.id, container.names, container.image, container.status
        );
    }
    Ok(())
}

async fn remote_exec(client: Arc<ClientFacade>, ctx: CommandContext) -> Result<()> {
    let host = ctx.str("host")?;
    let command = ctx.str("command")?;

    let ssh = client.ssh(host)?;
    let output = ssh.run(command).await?;
    print!("{}", output);
    Ok(())
}
