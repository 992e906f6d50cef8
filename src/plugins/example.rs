//! Example plugin.
//!
//! The reference provider for plugin authors: one command that touches no
//! capability (`hello`) and one that chains two (`create-issue`, GitHub
//! repo info into a new Jira issue).

use std::sync::Arc;

use crate::client::ClientFacade;
use crate::error::Result;

use super::registry::Registrar;
use super::types::{
    handler, CommandContext, CommandProvider, CommandSpec, ParamKind, ParamSpec, ParamValue,
};

pub struct ExamplePlugin {
    client: Arc<ClientFacade>,
}

impl ExamplePlugin {
    pub fn new(client: Arc<ClientFacade>) -> Self {
        Self { client }
    }
}

impl CommandProvider for ExamplePlugin {
    fn name(&self) -> &str {
        "example"
    }

    fn setup(&self, registrar: &mut Registrar<'_>) -> Result<()> {
        registrar.command(
            CommandSpec::new("hello", "Say hello", handler(hello))
                .param(ParamSpec::required("name", ParamKind::String, "Name to greet"))
                .param(ParamSpec::optional(
                    "count",
                    ParamKind::Integer,
                    Some(ParamValue::Int(1)),
                    "Number of times to greet",
                )),
        )?;

        let client = Arc::clone(&self.client);
        registrar.command(
            CommandSpec::new(
                "create-issue",
                "Create a Jira issue from GitHub repo info",
                handler(move |ctx| {
                    let client = Arc::clone(&client);
                    async move { create_issue(client, ctx).await }
                }),
            )
            .param(ParamSpec::required(
                "repo",
                ParamKind::String,
                "GitHub repository (owner/name)",
            ))
            .param(ParamSpec::required(
                "project",
                ParamKind::String,
                "Jira project key",
            ))
            .param(ParamSpec::optional(
                "issue-type",
                ParamKind::Choice(vec![
                    "Task".to_string(),
                    "Bug".to_string(),
                    "Story".to_string(),
                ]),
                Some(ParamValue::Str("Task".to_string())),
                "Jira issue type",
            )),
        )?;

        Ok(())
    }
}

async fn hello(ctx: CommandContext) -> Result<()> {
    let name = ctx.str("name")?;
    let count = ctx.int("count")?;
    for _ in 0..count {
        println!("Hello {}!", name);
    }
    Ok(())
}

async fn create_issue(client: Arc<ClientFacade>, ctx: CommandContext) -> Result<()> {
    let repo = ctx.str("repo")?;
    let project = ctx.str("project")?;
    let issue_type = ctx.str("issue-type")?;

    let github = client.github()?;
    let repo_info = github.get_repo(repo).await?;

    let jira = client.jira()?;
    let issue = jira
        .create_issue(
            project,
            &format!("GitHub: {}", repo_info.name),
            repo_info.description.as_deref().unwrap_or(""),
            issue_type,
        )
        .await?;

    println!("Created Jira issue: {}", issue.key);
    Ok(())
}
