use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use opsdeck::cli;
use opsdeck::client::ClientFacade;
use opsdeck::config::Config;
use opsdeck::plugins::{builtin_providers, load_providers, CommandRegistry};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logging goes to stderr so command output on stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> opsdeck::Result<()> {
    let config = Config::load()?;
    let policy = config.plugins.clone();
    let facade = Arc::new(ClientFacade::new(config));

    let mut registry = CommandRegistry::new();
    // Failures are already summarized by the loader; the report must stay
    // alive because it owns the plugin instances behind the handlers.
    let _report = load_providers(builtin_providers(), &facade, &mut registry, &policy);

    let matches = cli::build_cli(&registry).get_matches();
    // subcommand_required(true) makes None unreachable in practice
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| opsdeck::OpsError::NotFound("no command given".to_string()))?;

    cli::dispatch(&registry, name, sub).await
}
