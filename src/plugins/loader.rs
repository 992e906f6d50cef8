//! Plugin loading for OpsDeck
//!
//! Plugins are an explicit, enumerable set of providers registered at
//! startup rather than modules discovered by scanning a directory: each
//! provider is a named factory that receives the shared `ClientFacade` and
//! returns a constructed [`CommandProvider`]. Adding a plugin means adding
//! an entry to [`builtin_providers`].
//!
//! Load failures are isolated per provider. One broken plugin never aborts
//! the load pass; the CLI stays usable with whatever plugins did load, and
//! every failure is reported with the plugin name and reason.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::client::ClientFacade;
use crate::config::PluginConfig;
use crate::error::{OpsError, Result};

use super::example::ExamplePlugin;
use super::registry::{CommandRegistry, Registrar};
use super::resources::ResourcesPlugin;
use super::types::CommandProvider;

/// Plugin names: kebab-case, 1-64 chars, starting with a letter.
static PLUGIN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9\-]{0,63}$").unwrap());

/// The fixed entrypoint contract between the host and a plugin: given the
/// facade, produce a constructed provider.
pub type ProviderFactory = fn(Arc<ClientFacade>) -> Result<Box<dyn CommandProvider>>;

/// One loadable plugin: its unique name and its factory.
#[derive(Clone, Copy)]
pub struct ProviderEntry {
    pub name: &'static str,
    pub build: ProviderFactory,
}

/// The providers compiled into this binary.
pub fn builtin_providers() -> Vec<ProviderEntry> {
    vec![
        ProviderEntry {
            name: "example",
            build: |client| Ok(Box::new(ExamplePlugin::new(client))),
        },
        ProviderEntry {
            name: "resources",
            build: |client| Ok(Box::new(ResourcesPlugin::new(client))),
        },
    ]
}

/// A single plugin's load failure: name plus the error, for operator
/// visibility.
#[derive(Debug)]
pub struct LoadFailure {
    pub plugin: String,
    pub error: OpsError,
}

/// Outcome of one load pass. Owns the plugin instances it created; they
/// must stay alive for the process lifetime since the registry only
/// references their handlers.
#[derive(Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failures: Vec<LoadFailure>,
    instances: Vec<Box<dyn CommandProvider>>,
}

impl LoadReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The live plugin instances this load pass created.
    pub fn plugins(&self) -> &[Box<dyn CommandProvider>] {
        &self.instances
    }

    fn fail(&mut self, plugin: &str, error: OpsError) {
        self.failures.push(LoadFailure {
            plugin: plugin.to_string(),
            error,
        });
    }
}

/// Load every provider entry, registering each plugin's commands into the
/// shared registry.
///
/// Entry order determines load order, but plugins must not rely on loading
/// before or after one another; a duplicate command name across plugins is
/// a load failure for the later plugin, never "last wins". A plugin whose
/// setup fails partway has its partial registrations rolled back.
pub fn load_providers(
    entries: Vec<ProviderEntry>,
    facade: &Arc<ClientFacade>,
    registry: &mut CommandRegistry,
    policy: &PluginConfig,
) -> LoadReport {
    let mut report = LoadReport::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for entry in entries {
        if !seen.insert(entry.name) {
            report.fail(
                entry.name,
                OpsError::PluginLoad {
                    plugin: entry.name.to_string(),
                    reason: "duplicate provider entry".to_string(),
                },
            );
            continue;
        }

        if !policy.is_permitted(entry.name) {
            debug!(plugin = entry.name, "plugin disabled by policy, skipping");
            continue;
        }

        if !PLUGIN_NAME_RE.is_match(entry.name) {
            report.fail(
                entry.name,
                OpsError::PluginContract {
                    plugin: entry.name.to_string(),
                    reason: "invalid plugin name".to_string(),
                },
            );
            continue;
        }

        let provider = match (entry.build)(Arc::clone(facade)) {
            Ok(provider) => provider,
            Err(e) => {
                report.fail(entry.name, OpsError::plugin_init(entry.name, e));
                continue;
            }
        };

        if provider.name() != entry.name {
            report.fail(
                entry.name,
                OpsError::PluginContract {
                    plugin: entry.name.to_string(),
                    reason: format!(
                        "provider reports name '{}' but was registered as '{}'",
                        provider.name(),
                        entry.name
                    ),
                },
            );
            continue;
        }

        let before = registry.len();
        let setup_result = {
            let mut registrar = Registrar::new(registry, entry.name);
            provider.setup(&mut registrar)
        };

        match setup_result {
            Ok(()) => {
                info!(
                    plugin = entry.name,
                    commands = registry.len() - before,
                    "loaded plugin"
                );
                report.loaded.push(entry.name.to_string());
                report.instances.push(provider);
            }
            Err(e) => {
                let rolled_back = registry.remove_plugin(entry.name);
                if rolled_back > 0 {
                    debug!(
                        plugin = entry.name,
                        commands = rolled_back,
                        "rolled back partial registration"
                    );
                }
                report.fail(entry.name, e);
            }
        }
    }

    for failure in &report.failures {
        warn!(
            plugin = %failure.plugin,
            error = %failure.error,
            "failed to load plugin"
        );
    }
    info!(
        loaded = report.loaded.len(),
        failed = report.failures.len(),
        commands = registry.len(),
        "plugin load complete"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::plugins::types::{handler, CommandSpec};

    struct FakePlugin {
        name: &'static str,
        commands: Vec<&'static str>,
        fail_setup_after: Option<usize>,
    }

    impl CommandProvider for FakePlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn setup(&self, registrar: &mut Registrar<'_>) -> Result<()> {
            for (i, command) in self.commands.iter().enumerate() {
                if self.fail_setup_after == Some(i) {
                    return Err(OpsError::plugin_init(self.name, "setup exploded"));
                }
                registrar.command(CommandSpec::new(command, "", handler(|_| async { Ok(()) })))?;
            }
            Ok(())
        }
    }

    fn facade() -> Arc<ClientFacade> {
        Arc::new(ClientFacade::new(Config::default()))
    }

    // ProviderFactory is a plain fn pointer, so test fixtures are free
    // functions rather than closures.
    fn build_greeter(_: Arc<ClientFacade>) -> Result<Box<dyn CommandProvider>> {
        Ok(Box::new(FakePlugin {
            name: "greeter",
            commands: vec!["hello", "goodbye"],
            fail_setup_after: None,
        }))
    }

    fn build_deployer(_: Arc<ClientFacade>) -> Result<Box<dyn CommandProvider>> {
        Ok(Box::new(FakePlugin {
            name: "deployer",
            commands: vec!["deploy"],
            fail_setup_after: None,
        }))
    }

    fn build_broken(_: Arc<ClientFacade>) -> Result<Box<dyn CommandProvider>> {
        Err(OpsError::Config("constructor exploded".to_string()))
    }

    fn build_misnamed(_: Arc<ClientFacade>) -> Result<Box<dyn CommandProvider>> {
        Ok(Box::new(FakePlugin {
            name: "something-else",
            commands: vec![],
            fail_setup_after: None,
        }))
    }

    fn build_conflicting(_: Arc<ClientFacade>) -> Result<Box<dyn CommandProvider>> {
        Ok(Box::new(FakePlugin {
            name: "conflicting",
            commands: vec!["status", "hello"],
            fail_setup_after: None,
        }))
    }

    fn build_mid_failure(_: Arc<ClientFacade>) -> Result<Box<dyn CommandProvider>> {
        Ok(Box::new(FakePlugin {
            name: "flaky",
            commands: vec!["first", "second"],
            fail_setup_after: Some(1),
        }))
    }

    #[test]
    fn test_valid_providers_register_declared_commands() {
        let mut registry = CommandRegistry::new();
        let report = load_providers(
            vec![
                ProviderEntry { name: "greeter", build: build_greeter },
                ProviderEntry { name: "deployer", build: build_deployer },
            ],
            &facade(),
            &mut registry,
            &PluginConfig::default(),
        );

        assert_eq!(report.loaded, vec!["greeter", "deployer"]);
        assert!(!report.has_failures());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.resolve("hello").unwrap().plugin, "greeter");
        assert_eq!(registry.resolve("deploy").unwrap().plugin, "deployer");
    }

    #[test]
    fn test_broken_provider_does_not_abort_pass() {
        let mut registry = CommandRegistry::new();
        let report = load_providers(
            vec![
                ProviderEntry { name: "broken", build: build_broken },
                ProviderEntry { name: "greeter", build: build_greeter },
            ],
            &facade(),
            &mut registry,
            &PluginConfig::default(),
        );

        assert_eq!(report.loaded, vec!["greeter"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].plugin, "broken");
        assert!(matches!(
            report.failures[0].error,
            OpsError::PluginInit { .. }
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_command_across_plugins_fails_later_plugin() {
        let mut registry = CommandRegistry::new();
        let report = load_providers(
            vec![
                ProviderEntry { name: "greeter", build: build_greeter },
                ProviderEntry { name: "conflicting", build: build_conflicting },
            ],
            &facade(),
            &mut registry,
            &PluginConfig::default(),
        );

        assert_eq!(report.loaded, vec!["greeter"]);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            OpsError::DuplicateCommand { .. }
        ));
        // "hello" still belongs to greeter; conflicting's partial
        // registration ("status") was rolled back.
        assert_eq!(registry.resolve("hello").unwrap().plugin, "greeter");
        assert!(registry.resolve("status").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_setup_failure_rolls_back_partial_registration() {
        let mut registry = CommandRegistry::new();
        let report = load_providers(
            vec![ProviderEntry { name: "flaky", build: build_mid_failure }],
            &facade(),
            &mut registry,
            &PluginConfig::default(),
        );

        assert!(report.loaded.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_name_mismatch_is_contract_error() {
        let mut registry = CommandRegistry::new();
        let report = load_providers(
            vec![ProviderEntry { name: "misnamed", build: build_misnamed }],
            &facade(),
            &mut registry,
            &PluginConfig::default(),
        );

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            OpsError::PluginContract { .. }
        ));
    }

    #[test]
    fn test_duplicate_entry_is_load_error() {
        let mut registry = CommandRegistry::new();
        let report = load_providers(
            vec![
                ProviderEntry { name: "greeter", build: build_greeter },
                ProviderEntry { name: "greeter", build: build_greeter },
            ],
            &facade(),
            &mut registry,
            &PluginConfig::default(),
        );

        assert_eq!(report.loaded, vec!["greeter"]);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            OpsError::PluginLoad { .. }
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_blocked_provider_is_skipped_not_failed() {
        let mut registry = CommandRegistry::new();
        let policy = PluginConfig {
            allowed: vec![],
            blocked: vec!["greeter".to_string()],
        };
        let report = load_providers(
            vec![
                ProviderEntry { name: "greeter", build: build_greeter },
                ProviderEntry { name: "deployer", build: build_deployer },
            ],
            &facade(),
            &mut registry,
            &policy,
        );

        assert_eq!(report.loaded, vec!["deployer"]);
        assert!(!report.has_failures());
        assert!(registry.resolve("hello").is_none());
    }

    #[test]
    fn test_builtin_providers_load_cleanly() {
        let mut registry = CommandRegistry::new();
        let report = load_providers(
            builtin_providers(),
            &facade(),
            &mut registry,
            &PluginConfig::default(),
        );

        assert!(!report.has_failures());
        assert_eq!(report.loaded, vec!["example", "resources"]);
        assert_eq!(report.plugins().len(), 2);
        assert!(registry.resolve("hello").is_some());
        assert!(registry.resolve("create-issue").is_some());
    }
}
