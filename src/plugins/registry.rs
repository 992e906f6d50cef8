//! Command registry for OpsDeck
//!
//! The registry maps command names to their descriptors (handler + metadata)
//! across all loaded plugins. Command names are globally unique: a collision
//! at registration time is an error, never a silent overwrite, and the
//! failed registration leaves the registry unchanged. The registry is
//! populated during the load phase and only read during dispatch.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{OpsError, Result};

use super::types::{CommandHandler, CommandSpec, ParamSpec};

/// Command names: kebab-case, 1-64 chars, starting with a letter.
static COMMAND_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9\-]{0,63}$").unwrap());

/// A registered command: the plugin-declared spec plus its owning plugin.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub plugin: String,
    pub help: String,
    pub params: Vec<ParamSpec>,
    pub handler: CommandHandler,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("plugin", &self.plugin)
            .field("params", &self.params.len())
            .finish_non_exhaustive()
    }
}

/// The process-wide mapping from command name to descriptor.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Fails with `DuplicateCommand` if the name is
    /// taken; on failure the registry is unchanged.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<()> {
        if let Some(existing) = self.commands.get(&descriptor.name) {
            return Err(OpsError::DuplicateCommand {
                command: descriptor.name.clone(),
                plugin: descriptor.plugin.clone(),
                existing: existing.plugin.clone(),
            });
        }
        debug!(
            command = %descriptor.name,
            plugin = %descriptor.plugin,
            "registered command"
        );
        self.commands.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Resolve a command name to its descriptor.
    pub fn resolve(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// All registered commands, sorted by name for stable help output.
    pub fn list(&self) -> Vec<&CommandDescriptor> {
        let mut commands: Vec<_> = self.commands.values().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Remove every command a plugin registered. Used by the loader to roll
    /// back a plugin whose setup failed partway through.
    pub fn remove_plugin(&mut self, plugin: &str) -> usize {
        let before = self.commands.len();
        self.commands.retain(|_, d| d.plugin != plugin);
        before - self.commands.len()
    }
}

/// The registration primitive handed to a plugin's setup phase.
///
/// Tags each command with the owning plugin's name and validates command
/// names before they reach the registry.
pub struct Registrar<'a> {
    registry: &'a mut CommandRegistry,
    plugin: String,
}

impl<'a> Registrar<'a> {
    pub fn new(registry: &'a mut CommandRegistry, plugin: &str) -> Self {
        Self {
            registry,
            plugin: plugin.to_string(),
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Register one command on behalf of the owning plugin. Safe to call
    /// any number of times with distinct names.
    pub fn command(&mut self, spec: CommandSpec) -> Result<()> {
        if !COMMAND_NAME_RE.is_match(&spec.name) {
            return Err(OpsError::PluginContract {
                plugin: self.plugin.clone(),
                reason: format!(
                    "invalid command name '{}': must be 1-64 kebab-case characters starting with a letter",
                    spec.name
                ),
            });
        }
        self.registry.register(CommandDescriptor {
            name: spec.name,
            plugin: self.plugin.clone(),
            help: spec.help,
            params: spec.params,
            handler: spec.handler,
        })
    }
}
