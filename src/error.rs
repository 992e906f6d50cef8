//! Error types for OpsDeck
//!
//! This module defines all error types used throughout the OpsDeck framework.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.
//!
//! Plugin load failures are isolated per plugin and never abort the overall
//! load pass; capability and command failures abort only the invocation that
//! triggered them. There is no retry logic at this layer.

use thiserror::Error;

/// The primary error type for OpsDeck operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Configuration-related errors (invalid config file, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A plugin provider entry could not be loaded (e.g. a duplicate entry
    /// or an entry rejected before construction).
    #[error("Plugin '{plugin}' failed to load: {reason}")]
    PluginLoad { plugin: String, reason: String },

    /// A plugin provider does not satisfy the provider contract
    /// (invalid name, or a name that disagrees with its registration entry).
    #[error("Plugin '{plugin}' violates the provider contract: {reason}")]
    PluginContract { plugin: String, reason: String },

    /// A plugin's constructor or setup phase failed.
    #[error("Plugin '{plugin}' failed during init: {reason}")]
    PluginInit { plugin: String, reason: String },

    /// A command name was already registered, by this or another plugin.
    #[error(
        "Command '{command}' from plugin '{plugin}' is already registered by plugin '{existing}'"
    )]
    DuplicateCommand {
        command: String,
        plugin: String,
        existing: String,
    },

    /// A capability name outside the fixed recognized set was requested.
    #[error("Unknown capability '{0}' (expected one of: github, jira, confluence, kubernetes, docker, ssh)")]
    UnknownCapability(String),

    /// An underlying service client failed to construct.
    #[error("Capability '{capability}' failed to initialize: {reason}")]
    CapabilityInit { capability: String, reason: String },

    /// A command handler's own failure, surfaced verbatim to the user.
    #[error("Command failed: {0}")]
    CommandExecution(String),

    /// Resource not found (commands, plugins, remote objects, etc.)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl OpsError {
    /// Scope an arbitrary error to a named capability.
    pub fn capability_init(capability: &str, reason: impl std::fmt::Display) -> Self {
        OpsError::CapabilityInit {
            capability: capability.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Scope an arbitrary error to a named plugin's init phase.
    pub fn plugin_init(plugin: &str, reason: impl std::fmt::Display) -> Self {
        OpsError::PluginInit {
            plugin: plugin.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A specialized `Result` type for OpsDeck operations.
pub type Result<T> = std::result::Result<T, OpsError>;
