//! Plugin system for OpsDeck
//!
//! Every command the CLI exposes comes from a plugin. A plugin is a
//! provider: constructed with the shared [`ClientFacade`](crate::client::ClientFacade),
//! it registers its commands during a one-shot setup phase and its handlers
//! reach external services exclusively through the facade. Providers are an
//! explicit compile-time set (see [`builtin_providers`]), so "dropping in"
//! a plugin means adding one entry rather than scanning a directory.
//!
//! # Architecture
//!
//! - **types**: the provider contract (`CommandProvider`), command and
//!   parameter descriptors, handler types
//! - **registry**: command registration with global name uniqueness and
//!   conflict detection
//! - **loader**: the load pass that turns provider entries into live
//!   plugins with isolated, reported failures
//! - **example** / **resources**: the built-in providers
//!
//! # Lifecycle
//!
//! ```text
//! main
//!  ├─ ClientFacade::new(config)          no I/O
//!  ├─ load_providers(builtin_providers)  build + setup each plugin,
//!  │                                     commands land in the registry
//!  └─ cli::dispatch(registry, argv)      one command runs to completion
//! ```

pub mod example;
pub mod loader;
pub mod registry;
pub mod resources;
pub mod types;

pub use loader::{builtin_providers, load_providers, LoadFailure, LoadReport, ProviderEntry};
pub use registry::{CommandDescriptor, CommandRegistry, Registrar};
pub use types::{
    handler, CommandContext, CommandHandler, CommandProvider, CommandSpec, ParamKind, ParamSpec,
    ParamValue,
};
