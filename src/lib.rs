//! OpsDeck - plugin-driven operations CLI framework

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod plugins;

pub use config::Config;
pub use error::{OpsError, Result};
