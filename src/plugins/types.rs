//! Plugin contract types for OpsDeck
//!
//! This module defines the provider contract every plugin satisfies and the
//! types commands are described with: parameter specs, coerced argument
//! values, and the type-erased async handler a command resolves to.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{OpsError, Result};

use super::registry::Registrar;

/// The future a command handler returns.
pub type CommandFuture = BoxFuture<'static, Result<()>>;

/// A type-erased command handler. Handlers are shared (`Arc`) because the
/// registry references them without owning the plugin that created them.
pub type CommandHandler = Arc<dyn Fn(CommandContext) -> CommandFuture + Send + Sync>;

/// Wrap an async function or closure into a [`CommandHandler`].
pub fn handler<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx| f(ctx).boxed())
}

/// The semantic type of a command parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    /// An enumerated choice; the value must be one of the listed strings.
    Choice(Vec<String>),
}

/// A coerced argument value handed to a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Declaration of one command parameter: name, type, required/optional with
/// default, and help text. Required parameters surface as positionals on the
/// CLI; optional ones as `--flags`.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamValue>,
    pub help: String,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamKind, help: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            default: None,
            help: help.to_string(),
        }
    }

    pub fn optional(name: &str, kind: ParamKind, default: Option<ParamValue>, help: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default,
            help: help.to_string(),
        }
    }
}

/// A command as declared by a plugin, before it is attributed to its owning
/// plugin and inserted into the registry.
#[derive(Clone)]
pub struct CommandSpec {
    pub name: String,
    pub help: String,
    pub params: Vec<ParamSpec>,
    pub handler: CommandHandler,
}

impl CommandSpec {
    pub fn new(name: &str, help: &str, handler: CommandHandler) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            params: Vec::new(),
            handler,
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The coerced arguments for one command invocation.
#[derive(Debug, Default)]
pub struct CommandContext {
    args: HashMap<String, ParamValue>,
}

impl CommandContext {
    pub fn new(args: HashMap<String, ParamValue>) -> Self {
        Self { args }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.args.get(name)
    }

    /// A required string argument. Absence is an internal dispatch bug, so
    /// it surfaces as a command-execution error rather than a panic.
    pub fn str(&self, name: &str) -> Result<&str> {
        self.get(name)
            .and_then(ParamValue::as_str)
            .ok_or_else(|| missing(name))
    }

    /// A required integer argument.
    pub fn int(&self, name: &str) -> Result<i64> {
        self.get(name)
            .and_then(ParamValue::as_int)
            .ok_or_else(|| missing(name))
    }

    /// A boolean flag; absent means false.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(ParamValue::as_bool).unwrap_or(false)
    }

    /// An optional string argument.
    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }
}

fn missing(name: &str) -> OpsError {
    OpsError::CommandExecution(format!("missing or mistyped argument '{}'", name))
}

/// The capability set every plugin must satisfy.
///
/// A provider is constructed with the shared `ClientFacade` (stored for its
/// handlers to use) and its `setup` phase is invoked exactly once, right
/// after construction. Setup's sole responsibility is registering commands;
/// it must not perform I/O.
pub trait CommandProvider: Send + Sync {
    /// The plugin's unique name. Must match the name of the provider entry
    /// it was loaded from.
    fn name(&self) -> &str;

    /// Register this plugin's commands. Called exactly once per instance.
    fn setup(&self, registrar: &mut Registrar<'_>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_accessors() {
        assert_eq!(ParamValue::Str("x".into()).as_str(), Some("x"));
        assert_eq!(ParamValue::Int(3).as_int(), Some(3));
        assert_eq!(ParamValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ParamValue::Str("x".into()).as_int(), None);
        assert_eq!(ParamValue::Int(3).as_str(), None);
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::Str("open".into()).to_string(), "open");
        assert_eq!(ParamValue::Int(7).to_string(), "7");
        assert_eq!(ParamValue::Bool(false).to_string(), "false");
    }

    #[test]
    fn test_param_spec_constructors() {
        let required = ParamSpec::required("name", ParamKind::String, "Name to greet");
        assert!(required.required);
        assert!(required.default.is_none());

        let optional = ParamSpec::optional(
            "count",
            ParamKind::Integer,
            Some(ParamValue::Int(1)),
            "Repeat count",
        );
        assert!(!optional.required);
        assert_eq!(optional.default, Some(ParamValue::Int(1)));
    }

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("hello", "Say hello", handler(|_ctx| async { Ok(()) }))
            .param(ParamSpec::required("name", ParamKind::String, "Name"))
            .param(ParamSpec::optional(
                "count",
                ParamKind::Integer,
                Some(ParamValue::Int(1)),
                "Count",
            ));
        assert_eq!(spec.name, "hello");
        assert_eq!(spec.params.len(), 2);
        assert_eq!(spec.params[0].name, "name");
    }

    #[test]
    fn test_context_accessors() {
        let mut args = HashMap::new();
        args.insert("name".to_string(), ParamValue::Str("Alice".to_string()));
        args.insert("count".to_string(), ParamValue::Int(2));
        args.insert("verbose".to_string(), ParamValue::Bool(true));
        let ctx = CommandContext::new(args);

        assert_eq!(ctx.str("name").unwrap(), "Alice");
        assert_eq!(ctx.int("count").unwrap(), 2);
        assert!(ctx.flag("verbose"));
        assert!(!ctx.flag("quiet"));
        assert_eq!(ctx.opt_str("name"), Some("Alice"));
        assert_eq!(ctx.opt_str("absent"), None);
    }

    #[test]
    fn test_context_missing_argument_is_execution_error() {
        let ctx = CommandContext::default();
        let err = ctx.str("name").unwrap_err();
        assert!(matches!(err, OpsError::CommandExecution(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_context_mistyped_argument_is_execution_error() {
        let mut args = HashMap::new();
        args.insert("count".to_string(), ParamValue::Str("two".to_string()));
        let ctx = CommandContext::new(args);
        assert!(ctx.int("count").is_err());
    }

    #[tokio::test]
    async fn test_handler_wraps_async_closure() {
        let h = handler(|ctx: CommandContext| async move {
            let name = ctx.str("name")?.to_string();
            if name == "Alice" {
                Ok(())
            } else {
                Err(OpsError::CommandExecution("wrong name".to_string()))
            }
        });

        let mut args = HashMap::new();
        args.insert("name".to_string(), ParamValue::Str("Alice".to_string()));
        assert!(h(CommandContext::new(args)).await.is_ok());
        assert!(h(CommandContext::default()).await.is_err());
    }
}
