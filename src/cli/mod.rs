//! CLI dispatch for OpsDeck
//!
//! Builds the `clap` command tree at runtime from whatever the plugin load
//! pass registered, then resolves the invoked subcommand back through the
//! registry and runs its handler. Required parameters surface as positional
//! arguments, optional ones as `--flags`; clap performs type checking and
//! default filling, and this module coerces the matches into the typed
//! [`CommandContext`] handlers consume.

use std::collections::HashMap;

use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::error::{OpsError, Result};
use crate::plugins::registry::{CommandDescriptor, CommandRegistry};
use crate::plugins::types::{CommandContext, ParamKind, ParamSpec, ParamValue};

/// Assemble the top-level command from the registry.
pub fn build_cli(registry: &CommandRegistry) -> Command {
    let mut root = Command::new("opsdeck")
        .about("Plugin-driven operations CLI")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true);

    for descriptor in registry.list() {
        root = root.subcommand(build_subcommand(descriptor));
    }
    root
}

fn build_subcommand(descriptor: &CommandDescriptor) -> Command {
    let mut cmd = Command::new(descriptor.name.clone()).about(descriptor.help.clone());
    for param in &descriptor.params {
        cmd = cmd.arg(build_arg(param));
    }
    cmd
}

fn build_arg(param: &ParamSpec) -> Arg {
    let mut arg = Arg::new(param.name.clone()).help(param.help.clone());

    if param.required {
        arg = arg.required(true);
    } else {
        arg = arg.long(param.name.clone());
    }

    let is_flag = matches!(param.kind, ParamKind::Boolean) && !param.required;
    arg = match &param.kind {
        ParamKind::String => arg,
        ParamKind::Integer => arg.value_parser(value_parser!(i64)),
        ParamKind::Boolean => {
            if is_flag {
                arg.action(ArgAction::SetTrue)
            } else {
                arg.value_parser(value_parser!(bool))
            }
        }
        ParamKind::Choice(values) => arg.value_parser(PossibleValuesParser::new(values.clone())),
    };

    if !is_flag {
        if let Some(default) = &param.default {
            arg = arg.default_value(default.to_string());
        }
    }
    arg
}

/// Coerce parsed matches into the typed argument map for one command.
fn context_from_matches(params: &[ParamSpec], matches: &ArgMatches) -> Result<CommandContext> {
    let mut args = HashMap::new();
    for param in params {
        match &param.kind {
            ParamKind::Integer => {
                if let Some(value) = matches.get_one::<i64>(&param.name) {
                    args.insert(param.name.clone(), ParamValue::Int(*value));
                }
            }
            ParamKind::Boolean => {
                if param.required {
                    if let Some(value) = matches.get_one::<bool>(&param.name) {
                        args.insert(param.name.clone(), ParamValue::Bool(*value));
                    }
                } else {
                    args.insert(param.name.clone(), ParamValue::Bool(matches.get_flag(&param.name)));
                }
            }
            ParamKind::String | ParamKind::Choice(_) => {
                if let Some(value) = matches.get_one::<String>(&param.name) {
                    args.insert(param.name.clone(), ParamValue::Str(value.clone()));
                }
            }
        }
    }
    Ok(CommandContext::new(args))
}

/// Resolve and run one command. A handler completing normally means exit
/// code 0; any error propagates to the caller for a non-zero exit.
pub async fn dispatch(
    registry: &CommandRegistry,
    name: &str,
    matches: &ArgMatches,
) -> Result<()> {
    let descriptor = registry
        .resolve(name)
        .ok_or_else(|| OpsError::NotFound(format!("command '{}'", name)))?;
    let ctx = context_from_matches(&descriptor.params, matches)?;
    (descriptor.handler)(ctx).await
}
