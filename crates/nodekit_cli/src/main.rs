//! Inspection CLI for nodekit declarations.
//!
//! # Responsibility
//! - List built-in node declarations and their declared hook capabilities.
//! - Print one node's resolved descriptor for a given options override.
//!
//! Usage:
//!   nodekit list
//!   nodekit describe `<name>` [--options `<json>`]

use clap::{Parser, Subcommand};
use log::info;
use nodekit_core::node::builtin;
use nodekit_core::{
    core_version, declared_capabilities, default_log_level, init_logging, Attributes,
    NodeRegistry, NodeStructure, Options, ParseRule,
};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "nodekit", version, about = "Inspect node extension declarations")]
struct Cli {
    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for log files. Logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List built-in node declarations.
    List,
    /// Resolve one built-in node and print its descriptor as JSON.
    Describe {
        name: String,
        /// Option overrides as a JSON object.
        #[arg(long)]
        options: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct Description {
    structure: NodeStructure,
    options: Options,
    attributes: Attributes,
    parse_rules: Option<Vec<ParseRule>>,
    capabilities: Vec<&'static str>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let result = match cli.command {
        Command::List => list(),
        Command::Describe { name, options } => describe(&name, options.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn list() -> Result<(), String> {
    let mut registry = NodeRegistry::new();
    registry.register_builtins().map_err(|err| err.to_string())?;
    for entry in registry.iter() {
        let capabilities: Vec<_> = entry
            .capabilities
            .iter()
            .map(|capability| capability.as_str())
            .collect();
        println!("{}\t{}", entry.node_type.name, capabilities.join(","));
    }
    Ok(())
}

fn describe(name: &str, raw_options: Option<&str>) -> Result<(), String> {
    let json = describe_json(name, raw_options)?;
    println!("{json}");
    Ok(())
}

/// Resolves one built-in node and renders its description as pretty JSON.
fn describe_json(name: &str, raw_options: Option<&str>) -> Result<String, String> {
    let builder = builtin::by_name(name).ok_or_else(|| format!("unknown node: {name}"))?;
    let overrides = match raw_options {
        Some(raw) => Options::from_json_str(raw).map_err(|err| err.to_string())?,
        None => Options::new(),
    };

    let descriptor = builder.resolve(&overrides);
    let description = Description {
        structure: descriptor.structure(),
        attributes: descriptor.attributes(),
        parse_rules: descriptor.parse_rules(),
        capabilities: declared_capabilities(&descriptor)
            .into_iter()
            .map(|capability| capability.as_str())
            .collect(),
        options: descriptor.options,
    };

    serde_json::to_string_pretty(&description).map_err(|err| err.to_string())
}
