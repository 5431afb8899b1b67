//! toolbelt: inspect and invoke agent tools from the command line.
//!
//! Usage:
//!   toolbelt list                       List enabled tools
//!   toolbelt schema [NAME]              Print tool schemas as JSON
//!   toolbelt call NAME --args '{..}'    Invoke a tool
//!   toolbelt init                       Write the default config file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use toolbelt::builtin;
use toolbelt::config::{self, ToolbeltConfig};
use toolbelt::tools::{Capability, Dispatch, ToolRegistry, ToolSchema};
use toolbelt::types::{Arguments, ToolOutput};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "toolbelt")]
#[command(version)]
#[command(about = "Inspect and invoke agent tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file [default: ~/.toolbelt/toolbelt.toml].
    #[arg(long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List enabled tools.
    List,

    /// Print the JSON schema of one tool, or of every enabled tool.
    Schema {
        /// Tool name.
        name: Option<String>,
    },

    /// Invoke a tool and print its rendered output.
    Call {
        /// Tool name.
        name: String,

        /// Keyword arguments as a JSON object.
        #[arg(long)]
        args: Option<String>,

        /// Positional argument, parsed as JSON or taken as a plain string.
        /// Repeatable.
        #[arg(long = "arg")]
        positional: Vec<String>,

        /// Dispatch mode (auto, sync, async). Defaults to the config value.
        #[arg(long)]
        mode: Option<Dispatch>,
    },

    /// Write the default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(config::resolve_path)
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Logs go to stderr so tool output on stdout stays clean
    let log_level = cli.log_level.as_deref().unwrap_or(&cfg.log_level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::List => cmd_list(&enabled_tools(&cfg)?),
        Commands::Schema { name } => cmd_schema(&enabled_tools(&cfg)?, name.as_deref()),
        Commands::Call {
            name,
            args,
            positional,
            mode,
        } => {
            let tools = enabled_tools(&cfg)?;
            let mode = mode.unwrap_or(cfg.dispatch);
            cmd_call(&tools, &name, args.as_deref(), &positional, mode).await
        }
        Commands::Init { force } => cmd_init(&config_path, force),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_list(tools: &ToolRegistry) -> Result<()> {
    println!();
    println!("{}", "=== Tools ===".bold());
    println!();
    for tool in tools.iter() {
        println!(
            "  {}  {}  {}",
            format!("{:<16}", tool.name()).bold(),
            colorize_capability(tool.capability()),
            tool.description()
        );
    }
    println!();
    Ok(())
}

fn cmd_schema(tools: &ToolRegistry, name: Option<&str>) -> Result<()> {
    let value = match name {
        Some(name) => tools
            .get(name)
            .with_context(|| format!("Unknown tool: {}", name))?
            .schema()
            .to_value(),
        None => Value::Array(tools.schemas().iter().map(ToolSchema::to_value).collect()),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn cmd_call(
    tools: &ToolRegistry,
    name: &str,
    args: Option<&str>,
    positional: &[String],
    mode: Dispatch,
) -> Result<()> {
    let tool = tools
        .get(name)
        .with_context(|| format!("Unknown tool: {}", name))?;

    let keyword = match args {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("--args must be valid JSON")? {
            Value::Object(map) => map,
            other => bail!("--args must be a JSON object, got {}", other),
        },
        None => Map::new(),
    };
    let arguments = positional
        .iter()
        .map(|raw| parse_positional(raw))
        .fold(Arguments::keyword(keyword), |acc, value| acc.arg(value));

    info!(tool = name, %mode, "Invoking tool");
    let output = tool.invoke(arguments, mode).await?;

    if let Some(metadata) = metadata_json(&output)? {
        info!(%metadata, "Tool metadata");
    }
    if output.is_error() {
        println!("{}", output.render().red());
        std::process::exit(1);
    }
    println!("{}", output);
    Ok(())
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }
    config::save_config(&ToolbeltConfig::default(), config_path)?;
    println!(
        "{} Wrote default config to {}",
        ">>>".green().bold(),
        config_path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Built-in tools filtered by the config's `tools` list.
fn enabled_tools(cfg: &ToolbeltConfig) -> Result<ToolRegistry> {
    let all = builtin::default_tools().context("Failed to build built-in tools")?;
    for name in &cfg.tools {
        if !all.contains(name) {
            warn!(tool = %name, "Unknown tool in config, ignoring");
        }
    }
    Ok(all.subset(all.names().into_iter().filter(|n| cfg.is_enabled(n))))
}

/// Output metadata as compact JSON, for the log line.
fn metadata_json(output: &ToolOutput) -> Result<Option<String>> {
    output
        .metadata()
        .map(|metadata| serde_json::to_string(metadata).context("Failed to encode tool metadata"))
        .transpose()
}

/// JSON if it parses, otherwise the raw string.
fn parse_positional(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn colorize_capability(capability: Capability) -> String {
    let label = format!("{:<12}", format!("{:?}", capability).to_lowercase());
    match capability {
        Capability::Synchronous => label.green().to_string(),
        Capability::Asynchronous => label.cyan().to_string(),
        Capability::Both => label.blue().to_string(),
        Capability::Unimplemented => label.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn grade_answer_metadata_is_logged_as_json() {
        let tools = builtin::default_tools().unwrap();
        let output = tools
            .get("grade_answer")
            .unwrap()
            .invoke(Arguments::positional(["1/2", "0.5", "sympy"]), Dispatch::Auto)
            .await
            .unwrap();
        assert_eq!(
            metadata_json(&output).unwrap().as_deref(),
            Some(r#"{"method":"sympy"}"#)
        );
        assert_eq!(metadata_json(&ToolOutput::new("t")).unwrap(), None);
    }

    #[test]
    fn positional_arguments_fall_back_to_strings() {
        assert_eq!(parse_positional("3"), Value::from(3));
        assert_eq!(parse_positional("x+1"), Value::from("x+1"));
    }
}
