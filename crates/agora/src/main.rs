// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agora - host tool for the Agora plugin framework.
//!
//! Lists the plugins compiled into this build, validates host
//! configuration before a deployment picks it up, and generates new plugin
//! crates.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use agora::{commands, scaffold};
use agora_config::{AgoraConfig, ConfigError};
use agora_core::CapabilityKind;

/// Agora - host tool for the Agora plugin framework.
#[derive(Parser, Debug)]
#[command(name = "agora", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the XDG lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered plugins and their capabilities.
    Plugins {
        /// Language for plugin names (defaults to host.default_lang).
        #[arg(long)]
        lang: Option<String>,
        /// Extra message catalog merged over the built-in one.
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Validate host configuration and every plugin's config table.
    Check,
    /// Plugin development helpers.
    Plugin {
        #[command(subcommand)]
        action: PluginCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PluginCommands {
    /// Generate a plugin crate implementing one capability.
    Init {
        /// cache, connector, notification, reviewer, search, storage or user_center.
        #[arg(value_parser = scaffold::parse_capability)]
        capability: CapabilityKind,
        /// Plugin name; becomes the slug in snake_case.
        name: String,
        /// Directory the crate is created in.
        #[arg(long, default_value = "crates")]
        dir: PathBuf,
    },
}

fn load(path: Option<&PathBuf>) -> Result<AgoraConfig, Vec<ConfigError>> {
    match path {
        Some(path) => agora_config::load_and_validate_path(path),
        None => agora_config::load_and_validate(),
    }
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // `agora` prefixes every crate target in the workspace.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("agora={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Generating a crate needs no host configuration.
    if let Some(Commands::Plugin {
        action:
            PluginCommands::Init {
                capability,
                name,
                dir,
            },
    }) = &cli.command
    {
        init_tracing("info");
        return match scaffold::run_init(*capability, name, dir) {
            Ok(output) => {
                print!("{output}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            agora_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.host.log_level);

    let result = match cli.command {
        Some(Commands::Plugins {
            lang,
            catalog,
            json,
        }) => commands::run_plugins(&config, lang.as_deref(), catalog.as_deref(), json),
        Some(Commands::Check) => commands::run_check(&config),
        Some(Commands::Plugin { .. }) => Ok(String::new()),
        None => Ok("agora: use --help for available commands\n".to_string()),
    };

    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(errors) => {
            agora_config::render_errors(&errors);
            ExitCode::FAILURE
        }
    }
}
