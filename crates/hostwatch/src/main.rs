// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! hostwatch - host telemetry agent.
//!
//! This is the binary entry point for the agent.

mod check;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hostwatch_core::PluginKind;
use hostwatch_plugin::Registries;

/// hostwatch - host telemetry agent.
#[derive(Parser, Debug)]
#[command(name = "hostwatch", version, about, long_about = None)]
struct Cli {
    /// Configuration root. Defaults to $HOSTWATCH_CONFIG_DIR, then /etc/hostwatch.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every configured instance until interrupted.
    Serve,
    /// Validate configuration and plugin bindings, then exit.
    Check,
    /// List compiled-in plugins.
    Plugins,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_dir = cli
        .config_dir
        .unwrap_or_else(hostwatch_config::config_dir_from_env);

    // A name collision here is a build defect, never a config problem.
    let registries = match Registries::with_builtins() {
        Ok(registries) => registries,
        Err(e) => {
            eprintln!("hostwatch: {e}");
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Some(Commands::Serve) => serve::run_serve(&config_dir, &registries).await,
        Some(Commands::Check) => check::run_check(&config_dir, &registries),
        Some(Commands::Plugins) => {
            print_plugins(&registries);
            0
        }
        None => {
            println!("hostwatch: use --help for available commands");
            0
        }
    };
    std::process::exit(code);
}

fn print_plugins(registries: &Registries) {
    for kind in PluginKind::ALL {
        println!("{}:", kind.dir_name());
        for (name, description) in registries.describe(kind) {
            if description.is_empty() {
                println!("  {name}");
            } else {
                println!("  {name:<12} {description}");
            }
        }
    }
}
