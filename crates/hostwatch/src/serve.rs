// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hostwatch serve`: load configuration, bind instances and run them.

use std::path::Path;

use hostwatch_agent::{install_signal_handler, local_host_info, Agent};
use hostwatch_config::{load_and_validate_general, load_configs, render_errors};
use hostwatch_plugin::Registries;
use tracing::{info, warn};

/// Runs the agent until SIGINT/SIGTERM. Returns the process exit code.
pub async fn run_serve(config_dir: &Path, registries: &Registries) -> i32 {
    let general = match load_and_validate_general(config_dir) {
        Ok(general) => general,
        Err(errors) => {
            render_errors(&errors);
            return 1;
        }
    };

    init_tracing(&general.log_level);
    info!(config_dir = %config_dir.display(), addr = %general.addr, "starting hostwatch");

    let (configs, load_report) = load_configs(config_dir);
    for advisory in &load_report.advisories {
        info!(%advisory, "config advisory");
    }
    for skipped in &load_report.skipped {
        warn!(error = %skipped, "config file skipped");
    }

    let (agent, report) = Agent::build(
        registries,
        &configs,
        &local_host_info(),
        &general.master_defaults(),
    );
    if report.bound == 0 {
        warn!("no instances bound, the agent has nothing to do");
    }

    let cancel = install_signal_handler();
    agent.run(cancel).await;
    0
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hostwatch={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
