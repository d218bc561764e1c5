// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the hostwatch agent.
//!
//! Two layers:
//! - per-instance documents (`readers/`, `writers/`, `executors/`), decoded
//!   tolerantly so one malformed file never blocks the rest;
//! - the general configuration (`general.toml` + `HOSTWATCH_*` env),
//!   validated strictly with diagnostic rendering.
//!
//! # Usage
//!
//! ```no_run
//! use hostwatch_config::{config_dir_from_env, load_configs};
//!
//! let (configs, report) = load_configs(&config_dir_from_env());
//! println!("{} writers, {} skipped", configs.writers.len(), report.skipped.len());
//! ```

pub mod diagnostic;
pub mod expand;
pub mod interval;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use expand::expand_tilde_and_env;
pub use interval::parse_interval;
pub use loader::{
    config_dir_from_env, load_config, load_config_from_str, load_configs, load_general_config,
    load_general_config_from_str, LoadReport,
};
pub use model::{path_with_kind_prefix, Config, Configs, GeneralConfig, DEFAULT_INTERVAL};

/// Load `<dir>/general.toml` with env overrides and validate it.
pub fn load_and_validate_general(dir: &Path) -> Result<GeneralConfig, Vec<ConfigError>> {
    match loader::load_general_config(dir) {
        Ok(config) => {
            validation::validate_general_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load the general configuration from a TOML string and validate it.
pub fn load_and_validate_general_str(toml_content: &str) -> Result<GeneralConfig, Vec<ConfigError>> {
    match loader::load_general_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_general_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
