// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading of instance documents and the general configuration.
//!
//! Instance documents live under `<root>/readers`, `<root>/writers` and
//! `<root>/executors`, one TOML file per instance. The general configuration
//! is `<root>/general.toml`, merged with `HOSTWATCH_*` environment overrides
//! through Figment.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use hostwatch_core::{HostwatchError, PluginKind};
use tracing::{debug, warn};

use crate::expand::expand_tilde_and_env;
use crate::model::{Config, Configs, GeneralConfig};

/// Environment variable naming the configuration root.
pub const CONFIG_DIR_ENV: &str = "HOSTWATCH_CONFIG_DIR";

/// Root used when [`CONFIG_DIR_ENV`] is unset.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/hostwatch";

/// Problems encountered while scanning a configuration root.
///
/// None of these stop loading; they are reported so the caller can log or
/// surface them.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Documents that failed to decode and were skipped.
    pub skipped: Vec<HostwatchError>,
    /// Directory-level problems, such as a missing kind directory.
    pub advisories: Vec<HostwatchError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.advisories.is_empty()
    }
}

/// Resolves the configuration root from the environment.
pub fn config_dir_from_env() -> PathBuf {
    let raw = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    PathBuf::from(expand_tilde_and_env(&raw))
}

/// Decodes one instance document.
///
/// The kind is recorded and the `Interval` default applied regardless of
/// what the document contains.
pub fn load_config(path: &Path, kind: PluginKind) -> Result<Config, HostwatchError> {
    let path = PathBuf::from(expand_tilde_and_env(&path.to_string_lossy()));
    read_config_file(&path, kind)
}

/// Reads a document from a path taken literally, with no expansion.
fn read_config_file(path: &Path, kind: PluginKind) -> Result<Config, HostwatchError> {
    let path = path.to_path_buf();
    let content = std::fs::read_to_string(&path).map_err(|e| HostwatchError::ConfigParse {
        path: path.clone(),
        message: e.to_string(),
    })?;
    load_config_from_str(&content, kind).map_err(|e| match e {
        HostwatchError::ConfigParse { message, .. } => HostwatchError::ConfigParse {
            path: path.clone(),
            message,
        },
        other => other,
    })
}

/// Decodes one instance document from a string.
pub fn load_config_from_str(content: &str, kind: PluginKind) -> Result<Config, HostwatchError> {
    let mut config: Config = toml::from_str(content).map_err(|e| HostwatchError::ConfigParse {
        path: PathBuf::from("<inline>"),
        message: e.to_string(),
    })?;
    config.normalize(kind);
    Ok(config)
}

/// Loads every instance document under `dir`.
///
/// Files are visited in name order within each kind directory. A file that
/// fails to decode is skipped; it never prevents loading the others.
pub fn load_configs(dir: &Path) -> (Configs, LoadReport) {
    let dir = PathBuf::from(expand_tilde_and_env(&dir.to_string_lossy()));
    let mut configs = Configs::default();
    let mut report = LoadReport::default();

    for kind in PluginKind::ALL {
        let kind_dir = dir.join(kind.dir_name());
        let entries = match std::fs::read_dir(&kind_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %kind_dir.display(), error = %e, "config directory not readable");
                report.advisories.push(HostwatchError::Config(format!(
                    "cannot read {}: {e}",
                    kind_dir.display()
                )));
                continue;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        // Names come straight from read_dir, so `$` or `~` in them is literal.
        for file in files {
            match read_config_file(&file, kind) {
                Ok(config) => {
                    debug!(
                        kind = %kind,
                        plugin = %config.plugin_name,
                        path = %config.path_with_prefix(),
                        "loaded instance config"
                    );
                    configs.push(config);
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping malformed config");
                    report.skipped.push(e);
                }
            }
        }
    }

    (configs, report)
}

/// Loads `<dir>/general.toml` over compiled defaults, with env overrides.
pub fn load_general_config(dir: &Path) -> Result<GeneralConfig, figment::Error> {
    build_figment(dir).extract()
}

/// Loads the general configuration from a TOML string only (no env lookup).
pub fn load_general_config_from_str(toml_content: &str) -> Result<GeneralConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GeneralConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the Figment used for the general configuration.
pub fn build_figment(dir: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GeneralConfig::default()))
        .merge(Toml::file(dir.join("general.toml")))
        .merge(env_provider())
}

/// Maps `HOSTWATCH_*` variables onto general config keys.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `HOSTWATCH_MASTER_ACCESS_TOKEN` must become
/// `master.access_token`.
fn env_provider() -> Env {
    Env::prefixed("HOSTWATCH_")
        .ignore(&["config_dir"])
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("https_", "https.", 1)
                .replacen("master_", "master.", 1)
                .replacen("graphite_", "graphite.", 1);
            mapped.into()
        })
}
