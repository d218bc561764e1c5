// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for plugin instances and the general agent settings.
//!
//! Instance documents use PascalCase keys and tolerate unknown keys so that
//! one document format serves every plugin. The general configuration is
//! strict (`deny_unknown_fields`) because its shape is fixed.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hostwatch_core::{HostInfo, HostwatchError, PluginFields, PluginKind};
use serde::{Deserialize, Serialize};

use crate::interval::parse_interval;

/// Interval applied to every instance that does not declare one.
pub const DEFAULT_INTERVAL: &str = "1m";

/// One plugin instance's declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Registry lookup key.
    #[serde(default)]
    pub plugin_name: String,

    /// Settings bound onto the instance through its typed schema.
    #[serde(default)]
    pub plugin_fields: PluginFields,

    /// Address of this instance's data, without the kind prefix.
    #[serde(default)]
    pub path: String,

    /// Duration string, never empty after loading.
    #[serde(default = "default_interval")]
    pub interval: String,

    #[serde(default)]
    pub host: Option<HostInfo>,

    /// Set by the loader from the directory the document was found in.
    #[serde(skip)]
    pub kind: Option<PluginKind>,

    // --- writer-only ---
    /// Reader paths this writer consumes.
    #[serde(default)]
    pub reader_paths: Vec<String>,

    // --- executor-only ---
    #[serde(default)]
    pub low_threshold: i64,

    #[serde(default)]
    pub high_threshold: i64,

    #[serde(default)]
    pub conditions: String,

    #[serde(default)]
    pub remote_url: Option<String>,

    #[serde(default)]
    pub remote_access_token: Option<String>,
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin_name: String::new(),
            plugin_fields: PluginFields::new(),
            path: String::new(),
            interval: default_interval(),
            host: None,
            kind: None,
            reader_paths: Vec::new(),
            low_threshold: 0,
            high_threshold: 0,
            conditions: String::new(),
            remote_url: None,
            remote_access_token: None,
        }
    }
}

impl Config {
    /// Creates an empty configuration of the given kind.
    pub fn new(kind: PluginKind, plugin_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            path: path.into(),
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Records the kind and restores defaults for values left empty.
    pub fn normalize(&mut self, kind: PluginKind) {
        self.kind = Some(kind);
        if self.interval.trim().is_empty() {
            self.interval = default_interval();
        }
    }

    /// Canonical address of this instance: `/r`, `/w` or `/x` followed by `Path`.
    ///
    /// Configurations without a kind return `Path` unchanged.
    pub fn path_with_prefix(&self) -> String {
        match self.kind {
            Some(kind) => path_with_kind_prefix(kind, &self.path),
            None => self.path.clone(),
        }
    }

    /// Canonical reader paths this writer consumes.
    pub fn reader_paths_with_prefix(&self) -> Vec<String> {
        self.reader_paths
            .iter()
            .map(|p| path_with_kind_prefix(PluginKind::Reader, p))
            .collect()
    }

    /// Parsed `Interval`.
    pub fn interval_duration(&self) -> Result<Duration, HostwatchError> {
        parse_interval(&self.interval)
    }

    /// Fields common to every snapshot an instance publishes.
    pub fn common_json_data(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut record = serde_json::Map::new();
        let unix_nano = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or_default();
        record.insert("UnixNano".into(), unix_nano.into());
        record.insert("Path".into(), self.path.clone().into());
        record.insert("Interval".into(), self.interval.clone().into());
        if !self.plugin_name.is_empty() {
            record.insert("PluginName".into(), self.plugin_name.clone().into());
        }
        record
    }

    /// Returns a copy whose `PluginFields` fall back to `defaults` for any
    /// key the document does not set itself.
    pub fn with_default_fields(mut self, defaults: &PluginFields) -> Self {
        for (key, value) in defaults {
            if !self.plugin_fields.contains_key(key) {
                self.plugin_fields.insert(key.clone(), value.clone());
            }
        }
        self
    }
}

/// Prepends `/<short kind>` to `input`; already-prefixed input is returned as is.
pub fn path_with_kind_prefix(kind: PluginKind, input: &str) -> String {
    let prefix = format!("/{}", kind.short());
    if input == prefix || input.starts_with(&format!("{prefix}/")) {
        return input.to_string();
    }
    if input.is_empty() || input.starts_with('/') {
        format!("{prefix}{input}")
    } else {
        format!("{prefix}/{input}")
    }
}

/// All instance configurations found under one configuration root.
#[derive(Debug, Clone, Default)]
pub struct Configs {
    pub readers: Vec<Config>,
    pub writers: Vec<Config>,
    pub executors: Vec<Config>,
}

impl Configs {
    pub fn of_kind(&self, kind: PluginKind) -> &[Config] {
        match kind {
            PluginKind::Reader => &self.readers,
            PluginKind::Writer => &self.writers,
            PluginKind::Executor => &self.executors,
        }
    }

    pub(crate) fn push(&mut self, config: Config) {
        match config.kind {
            Some(PluginKind::Reader) => self.readers.push(config),
            Some(PluginKind::Writer) => self.writers.push(config),
            Some(PluginKind::Executor) => self.executors.push(config),
            None => {}
        }
    }

    pub fn len(&self) -> usize {
        self.readers.len() + self.writers.len() + self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Agent-wide settings loaded from `general.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Listen address of the snapshot endpoint.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub https: HttpsConfig,

    /// Default remote sink used by `MasterHost` writers.
    #[serde(default)]
    pub master: MasterConfig,

    #[serde(default)]
    pub graphite: GraphiteConfig,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            log_level: default_log_level(),
            https: HttpsConfig::default(),
            master: MasterConfig::default(),
            graphite: GraphiteConfig::default(),
        }
    }
}

impl GeneralConfig {
    /// Plugin fields the master sink settings contribute to `MasterHost` writers.
    pub fn master_defaults(&self) -> PluginFields {
        let mut fields = PluginFields::new();
        if let Some(url) = &self.master.url {
            fields.insert("Url".into(), url.clone().into());
        }
        if let Some(token) = &self.master.access_token {
            fields.insert("AccessToken".into(), token.clone().into());
        }
        fields
    }
}

fn default_addr() -> String {
    "127.0.0.1:55555".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// TLS material for the snapshot endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpsConfig {
    #[serde(default)]
    pub cert_file: Option<String>,

    #[serde(default)]
    pub key_file: Option<String>,
}

/// Remote sink receiving host envelopes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MasterConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,
}

/// Graphite sink address and client certificate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GraphiteConfig {
    #[serde(default)]
    pub addr: Option<String>,

    #[serde(default)]
    pub cert_file: Option<String>,

    #[serde(default)]
    pub key_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_has_default_interval() {
        let config = Config::new(PluginKind::Reader, "Cpu", "/cpu");
        assert_eq!(config.interval, "1m");
    }

    #[test]
    fn normalize_restores_empty_interval() {
        let mut config = Config {
            interval: "  ".to_string(),
            ..Config::default()
        };
        config.normalize(PluginKind::Writer);
        assert_eq!(config.interval, "1m");
        assert_eq!(config.kind, Some(PluginKind::Writer));
    }

    #[test]
    fn path_with_prefix_per_kind() {
        let reader = Config::new(PluginKind::Reader, "Cpu", "/cpu");
        let writer = Config::new(PluginKind::Writer, "MasterHost", "/master");
        let executor = Config::new(PluginKind::Executor, "Shell", "/alert");
        assert_eq!(reader.path_with_prefix(), "/r/cpu");
        assert_eq!(writer.path_with_prefix(), "/w/master");
        assert_eq!(executor.path_with_prefix(), "/x/alert");
    }

    #[test]
    fn path_with_prefix_is_idempotent() {
        let config = Config::new(PluginKind::Reader, "Cpu", "/r/cpu");
        assert_eq!(config.path_with_prefix(), "/r/cpu");
        assert_eq!(path_with_kind_prefix(PluginKind::Reader, "/r"), "/r");
    }

    #[test]
    fn path_with_prefix_does_not_confuse_similar_names() {
        // "/redis" starts with "/r" but not with "/r/".
        assert_eq!(path_with_kind_prefix(PluginKind::Reader, "/redis"), "/r/redis");
    }

    #[test]
    fn path_without_leading_slash_gets_one() {
        assert_eq!(path_with_kind_prefix(PluginKind::Writer, "stdout"), "/w/stdout");
    }

    #[test]
    fn config_without_kind_keeps_path() {
        let config = Config {
            path: "/cpu".to_string(),
            ..Config::default()
        };
        assert_eq!(config.path_with_prefix(), "/cpu");
    }

    #[test]
    fn reader_paths_are_canonicalized() {
        let mut config = Config::new(PluginKind::Writer, "MasterHost", "/master");
        config.reader_paths = vec!["/cpu".into(), "/r/mem".into()];
        assert_eq!(config.reader_paths_with_prefix(), vec!["/r/cpu", "/r/mem"]);
    }

    #[test]
    fn common_json_data_carries_identity() {
        let config = Config::new(PluginKind::Reader, "Cpu", "/cpu");
        let record = config.common_json_data();
        assert_eq!(record["Path"], "/cpu");
        assert_eq!(record["Interval"], "1m");
        assert_eq!(record["PluginName"], "Cpu");
        assert!(record["UnixNano"].as_i64().unwrap() > 0);
    }

    #[test]
    fn default_fields_do_not_override_document() {
        let mut config = Config::new(PluginKind::Writer, "MasterHost", "/master");
        config
            .plugin_fields
            .insert("Url".into(), "http://doc".into());

        let mut defaults = PluginFields::new();
        defaults.insert("Url".into(), "http://general".into());
        defaults.insert("AccessToken".into(), "tok".into());

        let merged = config.with_default_fields(&defaults);
        assert_eq!(merged.plugin_fields["Url"], "http://doc");
        assert_eq!(merged.plugin_fields["AccessToken"], "tok");
    }

    #[test]
    fn master_defaults_only_include_set_values() {
        let mut general = GeneralConfig::default();
        assert!(general.master_defaults().is_empty());
        general.master.url = Some("http://master:55655".into());
        let fields = general.master_defaults();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["Url"], "http://master:55655");
    }
}
