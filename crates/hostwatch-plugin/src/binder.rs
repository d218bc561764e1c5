// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a loaded [`Config`] into a configured plugin instance.
//!
//! Binding never fails on individual fields. Keys a plugin does not know and
//! values of the wrong shape are skipped, logged, and returned in the
//! [`BindReport`] so `hostwatch check` can show them.

use hostwatch_config::Config;
use hostwatch_core::{Configurable, Executor, FieldError, HostwatchError, PluginFields, PluginKind, Reader};
use hostwatch_writers::Writer;
use tracing::{debug, warn};

use crate::registry::Registries;

/// A `PluginFields` entry the plugin did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    pub key: String,
    pub error: FieldError,
}

/// Which fields were applied to an instance and which were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    pub applied: Vec<String>,
    pub skipped: Vec<SkippedField>,
}

impl BindReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Applies every field in `fields` that `plugin` accepts.
pub fn apply_fields<C>(plugin: &mut C, config: &Config, fields: &PluginFields) -> BindReport
where
    C: Configurable + ?Sized,
{
    let mut report = BindReport::default();
    for (key, value) in fields {
        match plugin.apply_field(key, value) {
            Ok(()) => report.applied.push(key.clone()),
            Err(error) => {
                warn!(
                    plugin = %config.plugin_name,
                    path = %config.path,
                    field = %key,
                    error = %error,
                    known = ?plugin.field_names(),
                    "skipping plugin field"
                );
                report.skipped.push(SkippedField {
                    key: key.clone(),
                    error,
                });
            }
        }
    }
    debug!(plugin = %config.plugin_name, applied = report.applied.len(), skipped = report.skipped.len(), "plugin bound");
    report
}

fn check_kind(config: &Config, expected: PluginKind) -> Result<(), HostwatchError> {
    match config.kind {
        Some(kind) if kind != expected => Err(HostwatchError::Config(format!(
            "{} config `{}` cannot be bound as a {expected}",
            kind, config.plugin_name
        ))),
        _ => Ok(()),
    }
}

/// Instantiates and configures the reader named by `config`.
pub fn bind_reader(
    registries: &Registries,
    config: &Config,
) -> Result<(Box<dyn Reader>, BindReport), HostwatchError> {
    check_kind(config, PluginKind::Reader)?;
    let mut reader = registries.readers.instantiate(&config.plugin_name)?;
    let report = apply_fields(reader.as_mut(), config, &config.plugin_fields);
    Ok((reader, report))
}

/// Instantiates and configures the writer named by `config`.
pub fn bind_writer(
    registries: &Registries,
    config: &Config,
) -> Result<(Box<dyn Writer>, BindReport), HostwatchError> {
    check_kind(config, PluginKind::Writer)?;
    let mut writer = registries.writers.instantiate(&config.plugin_name)?;
    let report = apply_fields(writer.as_mut(), config, &config.plugin_fields);
    Ok((writer, report))
}

/// Instantiates and configures the executor named by `config`.
pub fn bind_executor(
    registries: &Registries,
    config: &Config,
) -> Result<(Box<dyn Executor>, BindReport), HostwatchError> {
    check_kind(config, PluginKind::Executor)?;
    let mut executor = registries.executors.instantiate(&config.plugin_name)?;
    let report = apply_fields(executor.as_mut(), config, &config.plugin_fields);
    Ok((executor, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn writer_config(fields: serde_json::Value) -> Config {
        let mut config = Config::new(PluginKind::Writer, "MasterHost", "/master");
        config.plugin_fields = match fields {
            serde_json::Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        };
        config
    }

    #[test]
    fn tolerant_binding_skips_unknown_and_mistyped_fields() {
        let registries = Registries::with_builtins().unwrap();
        let config = writer_config(json!({
            "Url": "http://master:55655",
            "MaxRetries": "three",
            "Colour": "blue"
        }));

        let (_writer, report) = bind_writer(&registries, &config).unwrap();

        assert_eq!(report.applied, vec!["Url"]);
        let mut skipped: Vec<_> = report.skipped.iter().map(|s| s.key.as_str()).collect();
        skipped.sort_unstable();
        assert_eq!(skipped, vec!["Colour", "MaxRetries"]);
        assert!(report
            .skipped
            .iter()
            .any(|s| s.key == "Colour" && s.error == FieldError::Unknown));
        assert!(!report.is_clean());
    }

    #[test]
    fn skipped_fields_leave_other_defaults_untouched() {
        let config = writer_config(json!({
            "Url": "http://master:55655",
            "MaxRetries": "three",
            "Colour": "blue"
        }));

        let mut writer = hostwatch_writers::MasterHostWriter::new();
        let report = apply_fields(&mut writer, &config, &config.plugin_fields);

        assert_eq!(report.skipped.len(), 2);
        let sink = writer.sink();
        assert_eq!(sink.url, "http://master:55655");
        assert_eq!(sink.max_retries, 3);
        assert_eq!(sink.method, "POST");
        assert_eq!(sink.retry_delay, std::time::Duration::from_secs(1));
    }

    #[test]
    fn unknown_plugin_is_not_found() {
        let registries = Registries::with_builtins().unwrap();
        let config = Config::new(PluginKind::Writer, "Kafka", "/kafka");
        let err = bind_writer(&registries, &config).err().unwrap();
        assert!(matches!(err, HostwatchError::PluginNotFound { .. }));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let registries = Registries::with_builtins().unwrap();
        let config = Config::new(PluginKind::Reader, "MasterHost", "/master");
        assert!(bind_writer(&registries, &config).is_err());
    }

    #[test]
    fn reader_and_executor_bind_cleanly() {
        let registries = Registries::with_builtins().unwrap();

        let mut reader_config = Config::new(PluginKind::Reader, "Static", "/inventory");
        reader_config
            .plugin_fields
            .insert("Values".into(), json!({"rack": "a4"}));
        let (reader, report) = bind_reader(&registries, &reader_config).unwrap();
        assert_eq!(reader.plugin_name(), "Static");
        assert!(report.is_clean());

        let executor_config = Config::new(PluginKind::Executor, "Log", "/log");
        let (executor, report) = bind_executor(&registries, &executor_config).unwrap();
        assert_eq!(executor.plugin_name(), "Log");
        assert!(report.applied.is_empty());
    }
}
