// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hostwatch check`: validate configuration without starting anything.

use std::path::Path;

use hostwatch_config::{load_and_validate_general, load_configs, render_errors, Config};
use hostwatch_core::PluginKind;
use hostwatch_plugin::{bind_executor, bind_reader, bind_writer, BindReport, Registries};

/// Outcome of checking one instance.
#[derive(Debug)]
pub(crate) struct InstanceCheck {
    pub path: String,
    pub plugin_name: String,
    pub result: Result<BindReport, String>,
}

/// Binds every instance under `config_dir` and collects the outcome.
pub(crate) fn check_instances(config_dir: &Path, registries: &Registries) -> (Vec<InstanceCheck>, Vec<String>) {
    let (configs, load_report) = load_configs(config_dir);
    let mut problems: Vec<String> = load_report.skipped.iter().map(ToString::to_string).collect();
    problems.extend(load_report.advisories.iter().map(|a| format!("note: {a}")));

    let mut checks = Vec::new();
    for kind in PluginKind::ALL {
        for config in configs.of_kind(kind) {
            checks.push(check_one(registries, kind, config));
        }
    }
    (checks, problems)
}

fn check_one(registries: &Registries, kind: PluginKind, config: &Config) -> InstanceCheck {
    let result = config
        .interval_duration()
        .and_then(|_| match kind {
            PluginKind::Reader => bind_reader(registries, config).map(|(_, report)| report),
            PluginKind::Writer => bind_writer(registries, config).map(|(_, report)| report),
            PluginKind::Executor => bind_executor(registries, config).map(|(_, report)| report),
        })
        .map_err(|e| e.to_string());
    InstanceCheck {
        path: config.path_with_prefix(),
        plugin_name: config.plugin_name.clone(),
        result,
    }
}

/// Prints a report and returns the exit code: 1 if anything failed.
pub fn run_check(config_dir: &Path, registries: &Registries) -> i32 {
    let mut failed = false;

    match load_and_validate_general(config_dir) {
        Ok(general) => println!("general: ok (addr={}, log_level={})", general.addr, general.log_level),
        Err(errors) => {
            render_errors(&errors);
            failed = true;
        }
    }

    let (checks, problems) = check_instances(config_dir, registries);
    for problem in &problems {
        println!("{problem}");
    }
    failed |= problems.iter().any(|p| !p.starts_with("note:"));

    for check in &checks {
        match &check.result {
            Ok(report) if report.is_clean() => {
                println!("{} ({}): ok", check.path, check.plugin_name);
            }
            Ok(report) => {
                println!("{} ({}): ok with skipped fields", check.path, check.plugin_name);
                for skipped in &report.skipped {
                    println!("  {}: {}", skipped.key, skipped.error);
                }
            }
            Err(e) => {
                println!("{} ({}): {e}", check.path, check.plugin_name);
                failed = true;
            }
        }
    }

    if failed { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn check_reports_each_instance() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("readers")).unwrap();
        fs::create_dir_all(dir.path().join("writers")).unwrap();
        fs::write(
            dir.path().join("readers/a.toml"),
            "PluginName = \"Static\"\nPath = \"/a\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("writers/b.toml"),
            "PluginName = \"Nope\"\nPath = \"/b\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("writers/c.toml"), "PluginName = [").unwrap();

        let registries = Registries::with_builtins().unwrap();
        let (checks, problems) = check_instances(dir.path(), &registries);

        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].path, "/r/a");
        assert!(checks[0].result.is_ok());
        assert!(checks[1].result.as_ref().unwrap_err().contains("plugin not found"));
        assert!(problems.iter().any(|p| p.contains("c.toml")));
        assert!(problems.iter().any(|p| p.starts_with("note:")));
        assert_eq!(run_check(dir.path(), &registries), 1);
    }
}
