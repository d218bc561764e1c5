// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for the general configuration.
//!
//! Checks constraints serde cannot express: listen address shape, log level
//! names, sink URL schemes and paired TLS files.

use crate::diagnostic::ConfigError;
use crate::model::GeneralConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate the general configuration.
///
/// Returns all collected errors instead of failing fast.
pub fn validate_general_config(config: &GeneralConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.addr.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "addr must not be empty".to_string(),
        });
    } else if !looks_like_listen_addr(addr) {
        errors.push(ConfigError::Validation {
            message: format!("addr `{addr}` is not of the form host:port"),
        });
    }

    if !LOG_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log_level `{}` is not one of {}",
                config.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(url) = &config.master.url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::Validation {
                message: format!("master.url `{url}` must use http or https"),
            });
        }
    }

    check_pair(
        &mut errors,
        "https",
        config.https.cert_file.as_deref(),
        config.https.key_file.as_deref(),
    );
    check_pair(
        &mut errors,
        "graphite",
        config.graphite.cert_file.as_deref(),
        config.graphite.key_file.as_deref(),
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts `host:port` and `:port`, including bracketed IPv6 hosts.
fn looks_like_listen_addr(addr: &str) -> bool {
    if addr.parse::<std::net::SocketAddr>().is_ok() {
        return true;
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            port.parse::<u16>().is_ok()
                && host
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
        }
        None => false,
    }
}

fn check_pair(errors: &mut Vec<ConfigError>, section: &str, cert: Option<&str>, key: Option<&str>) {
    match (cert, key) {
        (Some(_), None) => errors.push(ConfigError::Validation {
            message: format!("{section}.cert_file is set but {section}.key_file is missing"),
        }),
        (None, Some(_)) => errors.push(ConfigError::Validation {
            message: format!("{section}.key_file is set but {section}.cert_file is missing"),
        }),
        _ => {}
    }
}
