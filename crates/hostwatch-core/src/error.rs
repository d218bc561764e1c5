// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the hostwatch agent.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::PluginKind;

/// The primary error type shared by plugins, the loader, and the agent runtime.
#[derive(Debug, Error)]
pub enum HostwatchError {
    /// General configuration errors (invalid values, unreadable directories).
    #[error("configuration error: {0}")]
    Config(String),

    /// A single configuration document could not be read or decoded.
    #[error("failed to parse config {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// The requested plugin name is not registered for this kind.
    #[error("plugin not found: {kind}/{name}")]
    PluginNotFound { kind: PluginKind, name: String },

    /// Two constructors were registered under the same name.
    #[error("{kind} plugin `{name}` is already registered")]
    RegistryCollision { kind: PluginKind, name: String },

    /// The post-processing step of a writer cycle failed.
    #[error("pipeline error: {message}")]
    Pipeline {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Delivery to a remote sink failed.
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A writer was asked to deliver before any data was produced.
    #[error("no data to deliver")]
    NoData,

    /// The filesystem watcher could not be set up.
    #[error("watch error on {}: {message}", path.display())]
    Watch {
        path: PathBuf,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation was interrupted by a shutdown signal.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HostwatchError {
    /// Builds a `Pipeline` error without an underlying cause.
    pub fn pipeline(message: impl Into<String>) -> Self {
        HostwatchError::Pipeline {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a `Delivery` error without an underlying cause.
    pub fn delivery(message: impl Into<String>) -> Self {
        HostwatchError::Delivery {
            message: message.into(),
            source: None,
        }
    }
}
