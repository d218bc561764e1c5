// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the hostwatch telemetry agent.
//!
//! Holds the plugin contracts, the shared error type, and the small set of
//! types every other crate in the workspace speaks.

pub mod error;
pub mod traits;
pub mod types;

pub use error::HostwatchError;
pub use types::{HostInfo, PluginFields, PluginKind, ReadersData};

pub use traits::{Configurable, Executor, FieldError, Reader, SnapshotSource};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn plugin_kind_display_round_trip() {
        for kind in PluginKind::ALL {
            let s = kind.to_string();
            assert_eq!(PluginKind::from_str(&s).unwrap(), kind);
        }
        assert_eq!(PluginKind::Writer.to_string(), "writer");
    }

    #[test]
    fn plugin_kind_short_and_dir_names() {
        assert_eq!(PluginKind::Reader.short(), "r");
        assert_eq!(PluginKind::Writer.short(), "w");
        assert_eq!(PluginKind::Executor.short(), "x");
        assert_eq!(PluginKind::Executor.dir_name(), "executors");
    }

    #[test]
    fn host_info_uses_pascal_case_keys() {
        let host: HostInfo =
            serde_json::from_value(serde_json::json!({"Name": "h1", "Tags": ["db"]})).unwrap();
        assert_eq!(host.name, "h1");
        assert_eq!(host.tags, vec!["db"]);
        assert!(host.data.is_empty());
    }

    #[test]
    fn error_messages_name_the_plugin() {
        let err = HostwatchError::PluginNotFound {
            kind: PluginKind::Writer,
            name: "Nope".into(),
        };
        assert_eq!(err.to_string(), "plugin not found: writer/Nope");

        let err = HostwatchError::RegistryCollision {
            kind: PluginKind::Reader,
            name: "Cpu".into(),
        };
        assert!(err.to_string().contains("already registered"));
    }
}
