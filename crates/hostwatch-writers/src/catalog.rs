// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in writer catalog.
//!
//! Compiled-in writers the agent registers at startup.

use crate::base::Writer;
use crate::http::{self, HttpWriter};
use crate::master::{self, MasterHostWriter};
use crate::stdout::{self, StdoutWriter};

/// Builds a fresh, unconfigured writer.
pub type WriterConstructor = fn() -> Box<dyn Writer>;

/// One compiled-in writer.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinWriter {
    pub name: &'static str,
    pub description: &'static str,
    pub constructor: WriterConstructor,
}

/// Returns every built-in writer:
/// - MasterHost (flattened envelope to the master service)
/// - Http (raw data to any endpoint)
/// - Stdout (logs data locally)
pub fn builtin_writers() -> Vec<BuiltinWriter> {
    vec![
        BuiltinWriter {
            name: master::PLUGIN_NAME,
            description: "Flattened host envelope delivered to the master service",
            constructor: || Box::new(MasterHostWriter::new()),
        },
        BuiltinWriter {
            name: http::PLUGIN_NAME,
            description: "Writer data delivered as-is to an HTTP endpoint",
            constructor: || Box::new(HttpWriter::new()),
        },
        BuiltinWriter {
            name: stdout::PLUGIN_NAME,
            description: "Writer data logged locally",
            constructor: || Box::new(StdoutWriter::new()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique() {
        let names: HashSet<_> = builtin_writers().iter().map(|w| w.name).collect();
        assert_eq!(names.len(), builtin_writers().len());
    }

    #[test]
    fn constructors_report_their_own_name() {
        for entry in builtin_writers() {
            let writer = (entry.constructor)();
            assert_eq!(writer.plugin_name(), entry.name);
        }
    }
}
