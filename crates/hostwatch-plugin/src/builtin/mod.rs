// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in plugin catalog.
//!
//! Writers come from `hostwatch-writers`. The reader and executor here are
//! small local plugins; real samplers and actions live outside the agent core.

mod log_executor;
mod static_reader;

pub use log_executor::LogExecutor;
pub use static_reader::StaticReader;

use hostwatch_core::{Executor, HostwatchError, Reader};
use hostwatch_writers::builtin_writers;

use crate::registry::Registries;

/// Registers every compiled-in plugin. Fails on the first name collision.
pub fn register_builtins(registries: &mut Registries) -> Result<(), HostwatchError> {
    registries.readers.register_with_description(
        static_reader::PLUGIN_NAME,
        "Publishes the values given in its configuration",
        || Box::new(StaticReader::new()) as Box<dyn Reader>,
    )?;

    for writer in builtin_writers() {
        registries
            .writers
            .register_with_description(writer.name, writer.description, writer.constructor)?;
    }

    registries.executors.register_with_description(
        log_executor::PLUGIN_NAME,
        "Logs a summary of the reader data it is handed",
        || Box::new(LogExecutor::new()) as Box<dyn Executor>,
    )?;

    Ok(())
}
