// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registries and configuration binding for hostwatch.
//!
//! Plugins are compiled in and registered by name at startup. A loaded
//! `Config` names its plugin; the binder resolves it against [`Registries`]
//! and applies the instance's `PluginFields` through the plugin's typed
//! schema.

pub mod binder;
pub mod builtin;
pub mod registry;

pub use binder::{apply_fields, bind_executor, bind_reader, bind_writer, BindReport, SkippedField};
pub use registry::{Constructor, Registries, Registry};
