// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writer side of the hostwatch agent.
//!
//! Writers aggregate reader snapshots into a single `Data` value, optionally
//! reshape it through an external JSON processor, and deliver it. This crate
//! holds the shared pipeline ([`base`]), the built-in writers, HTTP delivery
//! with retry, and the directory watcher used to re-trigger writers when
//! their processor changes.

pub mod base;
pub mod catalog;
pub mod flatten;
pub mod handle;
pub mod http;
pub mod master;
pub mod processor;
pub mod retry;
pub mod sink;
pub mod stdout;
pub mod watch;

pub use base::{CollectReport, CollectionGap, DataHandle, PipelineState, Writer, WriterBase};
pub use catalog::{builtin_writers, BuiltinWriter, WriterConstructor};
pub use handle::{CycleReport, WriterHandle};
pub use master::{pre_process_delivery, Envelope, MasterHostWriter};
pub use retry::{retry, AttemptError, RetryPolicy};
pub use watch::{watch_dir, ChangeKind, DirWatcher};
