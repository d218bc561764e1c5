// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin contracts for the hostwatch agent.
//!
//! Readers and executors are defined here. The writer contract lives in
//! `hostwatch-writers` next to the shared pipeline it is built on.

pub mod configurable;
pub mod executor;
pub mod reader;
pub mod source;

pub use configurable::{decode_field, Configurable, FieldError};
pub use executor::Executor;
pub use reader::Reader;
pub use source::SnapshotSource;
