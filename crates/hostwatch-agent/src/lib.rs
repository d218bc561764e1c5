// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent runtime for hostwatch.
//!
//! The [`Agent`] binds every loaded config and then:
//! - runs each reader on its interval and publishes into the [`SnapshotStore`]
//! - runs each writer cycle against the store
//! - re-triggers writers whose json processor directory changes
//! - feeds executors the latest reader data
//! - stops every loop when the shutdown token fires

pub mod host;
pub mod runtime;
pub mod shutdown;
pub mod store;

pub use host::local_host_info;
pub use runtime::{Agent, AgentReport, InstanceFailure};
pub use shutdown::install_signal_handler;
pub use store::SnapshotStore;
