// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Executor contract: evaluates conditions against collected data.

use async_trait::async_trait;

use crate::error::HostwatchError;
use crate::traits::configurable::Configurable;
use crate::types::ReadersData;

/// A plugin that evaluates thresholds or conditions and acts on them.
#[async_trait]
pub trait Executor: Configurable + Send + Sync + 'static {
    /// Registry name of the plugin that produced this instance.
    fn plugin_name(&self) -> &str;

    /// Evaluates the latest reader snapshots.
    async fn run(&mut self, readers_data: &ReadersData) -> Result<(), HostwatchError>;
}
