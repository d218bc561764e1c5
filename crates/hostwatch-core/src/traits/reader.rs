// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reader contract: samples local state into a JSON snapshot.

use async_trait::async_trait;

use crate::error::HostwatchError;
use crate::traits::configurable::Configurable;

/// A plugin that samples one piece of system or application state.
///
/// The agent calls [`run`](Reader::run) on the instance's interval and then
/// publishes [`to_json`](Reader::to_json) under the instance's reader path.
#[async_trait]
pub trait Reader: Configurable + Send + Sync + 'static {
    /// Registry name of the plugin that produced this instance.
    fn plugin_name(&self) -> &str;

    /// Takes a fresh sample.
    async fn run(&mut self) -> Result<(), HostwatchError>;

    /// Serializes the latest sample.
    fn to_json(&self) -> Result<Vec<u8>, HostwatchError>;
}
