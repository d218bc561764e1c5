// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across plugin contracts and the configuration model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Parsed reader snapshots keyed by reader path, rebuilt every writer cycle.
///
/// A `BTreeMap` keeps iteration in path order, which makes "last processed
/// path" well defined for the deliverers.
pub type ReadersData = BTreeMap<String, serde_json::Value>;

/// Generic key/value settings bound onto a plugin instance.
pub type PluginFields = serde_json::Map<String, serde_json::Value>;

/// The three plugin kinds an instance configuration can declare.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Reader,
    Writer,
    Executor,
}

impl PluginKind {
    /// All kinds, in loading order.
    pub const ALL: [PluginKind; 3] = [PluginKind::Reader, PluginKind::Writer, PluginKind::Executor];

    /// Short form used as the first segment of an instance's canonical path.
    pub fn short(self) -> &'static str {
        match self {
            PluginKind::Reader => "r",
            PluginKind::Writer => "w",
            PluginKind::Executor => "x",
        }
    }

    /// Name of the configuration subdirectory holding documents of this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            PluginKind::Reader => "readers",
            PluginKind::Writer => "writers",
            PluginKind::Executor => "executors",
        }
    }
}

/// Host metadata attached to an instance configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Free-form host facts (kernel, cpu count, ...).
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}
