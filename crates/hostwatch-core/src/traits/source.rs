// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source of raw reader snapshots consumed by writers.

use std::collections::BTreeMap;

use async_trait::async_trait;

/// Supplies the latest raw JSON bytes for a set of reader paths.
///
/// Paths with no snapshot are simply absent from the result; the writer
/// pipeline treats them the same way as unparseable snapshots.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, paths: &[String]) -> BTreeMap<String, Vec<u8>>;
}
