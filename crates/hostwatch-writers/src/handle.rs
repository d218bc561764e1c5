// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime wrapper that drives one writer instance through its cycle.

use hostwatch_core::{HostwatchError, SnapshotSource};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::base::{CollectionGap, DataHandle, PipelineState, Writer};

/// Summary of one completed writer cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub collected: Vec<String>,
    pub gaps: Vec<CollectionGap>,
}

/// One bound writer plus the reader paths it aggregates.
///
/// Cycles are serialized by an async mutex. The published `Data` is read
/// through [`DataHandle`] without taking the lock.
pub struct WriterHandle {
    path: String,
    reader_paths: Vec<String>,
    data: DataHandle,
    writer: Mutex<Box<dyn Writer>>,
}

impl std::fmt::Debug for WriterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterHandle")
            .field("path", &self.path)
            .field("reader_paths", &self.reader_paths)
            .finish_non_exhaustive()
    }
}

impl WriterHandle {
    pub fn new(path: impl Into<String>, reader_paths: Vec<String>, writer: Box<dyn Writer>) -> Self {
        let data = writer.base().data();
        Self {
            path: path.into(),
            reader_paths,
            data,
            writer: Mutex::new(writer),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn reader_paths(&self) -> &[String] {
        &self.reader_paths
    }

    pub fn data(&self) -> DataHandle {
        self.data.clone()
    }

    /// Latest `Data` as JSON, `null` before the first successful cycle.
    pub fn to_json(&self) -> Result<Vec<u8>, HostwatchError> {
        self.data.to_json()
    }

    pub async fn state(&self) -> PipelineState {
        self.writer.lock().await.base().state()
    }

    /// Fetches snapshots, regenerates `Data` and delivers it.
    ///
    /// A delivered cycle leaves the writer at `Delivered` until the next one
    /// starts. A failed step ends the cycle with the writer back at `Idle`.
    pub async fn run_cycle(
        &self,
        source: &dyn SnapshotSource,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, HostwatchError> {
        let mut writer = self.writer.lock().await;

        let raw = source.fetch(&self.reader_paths).await;
        let mut report = CycleReport::default();
        for missing in self.reader_paths.iter().filter(|p| !raw.contains_key(*p)) {
            debug!(writer = %self.path, reader = %missing, "no snapshot available yet");
            report.gaps.push(CollectionGap {
                path: missing.clone(),
                reason: "no snapshot available".to_string(),
            });
        }

        let collected = writer.base_mut().collect(&raw);
        report.collected = collected.collected;
        report.gaps.extend(collected.gaps);

        if let Err(e) = writer.base_mut().generate_data().await {
            warn!(writer = %self.path, error = %e, "failed to generate data, keeping previous");
            return Err(e);
        }

        let delivered = writer.run(cancel).await;
        writer.base_mut().set_state(match delivered {
            Ok(()) => PipelineState::Delivered,
            Err(_) => PipelineState::Idle,
        });
        delivered?;

        info!(writer = %self.path, plugin = writer.plugin_name(), collected = report.collected.len(), gaps = report.gaps.len(), "writer cycle delivered");
        Ok(report)
    }
}
