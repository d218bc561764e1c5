// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared writer pipeline: collect reader snapshots, optionally post-process
//! them through an external program, and publish the result.
//!
//! Every concrete writer embeds a [`WriterBase`] and only implements its own
//! delivery step ([`Writer::run`]).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use hostwatch_config::{expand_tilde_and_env, parse_interval};
use hostwatch_core::traits::decode_field;
use hostwatch_core::{Configurable, FieldError, HostwatchError, ReadersData};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::processor;

/// Default upper bound for one post-processor run (`JsonProcessorTimeout`).
///
/// On timeout only the top-level shell is killed, so a pipeline command's
/// children can outlive it.
pub const DEFAULT_PROCESSOR_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields every writer accepts through [`WriterBase::apply_field`].
pub const BASE_FIELDS: &[&str] = &["JsonProcessor", "JsonProcessorTimeout"];

/// A plugin that aggregates reader snapshots and forwards them to a sink.
#[async_trait]
pub trait Writer: Configurable + Send + Sync + 'static {
    /// Registry name of the plugin that produced this instance.
    fn plugin_name(&self) -> &str;

    fn base(&self) -> &WriterBase;

    fn base_mut(&mut self) -> &mut WriterBase;

    /// Delivers the current `Data` to this writer's destination.
    async fn run(&mut self, cancel: &CancellationToken) -> Result<(), HostwatchError>;
}

/// Where one writer is within its current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Collecting,
    PostProcessing,
    Ready,
    Delivered,
}

/// A reader path whose snapshot did not make it into this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionGap {
    pub path: String,
    pub reason: String,
}

/// Outcome of [`WriterBase::collect`].
#[derive(Debug, Clone, Default)]
pub struct CollectReport {
    pub collected: Vec<String>,
    pub gaps: Vec<CollectionGap>,
}

/// Lock-free, shareable view of a writer's latest `Data`.
///
/// Values are replaced whole, so a reader never sees a half-built payload.
#[derive(Debug, Clone, Default)]
pub struct DataHandle(Arc<ArcSwapOption<serde_json::Value>>);

impl DataHandle {
    pub fn load(&self) -> Option<Arc<serde_json::Value>> {
        self.0.load_full()
    }

    pub(crate) fn store(&self, value: serde_json::Value) {
        self.0.store(Some(Arc::new(value)));
    }

    /// Serializes the latest value, or `null` if nothing was produced yet.
    pub fn to_json(&self) -> Result<Vec<u8>, HostwatchError> {
        let bytes = match self.load() {
            Some(value) => serde_json::to_vec(value.as_ref()),
            None => serde_json::to_vec(&serde_json::Value::Null),
        };
        bytes.map_err(|e| HostwatchError::Internal(format!("failed to serialize data: {e}")))
    }
}

/// State and behavior shared by every writer.
#[derive(Debug)]
pub struct WriterBase {
    readers_data: ReadersData,
    data: DataHandle,
    json_processor: Option<String>,
    processor_timeout: Duration,
    state: PipelineState,
}

impl Default for WriterBase {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterBase {
    pub fn new() -> Self {
        Self {
            readers_data: ReadersData::new(),
            data: DataHandle::default(),
            json_processor: None,
            processor_timeout: DEFAULT_PROCESSOR_TIMEOUT,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: PipelineState) {
        self.state = state;
    }

    pub fn readers_data(&self) -> &ReadersData {
        &self.readers_data
    }

    pub fn set_readers_data(&mut self, readers_data: ReadersData) {
        self.readers_data = readers_data;
    }

    /// Shareable handle onto this writer's published `Data`.
    pub fn data(&self) -> DataHandle {
        self.data.clone()
    }

    pub fn set_data(&mut self, value: serde_json::Value) {
        self.data.store(value);
    }

    /// Post-processor command line with `~` and `$VAR` expanded.
    pub fn json_processor(&self) -> Option<String> {
        self.json_processor
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(expand_tilde_and_env)
    }

    pub fn set_json_processor(&mut self, command: impl Into<String>) {
        self.json_processor = Some(command.into());
    }

    pub fn processor_timeout(&self) -> Duration {
        self.processor_timeout
    }

    /// Rebuilds `ReadersData` from raw snapshots.
    ///
    /// Snapshots that are not valid JSON are dropped for this cycle only.
    pub fn collect(&mut self, raw_by_path: &BTreeMap<String, Vec<u8>>) -> CollectReport {
        self.state = PipelineState::Collecting;
        let mut report = CollectReport::default();
        let mut readers_data = ReadersData::new();

        for (path, bytes) in raw_by_path {
            match serde_json::from_slice::<serde_json::Value>(bytes) {
                Ok(value) => {
                    readers_data.insert(path.clone(), value);
                    report.collected.push(path.clone());
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "dropping unparseable reader snapshot");
                    report.gaps.push(CollectionGap {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.readers_data = readers_data;
        report
    }

    /// Derives `Data` from `ReadersData`, through the post-processor if set.
    ///
    /// On failure the previously published `Data` stays in place.
    pub async fn generate_data(&mut self) -> Result<(), HostwatchError> {
        let data = match self.json_processor() {
            None => serde_json::to_value(&self.readers_data).map_err(|e| HostwatchError::Pipeline {
                message: format!("failed to convert readers data: {e}"),
                source: Some(Box::new(e)),
            }),
            Some(command) => {
                self.state = PipelineState::PostProcessing;
                debug!(command = %command, "running json processor");
                processor::run_json_processor(&command, &self.readers_data, self.processor_timeout)
                    .await
            }
        };

        match data {
            Ok(data) => {
                self.data.store(data);
                self.state = PipelineState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = PipelineState::Idle;
                Err(e)
            }
        }
    }

    /// Serializes the current `Data`; `null` before the first success.
    pub fn to_json(&self) -> Result<Vec<u8>, HostwatchError> {
        self.data.to_json()
    }

    /// Applies one of [`BASE_FIELDS`].
    pub fn apply_field(&mut self, key: &str, value: &serde_json::Value) -> Result<(), FieldError> {
        match key {
            "JsonProcessor" => {
                self.json_processor = Some(decode_field(value, "a command string")?);
            }
            "JsonProcessorTimeout" => {
                let raw: String = decode_field(value, "a duration string")?;
                self.processor_timeout =
                    parse_interval(&raw).map_err(|e| FieldError::Incompatible {
                        expected: "a duration string",
                        detail: e.to_string(),
                    })?;
            }
            _ => return Err(FieldError::Unknown),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(entries: &[(&str, &str)]) -> BTreeMap<String, Vec<u8>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect()
    }

    #[test]
    fn collect_drops_only_broken_snapshots() {
        let mut base = WriterBase::new();
        let report = base.collect(&raw(&[
            ("/r/cpu", r#"{"Data":{"load":0.5}}"#),
            ("/r/mem", "{not json"),
        ]));

        assert_eq!(report.collected, vec!["/r/cpu"]);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].path, "/r/mem");
        assert_eq!(base.readers_data().len(), 1);
        assert_eq!(base.state(), PipelineState::Collecting);
    }

    #[test]
    fn collect_rebuilds_from_scratch() {
        let mut base = WriterBase::new();
        base.collect(&raw(&[("/r/cpu", "1")]));
        base.collect(&raw(&[("/r/mem", "2")]));
        assert!(!base.readers_data().contains_key("/r/cpu"));
        assert_eq!(base.readers_data()["/r/mem"], json!(2));
    }

    #[test]
    fn to_json_before_any_cycle_is_null() {
        let base = WriterBase::new();
        assert_eq!(base.to_json().unwrap(), b"null");
    }

    #[tokio::test]
    async fn generate_data_without_processor_is_identity() {
        let mut base = WriterBase::new();
        base.collect(&raw(&[(
            "/r/cpu",
            r#"{"Host":{"Name":"h1"},"Data":{"load":0.5}}"#,
        )]));
        base.generate_data().await.unwrap();

        let data = base.data().load().unwrap();
        assert_eq!(
            *data,
            json!({"/r/cpu": {"Host": {"Name": "h1"}, "Data": {"load": 0.5}}})
        );
        assert_eq!(base.state(), PipelineState::Ready);
    }

    #[tokio::test]
    async fn processor_transforms_data_but_not_input() {
        let mut base = WriterBase::new();
        base.set_json_processor("sed 's/h1/h2/'");
        base.collect(&raw(&[("/r/cpu", r#"{"Host":{"Name":"h1"}}"#)]));
        base.generate_data().await.unwrap();

        assert_eq!(base.data().load().unwrap()["/r/cpu"]["Host"]["Name"], "h2");
        assert_eq!(base.readers_data()["/r/cpu"]["Host"]["Name"], "h1");
    }

    #[tokio::test]
    async fn failed_processor_keeps_previous_data() {
        let mut base = WriterBase::new();
        base.collect(&raw(&[("/r/cpu", "1")]));
        base.generate_data().await.unwrap();

        base.set_json_processor("exit 2");
        base.collect(&raw(&[("/r/cpu", "2")]));
        assert!(base.generate_data().await.is_err());

        assert_eq!(*base.data().load().unwrap(), json!({"/r/cpu": 1}));
        assert_eq!(base.state(), PipelineState::Idle);
    }

    #[test]
    fn apply_field_accepts_base_settings() {
        let mut base = WriterBase::new();
        base.apply_field("JsonProcessor", &json!("cat")).unwrap();
        base.apply_field("JsonProcessorTimeout", &json!("5s")).unwrap();
        assert_eq!(base.json_processor().as_deref(), Some("cat"));
        assert_eq!(base.processor_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn apply_field_rejects_bad_values_without_change() {
        let mut base = WriterBase::new();
        assert!(matches!(
            base.apply_field("JsonProcessorTimeout", &json!("soon")),
            Err(FieldError::Incompatible { .. })
        ));
        assert_eq!(base.processor_timeout(), DEFAULT_PROCESSOR_TIMEOUT);
        assert_eq!(
            base.apply_field("Url", &json!("http://x")),
            Err(FieldError::Unknown)
        );
    }

    #[test]
    fn blank_processor_counts_as_unset() {
        let mut base = WriterBase::new();
        base.set_json_processor("   ");
        assert!(base.json_processor().is_none());
    }
}
