// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `MasterHost` writer: ships a flattened envelope of every reader snapshot
//! to the master service.

use std::collections::BTreeMap;

use async_trait::async_trait;
use hostwatch_core::{Configurable, FieldError, HostwatchError};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::base::{Writer, WriterBase, BASE_FIELDS};
use crate::flatten::{flatten, SEPARATOR};
use crate::sink::{HttpSink, SINK_FIELDS};

pub const PLUGIN_NAME: &str = "MasterHost";

/// Wire payload sent to the master.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Envelope {
    /// Flattened `Data` of every reader, keyed by reader path.
    #[serde(rename = "Data")]
    pub data: BTreeMap<String, Map<String, Value>>,
    #[serde(rename = "Host")]
    pub host: Map<String, Value>,
}

/// Builds the delivery envelope from a writer's `Data`.
///
/// `data` must map each reader path to an object carrying a `Data` object
/// and, optionally, a `Host` object. The host of the last path in sorted
/// order wins.
pub fn pre_process_delivery(data: &Value) -> Result<Envelope, HostwatchError> {
    let records = data.as_object().ok_or_else(|| {
        HostwatchError::delivery(format!(
            "expected an object keyed by reader path, found {}",
            json_kind(data)
        ))
    })?;

    let mut envelope = Envelope::default();
    let mut host_source: Option<&str> = None;

    // serde_json maps iterate in key order without `preserve_order`, but sort
    // explicitly so the last-path rule never depends on a feature flag.
    let mut paths: Vec<&String> = records.keys().collect();
    paths.sort();

    for path in paths {
        let record = &records[path.as_str()];
        let inner = record
            .get("Data")
            .and_then(Value::as_object)
            .ok_or_else(|| HostwatchError::delivery(format!("{path}: record has no Data object")))?;

        match record.get("Host") {
            Some(Value::Object(host)) => {
                if let Some(previous) = host_source {
                    if envelope.host != *host {
                        warn!(previous = %previous, path = %path, "reader paths report different hosts, keeping the last one");
                    }
                }
                envelope.host = host.clone();
                host_source = Some(path.as_str());
            }
            None | Some(Value::Null) => {}
            Some(other) => {
                return Err(HostwatchError::delivery(format!(
                    "{path}: Host must be an object, found {}",
                    json_kind(other)
                )));
            }
        }

        envelope.data.insert(path.clone(), flatten(inner, SEPARATOR));
    }

    Ok(envelope)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Writer delivering [`Envelope`]s to the master service.
#[derive(Debug, Default)]
pub struct MasterHostWriter {
    base: WriterBase,
    sink: HttpSink,
}

impl MasterHostWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> &HttpSink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut HttpSink {
        &mut self.sink
    }
}

const FIELDS: &[&str] = &[
    "JsonProcessor",
    "JsonProcessorTimeout",
    "Url",
    "Method",
    "Headers",
    "Username",
    "Password",
    "AccessToken",
    "MaxRetries",
    "Timeout",
    "RetryDelay",
];

impl Configurable for MasterHostWriter {
    fn field_names(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), FieldError> {
        if BASE_FIELDS.contains(&key) {
            self.base.apply_field(key, value)
        } else if SINK_FIELDS.contains(&key) {
            self.sink.apply_field(key, value)
        } else {
            Err(FieldError::Unknown)
        }
    }
}

#[async_trait]
impl Writer for MasterHostWriter {
    fn plugin_name(&self) -> &str {
        PLUGIN_NAME
    }

    fn base(&self) -> &WriterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WriterBase {
        &mut self.base
    }

    async fn run(&mut self, cancel: &CancellationToken) -> Result<(), HostwatchError> {
        let data = match self.base.data().load() {
            Some(data) if !data.is_null() => data,
            _ => return Err(HostwatchError::NoData),
        };

        let envelope = pre_process_delivery(&data)?;
        let body = serde_json::to_vec(&envelope).map_err(|e| HostwatchError::Delivery {
            message: format!("failed to serialize envelope: {e}"),
            source: Some(Box::new(e)),
        })?;

        debug!(paths = envelope.data.len(), bytes = body.len(), "delivering to master");
        self.sink.deliver(body, cancel).await
    }
}
