// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `Http` writer: sends the writer's `Data` as-is to an arbitrary endpoint.

use async_trait::async_trait;
use hostwatch_core::{Configurable, FieldError, HostwatchError};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::base::{Writer, WriterBase, BASE_FIELDS};
use crate::sink::{HttpSink, SINK_FIELDS};

pub const PLUGIN_NAME: &str = "Http";

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

#[derive(Debug, Default)]
pub struct HttpWriter {
    base: WriterBase,
    sink: HttpSink,
}

impl HttpWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> &HttpSink {
        &self.sink
    }
}

impl Configurable for HttpWriter {
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
impl Writer for HttpWriter {
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
        match self.base.data().load() {
            Some(data) if !data.is_null() => {}
            _ => return Err(HostwatchError::NoData),
        }
        let body = self.base.to_json()?;
        self.sink.deliver(body, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_unflattened_data() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/ingest"))
            .and(body_json(json!({"/r/cpu": {"Data": {"load": {"1m": 0.5}}}})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut writer = HttpWriter::new();
        writer
            .apply_field("Url", &json!(format!("{}/ingest", server.uri())))
            .unwrap();
        writer.apply_field("Method", &json!("put")).unwrap();
        writer
            .base_mut()
            .set_data(json!({"/r/cpu": {"Data": {"load": {"1m": 0.5}}}}));

        writer.run(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn run_before_first_cycle_is_no_data() {
        let mut writer = HttpWriter::new();
        let err = writer.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, HostwatchError::NoData));
    }
}
