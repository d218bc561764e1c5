// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `Stdout` writer: logs the current `Data` instead of shipping it.

use async_trait::async_trait;
use hostwatch_core::{Configurable, FieldError, HostwatchError};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::base::{Writer, WriterBase, BASE_FIELDS};

pub const PLUGIN_NAME: &str = "Stdout";

#[derive(Debug, Default)]
pub struct StdoutWriter {
    base: WriterBase,
    pretty: bool,
}

impl StdoutWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn render(&self) -> Result<String, HostwatchError> {
        let data = self.base.data().load().ok_or(HostwatchError::NoData)?;
        let rendered = if self.pretty {
            serde_json::to_string_pretty(data.as_ref())
        } else {
            serde_json::to_string(data.as_ref())
        };
        rendered.map_err(|e| HostwatchError::Internal(format!("failed to render data: {e}")))
    }
}

impl Configurable for StdoutWriter {
    fn field_names(&self) -> &'static [&'static str] {
        &["JsonProcessor", "JsonProcessorTimeout", "Pretty"]
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), FieldError> {
        if BASE_FIELDS.contains(&key) {
            return self.base.apply_field(key, value);
        }
        match key {
            "Pretty" => {
                self.pretty = hostwatch_core::traits::decode_field(value, "a boolean")?;
                Ok(())
            }
            _ => Err(FieldError::Unknown),
        }
    }
}

#[async_trait]
impl Writer for StdoutWriter {
    fn plugin_name(&self) -> &str {
        PLUGIN_NAME
    }

    fn base(&self) -> &WriterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WriterBase {
        &mut self.base
    }

    async fn run(&mut self, _cancel: &CancellationToken) -> Result<(), HostwatchError> {
        let rendered = self.render()?;
        info!(data = %rendered, "writer data");
        Ok(())
    }
}
