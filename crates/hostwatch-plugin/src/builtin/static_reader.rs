// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use hostwatch_core::traits::decode_field;
use hostwatch_core::{Configurable, FieldError, HostwatchError, Reader};
use serde_json::{Map, Value};

pub const PLUGIN_NAME: &str = "Static";

/// Reader that reports a fixed set of values, for smoke tests and for
/// attaching inventory facts to a host.
#[derive(Debug, Default)]
pub struct StaticReader {
    values: Map<String, Value>,
    sample: Option<Map<String, Value>>,
}

impl StaticReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Configurable for StaticReader {
    fn field_names(&self) -> &'static [&'static str] {
        &["Values"]
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), FieldError> {
        match key {
            "Values" => {
                self.values = decode_field(value, "a table of values")?;
                Ok(())
            }
            _ => Err(FieldError::Unknown),
        }
    }
}

#[async_trait]
impl Reader for StaticReader {
    fn plugin_name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn run(&mut self) -> Result<(), HostwatchError> {
        self.sample = Some(self.values.clone());
        Ok(())
    }

    fn to_json(&self) -> Result<Vec<u8>, HostwatchError> {
        let sample = self.sample.as_ref().ok_or(HostwatchError::NoData)?;
        serde_json::to_vec(sample)
            .map_err(|e| HostwatchError::Internal(format!("failed to serialize sample: {e}")))
    }
}
