// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use hostwatch_core::traits::decode_field;
use hostwatch_core::{Configurable, Executor, FieldError, HostwatchError, ReadersData};
use serde_json::Value;
use tracing::info;

pub const PLUGIN_NAME: &str = "Log";

/// Executor that only records what it was given.
#[derive(Debug)]
pub struct LogExecutor {
    message: String,
    runs: u64,
}

impl Default for LogExecutor {
    fn default() -> Self {
        Self {
            message: "executor evaluated".to_string(),
            runs: 0,
        }
    }
}

impl LogExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }
}

impl Configurable for LogExecutor {
    fn field_names(&self) -> &'static [&'static str] {
        &["Message"]
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), FieldError> {
        match key {
            "Message" => {
                self.message = decode_field(value, "a string")?;
                Ok(())
            }
            _ => Err(FieldError::Unknown),
        }
    }
}

#[async_trait]
impl Executor for LogExecutor {
    fn plugin_name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn run(&mut self, readers_data: &ReadersData) -> Result<(), HostwatchError> {
        self.runs += 1;
        let paths: Vec<&str> = readers_data.keys().map(String::as_str).collect();
        info!(paths = ?paths, runs = self.runs, "{}", self.message);
        Ok(())
    }
}
