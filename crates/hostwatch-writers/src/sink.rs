// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP delivery shared by the `Http` and `MasterHost` writers.
//!
//! One request per attempt, retried with backoff on transport failures and
//! transient status codes. Response bodies are always drained.

use std::collections::BTreeMap;
use std::time::Duration;

use hostwatch_config::parse_interval;
use hostwatch_core::traits::decode_field;
use hostwatch_core::{FieldError, HostwatchError};
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::retry::{retry, AttemptError, RetryPolicy};

/// Fields accepted by [`HttpSink::apply_field`].
pub const SINK_FIELDS: &[&str] = &[
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

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Destination and retry settings for one writer instance.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sent as the basic-auth user name when no `Username` is set.
    pub access_token: Option<String>,
    /// Total attempts per delivery.
    pub max_retries: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// First backoff step.
    pub retry_delay: Duration,
}

impl Default for HttpSink {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSink {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: String::new(),
            method: "POST".to_string(),
            headers: BTreeMap::new(),
            username: None,
            password: None,
            access_token: None,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay: self.retry_delay,
            ..RetryPolicy::with_max_attempts(self.max_retries)
        }
    }

    /// Sends `body` with retries. Returns the final error if every attempt fails.
    pub async fn deliver(&self, body: Vec<u8>, cancel: &CancellationToken) -> Result<(), HostwatchError> {
        if self.url.trim().is_empty() {
            return Err(HostwatchError::delivery("no Url configured"));
        }
        let method: reqwest::Method =
            self.method
                .to_uppercase()
                .parse()
                .map_err(|e| HostwatchError::Delivery {
                    message: format!("invalid HTTP method '{}'", self.method),
                    source: Some(Box::new(e)),
                })?;

        let result = retry(&self.retry_policy(), cancel, |attempt| {
            let request = self.build_request(method.clone(), body.clone());
            let url = self.url.clone();
            async move {
                let response = request.send().await.map_err(|e| {
                    AttemptError::Retryable(HostwatchError::Delivery {
                        message: format!("request to {url} failed: {e}"),
                        source: Some(Box::new(e)),
                    })
                })?;

                let status = response.status();
                // Drain the body so the connection can be reused.
                let _ = response.bytes().await;
                debug!(status = %status, attempt, url = %url, "sink responded");

                if status.is_success() {
                    Ok(())
                } else if is_retryable_status(status) {
                    Err(AttemptError::Retryable(HostwatchError::delivery(format!(
                        "{url} returned {status}"
                    ))))
                } else {
                    Err(AttemptError::Fatal(HostwatchError::delivery(format!(
                        "{url} returned {status}"
                    ))))
                }
            }
        })
        .await;

        if let Err(e) = &result {
            error!(error = %e, url = %self.url, method = %method, "failed to send HTTP request");
        }
        result
    }

    fn build_request(&self, method: reqwest::Method, body: Vec<u8>) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, &self.url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if let Some(user) = &self.username {
            request = request.basic_auth(user, self.password.as_ref());
        } else if let Some(token) = &self.access_token {
            request = request.basic_auth(token, None::<&str>);
        }

        request
    }

    /// Applies one of [`SINK_FIELDS`].
    pub fn apply_field(&mut self, key: &str, value: &serde_json::Value) -> Result<(), FieldError> {
        match key {
            "Url" => self.url = decode_field(value, "a URL string")?,
            "Method" => self.method = decode_field(value, "an HTTP method string")?,
            "Headers" => self.headers = decode_field(value, "a table of string headers")?,
            "Username" => self.username = Some(decode_field(value, "a string")?),
            "Password" => self.password = Some(decode_field(value, "a string")?),
            "AccessToken" => self.access_token = Some(decode_field(value, "a string")?),
            "MaxRetries" => self.max_retries = decode_field(value, "a non-negative integer")?,
            "Timeout" => self.timeout = decode_duration(value)?,
            "RetryDelay" => self.retry_delay = decode_duration(value)?,
            _ => return Err(FieldError::Unknown),
        }
        Ok(())
    }
}

fn decode_duration(value: &serde_json::Value) -> Result<Duration, FieldError> {
    let raw: String = decode_field(value, "a duration string")?;
    parse_interval(&raw).map_err(|e| FieldError::Incompatible {
        expected: "a duration string",
        detail: e.to_string(),
    })
}

/// Status codes worth another attempt.
fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error()
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
}
