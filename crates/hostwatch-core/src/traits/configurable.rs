// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed per-plugin settings applied from a generic key/value map.
//!
//! Every plugin declares the keys it understands and decodes each value into
//! a concrete Rust type. The binder reports keys a plugin rejects instead of
//! failing, so configuration documents written for older or newer plugin
//! versions still load.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a single plugin field could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The plugin has no setting with this name.
    #[error("unknown field")]
    Unknown,

    /// The setting exists but the value has the wrong shape.
    #[error("expected {expected}: {detail}")]
    Incompatible {
        expected: &'static str,
        detail: String,
    },
}

/// A plugin instance whose settings can be bound from configuration.
pub trait Configurable {
    /// Field names this plugin understands, for diagnostics.
    fn field_names(&self) -> &'static [&'static str];

    /// Applies one configuration entry onto this instance.
    ///
    /// Must leave the instance untouched when returning an error.
    fn apply_field(&mut self, key: &str, value: &serde_json::Value) -> Result<(), FieldError>;
}

/// Decodes a JSON value into a typed setting, mapping failures to
/// [`FieldError::Incompatible`].
pub fn decode_field<T: DeserializeOwned>(
    value: &serde_json::Value,
    expected: &'static str,
) -> Result<T, FieldError> {
    serde_json::from_value(value.clone()).map_err(|e| FieldError::Incompatible {
        expected,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_field_accepts_matching_type() {
        let retries: u32 = decode_field(&json!(5), "an integer").unwrap();
        assert_eq!(retries, 5);
    }

    #[test]
    fn decode_field_rejects_mismatched_type() {
        let err = decode_field::<u32>(&json!("five"), "an integer").unwrap_err();
        match err {
            FieldError::Incompatible { expected, .. } => assert_eq!(expected, "an integer"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_field_rejects_negative_for_unsigned() {
        assert!(decode_field::<u32>(&json!(-1), "a positive integer").is_err());
    }
}
