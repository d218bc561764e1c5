// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nested-to-flat map conversion with dotted keys.

use serde_json::{Map, Value};

/// Separator joining nested keys.
pub const SEPARATOR: &str = ".";

/// Flattens nested objects into a single level: `{a:{b:1}}` becomes `{"a.b":1}`.
///
/// Arrays and scalars are leaves. Empty nested objects contribute no keys.
/// The result is only reversible when source keys do not contain the
/// separator themselves.
pub fn flatten(map: &Map<String, Value>, separator: &str) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(&mut out, None, map, separator);
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, map: &Map<String, Value>, separator: &str) {
    for (key, value) in map {
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}{separator}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(out, Some(&full_key), nested, separator),
            leaf => {
                out.insert(full_key, leaf.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn flattens_nested_objects() {
        let flat = flatten(&obj(json!({"a": {"b": 1, "c": {"d": 2}}})), SEPARATOR);
        assert_eq!(Value::Object(flat), json!({"a.b": 1, "a.c.d": 2}));
    }

    #[test]
    fn flat_input_is_unchanged() {
        let input = obj(json!({"free": 100, "used": 20}));
        assert_eq!(flatten(&input, SEPARATOR), input);
    }

    #[test]
    fn arrays_and_nulls_are_leaves() {
        let flat = flatten(&obj(json!({"disk": {"mounts": ["/", "/var"], "err": null}})), SEPARATOR);
        assert_eq!(
            Value::Object(flat),
            json!({"disk.mounts": ["/", "/var"], "disk.err": null})
        );
    }

    #[test]
    fn empty_nested_object_disappears() {
        let flat = flatten(&obj(json!({"a": {}, "b": 1})), SEPARATOR);
        assert_eq!(Value::Object(flat), json!({"b": 1}));
    }

    #[test]
    fn custom_separator() {
        let flat = flatten(&obj(json!({"a": {"b": true}})), "_");
        assert_eq!(Value::Object(flat), json!({"a_b": true}));
    }
}
