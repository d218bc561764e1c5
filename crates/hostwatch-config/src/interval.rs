// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of interval strings such as `"30s"`, `"1m"` or `"1h30m"`.

use std::time::Duration;

use hostwatch_core::HostwatchError;

/// Parses a duration written as one or more `<number><unit>` groups.
///
/// Units: `ms`, `s`, `m`, `h`, `d`. A bare `"0"` is accepted.
pub fn parse_interval(input: &str) -> Result<Duration, HostwatchError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(HostwatchError::Config("interval must not be empty".to_string()));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let invalid = || HostwatchError::Config(format!("invalid interval `{input}`"));

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let step = match &rest[..unit_len] {
            "ms" => Some(Duration::from_millis(value)),
            "s" => Some(Duration::from_secs(value)),
            "m" => value.checked_mul(60).map(Duration::from_secs),
            "h" => value.checked_mul(3600).map(Duration::from_secs),
            "d" => value.checked_mul(86_400).map(Duration::from_secs),
            _ => return Err(invalid()),
        }
        .ok_or_else(invalid)?;
        total = total.checked_add(step).ok_or_else(invalid)?;
        rest = &rest[unit_len..];
    }

    Ok(total)
}
