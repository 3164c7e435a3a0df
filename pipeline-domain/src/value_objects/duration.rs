// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Compound Duration Parsing
//!
//! Parses compound duration strings such as `"1d2h30m"` into a
//! [`chrono::Duration`]. Accepts any order of `d`/`h`/`m`/`s` tokens,
//! tolerates interior whitespace, and rejects empty input or unknown units.

use crate::error::PipelineError;
use chrono::Duration;

/// Parses a compound duration string (e.g. `"1d2h30m"`, `"90s"`, `"2 h 15m"`)
/// into a [`chrono::Duration`].
///
/// Each token is `<non-negative integer><unit>` where unit is one of
/// `d` (days), `h` (hours), `m` (minutes), `s` (seconds). Tokens may appear in
/// any order; whitespace between and within tokens is ignored.
pub fn parse_duration(input: &str) -> Result<Duration, PipelineError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(PipelineError::parse_error("duration string is empty"));
    }

    let mut total = Duration::zero();
    let mut digits = String::new();
    let mut saw_token = false;

    for c in compact.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        if digits.is_empty() {
            return Err(PipelineError::parse_error(format!(
                "duration unit '{c}' with no preceding number in '{input}'"
            )));
        }

        let amount: i64 = digits
            .parse()
            .map_err(|_| PipelineError::parse_error(format!("invalid number '{digits}' in '{input}'")))?;
        digits.clear();

        let piece = match c {
            'd' => Duration::days(amount),
            'h' => Duration::hours(amount),
            'm' => Duration::minutes(amount),
            's' => Duration::seconds(amount),
            other => {
                return Err(PipelineError::parse_error(format!(
                    "unknown duration unit '{other}' in '{input}'"
                )))
            }
        };
        total += piece;
        saw_token = true;
    }

    if !digits.is_empty() {
        return Err(PipelineError::parse_error(format!(
            "trailing number '{digits}' with no unit in '{input}'"
        )));
    }
    if !saw_token {
        return Err(PipelineError::parse_error(format!("no duration tokens found in '{input}'")));
    }

    Ok(total)
}
