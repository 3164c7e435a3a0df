// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Processing Window
//!
//! The half-open `[start, end)` time interval a pipeline record processes,
//! together with the calendar day it belongs to and the granularity that was
//! actually achieved after day-boundary clamping (C2 in the design).

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A `[window_start_time, window_end_time)` interval within `target_day`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub target_day: NaiveDate,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub requested_granularity: Duration,
    pub achieved_granularity: Duration,
}

impl Window {
    pub fn new(
        target_day: NaiveDate,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        requested_granularity: Duration,
    ) -> Self {
        let achieved_granularity = end - start;
        Self {
            target_day,
            start,
            end,
            requested_granularity,
            achieved_granularity,
        }
    }

    /// Invariant 2 in spec.md §3: `window_start_time < window_end_time <=
    /// start_of(target_day + 1 day)`.
    pub fn is_valid(&self, day_end: DateTime<FixedOffset>) -> bool {
        self.start < self.end && self.end <= day_end
    }

    /// Whether this window was clamped to the day boundary rather than
    /// reaching its full requested granularity.
    pub fn was_clamped(&self) -> bool {
        self.achieved_granularity < self.requested_granularity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn achieved_granularity_tracks_actual_span() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let start = tz.with_ymd_and_hms(2025, 1, 1, 23, 45, 0).unwrap();
        let end = tz.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let w = Window::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            start,
            end,
            Duration::minutes(30),
        );
        assert_eq!(w.achieved_granularity, Duration::minutes(15));
        assert!(w.was_clamped());
    }

    #[test]
    fn unclamped_window_reports_full_granularity() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let start = tz.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = tz.with_ymd_and_hms(2025, 1, 1, 0, 30, 0).unwrap();
        let w = Window::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            start,
            end,
            Duration::minutes(30),
        );
        assert!(!w.was_clamped());
    }
}
