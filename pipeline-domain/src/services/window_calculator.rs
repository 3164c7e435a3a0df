// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Window Calculator
//!
//! Pure implementation of C2: computes the next `[start, end)` processing
//! window for a target day, honoring granularity, the day boundary, and
//! continuation from a prior run. The continuation lookup itself (querying
//! the record store for `max(window_end_time)`) is the caller's
//! responsibility — kept out of this function so the algorithm stays a pure,
//! synchronously-testable computation independent of the store.

use crate::value_objects::Window;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

/// Inputs to the window calculation (spec.md §4.2).
pub struct WindowRequest {
    pub now: DateTime<Utc>,
    pub timezone: Tz,
    pub x_time_back: Duration,
    pub granularity: Duration,
    pub granularity_offset: Duration,
    /// `max(window_end_time)` among existing records for this identity and
    /// target day, if any (step 3, "Continuation").
    pub continuation: Option<DateTime<Utc>>,
}

/// Computes the next window, or `None` if there is nothing to do for today
/// (step 4, "Exit": `start >= day_end`).
pub fn compute_window(req: &WindowRequest) -> Option<Window> {
    let local_now = req.now.with_timezone(&req.timezone);
    let target_day = (local_now - req.x_time_back).date_naive();

    let day_end_naive = target_day.succ_opt()?.and_hms_opt(0, 0, 0)?;
    let day_end = local_datetime_to_instant(&req.timezone, day_end_naive)?;

    let start = match req.continuation {
        Some(continuation) => continuation.with_timezone(&req.timezone),
        None => {
            let day_start_naive = target_day.and_hms_opt(0, 0, 0)?;
            local_datetime_to_instant(&req.timezone, day_start_naive)? + req.granularity_offset
        }
    };

    if start >= day_end {
        return None;
    }

    let raw_end = start + req.granularity;
    let end = if raw_end > day_end { day_end } else { raw_end };

    Some(Window::new(
        target_day,
        start.fixed_offset(),
        end.fixed_offset(),
        req.granularity,
    ))
}

/// Resolves a naive local datetime to a concrete instant in `tz`, preferring
/// the earlier of the two candidates during a DST fall-back ambiguity and
/// skipping forward past a DST spring-forward gap — boundaries are always
/// computed in `TZ` before being converted, per spec.md §4.2 "Notes".
fn local_datetime_to_instant(tz: &Tz, naive: chrono::NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(earliest, _latest) => Some(earliest),
        chrono::LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).single(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    /// S1: no prior records, first window of the day.
    #[test]
    fn s1_first_window_of_day() {
        let req = WindowRequest {
            now: utc(2025, 1, 2, 1, 15, 0),
            timezone: chrono_tz::UTC,
            x_time_back: Duration::hours(2),
            granularity: Duration::minutes(30),
            granularity_offset: Duration::zero(),
            continuation: None,
        };
        let window = compute_window(&req).unwrap();
        assert_eq!(window.target_day, chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(window.start, utc(2025, 1, 1, 0, 0, 0).fixed_offset());
        assert_eq!(window.end, utc(2025, 1, 1, 0, 30, 0).fixed_offset());
        assert_eq!(window.achieved_granularity, Duration::minutes(30));
    }

    /// S2: continuation near the end of the day clamps the achieved window.
    #[test]
    fn s2_continuation_clamped_at_day_boundary() {
        let req = WindowRequest {
            now: utc(2025, 1, 2, 1, 15, 0),
            timezone: chrono_tz::UTC,
            x_time_back: Duration::hours(2),
            granularity: Duration::minutes(30),
            granularity_offset: Duration::zero(),
            continuation: Some(utc(2025, 1, 1, 23, 45, 0)),
        };
        let window = compute_window(&req).unwrap();
        assert_eq!(window.start, utc(2025, 1, 1, 23, 45, 0).fixed_offset());
        assert_eq!(window.end, utc(2025, 1, 2, 0, 0, 0).fixed_offset());
        assert_eq!(window.achieved_granularity, Duration::minutes(15));
        assert!(window.was_clamped());
    }

    /// Boundary: `start == day_end` emits no window.
    #[test]
    fn start_at_day_end_emits_nothing() {
        let req = WindowRequest {
            now: utc(2025, 1, 2, 1, 15, 0),
            timezone: chrono_tz::UTC,
            x_time_back: Duration::hours(2),
            granularity: Duration::minutes(30),
            granularity_offset: Duration::zero(),
            continuation: Some(utc(2025, 1, 2, 0, 0, 0)),
        };
        assert!(compute_window(&req).is_none());
    }

    /// Boundary: a granularity larger than the remaining day clamps to the
    /// day boundary even on the very first window.
    #[test]
    fn granularity_larger_than_remaining_day_is_clamped() {
        let req = WindowRequest {
            now: utc(2025, 1, 1, 23, 0, 0),
            timezone: chrono_tz::UTC,
            x_time_back: Duration::zero(),
            granularity: Duration::hours(6),
            granularity_offset: Duration::zero(),
            continuation: Some(utc(2025, 1, 1, 22, 0, 0)),
        };
        let window = compute_window(&req).unwrap();
        assert_eq!(window.end, utc(2025, 1, 2, 0, 0, 0).fixed_offset());
        assert_eq!(window.achieved_granularity, Duration::hours(2));
    }

    #[test]
    fn granularity_offset_shifts_first_window_start() {
        let req = WindowRequest {
            now: utc(2025, 1, 2, 1, 15, 0),
            timezone: chrono_tz::UTC,
            x_time_back: Duration::hours(2),
            granularity: Duration::minutes(30),
            granularity_offset: Duration::minutes(15),
            continuation: None,
        };
        let window = compute_window(&req).unwrap();
        assert_eq!(window.start, utc(2025, 1, 1, 0, 15, 0).fixed_offset());
    }
}
