use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use pipeline_domain::Clock;

/// A clock pinned to a fixed UTC instant, for deterministic scenario tests.
#[derive(Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        let instant = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .unwrap()
            .fixed_offset();
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}
