use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of timestamps and record ids. Injected so tests are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Millisecond record id. Ids from one clock never repeat.
    fn next_id(&self) -> i64;
}

pub struct SystemClock {
    last_id: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last_id: AtomicI64::new(0),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn next_id(&self) -> i64 {
        let candidate = Utc::now().timestamp_millis();
        let mut previous = self.last_id.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(previous + 1);
            match self.last_id.compare_exchange_weak(
                previous,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => previous = actual,
            }
        }
    }
}

/// Clock pinned to one instant; ids count up from its millisecond value.
pub struct FixedClock {
    instant: DateTime<Utc>,
    counter: AtomicI64,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            counter: AtomicI64::new(instant.timestamp_millis()),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn next_id(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

pub fn iso_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// RFC 3339 instant made safe for file names (`:` and `.` become `-`).
pub fn file_timestamp(instant: &DateTime<Utc>) -> String {
    iso_timestamp(instant).replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_timestamp_has_no_separators() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(iso_timestamp(&instant), "2026-03-04T05:06:07.000Z");
        assert_eq!(file_timestamp(&instant), "2026-03-04T05-06-07-000Z");
    }

    #[test]
    fn system_clock_ids_are_strictly_increasing() {
        let clock = SystemClock::new();
        let mut last = clock.next_id();
        for _ in 0..1000 {
            let next = clock.next_id();
            assert!(next > last);
            last = next;
        }
    }
}
