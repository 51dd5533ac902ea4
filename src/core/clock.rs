//! Wall-clock access for session timestamps and identities.
//!
//! Session ids (`session-{millis}`) and player ids
//! (`player-{n}-{millis}`) are derived from the creation instant, so tests
//! inject a `ManualClock` to get stable ids.

use std::cell::Cell;

use time::OffsetDateTime;

/// Source of the current UTC time.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Reads the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<OffsetDateTime>,
}

impl ManualClock {
    /// Start at the given instant.
    #[must_use]
    pub fn new(start: OffsetDateTime) -> Self {
        Self { now: Cell::new(start) }
    }

    /// Start at a unix timestamp in milliseconds.
    #[must_use]
    pub fn at_millis(millis: i64) -> Self {
        Self::new(from_millis(millis))
    }

    /// Move the clock forward.
    pub fn advance(&self, by: time::Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump to a specific instant.
    pub fn set(&self, to: OffsetDateTime) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}

/// Unix timestamp of `at` in whole milliseconds, saturating at the `i64`
/// bounds.
#[must_use]
pub fn unix_millis(at: OffsetDateTime) -> i64 {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
}

fn from_millis(millis: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(datetime!(2024-01-01 00:00 UTC));
        let before = clock.now();

        clock.advance(time::Duration::seconds(5));

        assert_eq!(clock.now() - before, time::Duration::seconds(5));
    }

    #[test]
    fn test_millis_round_trip() {
        let clock = ManualClock::at_millis(1_700_000_000_123);
        assert_eq!(unix_millis(clock.now()), 1_700_000_000_123);
    }

    #[test]
    fn test_millis_at_range_edges() {
        assert_eq!(unix_millis(datetime!(1969-12-31 23:59:59.999 UTC)), -1);
        assert_eq!(unix_millis(datetime!(9999-12-31 23:59:59.999 UTC)), 253_402_300_799_999);
    }

    #[test]
    fn test_shared_manual_clock() {
        let clock = std::rc::Rc::new(ManualClock::at_millis(1_000));
        let handle = std::rc::Rc::clone(&clock);

        clock.advance(time::Duration::milliseconds(250));

        assert_eq!(unix_millis(handle.now()), 1_250);
    }

    #[test]
    fn test_system_clock_is_recent() {
        let now = SystemClock.now();
        assert!(now.year() >= 2024);
    }
}
