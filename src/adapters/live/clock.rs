//! Live clock using the system clock.

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::ports::clock::Clock;

/// Live clock that returns the real current time.
pub struct LiveClock;

impl LiveClock {
    /// The system's current UTC offset, used when no offset is configured.
    #[must_use]
    pub fn local_offset() -> FixedOffset {
        *Local::now().offset()
    }
}

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_current_time() {
        let clock = LiveClock;
        let before = Utc::now();
        let now = clock.now();
        let after = Utc::now();

        assert!(now >= before);
        assert!(now <= after);
    }

    #[test]
    fn local_offset_is_within_a_day() {
        let offset = LiveClock::local_offset();
        assert!(offset.local_minus_utc().abs() < 24 * 3600);
    }
}
