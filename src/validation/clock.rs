//! Time source for default producers
//!
//! Producers never read the system clock directly; they receive the
//! clock owned by the [`Validator`](super::Validator) running the call.
//! The clock abstraction is `mockable::Clock`; [`DefaultClock`] reads
//! the wall clock.

use chrono::{DateTime, Local, Utc};

pub use mockable::{Clock, DefaultClock};

/// Clock shared by concurrent validation calls
pub type SharedClock = dyn Clock + Send + Sync;

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.instant.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.utc(), instant);
        assert_eq!(clock.utc(), clock.utc());
        assert_eq!(clock.local().with_timezone(&Utc), instant);
    }

    #[test]
    fn test_default_clock_advances() {
        let clock = DefaultClock;
        let first = clock.utc();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.utc() > first);
    }
}
