//! Clock sources for the volatile date/time functions (`TODAY`, `NOW`).
use chrono::{NaiveDate, NaiveDateTime};

/// Source of "current" time for an evaluation.
pub trait ClockProvider: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Timezone specification for the system clock.
/// Excel behavior: always uses local timezone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeZoneSpec {
    /// Use the system's local timezone (Excel default behavior)
    #[default]
    Local,
    Utc,
}

/// Wall-clock time. Requires the `system-clock` feature.
#[cfg(feature = "system-clock")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock {
    pub tz: TimeZoneSpec,
}

#[cfg(feature = "system-clock")]
impl ClockProvider for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.tz {
            TimeZoneSpec::Local => chrono::Local::now().naive_local(),
            TimeZoneSpec::Utc => chrono::Utc::now().naive_utc(),
        }
    }
}

/// A clock frozen at one instant; deterministic tests and hosts without a
/// wall clock use this.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDateTime);

impl ClockProvider for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
