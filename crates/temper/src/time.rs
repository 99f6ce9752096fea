//! Timestamps and the units durations are reported in.
//!
//! A [`TimeSource`] hands out raw ticks plus the rate they advance at;
//! [`TimeUnit::convert`] turns a tick count into the configured unit. The
//! harness reads one timestamp before and one after each test body and keeps
//! the difference as the test's duration.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Instant;

use thiserror::Error;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Unit that durations are measured and printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TimeUnit {
    /// Raw ticks of the time source.
    #[value(name = "clocks")]
    Clocks,
    /// Nanoseconds.
    #[value(name = "ns")]
    Nanoseconds,
    /// Microseconds.
    #[value(name = "us")]
    Microseconds,
    /// Milliseconds (the default when command-line args are processed).
    #[value(name = "ms")]
    Milliseconds,
    /// Seconds.
    #[value(name = "seconds")]
    Seconds,
}

impl TimeUnit {
    /// Every unit, in the order they appear in the usage text.
    pub const ALL: [Self; 5] = [
        Self::Clocks,
        Self::Nanoseconds,
        Self::Microseconds,
        Self::Milliseconds,
        Self::Seconds,
    ];

    /// Label printed after a duration, also accepted by `--time-unit=`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clocks => "clocks",
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "seconds",
        }
    }

    /// How many of this unit fit in one second, `None` for raw clocks.
    const fn units_per_second(self) -> Option<f64> {
        match self {
            Self::Clocks => None,
            Self::Nanoseconds => Some(1e9),
            Self::Microseconds => Some(1e6),
            Self::Milliseconds => Some(1e3),
            Self::Seconds => Some(1.0),
        }
    }

    /// Convert a raw tick count from a source running at `ticks_per_second`.
    ///
    /// `Clocks` returns the ticks unchanged. For a nanosecond source the
    /// other units divide by 1, 1e3, 1e6 and 1e9.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn convert(self, ticks: u64, ticks_per_second: u64) -> f64 {
        debug_assert!(ticks_per_second > 0, "time source reported a zero tick rate");
        let ticks = ticks as f64;
        match self.units_per_second() {
            None => ticks,
            Some(units) => ticks / (ticks_per_second as f64 / units),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a string names no [`TimeUnit`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown time unit `{0}` (expected one of: clocks, ns, us, ms, seconds)")]
pub struct ParseTimeUnitError(pub String);

impl FromStr for TimeUnit {
    type Err = ParseTimeUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.label() == s)
            .ok_or_else(|| ParseTimeUnitError(s.to_string()))
    }
}

/// A monotonic counter the harness reads timestamps from.
pub trait TimeSource {
    /// Current reading. Must never go backwards.
    fn ticks(&self) -> u64;

    /// Rate the counter advances at. Must be non-zero.
    fn ticks_per_second(&self) -> u64;
}

/// Nanosecond-resolution clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Start a clock whose zero is the moment of creation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn ticks(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn ticks_per_second(&self) -> u64 {
        NANOS_PER_SECOND
    }
}

/// Hand-driven clock for deterministic durations.
///
/// Clones share the same counter, so a test body can hold one clone and
/// advance it while the harness reads from another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Rc<Cell<u64>>,
    ticks_per_second: u64,
}

impl ManualClock {
    /// A clock at zero that counts nanoseconds.
    #[must_use]
    pub fn nanos() -> Self {
        Self::with_rate(NANOS_PER_SECOND)
    }

    /// A clock at zero advancing at `ticks_per_second`.
    ///
    /// # Panics
    ///
    /// Panics if `ticks_per_second` is zero.
    #[must_use]
    pub fn with_rate(ticks_per_second: u64) -> Self {
        assert!(ticks_per_second > 0, "tick rate must be non-zero");
        Self {
            ticks: Rc::new(Cell::new(0)),
            ticks_per_second,
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, ticks: u64) {
        self.ticks.set(self.ticks.get().saturating_add(ticks));
    }

    /// Current reading.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.ticks.get()
    }
}

impl TimeSource for ManualClock {
    fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    fn ticks_per_second(&self) -> u64 {
        self.ticks_per_second
    }
}
