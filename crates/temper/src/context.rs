//! Harness - the execution context for a test run
//!
//! Owns the outcome counters, behavior flags, name filters, lifecycle
//! callbacks, the last failure and last duration, and the configured time
//! unit. A driver creates one `Harness`, configures it (directly or from
//! command-line args), passes it by `&mut` to every test and suite
//! invocation, and finally prints the summary.

use std::ffi::OsStr;
use std::fmt;
use std::process::ExitCode;

use bitflags::bitflags;
use termcolor::{ColorChoice, StandardStream, WriteColor};
use tracing::debug;

use crate::error::Error;
use crate::outcome::Failure;
use crate::report::Reporter;
use crate::time::{MonotonicClock, TimeSource, TimeUnit};

bitflags! {
    /// Behavior switches read by the invocation protocol and the reporter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Flags: u32 {
        /// Turn every invocation after the first failure into a no-op.
        const ABORT_ON_FAIL = 1 << 1;
        /// Paint outcome tags in color.
        const COLORED_OUTPUT = 1 << 2;
    }
}

/// Outcome counts since the last [`Harness::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Number of passed tests
    pub passed: u32,
    /// Number of failed tests
    pub failed: u32,
    /// Number of skipped tests
    pub skipped: u32,
}

impl Counters {
    /// Every test that reported an outcome.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.passed + self.failed + self.skipped
    }
}

/// Exact-match name filters. At most one of each kind is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Only this test runs, when set.
    pub test: Option<String>,
    /// Only this suite runs, when set.
    pub suite: Option<String>,
}

impl Filters {
    /// Whether a test called `name` passes the test filter.
    #[must_use]
    pub fn allows_test(&self, name: &str) -> bool {
        self.test.as_deref().is_none_or(|filter| filter == name)
    }

    /// Whether a suite called `name` passes the suite filter.
    #[must_use]
    pub fn allows_suite(&self, name: &str) -> bool {
        self.suite.as_deref().is_none_or(|filter| filter == name)
    }
}

type Callback = Box<dyn FnMut()>;

/// The four lifecycle hooks. Whatever a hook needs is captured by the
/// closure itself.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) suite_start: Option<Callback>,
    pub(crate) suite_end: Option<Callback>,
    pub(crate) test_start: Option<Callback>,
    pub(crate) test_end: Option<Callback>,
}

impl Callbacks {
    pub(crate) fn fire(slot: &mut Option<Callback>) {
        if let Some(callback) = slot.as_mut() {
            callback();
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("suite_start", &self.suite_start.is_some())
            .field("suite_end", &self.suite_end.is_some())
            .field("test_start", &self.test_start.is_some())
            .field("test_end", &self.test_end.is_some())
            .finish()
    }
}

/// State of one test run.
///
/// The output sink and the time source are backends: they survive
/// [`init`](Self::init), everything else is reset by it.
pub struct Harness<W = StandardStream> {
    pub(crate) counters: Counters,
    pub(crate) flags: Flags,
    pub(crate) time_unit: Option<TimeUnit>,
    pub(crate) filters: Filters,
    pub(crate) callbacks: Callbacks,
    pub(crate) last_failure: Option<Failure>,
    pub(crate) last_duration: f64,
    pub(crate) clock: Box<dyn TimeSource>,
    pub(crate) reporter: Reporter<W>,
}

impl Default for Harness<StandardStream> {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness<StandardStream> {
    /// A harness reporting to stdout, timed by the monotonic clock.
    ///
    /// Colors follow [`Flags::COLORED_OUTPUT`] alone, unless `NO_COLOR` is set
    /// to a non-empty value.
    #[must_use]
    pub fn new() -> Self {
        let choice = stdout_color_choice(std::env::var_os("NO_COLOR").as_deref());
        Self::with_writer(StandardStream::stdout(choice))
    }
}

pub(crate) fn stdout_color_choice(no_color: Option<&OsStr>) -> ColorChoice {
    if no_color.is_some_and(|value| !value.is_empty()) {
        ColorChoice::Never
    } else {
        ColorChoice::Always
    }
}

impl<W: WriteColor> Harness<W> {
    /// A harness reporting to `out`, timed by the monotonic clock.
    pub fn with_writer(out: W) -> Self {
        Self {
            counters: Counters::default(),
            flags: Flags::empty(),
            time_unit: None,
            filters: Filters::default(),
            callbacks: Callbacks::default(),
            last_failure: None,
            last_duration: 0.0,
            clock: Box::new(MonotonicClock::new()),
            reporter: Reporter::new(out),
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_time_source(mut self, source: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(source);
        self
    }

    /// Reset counters, flags, filters, callbacks, the last failure and
    /// duration, and the time unit.
    pub fn init(&mut self) {
        debug!("resetting harness state");
        self.counters = Counters::default();
        self.flags = Flags::empty();
        self.time_unit = None;
        self.filters = Filters::default();
        self.callbacks = Callbacks::default();
        self.last_failure = None;
        self.last_duration = 0.0;
    }

    /// Set the given flags, leaving the others alone.
    pub fn turn_flag_on(&mut self, flags: Flags) {
        self.flags.insert(flags);
    }

    /// Clear the given flags, leaving the others alone.
    pub fn turn_flag_off(&mut self, flags: Flags) {
        self.flags.remove(flags);
    }

    /// Whether all of `flags` are set.
    #[must_use]
    pub const fn is_flag_on(&self, flags: Flags) -> bool {
        self.flags.contains(flags)
    }

    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// Only run the test called `name`. Replaces any previous test filter.
    pub fn set_test_filter(&mut self, name: impl Into<String>) {
        self.filters.test = Some(name.into());
    }

    /// Only run the suite called `name`. Replaces any previous suite filter.
    pub fn set_suite_filter(&mut self, name: impl Into<String>) {
        self.filters.suite = Some(name.into());
    }

    /// Drop both filters.
    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Called before each suite body.
    pub fn set_suite_start_callback(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.suite_start = Some(Box::new(callback));
    }

    /// Called after each suite body.
    pub fn set_suite_end_callback(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.suite_end = Some(Box::new(callback));
    }

    /// Called before each test body, ahead of the start timestamp.
    pub fn set_test_start_callback(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.test_start = Some(Box::new(callback));
    }

    /// Called after each test body, before its outcome is printed.
    pub fn set_test_end_callback(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.test_end = Some(Box::new(callback));
    }

    pub fn set_time_unit(&mut self, unit: TimeUnit) {
        self.time_unit = Some(unit);
    }

    /// The configured unit, `None` until one is set.
    #[must_use]
    pub const fn time_unit(&self) -> Option<TimeUnit> {
        self.time_unit
    }

    /// The configured unit, for code paths that cannot run without one.
    ///
    /// # Panics
    ///
    /// Panics if no time unit has been configured.
    pub(crate) fn configured_unit(&self) -> TimeUnit {
        match self.time_unit {
            Some(unit) => unit,
            None => panic!(
                "temper: no time unit configured; call set_time_unit or set_command_line_args first"
            ),
        }
    }

    /// Current timestamp in the configured unit.
    ///
    /// # Panics
    ///
    /// Panics if no time unit has been configured. Processing command-line
    /// args sets milliseconds; otherwise call [`set_time_unit`](Self::set_time_unit).
    #[must_use]
    pub fn now(&self) -> f64 {
        let unit = self.configured_unit();
        unit.convert(self.clock.ticks(), self.clock.ticks_per_second())
    }

    #[must_use]
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    /// Source location and message of the most recent failing test.
    #[must_use]
    pub const fn last_failure(&self) -> Option<&Failure> {
        self.last_failure.as_ref()
    }

    /// How long the most recently executed test took, in the configured unit.
    #[must_use]
    pub const fn last_duration(&self) -> f64 {
        self.last_duration
    }

    /// 0 when nothing has failed so far, 1 otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.counters.failed == 0 { 0 } else { 1 }
    }

    /// [`exit_code`](Self::exit_code) in a form `main` can return.
    #[must_use]
    pub fn exit_status(&self) -> ExitCode {
        if self.counters.failed == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Print the totals line. Call once, after the last test.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the output sink cannot be written or flushed.
    pub fn shutdown(&mut self) -> Result<(), Error> {
        debug!(
            passed = self.counters.passed,
            failed = self.counters.failed,
            skipped = self.counters.skipped,
            "test run finished"
        );
        self.reporter.summary(&self.counters)?;
        Ok(())
    }

    /// The output sink.
    pub const fn writer(&self) -> &W {
        self.reporter.writer()
    }

    /// The output sink, mutably.
    pub const fn writer_mut(&mut self) -> &mut W {
        self.reporter.writer_mut()
    }

    /// Consume the harness and return its output sink.
    pub fn into_writer(self) -> W {
        self.reporter.into_inner()
    }
}

impl<W> fmt::Debug for Harness<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("counters", &self.counters)
            .field("flags", &self.flags)
            .field("time_unit", &self.time_unit)
            .field("filters", &self.filters)
            .field("callbacks", &self.callbacks)
            .field("last_failure", &self.last_failure)
            .field("last_duration", &self.last_duration)
            .finish_non_exhaustive()
    }
}
