#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Temper
//!
//! A small test-execution harness for test executables that drive their own
//! tests from `main`.
//!
//! Tests are plain functions or closures returning a [`TestOutcome`]; suites
//! are closures that run tests. A [`Harness`] owns the state of one run:
//! pass/fail/skip counters, name filters, the abort-on-fail and color flags,
//! lifecycle callbacks and the time unit durations are reported in.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::process::ExitCode;
//!
//! use temper::{Harness, TestOutcome, expect_true, pass};
//!
//! fn x_should_equal_0() -> TestOutcome {
//!     let x = 0.0_f32;
//!     expect_true!(x.abs() < 1e-5);
//!     pass!();
//! }
//!
//! fn main() -> ExitCode {
//!     let mut harness = Harness::new();
//!     harness.set_command_line_args(std::env::args());
//!
//!     harness.run_suite("TheSuite", |h| {
//!         h.run_test("XShouldEqual0", x_should_equal_0);
//!         h.skip_test("XShouldEqual3", "Flaky on CI right now");
//!     });
//!
//!     if let Err(err) = harness.shutdown() {
//!         eprintln!("{err}");
//!     }
//!     harness.exit_status()
//! }
//! ```
//!
//! ## Command line
//!
//! [`Harness::set_command_line_args`] understands:
//!
//! - `-h`, `--help`: print usage and exit
//! - `-t <name>`: only run the test with the given name
//! - `-s <suite>`: only run the suite with the given name
//! - `-a`: abort immediately on test failure
//! - `-c`: enable colored output
//! - `--time-unit=<unit>`: one of `clocks`, `ns`, `us`, `ms` (default), `seconds`
//!
//! ## Logging
//!
//! The harness emits `tracing` events (suites and tests starting, filtered
//! or suppressed invocations, write failures). It never installs a
//! subscriber; that is up to the executable.

mod cli;
mod context;
mod error;
mod outcome;
mod report;
mod runner;
mod time;

pub use cli::Options;
pub use context::{Counters, Filters, Flags, Harness};
pub use error::Error;
pub use outcome::{Failure, TestOutcome};
pub use report::{ConsoleColor, Reporter};
pub use time::{ManualClock, MonotonicClock, ParseTimeUnitError, TimeSource, TimeUnit};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Failure, Flags, Harness, TestOutcome, TimeUnit, expect_false, expect_true, fail, pass,
    };
}
