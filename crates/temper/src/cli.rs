//! Command-line options for a test executable.
//!
//! Defines the option contract with clap derive macros and applies parsed
//! options to a [`Harness`].
//!
//! # Examples
//!
//! ```bash
//! # Only run the test named XShouldEqual0
//! my_tests -t XShouldEqual0
//!
//! # Only run TheSuite, stop at the first failure, colored output
//! my_tests -s TheSuite -a -c
//!
//! # Report durations in microseconds
//! my_tests --time-unit=us
//! ```

use std::ffi::OsString;
use std::io::{self, Write};

use clap::{CommandFactory, Parser};
use termcolor::WriteColor;
use tracing::debug;

use crate::context::{Flags, Harness};
use crate::error::Error;
use crate::time::TimeUnit;

/// Options understood by every test executable built on the harness.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    about = "Runs the tests and suites compiled into this executable",
    args_override_self = true
)]
pub struct Options {
    /// Abort immediately on test failure
    #[arg(short = 'a')]
    pub abort_on_fail: bool,

    /// Enable colored output
    #[arg(short = 'c')]
    pub colored: bool,

    /// Only run the test with the given name
    #[arg(short = 't', value_name = "name", allow_hyphen_values = true)]
    pub test: Option<String>,

    /// Only run the suite with the given name
    #[arg(short = 's', value_name = "suite", allow_hyphen_values = true)]
    pub suite: Option<String>,

    /// Unit test durations are reported in
    #[arg(
        long = "time-unit",
        value_name = "unit",
        value_enum,
        default_value_t = TimeUnit::Milliseconds
    )]
    pub time_unit: TimeUnit,

    /// Bare words are accepted and ignored
    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            abort_on_fail: false,
            colored: false,
            test: None,
            suite: None,
            time_unit: TimeUnit::Milliseconds,
            ignored: Vec::new(),
        }
    }
}

impl Options {
    /// Parse an argument list whose first element is the program name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Arguments`] for unknown options, missing option
    /// values, an unknown time unit, or a help request.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(<Self as Parser>::try_parse_from(args)?)
    }

    /// Rendered usage text.
    #[must_use]
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }

    /// Write these options into `harness`.
    ///
    /// The time unit is always set. Flags are only ever turned on and
    /// filters only ever replaced; nothing already configured is cleared.
    pub fn apply<W: WriteColor>(&self, harness: &mut Harness<W>) {
        harness.set_time_unit(self.time_unit);
        if self.abort_on_fail {
            harness.turn_flag_on(Flags::ABORT_ON_FAIL);
        }
        if self.colored {
            harness.turn_flag_on(Flags::COLORED_OUTPUT);
        }
        if let Some(test) = &self.test {
            harness.set_test_filter(test.clone());
        }
        if let Some(suite) = &self.suite {
            harness.set_suite_filter(suite.clone());
        }
        debug!(options = ?self, "applied command-line options");
    }
}

impl<W: WriteColor> Harness<W> {
    /// Configure the harness from an argument list (program name first).
    ///
    /// Parsing happens before anything is applied, so a rejected list leaves
    /// the harness untouched.
    ///
    /// # Errors
    ///
    /// See [`Options::try_parse_from`].
    pub fn try_set_command_line_args<I, T>(&mut self, args: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let options = Options::try_parse_from(args)?;
        options.apply(self);
        Ok(())
    }

    /// Configure the harness from an argument list, exiting the process on
    /// `--help` (code 0) or on malformed arguments (code 1, after the usage
    /// text).
    pub fn set_command_line_args<I, T>(&mut self, args: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        if let Err(err) = self.try_set_command_line_args(args) {
            if let Err(print_err) = print_rejection(&err) {
                debug!(error = %print_err, "failed to print usage");
            }
            std::process::exit(err.exit_code());
        }
    }
}

/// Help goes to stdout as-is; real errors are followed by the full usage.
fn print_rejection(err: &Error) -> io::Result<()> {
    err.print()?;
    if !err.is_help() {
        let mut stderr = io::stderr().lock();
        writeln!(stderr)?;
        write!(stderr, "{}", Options::usage())?;
    }
    Ok(())
}
