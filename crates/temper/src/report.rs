//! Console output for test outcomes and the final summary.
//!
//! Colors go through [`termcolor::WriteColor`], which picks ANSI escapes or
//! the Windows console API for us. When colored output is off the reporter
//! makes no color call at all.

use std::fmt;
use std::io;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::context::Counters;
use crate::outcome::Failure;
use crate::time::TimeUnit;

/// Abstract color token understood by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleColor {
    /// Terminal default; resets any previous color.
    #[default]
    Default,
    /// Used for the `FAILED:` tag.
    Red,
    /// Used for the `PASSED:` tag.
    Green,
    /// Used for failure details.
    Yellow,
}

impl ConsoleColor {
    fn spec(self) -> Option<ColorSpec> {
        let fg = match self {
            Self::Default => return None,
            Self::Red => Color::Red,
            Self::Green => Color::Green,
            Self::Yellow => Color::Yellow,
        };
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(fg));
        Some(spec)
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests run in total.  {} passed, {} failed, {} skipped.",
            self.total(),
            self.passed,
            self.failed,
            self.skipped
        )
    }
}

/// Writes one line per reported test plus the closing summary.
#[derive(Debug)]
pub struct Reporter<W> {
    out: W,
}

impl<W: WriteColor> Reporter<W> {
    /// Wrap an output sink.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Switch to `color` for subsequent writes, or do nothing if `colored`
    /// is false.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn set_color(&mut self, colored: bool, color: ConsoleColor) -> io::Result<()> {
        if !colored {
            return Ok(());
        }
        match color.spec() {
            Some(spec) => self.out.set_color(&spec),
            None => self.out.reset(),
        }
    }

    /// `\tPASSED:  name (1.234 ms).`
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn passed(
        &mut self,
        colored: bool,
        name: &str,
        duration: f64,
        unit: TimeUnit,
    ) -> io::Result<()> {
        self.set_color(colored, ConsoleColor::Green)?;
        write!(self.out, "\tPASSED:")?;
        self.set_color(colored, ConsoleColor::Default)?;
        writeln!(self.out, "  {name} ({duration:.3} {unit}).")
    }

    /// `\tFAILED:  name: "message" at file:line.`
    ///
    /// The quoted message is left out when the failure carries none.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn failed(&mut self, colored: bool, name: &str, failure: &Failure) -> io::Result<()> {
        self.set_color(colored, ConsoleColor::Red)?;
        write!(self.out, "\tFAILED:")?;
        self.set_color(colored, ConsoleColor::Yellow)?;
        match failure.message() {
            Some(message) => writeln!(
                self.out,
                "  {name}: \"{message}\" at {}:{}.",
                failure.file(),
                failure.line()
            )?,
            None => writeln!(
                self.out,
                "  {name} at {}:{}.",
                failure.file(),
                failure.line()
            )?,
        }
        self.set_color(colored, ConsoleColor::Default)
    }

    /// `\tSKIPPED: name: "reason".`
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn skipped(&mut self, name: &str, reason: &str) -> io::Result<()> {
        writeln!(self.out, "\tSKIPPED: {name}: \"{reason}\".")
    }

    /// Blank line followed by the totals, then flush.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn summary(&mut self, counters: &Counters) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{counters}")?;
        self.out.flush()
    }

    /// The wrapped sink.
    pub const fn writer(&self) -> &W {
        &self.out
    }

    /// The wrapped sink, mutably.
    pub const fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
