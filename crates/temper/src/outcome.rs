//! Test outcomes and the assertion macros that produce them.

use std::fmt;
use std::panic::Location;

/// Where and why a test body failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    file: &'static str,
    line: u32,
    message: Option<String>,
}

impl Failure {
    /// A failure recorded at an explicit source location, with no message.
    #[must_use]
    pub const fn at(file: &'static str, line: u32) -> Self {
        Self {
            file,
            line,
            message: None,
        }
    }

    /// A failure recorded at the caller's location, with no message.
    #[must_use]
    #[track_caller]
    pub fn here() -> Self {
        let location = Location::caller();
        Self::at(location.file(), location.line())
    }

    /// Attach a message, replacing any previous one.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Source file of the failing check.
    #[must_use]
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// Source line of the failing check.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// The asserted expression or explicit message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "\"{message}\" at {}:{}", self.file, self.line),
            None => write!(f, "at {}:{}", self.file, self.line),
        }
    }
}

/// What a test body reports back to the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// Every expectation held.
    Passed,
    /// An expectation failed or the body failed explicitly.
    Failed(Failure),
    /// The body elected not to run.
    Skipped,
}

impl TestOutcome {
    /// Returns true if the test passed
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns true if the test failed
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if the test was skipped
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl From<Failure> for TestOutcome {
    fn from(failure: Failure) -> Self {
        Self::Failed(failure)
    }
}

impl From<Result<(), Failure>> for TestOutcome {
    fn from(result: Result<(), Failure>) -> Self {
        match result {
            Ok(()) => Self::Passed,
            Err(failure) => Self::Failed(failure),
        }
    }
}

/// Fail the enclosing test unless `cond` holds.
///
/// The failure message is the literal text of the condition. The enclosing
/// function must return [`TestOutcome`](crate::TestOutcome).
#[macro_export]
macro_rules! expect_true {
    ($cond:expr $(,)?) => {
        if !($cond) {
            return $crate::TestOutcome::Failed(
                $crate::Failure::at(file!(), line!()).with_message(stringify!($cond)),
            );
        }
    };
}

/// Fail the enclosing test if `cond` holds.
#[macro_export]
macro_rules! expect_false {
    ($cond:expr $(,)?) => {
        if $cond {
            return $crate::TestOutcome::Failed(
                $crate::Failure::at(file!(), line!()).with_message(stringify!($cond)),
            );
        }
    };
}

/// Fail the enclosing test unconditionally.
///
/// Without arguments no message is recorded; otherwise the arguments are
/// formatted into the message.
#[macro_export]
macro_rules! fail {
    () => {
        return $crate::TestOutcome::Failed($crate::Failure::at(file!(), line!()))
    };
    ($($arg:tt)+) => {
        return $crate::TestOutcome::Failed(
            $crate::Failure::at(file!(), line!()).with_message(format!($($arg)+)),
        )
    };
}

/// Pass the enclosing test.
#[macro_export]
macro_rules! pass {
    () => {
        return $crate::TestOutcome::Passed
    };
}
