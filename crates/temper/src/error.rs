//! Errors surfaced by the harness.

use std::io;

use clap::error::ErrorKind;
use thiserror::Error;

/// Errors from configuring the harness or writing its report.
#[derive(Error, Debug)]
pub enum Error {
    /// The argument list was malformed, or asked for help.
    ///
    /// Help requests travel this path too, because clap reports them as
    /// errors; [`exit_code`](Self::exit_code) tells them apart.
    #[error(transparent)]
    Arguments(#[from] clap::Error),

    /// The report could not be written to the output sink.
    #[error("failed to write test report: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this is a help request rather than a real error.
    #[must_use]
    pub fn is_help(&self) -> bool {
        matches!(
            self,
            Self::Arguments(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
        )
    }

    /// Process exit code for this error: 0 for help, 1 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_help())
    }

    /// Print the usage or error text to the appropriate stream.
    ///
    /// Help goes to stdout, everything else to stderr.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to the console.
    pub fn print(&self) -> io::Result<()> {
        match self {
            Self::Arguments(err) => err.print(),
            Self::Io(_) => {
                eprintln!("error: {self}");
                Ok(())
            }
        }
    }
}
