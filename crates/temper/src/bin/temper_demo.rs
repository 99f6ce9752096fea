#![forbid(unsafe_code)]

//! # Temper demo
//!
//! A test executable built on the harness: one suite with passing, failing
//! and skipped tests, plus lifecycle callbacks that narrate the run.
//!
//! ## Usage
//!
//! ```bash
//! temper-demo                      # run everything
//! temper-demo -t XShouldEqual0     # only one test
//! temper-demo -s TheSuite -a -c    # abort on first failure, colored
//! RUST_LOG=temper=debug temper-demo --time-unit=us
//! ```

use std::process::ExitCode;

use temper::prelude::*;
use tracing_subscriber::EnvFilter;

fn float_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn x_should_equal_0() -> TestOutcome {
    let x = 0.0_f32;
    expect_true!(float_eq(x, 0.0));
    pass!();
}

fn x_should_equal_1() -> TestOutcome {
    let x = 0.0_f32;
    expect_true!(float_eq(x, 1.0));
    pass!();
}

fn x_should_equal_2() -> TestOutcome {
    let x = 2.0_f32;
    expect_false!(float_eq(x, 0.0));
    expect_true!(float_eq(x, 2.0));
    pass!();
}

fn the_suite(h: &mut Harness) {
    h.run_test("XShouldEqual0", x_should_equal_0);
    h.run_test("XShouldEqual1", x_should_equal_1);
    h.run_test("XShouldEqual2", x_should_equal_2);
    h.skip_test(
        "XShouldEqual3",
        "Flaky on various people's machines right now...",
    );
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut harness = Harness::new();
    harness.init();
    harness.set_command_line_args(std::env::args());

    harness.set_suite_start_callback(|| println!("About to run a test suite."));
    harness.set_suite_end_callback(|| println!("Test suite finished."));
    harness.set_test_start_callback(|| println!("Test starting."));
    harness.set_test_end_callback(|| println!("Test finished."));

    harness.run_suite("TheSuite", the_suite);

    if let Err(err) = harness.shutdown() {
        let _ = err.print();
        return ExitCode::FAILURE;
    }
    harness.exit_status()
}
