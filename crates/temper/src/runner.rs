//! Running tests and suites against a [`Harness`].
//!
//! Every call site decides for itself whether it runs: filters and the
//! abort-on-fail switch are checked per invocation, nothing is registered
//! up front.

use std::io;

use termcolor::WriteColor;
use tracing::{debug, trace, warn};

use crate::context::{Callbacks, Flags, Harness};
use crate::outcome::TestOutcome;

impl<W: WriteColor> Harness<W> {
    /// Run the test `name` and report its outcome.
    ///
    /// Nothing happens (no callbacks, no counters, no output) when
    /// abort-on-fail is on and a test has already failed, or when a test
    /// filter is set to a different name.
    ///
    /// Otherwise: test-start callback, start timestamp, `body`, end
    /// timestamp, test-end callback, then the outcome is counted and
    /// printed. A body that returns [`TestOutcome::Skipped`] is counted as
    /// skipped but prints nothing.
    ///
    /// # Panics
    ///
    /// Panics if no time unit has been configured.
    pub fn run_test<F, R>(&mut self, name: &str, body: F)
    where
        F: FnOnce() -> R,
        R: Into<TestOutcome>,
    {
        if self.aborted() {
            debug!(test = name, "abort-on-fail: not running test");
            return;
        }
        if !self.filters.allows_test(name) {
            trace!(test = name, "test filtered out");
            return;
        }

        let unit = self.configured_unit();
        debug!(test = name, "running test");

        Callbacks::fire(&mut self.callbacks.test_start);
        let start = self.now();
        let outcome = body().into();
        let end = self.now();
        self.last_duration = end - start;
        trace!(test = name, start, end, %unit, "test timed");
        Callbacks::fire(&mut self.callbacks.test_end);

        let colored = self.flags.contains(Flags::COLORED_OUTPUT);
        match outcome {
            TestOutcome::Passed => {
                self.counters.passed += 1;
                let written = self
                    .reporter
                    .passed(colored, name, self.last_duration, unit);
                log_write_failure(name, written);
            }
            TestOutcome::Failed(failure) => {
                self.counters.failed += 1;
                debug!(test = name, %failure, "test failed");
                let written = self.reporter.failed(colored, name, &failure);
                log_write_failure(name, written);
                self.last_failure = Some(failure);
            }
            TestOutcome::Skipped => {
                self.counters.skipped += 1;
                debug!(test = name, "test body skipped itself");
            }
        }
    }

    /// Report the test `name` as skipped without running it.
    ///
    /// Subject to the same abort-on-fail gate as [`run_test`](Self::run_test).
    /// While a test filter is set, the skip is only printed and counted if
    /// the filter names this test; otherwise it is silently dropped.
    pub fn skip_test(&mut self, name: &str, reason: &str) {
        if self.aborted() {
            debug!(test = name, "abort-on-fail: not reporting skip");
            return;
        }
        if !self.filters.allows_test(name) {
            trace!(test = name, "skip filtered out");
            return;
        }

        self.counters.skipped += 1;
        debug!(test = name, reason, "test skipped");
        let written = self.reporter.skipped(name, reason);
        log_write_failure(name, written);
    }

    /// Run the suite `name`.
    ///
    /// When a suite filter names a different suite, `body` is not called, so
    /// none of the tests inside it run regardless of their own filters.
    /// Otherwise: suite-start callback, `body`, suite-end callback.
    pub fn run_suite<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        if !self.filters.allows_suite(name) {
            trace!(suite = name, "suite filtered out");
            return;
        }

        debug!(suite = name, "running suite");
        Callbacks::fire(&mut self.callbacks.suite_start);
        body(self);
        Callbacks::fire(&mut self.callbacks.suite_end);
        debug!(suite = name, "suite finished");
    }

    /// Abort-on-fail is on and something already failed.
    fn aborted(&self) -> bool {
        self.flags.contains(Flags::ABORT_ON_FAIL) && self.counters.failed > 0
    }
}

fn log_write_failure(test: &str, written: io::Result<()>) {
    if let Err(err) = written {
        warn!(test, error = %err, "failed to write test outcome");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use termcolor::Buffer;

    use super::*;
    use crate::outcome::Failure;
    use crate::time::{ManualClock, TimeUnit};
    use crate::{expect_true, fail, pass};

    fn harness() -> Harness<Buffer> {
        let mut h = Harness::with_writer(Buffer::no_color());
        h.set_time_unit(TimeUnit::Milliseconds);
        h
    }

    fn output(h: &Harness<Buffer>) -> String {
        String::from_utf8_lossy(h.writer().as_slice()).into_owned()
    }

    fn passes() -> TestOutcome {
        expect_true!(1 + 1 == 2);
        pass!();
    }

    fn one_equals_two() -> TestOutcome {
        expect_true!(1 == 2);
        pass!();
    }

    #[test]
    fn passing_test_is_counted_and_printed() {
        let mut h = harness();
        h.run_test("A", passes);
        assert_eq!(h.counters().passed, 1);
        assert!(output(&h).starts_with("\tPASSED:  A ("));
        assert!(output(&h).ends_with(" ms).\n"));
    }

    #[test]
    fn failing_test_records_location_and_message() {
        let mut h = harness();
        h.run_test("B", one_equals_two);
        assert_eq!(h.counters().failed, 1);
        let failure = h.last_failure().unwrap();
        assert_eq!(failure.message(), Some("1 == 2"));
        assert!(failure.file().ends_with("runner.rs"));
        assert!(output(&h).contains("FAILED:  B: \"1 == 2\" at "));
        assert_eq!(h.exit_code(), 1);
    }

    #[test]
    fn unconditional_failure_omits_message() {
        let mut h = harness();
        h.run_test("Bare", || -> TestOutcome { fail!() });
        assert_eq!(h.last_failure().unwrap().message(), None);
        assert!(output(&h).contains("FAILED:  Bare at "));
    }

    #[test]
    fn last_failure_is_overwritten() {
        let mut h = harness();
        h.run_test("First", || Failure::at("first.rs", 1));
        h.run_test("Second", || Failure::at("second.rs", 2));
        assert_eq!(h.last_failure().unwrap().file(), "second.rs");
    }

    #[test]
    fn result_bodies_are_accepted() {
        let mut h = harness();
        h.run_test("Ok", || -> Result<(), Failure> { Ok(()) });
        h.run_test("Err", || -> Result<(), Failure> {
            Err(Failure::here().with_message("boom"))
        });
        assert_eq!(h.counters().passed, 1);
        assert_eq!(h.counters().failed, 1);
    }

    #[test]
    fn self_skipping_body_counts_without_printing() {
        let mut h = harness();
        h.run_test("Quiet", || TestOutcome::Skipped);
        assert_eq!(h.counters().skipped, 1);
        assert!(output(&h).is_empty());
    }

    #[test]
    fn duration_comes_from_the_time_source() {
        let clock = ManualClock::nanos();
        let mut h = harness().with_time_source(clock.clone());
        h.run_test("Slow", || {
            clock.advance(3_000_000);
            TestOutcome::Passed
        });
        assert_eq!(h.last_duration(), 3.0);
        assert_eq!(output(&h), "\tPASSED:  Slow (3.000 ms).\n");
    }

    #[test]
    fn test_filter_hides_other_tests_entirely() {
        let mut h = harness();
        h.set_test_filter("Foo");
        let ran = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&ran);
        h.run_test("Foobar", move || {
            log.borrow_mut().push("Foobar");
            TestOutcome::Passed
        });
        let log = Rc::clone(&ran);
        h.run_test("Foo", move || {
            log.borrow_mut().push("Foo");
            TestOutcome::Passed
        });
        h.skip_test("Other", "not selected");

        assert_eq!(*ran.borrow(), vec!["Foo"]);
        assert_eq!(h.counters().total(), 1);
        assert!(!output(&h).contains("Foobar"));
        assert!(!output(&h).contains("Other"));
    }

    #[test]
    fn skip_is_honored_when_filter_matches() {
        let mut h = harness();
        h.set_test_filter("C");
        h.skip_test("C", "flaky");
        assert_eq!(h.counters().skipped, 1);
        assert_eq!(output(&h), "\tSKIPPED: C: \"flaky\".\n");
    }

    #[test]
    fn abort_on_fail_stops_everything_after_first_failure() {
        let mut h = harness();
        h.turn_flag_on(Flags::ABORT_ON_FAIL);
        h.run_test("A", passes);
        h.run_test("B", one_equals_two);
        let before = output(&h);

        let ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran);
        h.run_test("C", move || {
            *flag.borrow_mut() = true;
            TestOutcome::Passed
        });
        h.skip_test("D", "later");

        assert!(!*ran.borrow());
        assert_eq!(h.counters().passed, 1);
        assert_eq!(h.counters().failed, 1);
        assert_eq!(h.counters().skipped, 0);
        assert_eq!(output(&h), before);
    }

    #[test]
    fn failures_do_not_stop_the_run_without_abort_flag() {
        let mut h = harness();
        h.run_test("B", one_equals_two);
        h.run_test("A", passes);
        h.skip_test("C", "later");
        assert_eq!(h.counters().total(), 3);
    }

    #[test]
    fn callbacks_bracket_tests_and_suites() {
        let mut h = harness();
        let events = Rc::new(RefCell::new(Vec::new()));

        let e = Rc::clone(&events);
        h.set_suite_start_callback(move || e.borrow_mut().push("suite start"));
        let e = Rc::clone(&events);
        h.set_suite_end_callback(move || e.borrow_mut().push("suite end"));
        let e = Rc::clone(&events);
        h.set_test_start_callback(move || e.borrow_mut().push("test start"));
        let e = Rc::clone(&events);
        h.set_test_end_callback(move || e.borrow_mut().push("test end"));

        let e = Rc::clone(&events);
        h.run_suite("TheSuite", |h| {
            h.run_test("A", move || {
                e.borrow_mut().push("body");
                TestOutcome::Passed
            });
            h.skip_test("C", "flaky");
        });

        assert_eq!(
            *events.borrow(),
            vec!["suite start", "test start", "body", "test end", "suite end"]
        );
    }

    #[test]
    fn filtered_tests_fire_no_callbacks() {
        let mut h = harness();
        let calls = Rc::new(RefCell::new(0));
        let c = Rc::clone(&calls);
        h.set_test_start_callback(move || *c.borrow_mut() += 1);
        h.set_test_filter("A");
        h.run_test("B", passes);
        assert_eq!(*calls.borrow(), 0);
        h.run_test("A", passes);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn suite_filter_skips_the_whole_body() {
        let mut h = harness();
        h.set_suite_filter("OtherSuite");
        let ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran);
        h.run_suite("TheSuite", move |h| {
            *flag.borrow_mut() = true;
            h.run_test("A", passes);
        });
        assert!(!*ran.borrow());
        assert_eq!(h.counters().total(), 0);
        assert_eq!(h.exit_code(), 0);
    }

    #[test]
    fn suites_can_nest() {
        let mut h = harness();
        h.run_suite("Outer", |h| {
            h.run_test("A", passes);
            h.run_suite("Inner", |h| h.run_test("B", passes));
        });
        assert_eq!(h.counters().passed, 2);
    }

    #[test]
    #[should_panic(expected = "no time unit configured")]
    fn running_a_test_without_a_time_unit_panics() {
        let mut h = Harness::with_writer(Buffer::no_color());
        h.run_test("A", passes);
    }
}
