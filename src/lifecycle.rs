//! The lifecycle runner.
//!
//! One runnable moves through three phases:
//!
//! 1. `before`: optional setup, scoped `"before test"`. A panic here ends the lifecycle; neither the test nor
//!    teardown runs.
//! 2. `during`: the test body. Its unwind (if any) is reconciled against the declared panic expectations.
//! 3. `after`: optional teardown, scoped `"after test"`. Runs however `during` ended.
//!
//! Every phase runs inside its own recovery boundary, together with the capability probe it depends on, so nothing
//! escapes `run`. A fatal report inside any phase
//! is already recorded when its unwind is caught, and is never reported twice.

use std::fmt;

use tabletest_core::Severity;
use tracing::{debug, trace};

use crate::context::Context;
use crate::element::Runnable;
use crate::expectation::{PanicExpectation, describe};
use crate::reporter::Tally;
use crate::unwind::{Caught, protect};

/// A lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    During,
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Before => f.write_str("before"),
            Phase::During => f.write_str("during"),
            Phase::After => f.write_str("after"),
        }
    }
}

/// How one protected phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PhaseOutcome {
    pub(crate) phase: Phase,
    pub(crate) caught: Option<Caught>,
}

/// The result of running one runnable.
///
/// Informational only: every outcome has already been reported through the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    Fatal,
    Skipped,
}

fn guarded(phase: Phase, f: impl FnOnce()) -> PhaseOutcome {
    let caught = protect(f);
    if let Some(caught) = &caught {
        trace!(%phase, ?caught, "phase unwound");
    }
    PhaseOutcome { phase, caught }
}

/// Accumulated state across the phases of one run.
#[derive(Default)]
struct Progress {
    fatal: bool,
    skipped: Option<String>,
}

impl Progress {
    /// Fold an engine control transfer into the run state. Genuine panics are returned for the caller to word.
    fn absorb(&mut self, caught: Caught) -> Option<String> {
        match caught {
            Caught::Fatal => {
                self.fatal = true;
                None
            }
            Caught::Skip(reason) => {
                self.skipped.get_or_insert(reason);
                None
            }
            Caught::Panic(v) => Some(v),
        }
    }
}

/// Run one runnable through its lifecycle.
///
/// ## Parameters
/// - `ctx`: the runnable's scope; phase scopes are derived from it.
/// - `runnable`: the test to run.
///
/// ## Returns
/// - (`Outcome`): how the run ended. `Fatal` wins over `Failed`, which wins over `Skipped`.
///
/// ## Notes
/// - Under verbose mode a passing run logs `"passed"` and a skipped run logs `"skipped: <reason>"`.
pub fn run(ctx: &Context<'_>, runnable: &mut dyn Runnable) -> Outcome {
    let tally = Tally::new(ctx.reporter());
    let ctx = ctx.with_reporter(&tally);
    let mut progress = Progress::default();

    let outcome = guarded(Phase::Before, || {
        if let Some(before) = runnable.as_before() {
            before.before(&ctx.sub("before test"))
        }
    });
    if let Some(caught) = outcome.caught {
        if let Some(v) = progress.absorb(caught) {
            ctx.error(format_args!("panic {} test: {v}", outcome.phase));
        }
        return finish(&ctx, &tally, progress);
    }

    let during = guarded(Phase::During, || runnable.test(&ctx));
    match during.caught {
        Some(Caught::Fatal) => progress.fatal = true,
        Some(Caught::Skip(reason)) => progress.skipped = Some(reason),
        Some(Caught::Panic(v)) => reconcile(&ctx, &*runnable, Some(v.as_str()), &mut progress),
        None => reconcile(&ctx, &*runnable, None, &mut progress),
    }

    let outcome = guarded(Phase::After, || {
        if let Some(after) = runnable.as_after() {
            after.after(&ctx.sub("after test"))
        }
    });
    if let Some(v) = outcome.caught.and_then(|caught| progress.absorb(caught)) {
        ctx.error(format_args!("panic {} test: {v}", outcome.phase));
    }

    finish(&ctx, &tally, progress)
}

/// Check a `during` result against the runnable's declared expectations.
fn reconcile(ctx: &Context<'_>, runnable: &dyn Runnable, panic: Option<&str>, progress: &mut Progress) {
    let expectations = fetch(ctx, runnable, progress);
    let valid: Vec<(usize, &PanicExpectation)> = expectations
        .iter()
        .enumerate()
        .filter(|(_, exp)| exp.problem().is_none())
        .collect();

    match panic {
        None if !valid.is_empty() => {
            ctx.error(format_args!(
                "test did not panic as expected {}",
                describe(valid.iter().map(|(_, exp)| *exp))
            ));
        }
        None => {}
        Some(text) if valid.is_empty() => {
            if ctx.config().fatal_unexpected_panics {
                progress.fatal = true;
                ctx.report(Severity::Fatal, format_args!("unexpected panic: {text}"));
            } else {
                ctx.error(format_args!("unexpected panic: {text}"));
            }
        }
        Some(text) => {
            for (i, exp) in valid {
                let exp_ctx = ctx.sub(format_args!("panic expectation {i}"));
                let Some(caught) = protect(|| exp.apply(&exp_ctx, text)) else {
                    continue;
                };
                if let Some(v) = progress.absorb(caught) {
                    exp_ctx.error(format_args!("panic in expectation callback: {v}"));
                } else {
                    break;
                }
            }
        }
    }
}

/// Fetch the declared expectations, reporting each malformed entry in its own scope.
///
/// Probing for the capability counts as fetching: a panic in either is reported once and no expectations apply.
fn fetch(ctx: &Context<'_>, runnable: &dyn Runnable, progress: &mut Progress) -> Vec<PanicExpectation> {
    let mut expectations = Vec::new();
    let declared = protect(|| {
        if let Some(panics) = runnable.as_panics() {
            expectations = panics.panics();
        }
    });
    if let Some(caught) = declared {
        if let Some(v) = progress.absorb(caught) {
            ctx.error(format_args!("panic fetching panic expectations: {v}"));
        }
        return Vec::new();
    }
    for (i, exp) in expectations.iter().enumerate() {
        if let Some(problem) = exp.problem() {
            ctx.sub(format_args!("panic expectation {i}")).error(problem);
        }
    }
    expectations
}

fn finish(ctx: &Context<'_>, tally: &Tally<'_>, progress: Progress) -> Outcome {
    let outcome = if progress.fatal {
        Outcome::Fatal
    } else if tally.failures() > 0 {
        Outcome::Failed
    } else if progress.skipped.is_some() {
        Outcome::Skipped
    } else {
        Outcome::Passed
    };

    if ctx.config().verbose {
        match (&outcome, &progress.skipped) {
            (Outcome::Passed, _) => ctx.log("passed"),
            (Outcome::Skipped, Some(reason)) if reason.is_empty() => ctx.log("skipped"),
            (Outcome::Skipped, Some(reason)) => ctx.log(format_args!("skipped: {reason}")),
            _ => {}
        }
    }

    debug!(scope = ctx.name(), ?outcome, "runnable finished");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::element::{After, Before, Panics};
    use crate::reporter::{Recorder, Reporter};

    #[derive(Default)]
    struct Staged {
        before_panics: bool,
        test_panics: Option<&'static str>,
        after_panics: bool,
        expect: Vec<&'static str>,
        declares_panics: bool,
        ran: Vec<Phase>,
    }

    impl Runnable for Staged {
        fn test(&mut self, _ctx: &Context<'_>) {
            self.ran.push(Phase::During);
            if let Some(text) = self.test_panics {
                panic!("{text}");
            }
        }

        fn as_before(&mut self) -> Option<&mut dyn Before> {
            Some(self)
        }

        fn as_after(&mut self) -> Option<&mut dyn After> {
            Some(self)
        }

        fn as_panics(&self) -> Option<&dyn Panics> {
            self.declares_panics.then_some(self as &dyn Panics)
        }
    }

    impl Before for Staged {
        fn before(&mut self, _ctx: &Context<'_>) {
            self.ran.push(Phase::Before);
            if self.before_panics {
                panic!("setup broke");
            }
        }
    }

    impl After for Staged {
        fn after(&mut self, _ctx: &Context<'_>) {
            self.ran.push(Phase::After);
            if self.after_panics {
                panic!("teardown broke");
            }
        }
    }

    impl Panics for Staged {
        fn panics(&self) -> Vec<PanicExpectation> {
            self.expect.iter().map(|&e| e.into()).collect()
        }
    }

    fn run_staged(staged: &mut Staged, config: &Config) -> (Outcome, Recorder) {
        let recorder = Recorder::new();
        let outcome = run(&Context::named("case", &recorder, config), staged);
        (outcome, recorder)
    }

    // ========================================
    // Phase ordering
    // ========================================

    #[test]
    fn test_all_phases_in_order() {
        let mut staged = Staged::default();
        let (outcome, recorder) = run_staged(&mut staged, &Config::default());
        assert_eq!(outcome, Outcome::Passed);
        assert_eq!(staged.ran, vec![Phase::Before, Phase::During, Phase::After]);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_before_panic_stops_lifecycle() {
        let mut staged = Staged {
            before_panics: true,
            ..Staged::default()
        };
        let (outcome, recorder) = run_staged(&mut staged, &Config::default());
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(staged.ran, vec![Phase::Before]);
        assert_eq!(recorder.failures(), vec!["case: panic before test: setup broke"]);
    }

    #[test]
    fn test_after_runs_when_test_panics() {
        let mut staged = Staged {
            test_panics: Some("gophers"),
            ..Staged::default()
        };
        let (outcome, recorder) = run_staged(&mut staged, &Config::default());
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(staged.ran, vec![Phase::Before, Phase::During, Phase::After]);
        assert_eq!(recorder.failures(), vec!["case: unexpected panic: gophers"]);
    }

    #[test]
    fn test_after_panic() {
        let mut staged = Staged {
            after_panics: true,
            ..Staged::default()
        };
        let (outcome, recorder) = run_staged(&mut staged, &Config::default());
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(recorder.failures(), vec!["case: panic after test: teardown broke"]);
    }

    // ========================================
    // Panic reconciliation
    // ========================================

    #[test]
    fn test_expected_panic() {
        let mut staged = Staged {
            test_panics: Some("gophers"),
            expect: vec!["gophers"],
            declares_panics: true,
            ..Staged::default()
        };
        let (outcome, recorder) = run_staged(&mut staged, &Config::default());
        assert_eq!(outcome, Outcome::Passed);
        assert!(!recorder.failed());
    }

    #[test]
    fn test_each_mismatch_reported() {
        let mut staged = Staged {
            test_panics: Some("gophers"),
            expect: vec!["badgers", "gopher", "ferrets"],
            declares_panics: true,
            ..Staged::default()
        };
        let (_, recorder) = run_staged(&mut staged, &Config::default());
        insta::assert_debug_snapshot!(recorder.failures(), @r#"
        [
            "case: panic expectation 0: unexpected panic (doesn't contain \"badgers\"): gophers",
            "case: panic expectation 2: unexpected panic (doesn't contain \"ferrets\"): gophers",
        ]
        "#);
    }

    #[test]
    fn test_did_not_panic() {
        let mut staged = Staged {
            expect: vec!["gophers"],
            declares_panics: true,
            ..Staged::default()
        };
        let (_, recorder) = run_staged(&mut staged, &Config::default());
        assert_eq!(
            recorder.failures(),
            vec![r#"case: test did not panic as expected ["gophers"]"#]
        );
    }

    #[test]
    fn test_empty_expectations_do_not_absorb_panic() {
        let mut staged = Staged {
            test_panics: Some("gophers"),
            declares_panics: true,
            ..Staged::default()
        };
        let (_, recorder) = run_staged(&mut staged, &Config::default());
        assert_eq!(recorder.failures(), vec!["case: unexpected panic: gophers"]);
    }

    #[test]
    fn test_fatal_unexpected_panic() {
        let mut staged = Staged {
            test_panics: Some("gophers"),
            ..Staged::default()
        };
        let config = Config::default().with_fatal_unexpected_panics(true);
        let (outcome, recorder) = run_staged(&mut staged, &config);
        assert_eq!(outcome, Outcome::Fatal);
        assert_eq!(
            recorder.with_severity(Severity::Fatal),
            vec!["case: unexpected panic: gophers"]
        );
        assert_eq!(staged.ran.last(), Some(&Phase::After));
    }

    #[test]
    fn test_verbose_passed() {
        let mut staged = Staged::default();
        let (_, recorder) = run_staged(&mut staged, &Config::default().with_verbose(true));
        assert_eq!(recorder.lines(), vec!["case: passed"]);
    }
}
