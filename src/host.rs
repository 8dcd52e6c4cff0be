//! Adapter for the libtest harness.
//!
//! `check` is the entry point for ordinary `#[test]` functions: it runs a table against a `HostReporter`, which
//! writes every line to the captured test output, then panics with a `TableFailures` report if anything failed.

use std::cell::{Cell, RefCell};
use std::panic;
use std::sync::Once;

use miette::Diagnostic;
use tabletest_core::Severity;
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::dispatch::Engine;
use crate::reporter::Reporter;
use crate::table::Table;
use crate::unwind;

/// One failure line reported during a table run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{line}")]
pub struct Failure {
    pub severity: Severity,
    pub line: String,
}

/// Every failure of one table run.
#[derive(Debug, Error, Diagnostic)]
#[error("table test failed ({count} reported failures)")]
#[diagnostic(
    code(tabletest::failures),
    help("each related diagnostic is one failure, prefixed with the scope that reported it")
)]
pub struct TableFailures {
    pub count: usize,
    #[related]
    pub failures: Vec<Failure>,
}

/// Reporter backed by the libtest harness.
#[derive(Debug, Default)]
pub struct HostReporter {
    failures: RefCell<Vec<Failure>>,
    failed: Cell<bool>,
}

impl HostReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The failures recorded so far, or `None` if the run is clean.
    pub fn into_failures(self) -> Option<TableFailures> {
        if !self.failed.get() {
            return None;
        }
        let failures = self.failures.into_inner();
        Some(TableFailures {
            count: failures.len(),
            failures,
        })
    }

    /// Panic with a rendered `TableFailures` report if anything failed.
    pub fn finish(self) {
        if let Some(failures) = self.into_failures() {
            panic!("{:?}", miette::Report::new(failures));
        }
    }

    fn record(&self, severity: Severity, line: &str) {
        eprintln!("{line}");
        self.failures.borrow_mut().push(Failure {
            severity,
            line: line.to_string(),
        });
        self.failed.set(true);
    }
}

impl Reporter for HostReporter {
    fn log(&self, line: &str) {
        println!("{line}");
    }

    fn error(&self, line: &str) {
        self.record(Severity::Error, line);
    }

    fn fatal(&self, line: &str) {
        self.record(Severity::Fatal, line);
    }

    fn fail(&self) {
        self.failed.set(true);
    }

    fn failed(&self) -> bool {
        self.failed.get()
    }
}

/// Install a `tracing` subscriber writing to the captured test output.
///
/// The filter comes from `RUST_LOG`, defaulting to `warn`. Installing twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Install a panic hook that stays silent for panics the engine catches.
///
/// The default hook prints `thread '..' panicked at ..` for every panic, including those a table expects and
/// reconciles. After this call only panics raised outside a table run reach the previously installed hook.
/// Installing twice is harmless.
pub fn quiet_panics() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !unwind::inside_boundary() {
                previous(info);
            }
        }));
    });
}

/// Run `table` with configuration from the environment and fail the current test if anything failed.
///
/// An invalid environment configuration is logged and replaced by the defaults.
///
/// Panics caught by the table still pass through the process panic hook, so the default hook prints them to the
/// captured output. Call [`quiet_panics`] first to suppress that.
pub fn check(table: impl Into<Table>) {
    init_tracing();
    let config = Config::from_env().unwrap_or_else(|err| {
        warn!(%err, "ignoring invalid table test configuration");
        Config::default()
    });
    check_with(config, table);
}

/// Run `table` with an explicit configuration and fail the current test if anything failed.
pub fn check_with(config: Config, table: impl Into<Table>) {
    let reporter = HostReporter::new();
    Engine::new(config).run(&reporter, table);
    reporter.finish();
}
