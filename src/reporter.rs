//! The reporting capability the engine depends on.
//!
//! ## Reporter Trait
//!
//! The engine never prints or panics on its own behalf. Every outcome is a call on a `Reporter`, supplied by the
//! host test framework. Lines arrive fully formatted (scope prefix and severity splicing already applied).
//!
//! `fatal` only *records* a terminating failure. Ending the current element's lifecycle is the engine's job: the
//! naming context unwinds to the nearest protection frame after calling `fatal`, so a reporter must not unwind
//! itself.

use std::cell::{Cell, RefCell};

use tabletest_core::Severity;

/// Narrow reporting interface consumed by the engine.
pub trait Reporter {
    /// Record a log line.
    fn log(&self, line: &str);

    /// Record a non-terminating failure.
    fn error(&self, line: &str);

    /// Record a terminating failure.
    fn fatal(&self, line: &str);

    /// Mark the run as failed without recording a line.
    fn fail(&self);

    /// Check whether any failure has been recorded.
    fn failed(&self) -> bool;
}

/// One recorded line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub severity: Severity,
    pub line: String,
}

/// In-memory reporter that keeps every line for later inspection.
#[derive(Debug, Default)]
pub struct Recorder {
    entries: RefCell<Vec<Entry>>,
    failed: Cell<bool>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, in emission order.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.borrow().clone()
    }

    /// All recorded lines, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|e| e.line.clone()).collect()
    }

    /// Lines recorded with error or fatal severity.
    pub fn failures(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.severity.is_failure())
            .map(|e| e.line.clone())
            .collect()
    }

    /// Lines recorded with a specific severity.
    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.line.clone())
            .collect()
    }

    /// Check whether any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.borrow().iter().any(|e| e.line.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn push(&self, severity: Severity, line: &str) {
        self.entries.borrow_mut().push(Entry {
            severity,
            line: line.to_string(),
        });
    }
}

impl Reporter for Recorder {
    fn log(&self, line: &str) {
        self.push(Severity::Plain, line);
    }

    fn error(&self, line: &str) {
        self.push(Severity::Error, line);
        self.failed.set(true);
    }

    fn fatal(&self, line: &str) {
        self.push(Severity::Fatal, line);
        self.failed.set(true);
    }

    fn fail(&self) {
        self.failed.set(true);
    }

    fn failed(&self) -> bool {
        self.failed.get()
    }
}

/// Forwards to another reporter while counting the failures that pass through.
///
/// The lifecycle runner wraps the element's reporter in a `Tally` so it can tell whether *this* runnable failed,
/// independent of failures recorded earlier in the run.
pub(crate) struct Tally<'r> {
    inner: &'r dyn Reporter,
    failures: Cell<usize>,
}

impl<'r> Tally<'r> {
    pub(crate) fn new(inner: &'r dyn Reporter) -> Self {
        Self {
            inner,
            failures: Cell::new(0),
        }
    }

    pub(crate) fn failures(&self) -> usize {
        self.failures.get()
    }

    fn bump(&self) {
        self.failures.set(self.failures.get() + 1);
    }
}

impl Reporter for Tally<'_> {
    fn log(&self, line: &str) {
        self.inner.log(line);
    }

    fn error(&self, line: &str) {
        self.bump();
        self.inner.error(line);
    }

    fn fatal(&self, line: &str) {
        self.bump();
        self.inner.fatal(line);
    }

    fn fail(&self) {
        self.bump();
        self.inner.fail();
    }

    fn failed(&self) -> bool {
        self.inner.failed()
    }
}
