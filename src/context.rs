//! Naming contexts.
//!
//! A `Context` is a scope name plus shared, read-only references to the reporter and the configuration. Every
//! message reported through a context is prefixed with its name using the configured template. `sub` derives a child
//! scope without touching the parent, so sibling scopes never see each other's labels.

use std::fmt::Display;

use tabletest_core::{Severity, compose, format_message};

use crate::config::Config;
use crate::reporter::Reporter;
use crate::unwind;

/// A scope used to prefix diagnostics and derive child scopes.
#[derive(Clone)]
pub struct Context<'r> {
    name: String,
    reporter: &'r dyn Reporter,
    config: &'r Config,
}

impl<'r> Context<'r> {
    /// The unnamed root scope; messages pass through unprefixed.
    pub fn root(reporter: &'r dyn Reporter, config: &'r Config) -> Self {
        Self::named("", reporter, config)
    }

    pub fn named(name: impl Into<String>, reporter: &'r dyn Reporter, config: &'r Config) -> Self {
        Self {
            name: name.into(),
            reporter,
            config,
        }
    }

    /// Derive a child scope named `"<name>: <label>"` (or just `label` under the root).
    pub fn sub(&self, label: impl Display) -> Context<'r> {
        Context {
            name: compose(&self.config.template, &self.name, &label.to_string()),
            reporter: self.reporter,
            config: self.config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &'r Config {
        self.config
    }

    /// Format `text` exactly as it would be reported with `severity` in this scope.
    pub fn message(&self, severity: Severity, text: impl Display) -> String {
        format_message(
            &self.config.template,
            self.config.verbose,
            &self.name,
            severity,
            &text.to_string(),
        )
    }

    pub fn log(&self, text: impl Display) {
        self.reporter.log(&self.message(Severity::Plain, text));
    }

    /// Report a failure and keep going.
    pub fn error(&self, text: impl Display) {
        self.reporter.error(&self.message(Severity::Error, text));
    }

    /// Report a failure and end the current element's lifecycle.
    pub fn fatal(&self, text: impl Display) -> ! {
        self.report(Severity::Fatal, text);
        unwind::unwind_fatal()
    }

    /// Mark the run as failed without a message.
    pub fn fail(&self) {
        self.reporter.fail();
    }

    /// Mark the run as failed and end the current element's lifecycle.
    pub fn fail_now(&self) -> ! {
        self.reporter.fail();
        unwind::unwind_fatal()
    }

    /// Opt out of the current test without failing it.
    pub fn skip(&self, reason: impl Display) -> ! {
        unwind::unwind_skip(reason.to_string())
    }

    pub fn failed(&self) -> bool {
        self.reporter.failed()
    }

    /// Report with an explicit severity. Fatal reports are recorded but do not unwind.
    pub(crate) fn report(&self, severity: Severity, text: impl Display) {
        let line = self.message(severity, text);
        match severity {
            Severity::Plain => self.reporter.log(&line),
            Severity::Error => self.reporter.error(&line),
            Severity::Fatal => self.reporter.fatal(&line),
        }
    }

    pub(crate) fn reporter(&self) -> &'r dyn Reporter {
        self.reporter
    }

    /// The same scope, reporting through a different reporter.
    pub(crate) fn with_reporter<'s>(&self, reporter: &'s dyn Reporter) -> Context<'s>
    where
        'r: 's,
    {
        Context {
            name: self.name.clone(),
            reporter,
            config: self.config,
        }
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").field("name", &self.name).finish_non_exhaustive()
    }
}
