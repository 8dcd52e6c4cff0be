//! Panic expectations.
//!
//! A runnable that is *supposed* to panic declares what the panic should look like. Each expectation is checked
//! against the panic's text:
//! - `Contains`: the text must contain a literal substring.
//! - `Matches`: the text must match a compiled pattern.
//! - `Callback`: custom validation that reports through its own scope.
//!
//! `Malformed` stands for an expectation that could not be built (an absent entry, or a pattern that failed to
//! compile). It is reported when the expectations are fetched and otherwise ignored.

use std::fmt;

use regex::Regex;

use crate::context::Context;

/// Custom panic validation; receives a `"callback function"` scope and the panic text.
pub type PanicCallback = Box<dyn Fn(&Context<'_>, &str)>;

/// A declared expectation about an intentional panic.
pub enum PanicExpectation {
    Contains(String),
    Matches(Regex),
    Callback(PanicCallback),
    Malformed(String),
}

impl PanicExpectation {
    pub fn contains(needle: impl Into<String>) -> Self {
        PanicExpectation::Contains(needle.into())
    }

    /// Compile `pattern`; an invalid pattern becomes a `Malformed` expectation.
    pub fn pattern(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => PanicExpectation::Matches(re),
            Err(err) => PanicExpectation::Malformed(format!("invalid panic pattern {pattern:?}: {err}")),
        }
    }

    pub fn callback(f: impl Fn(&Context<'_>, &str) + 'static) -> Self {
        PanicExpectation::Callback(Box::new(f))
    }

    /// The expectation used for an absent list entry.
    pub fn missing() -> Self {
        PanicExpectation::Malformed("nil PanicExpectation".to_string())
    }

    /// Why this expectation cannot be applied, if it is malformed.
    pub fn problem(&self) -> Option<&str> {
        match self {
            PanicExpectation::Malformed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Check `text` against this expectation, reporting a mismatch through `ctx`.
    ///
    /// Callbacks run with a `"callback function"` child scope and do their own reporting.
    pub(crate) fn apply(&self, ctx: &Context<'_>, text: &str) {
        match self {
            PanicExpectation::Contains(needle) => {
                if !text.contains(needle.as_str()) {
                    ctx.error(format_args!("unexpected panic (doesn't contain {needle:?}): {text}"));
                }
            }
            PanicExpectation::Matches(re) => {
                if !re.is_match(text) {
                    ctx.error(format_args!("unexpected panic (doesn't match {re}): {text}"));
                }
            }
            PanicExpectation::Callback(f) => f(&ctx.sub("callback function"), text),
            PanicExpectation::Malformed(_) => {}
        }
    }
}

impl From<&str> for PanicExpectation {
    fn from(needle: &str) -> Self {
        PanicExpectation::contains(needle)
    }
}

impl From<String> for PanicExpectation {
    fn from(needle: String) -> Self {
        PanicExpectation::Contains(needle)
    }
}

impl From<Regex> for PanicExpectation {
    fn from(re: Regex) -> Self {
        PanicExpectation::Matches(re)
    }
}

impl From<Option<PanicExpectation>> for PanicExpectation {
    fn from(exp: Option<PanicExpectation>) -> Self {
        exp.unwrap_or_else(PanicExpectation::missing)
    }
}

impl fmt::Display for PanicExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanicExpectation::Contains(needle) => write!(f, "{needle:?}"),
            PanicExpectation::Matches(re) => write!(f, "/{re}/"),
            PanicExpectation::Callback(_) => f.write_str("<callback>"),
            PanicExpectation::Malformed(reason) => write!(f, "<malformed: {reason}>"),
        }
    }
}

impl fmt::Debug for PanicExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanicExpectation::Contains(needle) => f.debug_tuple("Contains").field(needle).finish(),
            PanicExpectation::Matches(re) => f.debug_tuple("Matches").field(&re.as_str()).finish(),
            PanicExpectation::Callback(_) => f.write_str("Callback(..)"),
            PanicExpectation::Malformed(reason) => f.debug_tuple("Malformed").field(reason).finish(),
        }
    }
}

/// Render a list of expectations as `["a" /b/]`.
pub(crate) fn describe<'a>(exps: impl IntoIterator<Item = &'a PanicExpectation>) -> String {
    let items: Vec<String> = exps.into_iter().map(|e| e.to_string()).collect();
    format!("[{}]", items.join(" "))
}
