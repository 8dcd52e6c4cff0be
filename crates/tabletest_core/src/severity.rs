//! Severity vocabulary for diagnostics.

use std::fmt;

/// Represent the severity class of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A log line; never a failure.
    Plain,
    /// A non-terminating failure.
    Error,
    /// A terminating failure (ends the current element's lifecycle).
    Fatal,
}

impl Severity {
    /// Return the marker spliced into names in verbose mode, if any.
    ///
    /// ## Returns
    /// - (`Option<&'static str>`): `"error"` / `"fatal"`, or `None` for plain messages.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Severity::Plain => None,
            Severity::Error => Some("error"),
            Severity::Fatal => Some("fatal"),
        }
    }

    /// Check whether this severity marks the enclosing test as failed.
    pub fn is_failure(self) -> bool {
        !matches!(self, Severity::Plain)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker().unwrap_or("log"))
    }
}
