//! Provide pure, shared message-formatting helpers for the tabletest engine and its host adapters.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that both:
//! - the engine uses to prefix every diagnostic with its naming-context path, and
//! - host adapters (or tests) can use to predict the exact text the engine will emit.
//!
//! ## Notes
//!
//! - This is a “formatting core” crate: **no IO**, no global state, and no engine types.
//! - Current scope: severity vocabulary, the two-slot message template, verbose severity splicing, and short
//!   type-name rendering for element labels.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod names;
pub mod severity;
pub mod template;

pub use names::short_type_name;
pub use severity::Severity;
pub use template::{DEFAULT_TEMPLATE, MessageTemplate, TemplateError};

/// Compose a named message using a two-slot template.
///
/// ## Parameters
/// - `template`: the template whose first slot receives `name` and second slot receives `text`.
/// - `name`: the naming-context path; empty for the root context.
/// - `text`: the message body.
///
/// ## Returns
/// - (`String`): `text` unchanged when `name` is empty, otherwise the rendered template.
///
/// ## Examples
/// ```rust
/// use tabletest_core::{MessageTemplate, compose};
/// let template = MessageTemplate::default();
/// assert_eq!(compose(&template, "", "hello"), "hello");
/// assert_eq!(compose(&template, "scope", "hello"), "scope: hello");
/// ```
pub fn compose(template: &MessageTemplate, name: &str, text: &str) -> String {
    if name.is_empty() {
        text.to_string()
    } else {
        template.render(name, text)
    }
}

/// Compute the name portion of a diagnostic for a severity.
///
/// In verbose mode the severity marker is spliced into the *name*, so `"scope"` becomes `"scope error"` or
/// `"scope fatal"`. Plain messages and non-verbose messages keep the name unchanged.
///
/// ## Notes
/// - A root (empty) name becomes the bare marker (`"error"`), never a name with a leading space.
pub fn severity_name(name: &str, severity: Severity, verbose: bool) -> String {
    match severity.marker() {
        Some(marker) if verbose && name.is_empty() => marker.to_string(),
        Some(marker) if verbose => format!("{name} {marker}"),
        _ => name.to_string(),
    }
}

/// Format a diagnostic exactly as the engine emits it.
///
/// ## Parameters
/// - `template`: the active two-slot template.
/// - `verbose`: whether verbose severity splicing is enabled.
/// - `name`: the naming-context path.
/// - `severity`: plain, error or fatal.
/// - `text`: the message body.
///
/// ## Returns
/// - (`String`): the final line handed to the reporting capability.
///
/// ## Examples
/// ```rust
/// use tabletest_core::{MessageTemplate, Severity, format_message};
/// let template = MessageTemplate::default();
/// assert_eq!(format_message(&template, false, "scope", Severity::Error, "boom"), "scope: boom");
/// assert_eq!(format_message(&template, true, "scope", Severity::Error, "boom"), "scope error: boom");
/// assert_eq!(format_message(&template, true, "scope", Severity::Fatal, "boom"), "scope fatal: boom");
/// ```
pub fn format_message(template: &MessageTemplate, verbose: bool, name: &str, severity: Severity, text: &str) -> String {
    compose(template, &severity_name(name, severity, verbose), text)
}
