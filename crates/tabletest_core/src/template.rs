//! Two-slot message templates.
//!
//! A template is a string with exactly two `%s` (or `%v`) slots: the first receives the naming-context path, the
//! second receives the message body. `%%` renders a literal percent sign. Templates are validated once, up front,
//! so rendering can never fail.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The default template: `"<name>: <text>"`.
pub const DEFAULT_TEMPLATE: &str = "%s: %s";

/// Errors produced while parsing a message template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("message template {template:?} must contain exactly two %s slots, found {found}")]
    SlotCount { template: String, found: usize },

    #[error("message template {template:?} has unknown directive '%{directive}' at byte {offset}")]
    UnknownDirective {
        template: String,
        directive: char,
        offset: usize,
    },

    #[error("message template {template:?} ends with a dangling '%'")]
    Dangling { template: String },
}

/// A validated two-slot message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
    head: String,
    middle: String,
    tail: String,
}

impl MessageTemplate {
    /// Parse and validate a template.
    ///
    /// ## Parameters
    /// - `source`: template text with exactly two `%s`/`%v` slots.
    ///
    /// ## Returns
    /// - (`Result<MessageTemplate, TemplateError>`): the compiled template, or why it was rejected.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut parts = vec![String::new()];
        let mut chars = source.char_indices();

        while let Some((offset, c)) = chars.next() {
            if c != '%' {
                if let Some(part) = parts.last_mut() {
                    part.push(c);
                }
                continue;
            }
            match chars.next() {
                Some((_, 's' | 'v')) => parts.push(String::new()),
                Some((_, '%')) => {
                    if let Some(part) = parts.last_mut() {
                        part.push('%');
                    }
                }
                Some((_, directive)) => {
                    return Err(TemplateError::UnknownDirective {
                        template: source.to_string(),
                        directive,
                        offset,
                    });
                }
                None => {
                    return Err(TemplateError::Dangling {
                        template: source.to_string(),
                    });
                }
            }
        }

        let found = parts.len() - 1;
        let [head, middle, tail]: [String; 3] = parts.try_into().map_err(|_| TemplateError::SlotCount {
            template: source.to_string(),
            found,
        })?;

        Ok(Self {
            source: source.to_string(),
            head,
            middle,
            tail,
        })
    }

    /// Render the template with a name and a message body.
    pub fn render(&self, name: &str, text: &str) -> String {
        let mut out =
            String::with_capacity(self.head.len() + name.len() + self.middle.len() + text.len() + self.tail.len());
        out.push_str(&self.head);
        out.push_str(name);
        out.push_str(&self.middle);
        out.push_str(text);
        out.push_str(&self.tail);
        out
    }

    /// Return the template source as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
            head: String::new(),
            middle: ": ".to_string(),
            tail: String::new(),
        }
    }
}

impl FromStr for MessageTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
