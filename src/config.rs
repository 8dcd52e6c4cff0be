//! Engine configuration
//!
//! Configuration is an explicit value threaded by reference through every naming context. It is fixed for the
//! duration of one table run.

use std::env;

use tabletest_core::{MessageTemplate, TemplateError};
use thiserror::Error;

/// Environment variable enabling verbose diagnostics.
pub const VERBOSE_VAR: &str = "TABLETEST_VERBOSE";
/// Environment variable overriding the two-slot message template.
pub const TEMPLATE_VAR: &str = "TABLETEST_MSG_FMT";

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {source}")]
    Template {
        var: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("invalid boolean {value:?} for {var}")]
    Bool { var: &'static str, value: String },
}

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Splice severity markers into names, and log passed and skipped tests
    pub verbose: bool,
    /// Two-slot template used to prefix every message with its scope name
    pub template: MessageTemplate,
    /// Report panics that no expectation explains with fatal severity instead of error severity
    pub fatal_unexpected_panics: bool,
}

impl Config {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable verbose diagnostics
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the message template
    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        self.template = template;
        self
    }

    /// Promote unexplained panics to fatal severity
    pub fn with_fatal_unexpected_panics(mut self, fatal: bool) -> Self {
        self.fatal_unexpected_panics = fatal;
        self
    }

    /// Read configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// ## Parameters
    /// - `lookup`: returns the value of a variable, or `None` when unset.
    ///
    /// ## Returns
    /// - (`Result<Config, ConfigError>`): the configuration, or the first invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(VERBOSE_VAR) {
            if let Some(verbose) = parse_bool(VERBOSE_VAR, &value)? {
                config.verbose = verbose;
            }
        }

        if let Some(value) = lookup(TEMPLATE_VAR) {
            config.template = MessageTemplate::parse(&value).map_err(|source| ConfigError::Template {
                var: TEMPLATE_VAR,
                source,
            })?;
        }

        Ok(config)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<Option<bool>, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Bool {
            var,
            value: value.to_string(),
        }),
    }
}
