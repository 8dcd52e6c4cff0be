//! Structural errors: a malformed table or a malformed element.
//!
//! These carry the canonical diagnostic text. They are always reported with fatal severity against the most
//! specific scope, and always end that scope's processing.

use std::fmt;

use thiserror::Error;

/// Where an element came from; used to word nil-element diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Sequence,
    Mapping,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Sequence => f.write_str("slice"),
            Source::Mapping => f.write_str("mapping"),
        }
    }
}

/// A malformed table or element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("table is invalid")]
    InvalidTable,

    #[error("table {type_name} is not a sequence or mapping")]
    NotATable { type_name: String },

    #[error("empty table")]
    EmptyTable,

    #[error("duplicate mapping key {key:?}")]
    DuplicateKey { key: String },

    #[error("nil {origin} element")]
    NilElement { origin: Source },

    #[error("element {type_name} does not implement Runnable or Generator")]
    NotRunnable { type_name: String },

    #[error("generator {type_name} returned nil runnables at positions {positions:?}")]
    NilGenerated { type_name: String, positions: Vec<usize> },
}
