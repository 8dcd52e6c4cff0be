#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
//! Table-driven test execution engine
//!
//! A table is a sequence or mapping of elements. Each element is probed for capabilities: a `Runnable` is one
//! test, a `Generator` expands into several. Every runnable goes through a fixed lifecycle (optional setup, the test
//! body, optional teardown) with panics caught per phase and reconciled against declared `PanicExpectation`s.
//! Every diagnostic is prefixed with the path of nested scopes that produced it:
//!
//! ```text
//! Case 2: panic expectation 0: unexpected panic (doesn't contain "badgers"): gophers
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use tabletest::{Context, Runnable, check};
//!
//! struct Add { a: i32, b: i32, sum: i32 }
//!
//! impl Runnable for Add {
//!     fn test(&mut self, ctx: &Context<'_>) {
//!         if self.a + self.b != self.sum {
//!             ctx.error(format_args!("{} + {} != {}", self.a, self.b, self.sum));
//!         }
//!     }
//! }
//!
//! check(vec![Add { a: 1, b: 2, sum: 3 }, Add { a: 2, b: 2, sum: 4 }]);
//! ```
//!
//! ## Panic Policy
//!
//! - **Engine code** never unwraps. Panics raised by client code are caught at phase boundaries and reported.
//! - **Control transfers** (`Context::fatal`, `Context::fail_now`, `Context::skip`) unwind with private payloads
//!   that only the engine's recovery boundaries catch.
//! - **Host adapter**: `check` panics once, after the whole table has run, if anything failed.

mod cast;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod element;
pub mod errors;
pub mod expectation;
pub mod host;
pub mod lifecycle;
pub mod reporter;
pub mod table;
mod unwind;

pub use config::{Config, ConfigError};
pub use context::Context;
pub use dispatch::{Engine, run_table};
pub use element::{
    After, AsGenerator, AsRunnable, Before, Element, FnTest, Generator, Panics, Runnable, generated, generator,
    runnable, test_fn,
};
pub use errors::{Source, StructuralError};
pub use expectation::{PanicCallback, PanicExpectation};
pub use host::{HostReporter, TableFailures, check, check_with, init_tracing, quiet_panics};
pub use lifecycle::{Outcome, Phase};
pub use reporter::{Entry, Recorder, Reporter};
pub use table::{Key, Slot, Table};
pub use unwind::panic_text;

pub use tabletest_core::{MessageTemplate, Severity, TemplateError};
