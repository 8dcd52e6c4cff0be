//! The table dispatcher.
//!
//! Validates a table, then drives every element through casting and the lifecycle runner, depth first and in
//! table order. A failing element never stops its siblings.

use tabletest_core::{Severity, short_type_name};
use tracing::{debug, warn};

use crate::cast::{Resolution, cast};
use crate::config::Config;
use crate::context::Context;
use crate::element::{Element, Runnable};
use crate::errors::Source;
use crate::lifecycle;
use crate::reporter::Reporter;
use crate::table::{Slot, Table};
use crate::unwind::{Caught, protect};

/// Scope under which table-level diagnostics are reported.
pub const INTERNAL_SCOPE: &str = "internal table.Test";

/// Runs tables against a reporter with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every element of `table`, reporting through `reporter`.
    ///
    /// Nothing is returned; check `reporter.failed()` for the aggregate result.
    pub fn run(&self, reporter: &dyn Reporter, table: impl Into<Table>) {
        self.dispatch(reporter, table.into());
    }

    #[tracing::instrument(skip_all, fields(shape = table.shape_name(), len = table.len()))]
    fn dispatch(&self, reporter: &dyn Reporter, mut table: Table) {
        let root = Context::root(reporter, &self.config);

        if let Err(err) = table.validate() {
            warn!(%err, "table rejected");
            root.sub(INTERNAL_SCOPE)
                .sub("table validation")
                .report(Severity::Fatal, &err);
            return;
        }

        match &mut table {
            Table::Sequence(items) => {
                for (i, slot) in items.iter_mut().enumerate() {
                    let label = match slot.as_deref() {
                        Some(element) => match labelled(&root, i, || element_label(element, i)) {
                            Some(label) => label,
                            None => continue,
                        },
                        None => format!("<nil> {i}"),
                    };
                    self.element(&root.sub(label), slot, Source::Sequence);
                }
            }
            Table::Mapping(entries) => {
                for (ordinal, (key, slot)) in entries.iter_mut().enumerate() {
                    self.element(&root.sub(key.label(ordinal)), slot, Source::Mapping);
                }
            }
            // rejected by validate
            Table::Scalar(_) | Table::Absent => {}
        }
    }

    /// Cast one element and run what it resolves to, inside the element's own recovery boundary.
    fn element(&self, ctx: &Context<'_>, slot: &mut Slot, origin: Source) {
        debug!(scope = ctx.name(), "dispatching element");
        let caught = protect(|| match cast(ctx, slot, origin) {
            None => {}
            Some(Resolution::Direct(runnable)) => {
                lifecycle::run(ctx, runnable);
            }
            Some(Resolution::Generated(runnables)) => {
                for (j, mut runnable) in runnables.into_iter().enumerate() {
                    let Some(label) = labelled(ctx, j, || runnable_label(&*runnable, j)) else {
                        continue;
                    };
                    lifecycle::run(&ctx.sub(label), &mut *runnable);
                }
            }
        });

        match caught {
            None | Some(Caught::Fatal) => {}
            Some(Caught::Skip(reason)) => {
                if self.config.verbose {
                    ctx.log(format_args!("skipped: {reason}"));
                }
            }
            Some(Caught::Panic(v)) => {
                warn!(scope = ctx.name(), panic = %v, "element escaped its lifecycle");
                ctx.report(Severity::Fatal, format_args!("panic dispatching element: {v}"));
            }
        }
    }
}

/// Compute a client-supplied scope label inside a recovery boundary.
///
/// A panicking label abandons only the entry at `i`; the panic is reported fatally under `"<panicking label> <i>"`.
fn labelled(parent: &Context<'_>, i: usize, label: impl FnOnce() -> String) -> Option<String> {
    let mut text = String::new();
    match protect(|| text = label()) {
        None => Some(text),
        Some(Caught::Panic(v)) => {
            parent
                .sub(format_args!("<panicking label> {i}"))
                .report(Severity::Fatal, format_args!("panic computing label: {v}"));
            None
        }
        Some(Caught::Fatal | Caught::Skip(_)) => None,
    }
}

/// `"<label> <i>"`, falling back to the element's short type name.
fn element_label(element: &dyn Element, i: usize) -> String {
    match element.label() {
        Some(label) => format!("{label} {i}"),
        None => format!("{} {i}", short_type_name(element.type_name())),
    }
}

fn runnable_label(runnable: &dyn Runnable, j: usize) -> String {
    match runnable.label() {
        Some(label) => format!("{label} {j}"),
        None => format!("{} {j}", short_type_name(runnable.type_name())),
    }
}

/// Run `table` with the default configuration.
pub fn run_table(reporter: &dyn Reporter, table: impl Into<Table>) {
    Engine::default().run(reporter, table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::runnable;
    use crate::reporter::Recorder;

    struct Case(&'static str);

    impl Runnable for Case {
        fn test(&mut self, ctx: &Context<'_>) {
            ctx.log(self.0);
        }
    }

    #[test]
    fn test_sequence_labels() {
        let recorder = Recorder::new();
        run_table(&recorder, vec![Case("a"), Case("b")]);
        assert_eq!(recorder.lines(), vec!["Case 0: a", "Case 1: b"]);
    }

    #[test]
    fn test_nil_slot_label() {
        let recorder = Recorder::new();
        run_table(&recorder, Table::slots([Some(runnable(Case("a"))), None]));
        assert_eq!(recorder.lines(), vec!["Case 0: a", "<nil> 1: nil slice element"]);
    }

    #[test]
    fn test_validation_scope() {
        let recorder = Recorder::new();
        run_table(&recorder, Table::absent());
        assert_eq!(
            recorder.with_severity(Severity::Fatal),
            vec!["internal table.Test: table validation: table is invalid"]
        );
    }

    #[test]
    fn test_labelled_reports_panics() {
        let recorder = Recorder::new();
        let config = Config::default();
        let root = Context::root(&recorder, &config);
        assert_eq!(labelled(&root, 0, || "fine 0".to_string()), Some("fine 0".to_string()));
        assert_eq!(labelled(&root, 1, || panic!("label broke")), None);
        assert_eq!(
            recorder.with_severity(Severity::Fatal),
            vec!["<panicking label> 1: panic computing label: label broke"]
        );
    }

    #[test]
    fn test_engine_keeps_config() {
        let engine = Engine::new(Config::default().with_verbose(true));
        assert!(engine.config().verbose);
    }
}
