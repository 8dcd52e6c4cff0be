//! Element casting: resolve a table slot to the runnables it describes.
//!
//! Resolution is single-level. A generator's output is taken to be concrete runnables, never more generators.

use tabletest_core::{Severity, short_type_name};
use tracing::debug;

use crate::context::Context;
use crate::element::Runnable;
use crate::errors::{Source, StructuralError};
use crate::table::Slot;
use crate::unwind::{Caught, protect};

/// What an element resolved to.
pub(crate) enum Resolution<'e> {
    /// The element is itself a runnable.
    Direct(&'e mut dyn Runnable),
    /// The element generated these runnables (possibly none).
    Generated(Vec<Box<dyn Runnable>>),
}

/// Resolve `slot` into runnables.
///
/// ## Parameters
/// - `ctx`: the element's scope; failures are reported here with fatal severity.
/// - `slot`: the table slot; `None` is a nil entry.
/// - `origin`: the kind of table the slot came from.
///
/// ## Returns
/// - (`Some(Resolution)`): the runnables to execute.
/// - (`None`): the element was rejected and the rejection has been reported.
///
/// ## Notes
/// - A generator is probed before the runnable capability, so an element offering both is expanded.
/// - Panics raised while generating are caught and reported as `"panic generating tests: <v>"`.
pub(crate) fn cast<'e>(
    ctx: &Context<'_>,
    slot: &'e mut Slot,
    origin: Source,
) -> Option<Resolution<'e>> {
    let Some(element) = slot.as_deref_mut() else {
        ctx.report(Severity::Fatal, StructuralError::NilElement { origin });
        return None;
    };

    if let Some(generator) = element.as_generator() {
        let type_name = short_type_name(generator.type_name());
        let mut produced = Vec::new();
        match protect(|| produced = generator.generate(ctx)) {
            None => {}
            Some(Caught::Fatal) => return None,
            Some(Caught::Skip(reason)) => {
                if ctx.config().verbose {
                    ctx.log(format_args!("skipped: {reason}"));
                }
                return None;
            }
            Some(Caught::Panic(v)) => {
                ctx.report(Severity::Fatal, format_args!("panic generating tests: {v}"));
                return None;
            }
        }
        return match collect_generated(type_name, produced) {
            Ok(runnables) => {
                debug!(scope = ctx.name(), count = runnables.len(), "generator expanded");
                Some(Resolution::Generated(runnables))
            }
            Err(err) => {
                ctx.report(Severity::Fatal, &err);
                None
            }
        };
    }

    let type_name = short_type_name(element.type_name());
    match element.as_runnable() {
        Some(runnable) => Some(Resolution::Direct(runnable)),
        None => {
            ctx.report(Severity::Fatal, StructuralError::NotRunnable { type_name });
            None
        }
    }
}

/// Unwrap generator output, rejecting it as a whole if any entry is nil.
fn collect_generated(
    type_name: String,
    produced: Vec<Option<Box<dyn Runnable>>>,
) -> Result<Vec<Box<dyn Runnable>>, StructuralError> {
    let positions: Vec<usize> = produced
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_none())
        .map(|(i, _)| i)
        .collect();
    if !positions.is_empty() {
        return Err(StructuralError::NilGenerated { type_name, positions });
    }
    Ok(produced.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::element::{Element, Generator, generated, generator, runnable};
    use crate::reporter::{Recorder, Reporter};

    struct Case;

    impl Runnable for Case {
        fn test(&mut self, _ctx: &Context<'_>) {}
    }

    struct Gen(usize);

    impl Generator for Gen {
        fn generate(&mut self, _ctx: &Context<'_>) -> Vec<Option<Box<dyn Runnable>>> {
            generated((0..self.0).map(|_| Case))
        }
    }

    struct Holey;

    impl Generator for Holey {
        fn generate(&mut self, _ctx: &Context<'_>) -> Vec<Option<Box<dyn Runnable>>> {
            let case = || Some(Box::new(Case) as Box<dyn Runnable>);
            vec![case(), None, case(), None]
        }
    }

    struct Exploding;

    impl Generator for Exploding {
        fn generate(&mut self, _ctx: &Context<'_>) -> Vec<Option<Box<dyn Runnable>>> {
            panic!("no tests today")
        }
    }

    struct Inert;

    impl Element for Inert {}

    fn resolve(slot: Slot, origin: Source) -> (Option<usize>, Recorder) {
        let recorder = Recorder::new();
        let config = Config::default();
        let ctx = Context::named("elem", &recorder, &config);
        let mut slot = slot;
        let count = cast(&ctx, &mut slot, origin).map(|r| match r {
            Resolution::Direct(_) => 1,
            Resolution::Generated(rs) => rs.len(),
        });
        (count, recorder)
    }

    #[test]
    fn test_direct_runnable() {
        let element = runnable(Case);
        let (count, recorder) = resolve(Some(element), Source::Sequence);
        assert_eq!(count, Some(1));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_nil_element() {
        let (count, recorder) = resolve(None, Source::Mapping);
        assert_eq!(count, None);
        assert_eq!(
            recorder.with_severity(Severity::Fatal),
            vec!["elem: nil mapping element"]
        );
    }

    #[test]
    fn test_not_runnable() {
        let element: Box<dyn Element> = Box::new(Inert);
        let (count, recorder) = resolve(Some(element), Source::Sequence);
        assert_eq!(count, None);
        assert_eq!(
            recorder.failures(),
            vec!["elem: element Inert does not implement Runnable or Generator"]
        );
    }

    #[test]
    fn test_generator_expands() {
        let element = generator(Gen(3));
        let (count, recorder) = resolve(Some(element), Source::Sequence);
        assert_eq!(count, Some(3));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_empty_generator_is_valid() {
        let element = generator(Gen(0));
        let (count, recorder) = resolve(Some(element), Source::Sequence);
        assert_eq!(count, Some(0));
        assert!(!recorder.failed());
    }

    #[test]
    fn test_nil_generated_reported_once() {
        let element = generator(Holey);
        let (count, recorder) = resolve(Some(element), Source::Sequence);
        assert_eq!(count, None);
        assert_eq!(
            recorder.failures(),
            vec!["elem: generator Holey returned nil runnables at positions [1, 3]"]
        );
    }

    #[test]
    fn test_generator_panic() {
        let element = generator(Exploding);
        let (count, recorder) = resolve(Some(element), Source::Sequence);
        assert_eq!(count, None);
        assert_eq!(
            recorder.failures(),
            vec!["elem: panic generating tests: no tests today"]
        );
    }
}
