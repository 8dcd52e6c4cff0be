//! Recovery boundaries.
//!
//! Every protected phase runs inside `protect`, which turns an abnormal unwind into a typed `Caught` value. Two
//! private payloads are engine control transfers rather than test panics: `FatalUnwind` (a fatal report has already
//! been recorded) and `SkipUnwind` (the test opted out).

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

thread_local! {
    /// Number of recovery boundaries active on this thread.
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Marks one active boundary for as long as it lives.
struct Boundary;

impl Boundary {
    fn enter() -> Self {
        DEPTH.with(|d| d.set(d.get() + 1));
        Boundary
    }
}

impl Drop for Boundary {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Whether the current thread is running inside a recovery boundary, where any panic will be caught.
pub(crate) fn inside_boundary() -> bool {
    DEPTH.with(|d| d.get() > 0)
}

/// Payload unwound by `Context::fatal` after the failure has been recorded.
pub(crate) struct FatalUnwind;

/// Payload unwound by `Context::skip`.
pub(crate) struct SkipUnwind(pub(crate) String);

/// What a recovery boundary caught.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Caught {
    /// A fatal report ended the phase; it is already reported.
    Fatal,
    /// The test skipped itself with a reason.
    Skip(String),
    /// A genuine panic, rendered as text.
    Panic(String),
}

/// Run `f`, converting any unwind into a `Caught` value.
pub(crate) fn protect<F: FnOnce()>(f: F) -> Option<Caught> {
    let _boundary = Boundary::enter();
    panic::catch_unwind(AssertUnwindSafe(f)).err().map(classify)
}

/// Unwind with the fatal sentinel.
pub(crate) fn unwind_fatal() -> ! {
    panic::resume_unwind(Box::new(FatalUnwind))
}

/// Unwind with the skip sentinel.
pub(crate) fn unwind_skip(reason: String) -> ! {
    panic::resume_unwind(Box::new(SkipUnwind(reason)))
}

fn classify(payload: Box<dyn Any + Send>) -> Caught {
    if payload.is::<FatalUnwind>() {
        return Caught::Fatal;
    }
    match payload.downcast::<SkipUnwind>() {
        Ok(skip) => Caught::Skip(skip.0),
        Err(payload) => Caught::Panic(panic_text(payload.as_ref())),
    }
}

/// Render a panic payload as text.
///
/// `panic!` payloads are either `&'static str` or `String`; anything else (from `panic_any` or
/// `resume_unwind`) has no textual form and renders as `Box<dyn Any>`.
pub fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_return_catches_nothing() {
        assert_eq!(protect(|| {}), None);
    }

    #[test]
    fn test_str_panic() {
        assert_eq!(protect(|| panic!("gophers")), Some(Caught::Panic("gophers".to_string())));
    }

    #[test]
    fn test_formatted_panic() {
        let n = 3;
        assert_eq!(
            protect(|| panic!("{n} gophers")),
            Some(Caught::Panic("3 gophers".to_string()))
        );
    }

    #[test]
    fn test_opaque_panic() {
        assert_eq!(
            protect(|| std::panic::panic_any(42_u8)),
            Some(Caught::Panic("Box<dyn Any>".to_string()))
        );
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(protect(|| unwind_fatal()), Some(Caught::Fatal));
        assert_eq!(
            protect(|| unwind_skip("later".to_string())),
            Some(Caught::Skip("later".to_string()))
        );
    }

    #[test]
    fn test_boundary_depth_is_tracked() {
        assert!(!inside_boundary());
        let mut inside = false;
        let caught = protect(|| {
            inside = inside_boundary();
            panic!("gophers")
        });
        assert!(inside);
        assert!(caught.is_some());
        assert!(!inside_boundary());
    }

    #[test]
    fn test_nested_boundaries() {
        let outer = protect(|| {
            let inner = protect(|| panic!("inner"));
            assert_eq!(inner, Some(Caught::Panic("inner".to_string())));
            unwind_fatal();
        });
        assert_eq!(outer, Some(Caught::Fatal));
    }
}
