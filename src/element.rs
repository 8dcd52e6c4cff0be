//! Capability interfaces for table elements.
//!
//! Elements are polymorphic over an open set of capabilities, probed at dispatch time:
//!
//! - `Runnable` is one test. Its optional capabilities (`Before`, `After`, `Panics`) are exposed through `as_*`
//!   probes that return `None` unless the implementor opts in:
//!
//!   ```rust
//!   use tabletest::{Before, Context, Runnable};
//!
//!   struct Case { input: i32, doubled: i32 }
//!
//!   impl Runnable for Case {
//!       fn test(&mut self, ctx: &Context<'_>) {
//!           if self.doubled != self.input * 2 {
//!               ctx.error(format_args!("{} != {}", self.doubled, self.input * 2));
//!           }
//!       }
//!       fn as_before(&mut self) -> Option<&mut dyn Before> {
//!           Some(self)
//!       }
//!   }
//!
//!   impl Before for Case {
//!       fn before(&mut self, _ctx: &Context<'_>) {
//!           self.doubled = self.input + self.input;
//!       }
//!   }
//!   ```
//!
//! - `Generator` expands into zero or more runnables.
//! - `Element` is what a table holds: something that may be a runnable, a generator, or neither.

use std::any::type_name;

use crate::context::Context;
use crate::expectation::PanicExpectation;

/// A unit of test logic.
///
/// Failures are reported through `ctx`; there is no return channel.
pub trait Runnable {
    fn test(&mut self, ctx: &Context<'_>);

    /// Setup capability.
    fn as_before(&mut self) -> Option<&mut dyn Before> {
        None
    }

    /// Teardown capability.
    fn as_after(&mut self) -> Option<&mut dyn After> {
        None
    }

    /// Panic-expectation capability.
    fn as_panics(&self) -> Option<&dyn Panics> {
        None
    }

    /// Display label used instead of the type name when naming this test's scope.
    fn label(&self) -> Option<String> {
        None
    }

    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Runs before `Runnable::test`, in a `"before test"` scope.
pub trait Before {
    fn before(&mut self, ctx: &Context<'_>);
}

/// Runs after `Runnable::test` however it ended, in an `"after test"` scope.
pub trait After {
    fn after(&mut self, ctx: &Context<'_>);
}

/// Declares that panicking is part of the expected behavior.
pub trait Panics {
    fn panics(&self) -> Vec<PanicExpectation>;
}

/// Expands into runnables at dispatch time.
///
/// `None` entries are invalid; they are collected and reported together.
pub trait Generator {
    fn generate(&mut self, ctx: &Context<'_>) -> Vec<Option<Box<dyn Runnable>>>;

    fn label(&self) -> Option<String> {
        None
    }

    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// A table entry of not-yet-known capability.
///
/// Implement the probes for the capabilities a type actually has; an element with neither probe is rejected at
/// dispatch time.
pub trait Element {
    fn as_runnable(&mut self) -> Option<&mut dyn Runnable> {
        None
    }

    fn as_generator(&mut self) -> Option<&mut dyn Generator> {
        None
    }

    fn label(&self) -> Option<String> {
        None
    }

    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

// ============================================================================
// Forwarding impls
// ============================================================================

impl<R: Runnable + ?Sized> Runnable for Box<R> {
    fn test(&mut self, ctx: &Context<'_>) {
        (**self).test(ctx)
    }

    fn as_before(&mut self) -> Option<&mut dyn Before> {
        (**self).as_before()
    }

    fn as_after(&mut self) -> Option<&mut dyn After> {
        (**self).as_after()
    }

    fn as_panics(&self) -> Option<&dyn Panics> {
        (**self).as_panics()
    }

    fn label(&self) -> Option<String> {
        (**self).label()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&mut self, ctx: &Context<'_>) -> Vec<Option<Box<dyn Runnable>>> {
        (**self).generate(ctx)
    }

    fn label(&self) -> Option<String> {
        (**self).label()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<E: Element + ?Sized> Element for Box<E> {
    fn as_runnable(&mut self) -> Option<&mut dyn Runnable> {
        (**self).as_runnable()
    }

    fn as_generator(&mut self) -> Option<&mut dyn Generator> {
        (**self).as_generator()
    }

    fn label(&self) -> Option<String> {
        (**self).label()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

// ============================================================================
// Adapters
// ============================================================================

/// Present a runnable as a table element.
#[derive(Debug, Clone, Default)]
pub struct AsRunnable<R>(pub R);

impl<R: Runnable> Element for AsRunnable<R> {
    fn as_runnable(&mut self) -> Option<&mut dyn Runnable> {
        Some(&mut self.0)
    }

    fn label(&self) -> Option<String> {
        self.0.label()
    }

    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

/// Present a generator as a table element.
#[derive(Debug, Clone, Default)]
pub struct AsGenerator<G>(pub G);

impl<G: Generator> Element for AsGenerator<G> {
    fn as_generator(&mut self) -> Option<&mut dyn Generator> {
        Some(&mut self.0)
    }

    fn label(&self) -> Option<String> {
        self.0.label()
    }

    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

/// Box a runnable as a table element.
pub fn runnable<R: Runnable + 'static>(r: R) -> Box<dyn Element> {
    Box::new(AsRunnable(r))
}

/// Box a generator as a table element.
pub fn generator<G: Generator + 'static>(g: G) -> Box<dyn Element> {
    Box::new(AsGenerator(g))
}

/// Collect runnables into generator output.
pub fn generated<R, I>(items: I) -> Vec<Option<Box<dyn Runnable>>>
where
    R: Runnable + 'static,
    I: IntoIterator<Item = R>,
{
    items
        .into_iter()
        .map(|r| Some(Box::new(r) as Box<dyn Runnable>))
        .collect()
}

// ============================================================================
// Closure-backed runnables
// ============================================================================

/// A runnable backed by a closure.
pub struct FnTest<F> {
    name: Option<String>,
    f: F,
}

impl<F> FnTest<F>
where
    F: FnMut(&Context<'_>),
{
    pub fn new(f: F) -> Self {
        Self { name: None, f }
    }

    /// Label this test's scope.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<F> Runnable for FnTest<F>
where
    F: FnMut(&Context<'_>),
{
    fn test(&mut self, ctx: &Context<'_>) {
        (self.f)(ctx)
    }

    fn label(&self) -> Option<String> {
        self.name.clone()
    }

    fn type_name(&self) -> &'static str {
        "FnTest"
    }
}

/// Wrap a closure as a runnable.
pub fn test_fn<F>(f: F) -> FnTest<F>
where
    F: FnMut(&Context<'_>),
{
    FnTest::new(f)
}
