//! Client-style tables exercising `format!`.
//!
//! Two rows in each table are wrong on purpose, so the tests assert exactly which rows fail and with what text.
//! The generator variant builds the same cases through a flat description struct that expands, at dispatch
//! time, into runnables with setup.

use tabletest::{
    Before, Context, Generator, Recorder, Reporter, Runnable, Table, check, generated, run_table,
};

#[derive(Debug)]
struct Pair<T> {
    a: T,
    b: T,
}

/// One `format!` call and the text it should produce.
struct SprintfTest {
    call: &'static str,
    render: fn() -> String,
    expected: &'static str,
}

impl Runnable for SprintfTest {
    fn test(&mut self, ctx: &Context<'_>) {
        let out = (self.render)();
        if out != self.expected {
            ctx.error(format_args!("{} => {:?} != {:?}", self.call, out, self.expected));
        }
    }
}

macro_rules! sprintf {
    ($fmt:literal, $v:expr => $expected:expr) => {
        SprintfTest {
            call: concat!("format!(", stringify!($fmt), ")"),
            render: || format!($fmt, $v),
            expected: $expected,
        }
    };
}

fn sprintf_table() -> Vec<SprintfTest> {
    vec![
        sprintf!("{:>4}", "foo" => " foo"),
        sprintf!("{:<4}", "foo" => "foo "),
        sprintf!("{:5}", 1337 => " 1337"),
        sprintf!("{:<5}", 1337 => "1337 "),
        sprintf!("{:e}", 1500.0 => "1.5e3"),
        sprintf!("{:?}", (2.125, 1.5) => "(2.125, 1.5)"),
        sprintf!("{:x}", 255 => "0xff"), // wrong: needs `{:#x}`
        sprintf!("{:?}", [1, 2] => "[1, 2]"),
        sprintf!("{:?}", ["1", "2"] => r#"["1", "2"]"#),
        sprintf!("{:?}", Pair { a: 1, b: 2 } => "Pair { a: 1, b: 2 }"),
        sprintf!("{:?}", Pair { a: "1", b: "2" } => "Pair { a: 1, b: 2 }"), // wrong: strings are quoted
        sprintf!("{:#x}", 255 => "0xff"),
    ]
}

fn broken_rows(prefix: impl Fn(usize) -> String) -> Vec<String> {
    vec![
        format!("{}: format!(\"{{:x}}\") => \"ff\" != \"0xff\"", prefix(6)),
        format!(
            "{}: format!(\"{{:?}}\") => {:?} != {:?}",
            prefix(10),
            r#"Pair { a: "1", b: "2" }"#,
            "Pair { a: 1, b: 2 }"
        ),
    ]
}

// ============================================================================
// Runnable table
// ============================================================================

#[test]
fn test_sprintf_table_reports_only_broken_rows() {
    let recorder = Recorder::new();
    run_table(&recorder, sprintf_table());
    assert!(recorder.failed());
    assert_eq!(recorder.failures(), broken_rows(|i| format!("SprintfTest {i}")));
}

#[test]
fn test_sprintf_passing_rows_through_host() {
    let passing: Vec<SprintfTest> = sprintf_table()
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != 6 && *i != 10)
        .map(|(_, t)| t)
        .collect();
    check(passing);
}

#[test]
#[should_panic(expected = "table test failed")]
fn test_sprintf_full_table_fails_through_host() {
    check(sprintf_table());
}

// ============================================================================
// Generator table
// ============================================================================

/// A case with its output computed during setup.
struct SprinterOutputTest {
    call: &'static str,
    render: fn() -> String,
    out: String,
    expected: &'static str,
}

impl Runnable for SprinterOutputTest {
    fn test(&mut self, ctx: &Context<'_>) {
        if self.out != self.expected {
            ctx.error(format_args!("{} => {:?} != {:?}", self.call, self.out, self.expected));
        }
    }

    fn as_before(&mut self) -> Option<&mut dyn Before> {
        Some(self)
    }

    fn label(&self) -> Option<String> {
        Some(self.call.to_string())
    }
}

impl Before for SprinterOutputTest {
    fn before(&mut self, _ctx: &Context<'_>) {
        self.out = (self.render)();
    }
}

/// Flat table row that expands into a `SprinterOutputTest`.
struct SprinterTest(SprintfTest);

impl Generator for SprinterTest {
    fn generate(&mut self, _ctx: &Context<'_>) -> Vec<Option<Box<dyn Runnable>>> {
        generated([SprinterOutputTest {
            call: self.0.call,
            render: self.0.render,
            out: String::new(),
            expected: self.0.expected,
        }])
    }
}

#[test]
fn test_sprinter_generator_table() {
    let recorder = Recorder::new();
    run_table(&recorder, Table::generators(sprintf_table().into_iter().map(SprinterTest)));
    assert_eq!(
        recorder.failures(),
        broken_rows(|i| {
            let call = if i == 6 { "format!(\"{:x}\")" } else { "format!(\"{:?}\")" };
            format!("SprinterTest {i}: {call} 0")
        })
    );
}
