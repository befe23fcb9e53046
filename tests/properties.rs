//! Property suites: determinism and malformed-input safety.
//!
//! The pipeline's contract is that arbitrary text is an expected input:
//! no panics, no unbounded recursion, and byte-identical output on
//! repeated calls.

use proptest::prelude::*;
use shapeshift::{Converter, Format};

fn all_formats() -> [Format; 5] {
    [Format::TypeScript, Format::Sql, Format::Proto, Format::JsonSchema, Format::Zod]
}

proptest! {
    /// convert(s) == convert(s), for any printable input.
    #[test]
    fn conversion_is_deterministic(src in "[ -~\\n\\t]{0,400}") {
        for from in all_formats() {
            let converter = Converter::new(from, Format::JsonSchema);
            let first = converter.convert(&src);
            let second = converter.convert(&src);
            prop_assert_eq!(first.output, second.output);
            prop_assert_eq!(first.warnings, second.warnings);
        }
    }

    /// No source grammar panics on arbitrary text, including unbalanced
    /// delimiters and stray quotes.
    #[test]
    fn malformed_input_never_panics(src in "[{}()\\[\\]<>'\"`;:,|&?!a-z0-9 \\n]{0,300}") {
        for from in all_formats() {
            for to in all_formats() {
                let _ = Converter::new(from, to).convert(&src);
            }
        }
    }

    /// Deeply nested braces terminate in bounded work.
    #[test]
    fn nesting_terminates(depth in 1usize..120) {
        let mut src = String::from("interface T { x: ");
        for _ in 0..depth {
            src.push_str("{ y: ");
        }
        src.push_str("string");
        for _ in 0..depth {
            src.push_str(" }");
        }
        src.push_str("; }");
        let out = Converter::new(Format::TypeScript, Format::Zod).convert(&src);
        prop_assert!(out.diagnostic.is_none());
    }
}

/// A plain test rather than a property, but it belongs with the suite
/// that guards the whole matrix.
#[test]
fn conversion_composes_with_itself_for_typescript() {
    // TS→TS output is valid TS input; converting twice must be stable
    // once the syntax is normalized.
    let src = "interface User { name: string; tags: (string | number)[]; pet?: Pet; }\n\
               interface Pet { kind: 'cat' | 'dog'; }";
    let converter = Converter::new(Format::TypeScript, Format::TypeScript);
    let once = converter.convert(src);
    assert!(once.diagnostic.is_none());
    let twice = converter.convert(&once.output);
    assert!(twice.diagnostic.is_none());
    assert_eq!(once.output, twice.output, "normalized output must be a fixed point");
}
