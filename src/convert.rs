//! Front API: one `Converter` per source/target pair.
//!
//! `convert` is the whole contract: never panics on malformed input,
//! always returns best-effort output plus at most one fatal diagnostic,
//! and is deterministic: BTree/insertion-ordered collections everywhere,
//! no clocks, no randomness. Each call is an independent run over an
//! immutable snapshot of the input; there is no state to share or lock.

use serde::{Deserialize, Serialize};

use crate::diag::{Conversion, ConvertError, Warning};
use crate::{emit, parse};

/// The five supported notations. Every format is both a source and a
/// target; all pairs route through the same type-expression IR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    #[value(name = "ts", alias = "typescript")]
    TypeScript,
    #[value(name = "sql")]
    Sql,
    #[value(name = "proto", alias = "protobuf")]
    Proto,
    #[value(name = "json-schema", alias = "jsonschema")]
    JsonSchema,
    #[value(name = "zod")]
    Zod,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::TypeScript,
        Format::Sql,
        Format::Proto,
        Format::JsonSchema,
        Format::Zod,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Format::TypeScript => "ts",
            Format::Sql => "sql",
            Format::Proto => "proto",
            Format::JsonSchema => "json-schema",
            Format::Zod => "zod",
        }
    }
}

/// Resource ceilings the core honors before parsing. Oversized input is
/// refused outright, never silently truncated mid-token.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    pub max_input_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_input_bytes: 1024 * 1024 }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Converter {
    source: Format,
    target: Format,
    limits: Limits,
}

impl Converter {
    pub fn new(source: Format, target: Format) -> Self {
        Self { source, target, limits: Limits::default() }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn source(&self) -> Format {
        self.source
    }

    pub fn target(&self) -> Format {
        self.target
    }

    /// Run the pipeline over one input snapshot.
    pub fn convert(&self, text: &str) -> Conversion {
        if text.len() > self.limits.max_input_bytes {
            return Conversion::fatal(ConvertError::SizeLimitExceeded {
                len: text.len(),
                limit: self.limits.max_input_bytes,
            });
        }

        let mut warnings: Vec<Warning> = Vec::new();
        let parsed = match self.source {
            Format::TypeScript => parse::typescript::parse(text, &mut warnings),
            Format::Sql => parse::sql::parse(text, &mut warnings),
            Format::Proto => parse::proto::parse(text, &mut warnings),
            Format::JsonSchema => parse::json_schema::parse(text, &mut warnings),
            Format::Zod => parse::zod::parse(text, &mut warnings),
        };

        let decls = match parsed {
            Ok(decls) if decls.is_empty() => {
                return Conversion::fatal(ConvertError::SyntaxUnrecognized {
                    detail: format!("no {} declarations found", self.source.name()),
                });
            }
            Ok(decls) => decls,
            Err(detail) => {
                return Conversion::fatal(ConvertError::SyntaxUnrecognized { detail });
            }
        };

        let output = match self.target {
            Format::TypeScript => emit::typescript::emit(&decls),
            Format::Sql => emit::sql::emit(&decls, &mut warnings),
            Format::Proto => emit::proto::emit(&decls, &mut warnings),
            Format::JsonSchema => emit::json_schema::emit(&decls),
            Format::Zod => emit::zod::emit(&decls),
        };
        Conversion::ok(output, warnings)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_fatal_but_not_a_panic() {
        let out = Converter::new(Format::TypeScript, Format::Zod).convert("");
        assert!(matches!(
            out.diagnostic,
            Some(ConvertError::SyntaxUnrecognized { .. })
        ));
        assert!(out.output.is_empty());
    }

    #[test]
    fn oversized_input_is_refused_before_parsing() {
        let converter = Converter::new(Format::TypeScript, Format::Zod)
            .with_limits(Limits { max_input_bytes: 16 });
        let out = converter.convert("interface User { name: string; }");
        assert!(matches!(
            out.diagnostic,
            Some(ConvertError::SizeLimitExceeded { limit: 16, .. })
        ));
    }

    #[test]
    fn convert_is_deterministic() {
        let converter = Converter::new(Format::TypeScript, Format::JsonSchema);
        let src = "interface A { x: string | number; y?: B; }\ninterface B { z: string[]; }";
        assert_eq!(converter.convert(src).output, converter.convert(src).output);
    }
}
