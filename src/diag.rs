//! Conversion outcome and diagnostics.
//!
//! Two tiers, per the error policy:
//! - `ConvertError`: document-fatal; the result carries placeholder output.
//! - `Warning`: locally recovered; the affected field degrades to the
//!   unknown sentinel (or a fallback column type) and conversion continues.
//!
//! The pipeline never panics on malformed input; malformed input is an
//! expected, first-class case.

use thiserror::Error;

/// Document-fatal failures. At most one per conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("no declarations recognized: {detail}")]
    SyntaxUnrecognized { detail: String },

    #[error("input is {len} bytes; refusing anything over {limit} bytes")]
    SizeLimitExceeded { len: usize, limit: usize },
}

/// Recoverable degradations, attached to the result in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("`{decl}`: unbalanced delimiter, declaration skipped")]
    UnbalancedDelimiter { decl: String },

    #[error("`{context}`: nesting exceeds depth {limit}, mapped to the unknown type")]
    DepthExceeded { context: String, limit: usize },

    #[error("`{name}` is not declared in this document, mapped to the unknown type")]
    UnknownReference { name: String },

    #[error("numeric value {value} is outside the safe integer range")]
    NumericRange { value: String },

    #[error("`{context}`: {detail}")]
    Unrepresentable { context: String, detail: String },
}

/// What `Converter::convert` hands back. Always a best-effort `output`;
/// `diagnostic` is set only for the document-fatal cases.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub output: String,
    pub diagnostic: Option<ConvertError>,
    pub warnings: Vec<Warning>,
}

impl Conversion {
    pub fn ok(output: String, warnings: Vec<Warning>) -> Self {
        Self { output, diagnostic: None, warnings }
    }

    /// Document-fatal: placeholder output plus the diagnostic.
    pub fn fatal(diagnostic: ConvertError) -> Self {
        Self { output: String::new(), diagnostic: Some(diagnostic), warnings: Vec::new() }
    }

    pub fn is_fatal(&self) -> bool {
        self.diagnostic.is_some()
    }
}
