//! Source-grammar front-ends.
//!
//! Each front-end is an extractor plus a type-expression mapper for one
//! notation, built on the `scan` primitives and the shared `map` machinery.
//! All of them share the same contract: best-effort extraction, warnings
//! for anything skipped or degraded, `Err` only when the document as a
//! whole is unreadable (the caller turns that into `SyntaxUnrecognized`).

pub mod json_schema;
pub mod proto;
pub mod sql;
pub mod typescript;
pub mod zod;
