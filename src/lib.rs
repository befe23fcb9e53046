//! Schema transpiler: convert structural type descriptions between
//! TypeScript, SQL, Zod, Protobuf, and JSON Schema.
//!
//! One pipeline serves every pair: delimiter-aware scanning (`scan`) →
//! declaration extraction (`parse::*`) → recursive type-expression mapping
//! into a target-neutral IR (`expr`, `map`) → emission (`emit::*`).
//!
//! Design goals:
//! - Malformed input is a first-class case: degrade per declaration or per
//!   field, never panic, at most one fatal diagnostic per document.
//! - Deterministic output: same input, same bytes, every time.
//! - Bounded work per call: an input-size ceiling up front and a hard
//!   recursion depth guard inside the mapper.

pub mod cli;
pub mod convert;
pub mod decl;
pub mod diag;
pub mod emit;
pub mod expr;
pub mod map;
pub mod parse;
pub mod scan;

pub use convert::{Converter, Format, Limits};
pub use diag::{Conversion, ConvertError, Warning};
