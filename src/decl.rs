//! Raw declaration model, the extractor's output.
//!
//! A `Declaration` is created once per source document parse and immutable
//! afterward; the mapper reads the set through a by-name lookup and never
//! mutates it. Field types are still raw source text here: interpreting
//! them is the mapper's job.

/// What shape of declaration the extractor found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    /// Braced body with named fields (interface, table, message).
    ObjectLike,
    /// `name = <expression>` with the expression kept verbatim.
    AliasExpression,
    /// A dedicated closed-enumeration construct (enum block, value list).
    EnumLike,
}

/// One field line of an object-like declaration. `key` may still need
/// escaping in the target notation; that is an emission-time concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub raw_type: String,
    pub optional: bool,
}

/// A named top-level declaration.
///
/// Invariants: `fields` is empty iff `kind != ObjectLike`; `alias_body` is
/// set iff `kind != ObjectLike`. The constructors below are the only way
/// the front-ends build these, which keeps the invariant in one place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub fields: Vec<Field>,
    pub alias_body: Option<String>,
}

impl Declaration {
    pub fn object(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self { name: name.into(), kind: DeclKind::ObjectLike, fields, alias_body: None }
    }

    pub fn alias(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DeclKind::AliasExpression,
            fields: Vec::new(),
            alias_body: Some(body.into()),
        }
    }

    pub fn enumeration(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DeclKind::EnumLike,
            fields: Vec::new(),
            alias_body: Some(body.into()),
        }
    }
}
