//! Target-neutral type-expression IR.
//!
//! Every front-end maps its grammar into `TypeExpr`; every back-end renders
//! `TypeExpr` out. Union/intersection members are flattened and never a
//! single-member list (the `map` module's constructors enforce that), and
//! `Reference` names are only valid against the declaration set of the same
//! conversion pass; anything else degrades to `Unknown`.

use std::collections::BTreeSet;

/// Primitive scalar kinds, the lowest common denominator of the five
/// notations. `number`-style sources map to `Float`; column and IDL
/// grammars distinguish `Int`/`BigInt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prim {
    Str,
    Int,
    Float,
    BigInt,
    Bool,
    Date,
    Null,
    Never,
}

/// A literal value used as a type (enum member, const, literal type).
/// Numeric literals keep their source text so magnitudes beyond f64 survive
/// the trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lit {
    Str(String),
    Num(String),
    Bool(bool),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjField {
    pub key: String,
    pub expr: TypeExpr,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(Prim),
    Literal(Lit),
    Array(Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    /// Record / dictionary with uniform key and value types.
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// Inline structural object, not a named declaration.
    Object(Vec<ObjField>),
    /// Name of another declaration in the same pass.
    Reference(String),
    /// `X | null` collapsed into a wrapper instead of a binary union.
    Nullable(Box<TypeExpr>),
    /// The universal "accept anything" sentinel.
    Unknown,
}

impl TypeExpr {
    pub fn is_null(&self) -> bool {
        matches!(self, TypeExpr::Primitive(Prim::Null))
    }

    /// Collect every declaration name referenced anywhere under this
    /// expression. Used for emission ordering.
    pub fn collect_refs(&self, out: &mut BTreeSet<String>) {
        match self {
            TypeExpr::Reference(name) => {
                out.insert(name.clone());
            }
            TypeExpr::Array(el) | TypeExpr::Nullable(el) => el.collect_refs(out),
            TypeExpr::Tuple(xs) | TypeExpr::Union(xs) | TypeExpr::Intersection(xs) => {
                for x in xs {
                    x.collect_refs(out);
                }
            }
            TypeExpr::Map { key, value } => {
                key.collect_refs(out);
                value.collect_refs(out);
            }
            TypeExpr::Object(fields) => {
                for f in fields {
                    f.expr.collect_refs(out);
                }
            }
            _ => {}
        }
    }
}

/// If every member is a string literal, return the values in order.
pub fn all_string_literals(members: &[TypeExpr]) -> Option<Vec<&str>> {
    let mut out = Vec::with_capacity(members.len());
    for m in members {
        match m {
            TypeExpr::Literal(Lit::Str(s)) => out.push(s.as_str()),
            _ => return None,
        }
    }
    (!out.is_empty()).then_some(out)
}

// --------------------------- Mapped declarations --------------------------- //

/// A declaration after type mapping: the emitters' input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedDecl {
    pub name: String,
    pub body: Body,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Object(Vec<ObjField>),
    Alias(TypeExpr),
    /// Closed enumeration of literal values, in source order.
    Enum(Vec<Lit>),
}

impl MappedDecl {
    pub fn collect_refs(&self, out: &mut BTreeSet<String>) {
        match &self.body {
            Body::Object(fields) => {
                for f in fields {
                    f.expr.collect_refs(out);
                }
            }
            Body::Alias(expr) => expr.collect_refs(out),
            Body::Enum(_) => {}
        }
    }
}

/// Promote a mapped expression to a declaration body: inline objects become
/// object declarations, all-literal unions become closed enumerations,
/// everything else stays an alias.
pub fn body_from_expr(expr: TypeExpr) -> Body {
    match expr {
        TypeExpr::Object(fields) => Body::Object(fields),
        TypeExpr::Union(members) => {
            let all_literal = members.iter().all(|m| matches!(m, TypeExpr::Literal(_)));
            if all_literal && !members.is_empty() {
                let lits = members
                    .into_iter()
                    .map(|m| match m {
                        TypeExpr::Literal(l) => l,
                        _ => unreachable!("checked all members are literals"),
                    })
                    .collect();
                Body::Enum(lits)
            } else {
                Body::Alias(TypeExpr::Union(members))
            }
        }
        other => Body::Alias(other),
    }
}
