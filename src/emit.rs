//! Target-syntax emitters.
//!
//! Emission is a pure function of the mapped declaration list: no parsing,
//! no I/O, and the only failures it can express are `Unrepresentable`
//! warnings on the shapes a target cannot carry. The shared helpers here
//! cover the two concerns every back-end has: identifier hygiene and
//! deterministic referenced-first ordering.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::expr::MappedDecl;

pub mod json_schema;
pub mod proto;
pub mod sql;
pub mod typescript;
pub mod zod;

static BARE_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// True if `name` can appear unquoted in identifier position.
pub fn is_bare_ident(name: &str) -> bool {
    BARE_IDENT.is_match(name)
}

/// Replace everything non-identifier with `_`; prefix a digit start.
/// Deterministic, so references sanitize the same way as declarations.
pub fn sanitize_ident(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() {
        out.push('_');
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if upper_next {
                out.extend(c.to_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        } else {
            upper_next = true;
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

pub fn upper_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_lower {
                out.push('_');
            }
            out.extend(c.to_uppercase());
            prev_lower = c.is_lowercase();
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
            prev_lower = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() { "_".to_string() } else { trimmed.to_string() }
}

/// Deterministic emission order: referenced declarations before their
/// users, original order breaking ties. Cycles are cut at the
/// lowest-indexed remaining declaration, so a cyclic group keeps source
/// order and the emitter sees the cycle as a forward reference (rendered
/// in the target's deferred form).
pub fn order_decls(decls: &[MappedDecl]) -> Vec<usize> {
    let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
    let deps: Vec<BTreeSet<usize>> = decls
        .iter()
        .map(|d| {
            let mut refs = BTreeSet::new();
            d.collect_refs(&mut refs);
            refs.iter()
                .filter_map(|r| names.iter().position(|n| *n == r.as_str()))
                .filter(|&i| decls[i].name != d.name) // self-loops stay deferred
                .collect()
        })
        .collect();

    let mut order = Vec::with_capacity(decls.len());
    let mut emitted = vec![false; decls.len()];
    while order.len() < decls.len() {
        let ready = (0..decls.len())
            .find(|&i| !emitted[i] && deps[i].iter().all(|&d| emitted[d]));
        let next = match ready {
            Some(i) => i,
            // cycle: cut at the first remaining declaration
            None => (0..decls.len()).find(|&i| !emitted[i]).expect("loop invariant"),
        };
        emitted[next] = true;
        order.push(next);
    }
    order
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Body, ObjField, TypeExpr};

    fn decl(name: &str, refs: &[&str]) -> MappedDecl {
        let fields = refs
            .iter()
            .map(|r| ObjField {
                key: format!("{}_field", r.to_lowercase()),
                expr: TypeExpr::Reference(r.to_string()),
                optional: false,
            })
            .collect();
        MappedDecl { name: name.to_string(), body: Body::Object(fields) }
    }

    #[test]
    fn referenced_declarations_come_first() {
        let decls = vec![decl("A", &["B"]), decl("B", &[])];
        let order = order_decls(&decls);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn cycles_keep_source_order() {
        let decls = vec![decl("A", &["B"]), decl("B", &["A"]), decl("C", &[])];
        let order = order_decls(&decls);
        // C is ready; the A/B cycle is cut at A
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn ident_hygiene() {
        assert!(is_bare_ident("fooBar_3"));
        assert!(!is_bare_ident("foo-bar"));
        assert_eq!(sanitize_ident("foo-bar"), "foo_bar");
        assert_eq!(sanitize_ident("3rd"), "_3rd");
        assert_eq!(pascal_case("order items"), "OrderItems");
        assert_eq!(upper_snake("statusCode"), "STATUS_CODE");
        assert_eq!(upper_snake("already_SNAKE"), "ALREADY_SNAKE");
    }
}
