//! Shared machinery for the recursive type-expression mappers.
//!
//! Two backpressure mechanisms live here. The depth guard caps recursion on
//! adversarial nesting; the ancestor trail breaks reference cycles. The
//! trail is cloned on every push so sibling branches can never see each
//! other's ancestors; a shared mutable set would produce false-positive
//! cycle hits between unrelated branches.
//!
//! The union/intersection constructors are also here so every front-end
//! canonicalizes the same way: flattened members, no degenerate one-member
//! lists, `X | null` collapsed to `Nullable(X)`.

use std::collections::BTreeSet;

use crate::expr::TypeExpr;

/// Hard recursion ceiling. Exceeding it maps to the unknown sentinel with a
/// `DepthExceeded` warning; nothing recurses past it.
pub const MAX_DEPTH: usize = 32;

// ------------------------------- Trail ------------------------------------ //

/// Depth counter plus the set of declaration names currently being resolved
/// on this recursion path. Scoped to a single top-level mapping call.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    depth: usize,
    ancestors: BTreeSet<String>,
}

impl Trail {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn exhausted(&self) -> bool {
        self.depth > MAX_DEPTH
    }

    /// One nesting level down, same ancestors. Copy, not borrow.
    pub fn deeper(&self) -> Self {
        let mut next = self.clone();
        next.depth += 1;
        next
    }

    /// One level down through the named declaration.
    pub fn through(&self, name: &str) -> Self {
        let mut next = self.deeper();
        next.ancestors.insert(name.to_string());
        next
    }

    pub fn visited(&self, name: &str) -> bool {
        self.ancestors.contains(name)
    }
}

// -------------------------- Canonical composites --------------------------- //

/// Build a union: flatten nested unions, pull nulls out into a `Nullable`
/// wrapper, drop duplicates, collapse degenerate cases. `Unknown` absorbs
/// the whole union (anything ∪ unknown = unknown).
pub fn union_of(members: Vec<TypeExpr>) -> TypeExpr {
    let mut flat: Vec<TypeExpr> = Vec::new();
    let mut saw_null = false;
    let mut saw_unknown = false;
    flatten_union(members, &mut flat, &mut saw_null, &mut saw_unknown);

    if saw_unknown {
        return TypeExpr::Unknown;
    }
    let core = match flat.len() {
        0 => return if saw_null { TypeExpr::Primitive(crate::expr::Prim::Null) } else { TypeExpr::Unknown },
        1 => flat.remove(0),
        _ => TypeExpr::Union(flat),
    };
    if saw_null { nullable(core) } else { core }
}

fn flatten_union(
    members: Vec<TypeExpr>,
    flat: &mut Vec<TypeExpr>,
    saw_null: &mut bool,
    saw_unknown: &mut bool,
) {
    for m in members {
        match m {
            TypeExpr::Union(inner) => flatten_union(inner, flat, saw_null, saw_unknown),
            TypeExpr::Nullable(inner) => {
                *saw_null = true;
                flatten_union(vec![*inner], flat, saw_null, saw_unknown);
            }
            m if m.is_null() => *saw_null = true,
            TypeExpr::Unknown => *saw_unknown = true,
            m => {
                if !flat.contains(&m) {
                    flat.push(m);
                }
            }
        }
    }
}

/// Build an intersection: flatten, dedup, unwrap the degenerate single
/// member. `Unknown` members are dropped (the other members constrain the
/// shape more usefully than the sentinel).
pub fn intersection_of(members: Vec<TypeExpr>) -> TypeExpr {
    let mut flat: Vec<TypeExpr> = Vec::new();
    for m in members {
        match m {
            TypeExpr::Intersection(inner) => {
                for x in inner {
                    if !matches!(x, TypeExpr::Unknown) && !flat.contains(&x) {
                        flat.push(x);
                    }
                }
            }
            TypeExpr::Unknown => {}
            m => {
                if !flat.contains(&m) {
                    flat.push(m);
                }
            }
        }
    }
    match flat.len() {
        0 => TypeExpr::Unknown,
        1 => flat.remove(0),
        _ => TypeExpr::Intersection(flat),
    }
}

/// Wrap in `Nullable` unless the expression is already null-flavored.
pub fn nullable(inner: TypeExpr) -> TypeExpr {
    match inner {
        TypeExpr::Nullable(x) => TypeExpr::Nullable(x),
        x if x.is_null() => x,
        x => TypeExpr::Nullable(Box::new(x)),
    }
}

/// Short context snippet for warnings: the raw type text, truncated on a
/// char boundary.
pub fn context_of(raw: &str) -> String {
    const MAX: usize = 48;
    let trimmed = raw.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX).collect();
        format!("{cut}…")
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Prim;

    #[test]
    fn degenerate_union_collapses() {
        let u = union_of(vec![TypeExpr::Primitive(Prim::Str)]);
        assert_eq!(u, TypeExpr::Primitive(Prim::Str));
    }

    #[test]
    fn null_member_becomes_nullable_wrapper() {
        let u = union_of(vec![
            TypeExpr::Primitive(Prim::Str),
            TypeExpr::Primitive(Prim::Null),
        ]);
        assert_eq!(u, TypeExpr::Nullable(Box::new(TypeExpr::Primitive(Prim::Str))));
    }

    #[test]
    fn nested_unions_flatten_and_dedup() {
        let u = union_of(vec![
            TypeExpr::Union(vec![
                TypeExpr::Primitive(Prim::Str),
                TypeExpr::Primitive(Prim::Int),
            ]),
            TypeExpr::Primitive(Prim::Str),
        ]);
        match u {
            TypeExpr::Union(members) => assert_eq!(members.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn unknown_absorbs_union_but_not_intersection() {
        let u = union_of(vec![TypeExpr::Primitive(Prim::Str), TypeExpr::Unknown]);
        assert_eq!(u, TypeExpr::Unknown);

        let i = intersection_of(vec![TypeExpr::Primitive(Prim::Str), TypeExpr::Unknown]);
        assert_eq!(i, TypeExpr::Primitive(Prim::Str));
    }

    #[test]
    fn trail_copies_do_not_leak_between_siblings() {
        let root = Trail::root();
        let left = root.through("A");
        let right = root.deeper();
        assert!(left.visited("A"));
        assert!(!right.visited("A"));
        assert!(!root.visited("A"));
    }

    #[test]
    fn only_null_members_yield_null() {
        let u = union_of(vec![
            TypeExpr::Primitive(Prim::Null),
            TypeExpr::Primitive(Prim::Null),
        ]);
        assert_eq!(u, TypeExpr::Primitive(Prim::Null));
    }
}
