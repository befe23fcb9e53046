//! Zod emitter.
//!
//! One `export const` per declaration plus the inferred-type alias. zod
//! evaluates schema constants eagerly, so ordering matters here: referenced
//! schemas come first, and any reference that is not yet in scope (forward
//! edge of a cycle, or a self-reference) is wrapped in `z.lazy(() => X)`,
//! the deferred form that breaks evaluation cycles.

use std::collections::BTreeSet;

use crate::emit;
use crate::expr::{Body, Lit, MappedDecl, ObjField, Prim, TypeExpr, all_string_literals};

pub fn emit(decls: &[MappedDecl]) -> String {
    let mut out = String::from("import { z } from \"zod\";\n");
    let mut in_scope: BTreeSet<String> = BTreeSet::new();

    for &i in &emit::order_decls(decls) {
        let decl = &decls[i];
        let name = emit::sanitize_ident(&decl.name);
        let ctx = Ctx { in_scope: &in_scope };
        let schema = match &decl.body {
            Body::Object(fields) => render_object(fields, &ctx),
            Body::Alias(expr) => render(expr, &ctx),
            Body::Enum(lits) => render_enum(lits),
        };
        out.push('\n');
        out.push_str(&format!("export const {name} = {schema};\n"));
        out.push_str(&format!("export type {name} = z.infer<typeof {name}>;\n"));
        in_scope.insert(decl.name.clone());
    }
    out
}

struct Ctx<'a> {
    in_scope: &'a BTreeSet<String>,
}

impl Ctx<'_> {
    fn reference(&self, name: &str) -> String {
        let ident = emit::sanitize_ident(name);
        if self.in_scope.contains(name) {
            ident
        } else {
            // not yet evaluated: defer
            format!("z.lazy(() => {ident})")
        }
    }
}

fn render(expr: &TypeExpr, ctx: &Ctx) -> String {
    match expr {
        TypeExpr::Primitive(p) => primitive(*p).to_string(),
        TypeExpr::Literal(lit) => format!("z.literal({})", render_lit(lit)),
        TypeExpr::Array(el) => format!("z.array({})", render(el, ctx)),
        TypeExpr::Tuple(elems) => {
            let inner = elems.iter().map(|e| render(e, ctx)).collect::<Vec<_>>().join(", ");
            format!("z.tuple([{inner}])")
        }
        TypeExpr::Union(members) => {
            if let Some(values) = all_string_literals(members) {
                let list = values
                    .iter()
                    .map(|v| quote(v))
                    .collect::<Vec<_>>()
                    .join(", ");
                return format!("z.enum([{list}])");
            }
            let inner = members.iter().map(|m| render(m, ctx)).collect::<Vec<_>>().join(", ");
            format!("z.union([{inner}])")
        }
        TypeExpr::Intersection(members) => {
            // z.intersection is binary: fold left so 3+ members associate
            let mut rendered = members.iter().map(|m| render(m, ctx));
            let first = rendered.next().unwrap_or_else(|| "z.unknown()".to_string());
            rendered.fold(first, |acc, m| format!("z.intersection({acc}, {m})"))
        }
        TypeExpr::Map { key, value } => {
            format!("z.record({}, {})", render(key, ctx), render(value, ctx))
        }
        TypeExpr::Object(fields) => render_object(fields, ctx),
        TypeExpr::Reference(name) => ctx.reference(name),
        TypeExpr::Nullable(inner) => format!("{}.nullable()", render(inner, ctx)),
        TypeExpr::Unknown => "z.unknown()".to_string(),
    }
}

fn render_object(fields: &[ObjField], ctx: &Ctx) -> String {
    if fields.is_empty() {
        return "z.object({})".to_string();
    }
    let mut out = String::from("z.object({\n");
    for f in fields {
        let key = if emit::is_bare_ident(&f.key) {
            f.key.clone()
        } else {
            quote(&f.key)
        };
        let mut schema = render(&f.expr, ctx);
        if f.optional {
            schema.push_str(".optional()");
        }
        out.push_str(&format!("  {key}: {schema},\n"));
    }
    out.push_str("})");
    out
}

fn render_enum(lits: &[Lit]) -> String {
    if lits.is_empty() {
        return "z.never()".to_string();
    }
    let all_strings = lits.iter().all(|l| matches!(l, Lit::Str(_)));
    if all_strings {
        let list = lits
            .iter()
            .map(|l| match l {
                Lit::Str(s) => quote(s),
                _ => unreachable!("checked all members are strings"),
            })
            .collect::<Vec<_>>()
            .join(", ");
        return format!("z.enum([{list}])");
    }
    let members: Vec<String> = lits
        .iter()
        .map(|l| format!("z.literal({})", render_lit(l)))
        .collect();
    if members.len() == 1 {
        return members.into_iter().next().unwrap_or_default();
    }
    format!("z.union([{}])", members.join(", "))
}

fn render_lit(lit: &Lit) -> String {
    match lit {
        Lit::Str(s) => quote(s),
        Lit::Num(n) => n.clone(),
        Lit::Bool(b) => b.to_string(),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn primitive(p: Prim) -> &'static str {
    match p {
        Prim::Str => "z.string()",
        Prim::Int => "z.number().int()",
        Prim::Float => "z.number()",
        Prim::BigInt => "z.bigint()",
        Prim::Bool => "z.boolean()",
        Prim::Date => "z.date()",
        Prim::Null => "z.null()",
        Prim::Never => "z.never()",
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_with_optional_field() {
        let decls = vec![MappedDecl {
            name: "User".into(),
            body: Body::Object(vec![
                ObjField { key: "name".into(), expr: TypeExpr::Primitive(Prim::Str), optional: false },
                ObjField { key: "age".into(), expr: TypeExpr::Primitive(Prim::Int), optional: true },
            ]),
        }];
        let out = emit(&decls);
        assert!(out.starts_with("import { z } from \"zod\";\n"));
        assert!(out.contains("name: z.string(),"));
        assert!(out.contains("age: z.number().int().optional(),"));
        assert!(out.contains("export type User = z.infer<typeof User>;"));
    }

    #[test]
    fn cycle_gets_a_lazy_edge() {
        let decls = vec![
            MappedDecl {
                name: "A".into(),
                body: Body::Object(vec![ObjField {
                    key: "b".into(),
                    expr: TypeExpr::Reference("B".into()),
                    optional: false,
                }]),
            },
            MappedDecl {
                name: "B".into(),
                body: Body::Object(vec![ObjField {
                    key: "a".into(),
                    expr: TypeExpr::Reference("A".into()),
                    optional: false,
                }]),
            },
        ];
        let out = emit(&decls);
        assert!(out.contains("z.lazy(() => B)"), "forward edge must defer:\n{out}");
        assert!(out.contains("a: A"), "backward edge stays plain:\n{out}");
    }

    #[test]
    fn self_reference_defers() {
        let decls = vec![MappedDecl {
            name: "Node".into(),
            body: Body::Object(vec![ObjField {
                key: "next".into(),
                expr: TypeExpr::Reference("Node".into()),
                optional: true,
            }]),
        }];
        let out = emit(&decls);
        assert!(out.contains("z.lazy(() => Node).optional()"));
    }

    #[test]
    fn enum_body_renders_z_enum() {
        let decls = vec![MappedDecl {
            name: "Level".into(),
            body: Body::Enum(vec![Lit::Str("low".into()), Lit::Str("high".into())]),
        }];
        let out = emit(&decls);
        assert!(out.contains("z.enum([\"low\", \"high\"])"));
    }

    #[test]
    fn intersection_folds_left() {
        let expr = TypeExpr::Intersection(vec![
            TypeExpr::Reference("A".into()),
            TypeExpr::Reference("B".into()),
            TypeExpr::Reference("C".into()),
        ]);
        let scope: BTreeSet<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let out = render(&expr, &Ctx { in_scope: &scope });
        assert_eq!(out, "z.intersection(z.intersection(A, B), C)");
    }
}
