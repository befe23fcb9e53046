//! TypeScript emitter.
//!
//! Interfaces for object declarations, `type` aliases for the rest, closed
//! enumerations as literal unions. TS hoists declarations, so ordering is
//! purely cosmetic here, but referenced-first output keeps diffs stable.

use crate::emit;
use crate::expr::{Body, Lit, MappedDecl, ObjField, TypeExpr, Prim};

pub fn emit(decls: &[MappedDecl]) -> String {
    let mut out = String::new();
    for (n, &i) in emit::order_decls(decls).iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        render_decl(&mut out, &decls[i]);
    }
    out
}

fn render_decl(out: &mut String, decl: &MappedDecl) {
    let name = emit::sanitize_ident(&decl.name);
    match &decl.body {
        Body::Object(fields) => {
            out.push_str(&format!("export interface {name} {{\n"));
            for f in fields {
                out.push_str(&format!(
                    "  {}{}: {};\n",
                    render_key(&f.key),
                    if f.optional { "?" } else { "" },
                    render_type(&f.expr),
                ));
            }
            out.push_str("}\n");
        }
        Body::Alias(expr) => {
            out.push_str(&format!("export type {name} = {};\n", render_type(expr)));
        }
        Body::Enum(lits) => {
            let members = if lits.is_empty() {
                "never".to_string()
            } else {
                lits.iter().map(render_lit).collect::<Vec<_>>().join(" | ")
            };
            out.push_str(&format!("export type {name} = {members};\n"));
        }
    }
}

fn render_key(key: &str) -> String {
    if emit::is_bare_ident(key) {
        key.to_string()
    } else {
        format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn render_lit(lit: &Lit) -> String {
    match lit {
        Lit::Str(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Lit::Num(n) => n.clone(),
        Lit::Bool(b) => b.to_string(),
    }
}

pub(crate) fn render_type(expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::Primitive(p) => primitive(*p).to_string(),
        TypeExpr::Literal(lit) => render_lit(lit),
        TypeExpr::Array(el) => {
            // union/intersection elements need grouping or `A | B[]`
            // reads back as `A | (B[])`
            if needs_group(el) {
                format!("({})[]", render_type(el))
            } else {
                format!("{}[]", render_type(el))
            }
        }
        TypeExpr::Tuple(elems) => {
            let inner = elems.iter().map(render_type).collect::<Vec<_>>().join(", ");
            format!("[{inner}]")
        }
        TypeExpr::Union(members) => members
            .iter()
            .map(render_type)
            .collect::<Vec<_>>()
            .join(" | "),
        TypeExpr::Intersection(members) => members
            .iter()
            .map(|m| {
                if matches!(m, TypeExpr::Union(_) | TypeExpr::Nullable(_)) {
                    format!("({})", render_type(m))
                } else {
                    render_type(m)
                }
            })
            .collect::<Vec<_>>()
            .join(" & "),
        TypeExpr::Map { key, value } => {
            format!("Record<{}, {}>", render_type(key), render_type(value))
        }
        TypeExpr::Object(fields) => render_inline_object(fields),
        TypeExpr::Reference(name) => emit::sanitize_ident(name),
        TypeExpr::Nullable(inner) => {
            if needs_group(inner) {
                format!("({}) | null", render_type(inner))
            } else {
                format!("{} | null", render_type(inner))
            }
        }
        TypeExpr::Unknown => "any".to_string(),
    }
}

fn render_inline_object(fields: &[ObjField]) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }
    let members = fields
        .iter()
        .map(|f| {
            format!(
                "{}{}: {}",
                render_key(&f.key),
                if f.optional { "?" } else { "" },
                render_type(&f.expr),
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("{{ {members} }}")
}

fn needs_group(expr: &TypeExpr) -> bool {
    matches!(
        expr,
        TypeExpr::Union(_) | TypeExpr::Intersection(_) | TypeExpr::Nullable(_)
    )
}

fn primitive(p: Prim) -> &'static str {
    match p {
        Prim::Str => "string",
        Prim::Int | Prim::Float => "number",
        Prim::BigInt => "bigint",
        Prim::Bool => "boolean",
        Prim::Date => "Date",
        Prim::Null => "null",
        Prim::Never => "never",
    }
}

// ------------------------------- Tests ------------------------------------ //
