//! SQL emitter: one `CREATE TABLE` per object-like declaration.
//!
//! Relational targets carry the least structure, so this is where the
//! degradation policy earns its keep: scalars become typed columns, closed
//! string sets become `TEXT CHECK (... IN ...)`, and anything nested
//! becomes a `JSONB` column with an `Unrepresentable` warning. Alias and
//! enum declarations have no standalone table form and are skipped (their
//! content still reaches columns through reference resolution).

use std::collections::BTreeMap;

use crate::diag::Warning;
use crate::expr::{Body, Lit, MappedDecl, Prim, TypeExpr, all_string_literals};
use crate::map::Trail;

pub fn emit(decls: &[MappedDecl], warnings: &mut Vec<Warning>) -> String {
    let by_name: BTreeMap<&str, &Body> =
        decls.iter().map(|d| (d.name.as_str(), &d.body)).collect();

    let mut tables = Vec::new();
    for d in decls {
        let Body::Object(fields) = &d.body else {
            warnings.push(Warning::Unrepresentable {
                context: d.name.clone(),
                detail: "no relational counterpart for a non-object declaration, skipped".into(),
            });
            continue;
        };

        let mut out = format!("CREATE TABLE {} (\n", quote_ident(&d.name));
        let columns: Vec<String> = fields
            .iter()
            .map(|f| {
                let col = column(&f.expr, &f.key, &by_name, &Trail::root(), warnings);
                let not_null = !f.optional && !col.force_nullable;
                format!(
                    "  {} {}{}",
                    quote_ident(&f.key),
                    col.sql,
                    if not_null { " NOT NULL" } else { "" },
                )
            })
            .collect();
        out.push_str(&columns.join(",\n"));
        out.push_str("\n);\n");
        tables.push(out);
    }
    tables.join("\n")
}

struct Column {
    sql: String,
    /// A `Nullable` wrapper in the type overrides field requiredness.
    force_nullable: bool,
}

fn column(
    expr: &TypeExpr,
    col: &str,
    by_name: &BTreeMap<&str, &Body>,
    trail: &Trail,
    warnings: &mut Vec<Warning>,
) -> Column {
    let plain = |sql: &str| Column { sql: sql.to_string(), force_nullable: false };

    match expr {
        TypeExpr::Primitive(p) => plain(primitive(*p)),
        TypeExpr::Literal(Lit::Str(_)) => plain("TEXT"),
        TypeExpr::Literal(Lit::Num(_)) => plain("DOUBLE PRECISION"),
        TypeExpr::Literal(Lit::Bool(_)) => plain("BOOLEAN"),
        TypeExpr::Nullable(inner) => {
            let mut c = column(inner, col, by_name, &trail.deeper(), warnings);
            c.force_nullable = true;
            c
        }
        TypeExpr::Union(members) => {
            if let Some(values) = all_string_literals(members) {
                return plain(&check_in(col, &values));
            }
            jsonb(col, "union column stored as JSONB", warnings)
        }
        TypeExpr::Reference(name) => {
            if trail.visited(name) {
                return jsonb(col, "reference cycle stored as JSONB", warnings);
            }
            match by_name.get(name.as_str()) {
                Some(Body::Enum(lits)) => {
                    let strings: Vec<&str> = lits
                        .iter()
                        .filter_map(|l| match l {
                            Lit::Str(s) => Some(s.as_str()),
                            _ => None,
                        })
                        .collect();
                    if strings.len() == lits.len() && !strings.is_empty() {
                        plain(&check_in(col, &strings))
                    } else {
                        plain("TEXT")
                    }
                }
                Some(Body::Alias(aliased)) => {
                    column(aliased, col, by_name, &trail.through(name), warnings)
                }
                Some(Body::Object(_)) => {
                    jsonb(col, "embedded object stored as JSONB", warnings)
                }
                None => jsonb(col, "unresolved reference stored as JSONB", warnings),
            }
        }
        TypeExpr::Array(_)
        | TypeExpr::Tuple(_)
        | TypeExpr::Map { .. }
        | TypeExpr::Object(_)
        | TypeExpr::Intersection(_) => {
            jsonb(col, "nested shape stored as JSONB", warnings)
        }
        TypeExpr::Unknown => plain("JSONB"),
    }
}

fn jsonb(col: &str, detail: &str, warnings: &mut Vec<Warning>) -> Column {
    warnings.push(Warning::Unrepresentable {
        context: col.to_string(),
        detail: detail.to_string(),
    });
    Column { sql: "JSONB".to_string(), force_nullable: false }
}

fn check_in(col: &str, values: &[&str]) -> String {
    let list = values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ");
    format!("TEXT CHECK ({} IN ({list}))", quote_ident(col))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn primitive(p: Prim) -> &'static str {
    match p {
        Prim::Str => "TEXT",
        Prim::Int => "INTEGER",
        Prim::BigInt => "BIGINT",
        Prim::Float => "DOUBLE PRECISION",
        Prim::Bool => "BOOLEAN",
        Prim::Date => "TIMESTAMP",
        Prim::Null => "JSONB",
        Prim::Never => "TEXT",
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ObjField;

    fn table(fields: Vec<ObjField>) -> Vec<MappedDecl> {
        vec![MappedDecl { name: "t".into(), body: Body::Object(fields) }]
    }

    #[test]
    fn scalars_and_requiredness() {
        let decls = table(vec![
            ObjField { key: "id".into(), expr: TypeExpr::Primitive(Prim::Int), optional: false },
            ObjField { key: "bio".into(), expr: TypeExpr::Primitive(Prim::Str), optional: true },
        ]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("\"id\" INTEGER NOT NULL"));
        assert!(out.contains("\"bio\" TEXT,\n") || out.ends_with("\"bio\" TEXT\n);\n"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn string_union_becomes_check() {
        let decls = table(vec![ObjField {
            key: "status".into(),
            expr: TypeExpr::Union(vec![
                TypeExpr::Literal(Lit::Str("new".into())),
                TypeExpr::Literal(Lit::Str("done".into())),
            ]),
            optional: false,
        }]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("\"status\" TEXT CHECK (\"status\" IN ('new', 'done')) NOT NULL"));
    }

    #[test]
    fn nested_object_degrades_to_jsonb_with_warning() {
        let decls = table(vec![ObjField {
            key: "meta".into(),
            expr: TypeExpr::Object(vec![]),
            optional: false,
        }]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("\"meta\" JSONB NOT NULL"));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::Unrepresentable { context, .. } if context == "meta")));
    }

    #[test]
    fn nullable_overrides_requiredness() {
        let decls = table(vec![ObjField {
            key: "x".into(),
            expr: TypeExpr::Nullable(Box::new(TypeExpr::Primitive(Prim::Int))),
            optional: false,
        }]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("\"x\" INTEGER"));
        assert!(!out.contains("NOT NULL"));
    }

    #[test]
    fn enum_reference_inlines_a_check() {
        let decls = vec![
            MappedDecl {
                name: "orders".into(),
                body: Body::Object(vec![ObjField {
                    key: "status".into(),
                    expr: TypeExpr::Reference("Status".into()),
                    optional: false,
                }]),
            },
            MappedDecl {
                name: "Status".into(),
                body: Body::Enum(vec![Lit::Str("open".into()), Lit::Str("closed".into())]),
            },
        ];
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("CHECK (\"status\" IN ('open', 'closed'))"));
        // the enum declaration itself produced a skip warning, not a table
        assert!(!out.contains("CREATE TABLE \"Status\""));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::Unrepresentable { context, .. } if context == "Status")));
    }
}
