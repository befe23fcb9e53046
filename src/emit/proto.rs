//! Protobuf emitter (proto3).
//!
//! Proto has no inline composite types, so a flattening pre-pass lifts
//! every nested object into a synthesized auxiliary message (named after
//! its field path) and every string-literal union into a synthesized enum.
//! Shapes proto3 genuinely cannot express (tuples, mixed unions,
//! intersections) degrade to `string` with a warning.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::diag::Warning;
use crate::emit;
use crate::expr::{Body, Lit, MappedDecl, ObjField, Prim, TypeExpr, all_string_literals};
use crate::map::Trail;

pub fn emit(decls: &[MappedDecl], warnings: &mut Vec<Warning>) -> String {
    let by_name: BTreeMap<&str, &Body> =
        decls.iter().map(|d| (d.name.as_str(), &d.body)).collect();

    let mut fl = Flattener {
        by_name: &by_name,
        taken: decls.iter().map(|d| emit::sanitize_ident(&d.name)).collect(),
        aux: Vec::new(),
        warnings,
    };

    let mut rendered = Vec::new();
    for d in decls {
        let name = emit::sanitize_ident(&d.name);
        match &d.body {
            Body::Object(fields) => {
                let message = fl.message(&name, fields);
                rendered.push(message);
            }
            Body::Enum(lits) => match fl.enumeration(&name, lits) {
                Some(e) => rendered.push(e),
                None => fl.warnings.push(Warning::Unrepresentable {
                    context: d.name.clone(),
                    detail: "non-string enumeration has no proto3 form, skipped".into(),
                }),
            },
            Body::Alias(expr) => match expr {
                TypeExpr::Object(fields) => {
                    let message = fl.message(&name, &fields.clone());
                    rendered.push(message);
                }
                TypeExpr::Union(members) => match all_string_literals(members) {
                    Some(values) => {
                        let owned: Vec<Lit> =
                            values.iter().map(|v| Lit::Str(v.to_string())).collect();
                        match fl.enumeration(&name, &owned) {
                            Some(e) => rendered.push(e),
                            None => {}
                        }
                    }
                    None => fl.skip_alias(&d.name),
                },
                _ => fl.skip_alias(&d.name),
            },
        }
    }
    rendered.extend(std::mem::take(&mut fl.aux));

    let mut out = String::from("syntax = \"proto3\";\n");
    for block in rendered {
        out.push('\n');
        out.push_str(&block);
    }
    out
}

struct Flattener<'a> {
    by_name: &'a BTreeMap<&'a str, &'a Body>,
    taken: BTreeSet<String>,
    aux: Vec<String>,
    warnings: &'a mut Vec<Warning>,
}

impl Flattener<'_> {
    fn skip_alias(&mut self, name: &str) {
        self.warnings.push(Warning::Unrepresentable {
            context: name.to_string(),
            detail: "alias has no message form, skipped".into(),
        });
    }

    fn message(&mut self, name: &str, fields: &[ObjField]) -> String {
        let mut out = format!("message {name} {{\n");
        for (i, f) in fields.iter().enumerate() {
            let field_name = emit::sanitize_ident(&f.key);
            let path = format!("{name}{}", emit::pascal_case(&f.key));
            let (ty, repeated, scalar) = self.field_type(&f.expr, &path, &Trail::root());
            let label = if repeated {
                "repeated "
            } else if f.optional && scalar {
                // message-typed fields already track presence in proto3
                "optional "
            } else {
                ""
            };
            out.push_str(&format!("  {label}{ty} {field_name} = {};\n", i + 1));
        }
        out.push_str("}\n");
        out
    }

    fn enumeration(&mut self, name: &str, lits: &[Lit]) -> Option<String> {
        let values: Vec<&str> = lits
            .iter()
            .filter_map(|l| match l {
                Lit::Str(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        if values.len() != lits.len() || values.is_empty() {
            return None;
        }
        let mut seen = BTreeSet::new();
        let mut out = format!("enum {name} {{\n");
        let mut number = 0usize;
        for v in values {
            let variant = emit::upper_snake(v);
            if !seen.insert(variant.clone()) {
                continue; // sanitization collision, first spelling wins
            }
            out.push_str(&format!("  {variant} = {number};\n"));
            number += 1;
        }
        out.push_str("}\n");
        Some(out)
    }

    /// Returns `(type text, repeated, scalar)`. `scalar` gates the
    /// `optional` label: proto3 only needs it for scalar fields.
    fn field_type(&mut self, expr: &TypeExpr, path: &str, trail: &Trail) -> (String, bool, bool) {
        match expr {
            TypeExpr::Primitive(p) => (scalar(*p).to_string(), false, true),
            TypeExpr::Literal(Lit::Str(_)) => ("string".into(), false, true),
            TypeExpr::Literal(Lit::Num(_)) => ("double".into(), false, true),
            TypeExpr::Literal(Lit::Bool(_)) => ("bool".into(), false, true),
            TypeExpr::Nullable(inner) => {
                let (ty, repeated, _) = self.field_type(inner, path, &trail.deeper());
                // a nullable scalar still wants explicit presence
                (ty, repeated, true)
            }
            TypeExpr::Array(el) => {
                let (ty, nested_repeated, _) = self.field_type(el, path, &trail.deeper());
                if nested_repeated {
                    self.degrade(path, "nested repeated field carried as string")
                } else {
                    (ty, true, false)
                }
            }
            TypeExpr::Map { key, value } => {
                let key_ty = match key.as_ref() {
                    TypeExpr::Primitive(p) if map_key(*p).is_some() => {
                        map_key(*p).unwrap().to_string()
                    }
                    _ => {
                        self.warnings.push(Warning::Unrepresentable {
                            context: path.to_string(),
                            detail: "map key type coerced to string".into(),
                        });
                        "string".to_string()
                    }
                };
                let (val_ty, repeated, _) = self.field_type(value, path, &trail.deeper());
                if repeated {
                    return self.degrade(path, "repeated map value carried as string");
                }
                (format!("map<{key_ty}, {val_ty}>"), false, false)
            }
            TypeExpr::Object(fields) => {
                let name = self.unique(path);
                let message = self.message(&name, &fields.clone());
                self.aux.push(message);
                (name, false, false)
            }
            TypeExpr::Union(members) => match all_string_literals(members) {
                Some(values) => {
                    let owned: Vec<Lit> = values.iter().map(|v| Lit::Str(v.to_string())).collect();
                    let name = self.unique(path);
                    match self.enumeration(&name, &owned) {
                        Some(e) => {
                            self.aux.push(e);
                            (name, false, true)
                        }
                        None => self.degrade(path, "union carried as string"),
                    }
                }
                None => self.degrade(path, "union carried as string"),
            },
            TypeExpr::Reference(target) => {
                if trail.visited(target) {
                    return self.degrade(path, "alias cycle carried as string");
                }
                match self.by_name.get(target.as_str()) {
                    Some(Body::Object(_)) | Some(Body::Enum(_)) => {
                        (emit::sanitize_ident(target), false, false)
                    }
                    Some(Body::Alias(aliased)) => {
                        let aliased = (*aliased).clone();
                        self.field_type(&aliased, path, &trail.through(target))
                    }
                    None => self.degrade(path, "unresolved reference carried as string"),
                }
            }
            TypeExpr::Tuple(_) | TypeExpr::Intersection(_) => {
                self.degrade(path, "shape has no proto3 form, carried as string")
            }
            TypeExpr::Unknown => ("string".into(), false, true),
        }
    }

    fn degrade(&mut self, path: &str, detail: &str) -> (String, bool, bool) {
        self.warnings.push(Warning::Unrepresentable {
            context: path.to_string(),
            detail: detail.to_string(),
        });
        ("string".into(), false, true)
    }

    fn unique(&mut self, base: &str) -> String {
        let base = emit::sanitize_ident(base);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn scalar(p: Prim) -> &'static str {
    match p {
        Prim::Str | Prim::Null | Prim::Never => "string",
        Prim::Int => "int32",
        Prim::BigInt => "int64",
        Prim::Float => "double",
        Prim::Bool => "bool",
        // ISO-8601 text; proto has no standard scalar for timestamps
        Prim::Date => "string",
    }
}

fn map_key(p: Prim) -> Option<&'static str> {
    match p {
        Prim::Str => Some("string"),
        Prim::Int => Some("int32"),
        Prim::BigInt => Some("int64"),
        Prim::Bool => Some("bool"),
        _ => None,
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn message(fields: Vec<ObjField>) -> Vec<MappedDecl> {
        vec![MappedDecl { name: "User".into(), body: Body::Object(fields) }]
    }

    #[test]
    fn scalars_labels_and_numbering() {
        let decls = message(vec![
            ObjField { key: "name".into(), expr: TypeExpr::Primitive(Prim::Str), optional: false },
            ObjField { key: "age".into(), expr: TypeExpr::Primitive(Prim::Int), optional: true },
            ObjField {
                key: "tags".into(),
                expr: TypeExpr::Array(Box::new(TypeExpr::Primitive(Prim::Str))),
                optional: false,
            },
        ]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.starts_with("syntax = \"proto3\";\n"));
        assert!(out.contains("  string name = 1;\n"));
        assert!(out.contains("  optional int32 age = 2;\n"));
        assert!(out.contains("  repeated string tags = 3;\n"));
    }

    #[test]
    fn inline_object_synthesizes_message() {
        let decls = message(vec![ObjField {
            key: "address".into(),
            expr: TypeExpr::Object(vec![ObjField {
                key: "city".into(),
                expr: TypeExpr::Primitive(Prim::Str),
                optional: false,
            }]),
            optional: false,
        }]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("UserAddress address = 1;"));
        assert!(out.contains("message UserAddress {"));
    }

    #[test]
    fn string_union_synthesizes_enum() {
        let decls = message(vec![ObjField {
            key: "status".into(),
            expr: TypeExpr::Union(vec![
                TypeExpr::Literal(Lit::Str("open".into())),
                TypeExpr::Literal(Lit::Str("closed".into())),
            ]),
            optional: false,
        }]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("UserStatus status = 1;"));
        assert!(out.contains("enum UserStatus {"));
        assert!(out.contains("  OPEN = 0;"));
        assert!(out.contains("  CLOSED = 1;"));
    }

    #[test]
    fn tuple_degrades_with_warning() {
        let decls = message(vec![ObjField {
            key: "pair".into(),
            expr: TypeExpr::Tuple(vec![
                TypeExpr::Primitive(Prim::Str),
                TypeExpr::Primitive(Prim::Int),
            ]),
            optional: false,
        }]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("string pair = 1;"));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::Unrepresentable { .. })));
    }

    #[test]
    fn map_field_renders_proto_map() {
        let decls = message(vec![ObjField {
            key: "counts".into(),
            expr: TypeExpr::Map {
                key: Box::new(TypeExpr::Primitive(Prim::Str)),
                value: Box::new(TypeExpr::Primitive(Prim::BigInt)),
            },
            optional: false,
        }]);
        let mut warnings = Vec::new();
        let out = emit(&decls, &mut warnings);
        assert!(out.contains("map<string, int64> counts = 1;"));
    }
}
