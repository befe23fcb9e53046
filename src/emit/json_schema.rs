//! JSON Schema emitter (draft 2020-12).
//!
//! The first declaration becomes the root schema; everything else lands in
//! `$defs` and is linked with `$ref`; references are always deferred in
//! this target, which is what makes cycles free. Member order is insertion
//! order (`serde_json` preserves it), so output is deterministic.

use serde_json::{Map, Value, json};

use crate::expr::{Body, Lit, MappedDecl, ObjField, Prim, TypeExpr, all_string_literals};

pub fn emit(decls: &[MappedDecl]) -> String {
    let mut root = Map::new();
    root.insert(
        "$schema".into(),
        Value::from("https://json-schema.org/draft/2020-12/schema"),
    );

    if let Some(first) = decls.first() {
        let ctx = Ctx { root_name: &first.name };
        root.insert("title".into(), Value::from(first.name.clone()));
        merge(&mut root, body_schema(&first.body, &ctx));

        if decls.len() > 1 {
            let mut defs = Map::new();
            for d in &decls[1..] {
                defs.insert(d.name.clone(), body_schema(&d.body, &ctx));
            }
            root.insert("$defs".into(), Value::Object(defs));
        }
    }

    let mut out = serde_json::to_string_pretty(&Value::Object(root))
        .expect("schema values contain no non-serializable data");
    out.push('\n');
    out
}

struct Ctx<'a> {
    root_name: &'a str,
}

fn merge(target: &mut Map<String, Value>, schema: Value) {
    if let Value::Object(obj) = schema {
        for (k, v) in obj {
            target.insert(k, v);
        }
    }
}

fn body_schema(body: &Body, ctx: &Ctx) -> Value {
    match body {
        Body::Object(fields) => object_schema(fields, ctx),
        Body::Alias(expr) => schema(expr, ctx),
        Body::Enum(lits) => enum_schema(lits),
    }
}

fn schema(expr: &TypeExpr, ctx: &Ctx) -> Value {
    match expr {
        TypeExpr::Primitive(p) => primitive(*p),
        TypeExpr::Literal(lit) => json!({ "const": lit_value(lit) }),
        TypeExpr::Array(el) => json!({ "type": "array", "items": schema(el, ctx) }),
        TypeExpr::Tuple(elems) => json!({
            "type": "array",
            "prefixItems": elems.iter().map(|e| schema(e, ctx)).collect::<Vec<_>>(),
            "minItems": elems.len(),
            "maxItems": elems.len(),
        }),
        TypeExpr::Union(members) => {
            if let Some(values) = all_string_literals(members) {
                return json!({ "type": "string", "enum": values });
            }
            json!({ "anyOf": members.iter().map(|m| schema(m, ctx)).collect::<Vec<_>>() })
        }
        TypeExpr::Intersection(members) => {
            json!({ "allOf": members.iter().map(|m| schema(m, ctx)).collect::<Vec<_>>() })
        }
        TypeExpr::Map { value, .. } => json!({
            "type": "object",
            "additionalProperties": schema(value, ctx),
        }),
        TypeExpr::Object(fields) => object_schema(fields, ctx),
        TypeExpr::Reference(name) => {
            if name == ctx.root_name {
                json!({ "$ref": "#" })
            } else {
                json!({ "$ref": format!("#/$defs/{name}") })
            }
        }
        TypeExpr::Nullable(inner) => json!({
            "anyOf": [schema(inner, ctx), { "type": "null" }]
        }),
        TypeExpr::Unknown => json!({}),
    }
}

fn object_schema(fields: &[ObjField], ctx: &Ctx) -> Value {
    let mut props = Map::new();
    let mut required = Vec::new();
    for f in fields {
        props.insert(f.key.clone(), schema(&f.expr, ctx));
        if !f.optional {
            required.push(Value::from(f.key.clone()));
        }
    }
    let mut out = Map::new();
    out.insert("type".into(), Value::from("object"));
    out.insert("properties".into(), Value::Object(props));
    if !required.is_empty() {
        out.insert("required".into(), Value::Array(required));
    }
    Value::Object(out)
}

fn enum_schema(lits: &[Lit]) -> Value {
    let values: Vec<Value> = lits.iter().map(lit_value).collect();
    if lits.iter().all(|l| matches!(l, Lit::Str(_))) && !lits.is_empty() {
        json!({ "type": "string", "enum": values })
    } else {
        json!({ "enum": values })
    }
}

fn lit_value(lit: &Lit) -> Value {
    match lit {
        Lit::Str(s) => Value::from(s.clone()),
        // numeric literals are source text; fall back to the string form
        // if it is not valid JSON (e.g. a trailing-dot float)
        Lit::Num(n) => serde_json::from_str(n).unwrap_or_else(|_| Value::from(n.clone())),
        Lit::Bool(b) => Value::from(*b),
    }
}

fn primitive(p: Prim) -> Value {
    match p {
        Prim::Str => json!({ "type": "string" }),
        Prim::Int | Prim::BigInt => json!({ "type": "integer" }),
        Prim::Float => json!({ "type": "number" }),
        Prim::Bool => json!({ "type": "boolean" }),
        Prim::Date => json!({ "type": "string", "format": "date-time" }),
        Prim::Null => json!({ "type": "null" }),
        Prim::Never => json!({ "not": {} }),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_plus_defs_with_refs() {
        let decls = vec![
            MappedDecl {
                name: "User".into(),
                body: Body::Object(vec![ObjField {
                    key: "pet".into(),
                    expr: TypeExpr::Reference("Pet".into()),
                    optional: false,
                }]),
            },
            MappedDecl {
                name: "Pet".into(),
                body: Body::Object(vec![ObjField {
                    key: "name".into(),
                    expr: TypeExpr::Primitive(Prim::Str),
                    optional: false,
                }]),
            },
        ];
        let out = emit(&decls);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["title"], "User");
        assert_eq!(doc["properties"]["pet"]["$ref"], "#/$defs/Pet");
        assert_eq!(doc["$defs"]["Pet"]["type"], "object");
    }

    #[test]
    fn self_reference_uses_root_pointer() {
        let decls = vec![MappedDecl {
            name: "Node".into(),
            body: Body::Object(vec![ObjField {
                key: "next".into(),
                expr: TypeExpr::Reference("Node".into()),
                optional: true,
            }]),
        }];
        let out = emit(&decls);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["properties"]["next"]["$ref"], "#");
        assert!(doc["required"].is_null());
    }

    #[test]
    fn nullable_and_required_render() {
        let decls = vec![MappedDecl {
            name: "T".into(),
            body: Body::Object(vec![ObjField {
                key: "x".into(),
                expr: TypeExpr::Nullable(Box::new(TypeExpr::Primitive(Prim::Int))),
                optional: false,
            }]),
        }];
        let out = emit(&decls);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["properties"]["x"]["anyOf"][0]["type"], "integer");
        assert_eq!(doc["properties"]["x"]["anyOf"][1]["type"], "null");
        assert_eq!(doc["required"][0], "x");
    }

    #[test]
    fn string_enum_uses_enum_keyword() {
        let decls = vec![MappedDecl {
            name: "Level".into(),
            body: Body::Enum(vec![Lit::Str("low".into()), Lit::Str("high".into())]),
        }];
        let out = emit(&decls);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["enum"][0], "low");
        assert_eq!(doc["type"], "string");
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let decls = vec![MappedDecl {
            name: "T".into(),
            body: Body::Alias(TypeExpr::Primitive(Prim::Str)),
        }];
        assert_eq!(emit(&decls), emit(&decls));
    }
}
