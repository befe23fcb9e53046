//! JSON Schema front-end.
//!
//! The document is real JSON, so extraction is a `serde_json` parse (order
//! preserved) rather than text scanning; the root schema plus every
//! `$defs`/`definitions` entry becomes a declaration and `$ref` pointers
//! become references. Keyword coverage is deliberately partial: unknown
//! keywords are ignored and unrecognizable subschemas map to the sentinel.

use indexmap::IndexMap;
use serde_json::Value;

use crate::diag::Warning;
use crate::expr::{Lit, MappedDecl, ObjField, Prim, TypeExpr, body_from_expr};
use crate::map::{self, Trail};

/// Largest integer magnitude that survives an f64 round trip.
const SAFE_INT: u64 = 1 << 53;

pub fn parse(text: &str, warnings: &mut Vec<Warning>) -> Result<Vec<MappedDecl>, String> {
    let doc = read_document(text)?;
    let Value::Object(_) = &doc else {
        return Err("top-level value is not a schema object".into());
    };

    let root_name = doc
        .get("title")
        .and_then(Value::as_str)
        .map(identish)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Root".to_string());

    // declaration set: root plus defs, in document order
    let mut defs: IndexMap<String, &Value> = IndexMap::new();
    for section in ["$defs", "definitions"] {
        if let Some(Value::Object(map)) = doc.get(section) {
            for (key, sub) in map {
                defs.entry(key.clone()).or_insert(sub);
            }
        }
    }

    let mut walker = Walker {
        root_name: root_name.clone(),
        def_names: defs.keys().cloned().collect(),
        warnings,
    };

    let mut out = Vec::with_capacity(1 + defs.len());
    let root_expr = walker.expr(&doc, &Trail::root());
    out.push(MappedDecl { name: root_name, body: body_from_expr(root_expr) });
    for (name, sub) in &defs {
        let expr = walker.expr(sub, &Trail::root());
        out.push(MappedDecl { name: name.clone(), body: body_from_expr(expr) });
    }
    Ok(out)
}

/// Parse with JSON-path context in the error message.
fn read_document(src: &str) -> Result<Value, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, Value>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

/// Reduce a title to something declaration-shaped ("User profile" → "UserProfile").
fn identish(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut upper_next = true;
    for c in title.chars() {
        if c.is_alphanumeric() || c == '_' {
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
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

struct Walker<'a> {
    root_name: String,
    def_names: Vec<String>,
    warnings: &'a mut Vec<Warning>,
}

impl Walker<'_> {
    fn expr(&mut self, schema: &Value, trail: &Trail) -> TypeExpr {
        if trail.exhausted() {
            self.warnings.push(Warning::DepthExceeded {
                context: schema_context(schema),
                limit: map::MAX_DEPTH,
            });
            return TypeExpr::Unknown;
        }

        let obj = match schema {
            Value::Bool(true) => return TypeExpr::Unknown,
            Value::Bool(false) => return TypeExpr::Primitive(Prim::Never),
            Value::Object(obj) => obj,
            _ => return TypeExpr::Unknown,
        };

        if let Some(Value::String(target)) = obj.get("$ref") {
            return self.reference(target);
        }

        if let Some(Value::Array(values)) = obj.get("enum") {
            let members = values
                .iter()
                .map(|v| self.literal(v))
                .collect::<Vec<_>>();
            return map::union_of(members);
        }
        if let Some(value) = obj.get("const") {
            return self.literal(value);
        }

        if let Some(Value::Array(parts)) = obj.get("allOf") {
            let members = parts.iter().map(|p| self.expr(p, &trail.deeper())).collect();
            return map::intersection_of(members);
        }
        for combinator in ["oneOf", "anyOf"] {
            if let Some(Value::Array(parts)) = obj.get(combinator) {
                let members = parts.iter().map(|p| self.expr(p, &trail.deeper())).collect();
                return map::union_of(members);
            }
        }

        match obj.get("type") {
            Some(Value::String(ty)) => self.typed(obj, ty, trail),
            Some(Value::Array(types)) => {
                let members = types
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|ty| self.typed(obj, ty, trail))
                    .collect();
                map::union_of(members)
            }
            // a bare `properties` block implies an object schema
            _ if obj.contains_key("properties") => self.typed(obj, "object", trail),
            _ => TypeExpr::Unknown,
        }
    }

    fn typed(&mut self, obj: &serde_json::Map<String, Value>, ty: &str, trail: &Trail) -> TypeExpr {
        match ty {
            "string" => match obj.get("format").and_then(Value::as_str) {
                Some("date-time") | Some("date") => TypeExpr::Primitive(Prim::Date),
                _ => TypeExpr::Primitive(Prim::Str),
            },
            "integer" => TypeExpr::Primitive(Prim::Int),
            "number" => TypeExpr::Primitive(Prim::Float),
            "boolean" => TypeExpr::Primitive(Prim::Bool),
            "null" => TypeExpr::Primitive(Prim::Null),
            "array" => {
                if let Some(Value::Array(prefix)) = obj.get("prefixItems") {
                    let elems = prefix.iter().map(|p| self.expr(p, &trail.deeper())).collect();
                    return TypeExpr::Tuple(elems);
                }
                let el = match obj.get("items") {
                    Some(items) => self.expr(items, &trail.deeper()),
                    None => TypeExpr::Unknown,
                };
                TypeExpr::Array(Box::new(el))
            }
            "object" => self.object(obj, trail),
            _ => TypeExpr::Unknown,
        }
    }

    fn object(&mut self, obj: &serde_json::Map<String, Value>, trail: &Trail) -> TypeExpr {
        let required: Vec<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|xs| xs.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = Vec::new();
        if let Some(Value::Object(props)) = obj.get("properties") {
            for (key, sub) in props {
                fields.push(ObjField {
                    key: key.clone(),
                    expr: self.expr(sub, &trail.deeper()),
                    optional: !required.contains(&key.as_str()),
                });
            }
        }

        let additional = match obj.get("additionalProperties") {
            Some(ap @ Value::Object(_)) => Some(self.expr(ap, &trail.deeper())),
            Some(Value::Bool(true)) => Some(TypeExpr::Unknown),
            _ => None,
        }
        .map(|value| TypeExpr::Map {
            key: Box::new(TypeExpr::Primitive(Prim::Str)),
            value: Box::new(value),
        });

        match (fields.is_empty(), additional) {
            (true, Some(map_expr)) => map_expr,
            (true, None) => TypeExpr::Map {
                key: Box::new(TypeExpr::Primitive(Prim::Str)),
                value: Box::new(TypeExpr::Unknown),
            },
            (false, Some(map_expr)) => {
                map::intersection_of(vec![TypeExpr::Object(fields), map_expr])
            }
            (false, None) => TypeExpr::Object(fields),
        }
    }

    fn reference(&mut self, target: &str) -> TypeExpr {
        if target == "#" {
            return TypeExpr::Reference(self.root_name.clone());
        }
        for prefix in ["#/$defs/", "#/definitions/"] {
            if let Some(rest) = target.strip_prefix(prefix) {
                let key = rest.replace("~1", "/").replace("~0", "~");
                if self.def_names.iter().any(|n| n == &key) {
                    return TypeExpr::Reference(key);
                }
            }
        }
        self.warnings.push(Warning::UnknownReference { name: target.to_string() });
        TypeExpr::Unknown
    }

    fn literal(&mut self, value: &Value) -> TypeExpr {
        match value {
            Value::String(s) => TypeExpr::Literal(Lit::Str(s.clone())),
            Value::Bool(b) => TypeExpr::Literal(Lit::Bool(*b)),
            Value::Null => TypeExpr::Primitive(Prim::Null),
            Value::Number(n) => {
                let unsafe_int = n
                    .as_i64()
                    .map(|i| i.unsigned_abs() > SAFE_INT)
                    .or_else(|| n.as_u64().map(|u| u > SAFE_INT))
                    .unwrap_or(false);
                if unsafe_int {
                    self.warnings.push(Warning::NumericRange { value: n.to_string() });
                    return TypeExpr::Primitive(if n.is_f64() { Prim::Float } else { Prim::Int });
                }
                TypeExpr::Literal(Lit::Num(n.to_string()))
            }
            // array/object literal values have no counterpart anywhere we emit
            _ => TypeExpr::Unknown,
        }
    }
}

fn schema_context(schema: &Value) -> String {
    map::context_of(&schema.to_string())
}

// ------------------------------- Tests ------------------------------------ //
