//! Protobuf front-end: `message` and `enum` definitions.
//!
//! Nested messages are lifted to top level (proto names are flat enough in
//! practice that collisions get a warning rather than a renaming scheme).
//! `oneof` blocks flatten to an optional union-typed field, which routes
//! them through the same union machinery as every other grammar.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::decl::{DeclKind, Declaration, Field};
use crate::diag::Warning;
use crate::expr::{Body, MappedDecl, ObjField, Prim, TypeExpr};
use crate::map::{self, Trail};
use crate::scan;

static BLOCK_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(message|enum)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{").unwrap()
});

static FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(optional|required|repeated)\s+)?([A-Za-z_][A-Za-z0-9_.]*|map\s*<[^>]*>)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*\d+",
    )
    .unwrap()
});

static ENUM_VARIANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*-?\d+").unwrap());

pub fn parse(text: &str, warnings: &mut Vec<Warning>) -> Result<Vec<MappedDecl>, String> {
    let clean = scan::strip_comments(text, scan::CommentStyle::Slashes);
    let mut decls = Vec::new();
    extract_blocks(&clean, &mut decls, warnings);

    let known: BTreeSet<String> = decls.iter().map(|d| d.name.clone()).collect();

    let mut out = Vec::with_capacity(decls.len());
    for d in &decls {
        let body = match d.kind {
            DeclKind::EnumLike => {
                Body::Enum(parse_enum_variants(d.alias_body.as_deref().unwrap_or("")))
            }
            _ => {
                let fields = d
                    .fields
                    .iter()
                    .map(|f| ObjField {
                        key: f.key.clone(),
                        expr: map_field_type(&f.raw_type, &known, &Trail::root(), warnings),
                        optional: f.optional,
                    })
                    .collect();
                Body::Object(fields)
            }
        };
        out.push(MappedDecl { name: d.name.clone(), body });
    }
    Ok(out)
}

// ------------------------------ Extraction -------------------------------- //

fn extract_blocks(text: &str, out: &mut Vec<Declaration>, warnings: &mut Vec<Warning>) {
    let mut cursor = 0usize;
    for caps in BLOCK_HEAD.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if whole.start() < cursor {
            continue; // inside a previously handled block; nesting is lifted below
        }
        let keyword = caps.get(1).unwrap().as_str();
        let name = caps.get(2).unwrap().as_str().to_string();
        let open = whole.end() - 1;
        let Some(close) = scan::find_matching_closer(text, open) else {
            warnings.push(Warning::UnbalancedDelimiter { decl: name });
            cursor = open + 1;
            continue;
        };
        cursor = close + 1;
        let body = &text[open + 1..close];

        if keyword == "enum" {
            push_decl(out, Declaration::enumeration(name, body), warnings);
        } else {
            // lift nested message/enum blocks, then parse what is left
            let mut flat = String::with_capacity(body.len());
            let mut rest = 0usize;
            for inner in BLOCK_HEAD.captures_iter(body) {
                let m = inner.get(0).unwrap();
                if m.start() < rest {
                    continue;
                }
                let inner_open = m.end() - 1;
                let Some(inner_close) = scan::find_matching_closer(body, inner_open) else {
                    continue; // outer scan already proved balance; defensive skip
                };
                flat.push_str(&body[rest..m.start()]);
                rest = inner_close + 1;
            }
            flat.push_str(&body[rest..]);
            extract_blocks(body, out, warnings);
            push_decl(out, Declaration::object(name, parse_fields(&flat)), warnings);
        }
    }
}

fn push_decl(out: &mut Vec<Declaration>, decl: Declaration, warnings: &mut Vec<Warning>) {
    if out.iter().any(|d| d.name == decl.name) {
        warnings.push(Warning::Unrepresentable {
            context: decl.name.clone(),
            detail: "duplicate name after lifting nested blocks, second definition skipped".into(),
        });
        return;
    }
    out.push(decl);
}

fn parse_fields(body: &str) -> Vec<Field> {
    let mut out = Vec::new();
    for line in scan::split_at_depth_zero_any(body, &[';', '\n']) {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with("option")
            || line.starts_with("reserved")
            || line.starts_with("extensions")
        {
            continue;
        }

        if let Some(rest) = line.strip_prefix("oneof") {
            if let Some(open) = rest.find('{') {
                let name = rest[..open].trim().to_string();
                if let Some(close) = scan::find_matching_closer(rest, open) {
                    let members: Vec<String> = parse_fields(&rest[open + 1..close])
                        .into_iter()
                        .map(|f| f.raw_type)
                        .collect();
                    if !members.is_empty() {
                        out.push(Field {
                            key: name,
                            raw_type: members.join(" | "),
                            optional: true,
                        });
                    }
                }
            }
            continue;
        }

        let Some(caps) = FIELD_LINE.captures(line) else { continue };
        let label = caps.get(1).map(|m| m.as_str());
        let base = caps.get(2).unwrap().as_str();
        let key = caps.get(3).unwrap().as_str().to_string();
        let raw_type = match label {
            Some("repeated") => format!("repeated {base}"),
            _ => base.to_string(),
        };
        out.push(Field { key, raw_type, optional: label == Some("optional") });
    }
    out
}

fn parse_enum_variants(body: &str) -> Vec<crate::expr::Lit> {
    let mut out = Vec::new();
    for line in scan::split_at_depth_zero_any(body, &[';', '\n']) {
        let line = line.trim();
        if let Some(caps) = ENUM_VARIANT.captures(line) {
            out.push(crate::expr::Lit::Str(caps.get(1).unwrap().as_str().to_string()));
        }
    }
    out
}

// ------------------------------- Mapping ---------------------------------- //

fn map_field_type(
    raw: &str,
    known: &BTreeSet<String>,
    trail: &Trail,
    warnings: &mut Vec<Warning>,
) -> TypeExpr {
    let raw = raw.trim();
    if trail.exhausted() {
        warnings.push(Warning::DepthExceeded {
            context: map::context_of(raw),
            limit: map::MAX_DEPTH,
        });
        return TypeExpr::Unknown;
    }

    // oneof members arrive joined with `|`
    let unions = scan::split_at_depth_zero(raw, '|');
    if unions.len() > 1 {
        let members = unions
            .iter()
            .map(|p| map_field_type(p, known, &trail.deeper(), warnings))
            .collect();
        return map::union_of(members);
    }

    if let Some(element) = raw.strip_prefix("repeated ") {
        let el = map_field_type(element, known, &trail.deeper(), warnings);
        return TypeExpr::Array(Box::new(el));
    }

    if let Some(args) = raw.strip_prefix("map").map(str::trim_start) {
        if args.starts_with('<') {
            if let Some(close) = scan::find_matching_closer(args, 0) {
                let parts = scan::split_at_depth_zero(&args[1..close], ',');
                if let [k, v] = parts.as_slice() {
                    return TypeExpr::Map {
                        key: Box::new(map_field_type(k, known, &trail.deeper(), warnings)),
                        value: Box::new(map_field_type(v, known, &trail.deeper(), warnings)),
                    };
                }
            }
            return TypeExpr::Unknown;
        }
    }

    scalar_or_reference(raw, known, warnings)
}

fn scalar_or_reference(
    name: &str,
    known: &BTreeSet<String>,
    warnings: &mut Vec<Warning>,
) -> TypeExpr {
    match name {
        "double" | "float" => TypeExpr::Primitive(Prim::Float),
        "int32" | "uint32" | "sint32" | "fixed32" | "sfixed32" => TypeExpr::Primitive(Prim::Int),
        "int64" | "uint64" | "sint64" | "fixed64" | "sfixed64" => {
            TypeExpr::Primitive(Prim::BigInt)
        }
        "bool" => TypeExpr::Primitive(Prim::Bool),
        "string" => TypeExpr::Primitive(Prim::Str),
        "bytes" => {
            warnings.push(Warning::Unrepresentable {
                context: "bytes".into(),
                detail: "byte field carried as string".into(),
            });
            TypeExpr::Primitive(Prim::Str)
        }
        "google.protobuf.Timestamp" => TypeExpr::Primitive(Prim::Date),
        "google.protobuf.Any" | "google.protobuf.Struct" => TypeExpr::Unknown,
        _ if known.contains(name) => TypeExpr::Reference(name.to_string()),
        _ => {
            warnings.push(Warning::UnknownReference { name: name.to_string() });
            TypeExpr::Unknown
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
