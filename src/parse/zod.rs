//! Zod front-end: `const Name = z.object({...})` declarations.
//!
//! A zod schema is an expression language of chained calls, so the
//! extractor only finds `const` heads and the mapper walks the call chain
//! with the scan primitives: read a method name, bracket-match its argument
//! list, repeat. Refinement methods (`.min`, `.email`, ...) are dropped;
//! `z.lazy(() => X)` maps back to a plain reference, which is exactly the
//! deferred form the zod emitter produces for cycles.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::decl::Declaration;
use crate::diag::Warning;
use crate::expr::{Lit, MappedDecl, ObjField, Prim, TypeExpr, body_from_expr};
use crate::map::{self, Trail};
use crate::scan;

static CONST_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?const\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*").unwrap()
});

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

pub fn parse(text: &str, warnings: &mut Vec<Warning>) -> Result<Vec<MappedDecl>, String> {
    let clean = scan::strip_comments(text, scan::CommentStyle::Slashes);
    let raw = extract(&clean);
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let known: BTreeSet<String> = raw.iter().map(|d| d.name.clone()).collect();
    let mut mapper = ZodMapper { known: &known, warnings };

    let mut out = Vec::with_capacity(raw.len());
    for d in &raw {
        let body = d.alias_body.as_deref().unwrap_or("");
        let (expr, optional) = mapper.z_expr(body, &Trail::root());
        let expr = if optional { map::nullable(expr) } else { expr };
        out.push(MappedDecl { name: d.name.clone(), body: body_from_expr(expr) });
    }
    Ok(out)
}

fn extract(text: &str) -> Vec<Declaration> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for caps in CONST_HEAD.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if whole.start() < cursor {
            continue;
        }
        let name = caps.get(1).unwrap().as_str().to_string();
        let start = whole.end();
        let rest = &text[start..];

        // the expression runs to a depth-zero `;` or the next const head
        let semi = scan::find_at_depth_zero(rest, ';');
        let next = CONST_HEAD.find(rest).map(|m| m.start());
        let end = match (semi, next) {
            (Some(s), Some(n)) => s.min(n),
            (Some(s), None) => s,
            (None, Some(n)) => n,
            (None, None) => rest.len(),
        };
        cursor = start + end;

        let body = rest[..end].trim();
        // only schema declarations; plain constants are not our business
        if body.starts_with('z') {
            out.push(Declaration::alias(name, body));
        }
    }
    out
}

// ------------------------------- Mapping ---------------------------------- //

struct ZodMapper<'a> {
    known: &'a BTreeSet<String>,
    warnings: &'a mut Vec<Warning>,
}

impl ZodMapper<'_> {
    /// Map one zod expression. The `bool` is the `.optional()` flag, which
    /// only matters in object-field position; everywhere else the caller
    /// folds it into `Nullable`.
    fn z_expr(&mut self, raw: &str, trail: &Trail) -> (TypeExpr, bool) {
        let raw = raw.trim();
        if trail.exhausted() {
            self.warnings.push(Warning::DepthExceeded {
                context: map::context_of(raw),
                limit: map::MAX_DEPTH,
            });
            return (TypeExpr::Unknown, false);
        }
        if raw.is_empty() {
            return (TypeExpr::Unknown, false);
        }

        // bare identifier: a reference to another schema constant
        if IDENT.is_match(raw) {
            if self.known.contains(raw) {
                return (TypeExpr::Reference(raw.to_string()), false);
            }
            self.warnings.push(Warning::UnknownReference { name: raw.to_string() });
            return (TypeExpr::Unknown, false);
        }

        let Some(chain) = split_chain(raw) else {
            return (TypeExpr::Unknown, false);
        };

        let mut iter = chain.into_iter();
        let mut expr = TypeExpr::Unknown;
        let mut optional = false;

        // base call (skipping namespace segments like `coerce`)
        for (name, args) in iter.by_ref() {
            if args.is_none() && name == "coerce" {
                continue;
            }
            expr = self.base(name, args.unwrap_or(""), trail);
            break;
        }

        // modifier chain
        for (name, args) in iter {
            let args = args.unwrap_or("");
            match name {
                "optional" | "nullish" => {
                    optional = true;
                    if name == "nullish" {
                        expr = map::nullable(expr);
                    }
                }
                "nullable" => expr = map::nullable(expr),
                "array" => expr = TypeExpr::Array(Box::new(expr)),
                "int" => {
                    if expr == TypeExpr::Primitive(Prim::Float) {
                        expr = TypeExpr::Primitive(Prim::Int);
                    }
                }
                "or" => {
                    let (rhs, _) = self.z_expr(args, &trail.deeper());
                    expr = map::union_of(vec![expr, rhs]);
                }
                "and" | "merge" => {
                    let (rhs, _) = self.z_expr(args, &trail.deeper());
                    expr = map::intersection_of(vec![expr, rhs]);
                }
                "partial" | "required" => {
                    if let TypeExpr::Object(ref mut fields) = expr {
                        for f in fields {
                            f.optional = name == "partial";
                        }
                    }
                }
                // refinement and shaping methods carry no type information
                _ => {}
            }
        }
        (expr, optional)
    }

    fn base(&mut self, name: &str, args: &str, trail: &Trail) -> TypeExpr {
        match name {
            "string" => TypeExpr::Primitive(Prim::Str),
            "number" => TypeExpr::Primitive(Prim::Float),
            "boolean" => TypeExpr::Primitive(Prim::Bool),
            "bigint" => TypeExpr::Primitive(Prim::BigInt),
            "date" => TypeExpr::Primitive(Prim::Date),
            "null" | "undefined" | "void" => TypeExpr::Primitive(Prim::Null),
            "never" => TypeExpr::Primitive(Prim::Never),
            "any" | "unknown" => TypeExpr::Unknown,
            "literal" => literal_of(args),
            "array" => {
                let (el, _) = self.z_expr(args, &trail.deeper());
                TypeExpr::Array(Box::new(el))
            }
            "set" => {
                let (el, _) = self.z_expr(args, &trail.deeper());
                TypeExpr::Array(Box::new(el))
            }
            "promise" | "lazy" => self.deferred(args, trail),
            "object" => self.object(args, trail),
            "union" | "discriminatedUnion" => self.union(args, trail),
            "intersection" => {
                let parts = scan::split_at_depth_zero(args, ',');
                let members = parts
                    .iter()
                    .map(|p| self.z_expr(p, &trail.deeper()).0)
                    .collect();
                map::intersection_of(members)
            }
            "tuple" => {
                let inner = strip_brackets(args).unwrap_or(args);
                let elems = scan::split_at_depth_zero(inner, ',')
                    .iter()
                    .map(|p| self.z_expr(p, &trail.deeper()).0)
                    .collect();
                TypeExpr::Tuple(elems)
            }
            "record" | "map" => {
                let parts = scan::split_at_depth_zero(args, ',');
                match parts.as_slice() {
                    [v] => TypeExpr::Map {
                        key: Box::new(TypeExpr::Primitive(Prim::Str)),
                        value: Box::new(self.z_expr(v, &trail.deeper()).0),
                    },
                    [k, v] => TypeExpr::Map {
                        key: Box::new(self.z_expr(k, &trail.deeper()).0),
                        value: Box::new(self.z_expr(v, &trail.deeper()).0),
                    },
                    _ => TypeExpr::Unknown,
                }
            }
            "enum" => {
                let inner = strip_brackets(args).unwrap_or(args);
                let members = scan::split_at_depth_zero(inner, ',')
                    .iter()
                    .filter_map(|v| {
                        let v = v.trim();
                        is_quoted(v).then(|| TypeExpr::Literal(Lit::Str(unquote(v).to_string())))
                    })
                    .collect::<Vec<_>>();
                if members.is_empty() { TypeExpr::Unknown } else { map::union_of(members) }
            }
            "nativeEnum" => {
                let target = args.trim();
                if self.known.contains(target) {
                    TypeExpr::Reference(target.to_string())
                } else {
                    self.warnings.push(Warning::UnknownReference { name: target.to_string() });
                    TypeExpr::Unknown
                }
            }
            _ => TypeExpr::Unknown,
        }
    }

    /// `z.lazy(() => X)` / `z.promise(X)`: unwrap to the inner expression.
    fn deferred(&mut self, args: &str, trail: &Trail) -> TypeExpr {
        let inner = match scan::find_pair_at_depth_zero(args, [b'=', b'>']) {
            Some(arrow) => args[arrow + 2..].trim(),
            None => args.trim(),
        };
        self.z_expr(inner, &trail.deeper()).0
    }

    fn object(&mut self, args: &str, trail: &Trail) -> TypeExpr {
        let Some(body) = strip_braces(args) else {
            return TypeExpr::Unknown;
        };
        let mut fields = Vec::new();
        for line in scan::split_at_depth_zero(body, ',') {
            let Some(colon) = scan::find_at_depth_zero(line, ':') else { continue };
            let key = line[..colon].trim().trim_matches(|c| c == '"' || c == '\'');
            if key.is_empty() {
                continue;
            }
            let (expr, optional) = self.z_expr(&line[colon + 1..], &trail.deeper());
            fields.push(ObjField { key: key.to_string(), expr, optional });
        }
        TypeExpr::Object(fields)
    }

    fn union(&mut self, args: &str, trail: &Trail) -> TypeExpr {
        // discriminatedUnion("kind", [...]) carries a leading key argument
        let parts = scan::split_at_depth_zero(args, ',');
        let list = parts
            .iter()
            .find(|p| p.starts_with('['))
            .copied()
            .unwrap_or(args);
        let inner = strip_brackets(list).unwrap_or(list);
        let members = scan::split_at_depth_zero(inner, ',')
            .iter()
            .map(|p| self.z_expr(p, &trail.deeper()).0)
            .collect();
        map::union_of(members)
    }
}

/// Split `z.a(...).b(...).c` into `(name, args)` segments. Returns `None`
/// for text that does not start with the `z` namespace.
fn split_chain(raw: &str) -> Option<Vec<(&str, Option<&str>)>> {
    let bytes = raw.as_bytes();
    if *bytes.first()? != b'z' {
        return None;
    }
    let mut out = Vec::new();
    let mut i = 1usize;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'.' {
            break; // trailing junk is ignored, the chain so far stands
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
            i += 1;
        }
        if i == name_start {
            break;
        }
        let name = &raw[name_start..i];
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'(' {
            let close = scan::find_matching_closer(raw, i)?;
            out.push((name, Some(raw[i + 1..close].trim())));
            i = close + 1;
        } else {
            out.push((name, None));
        }
    }
    (!out.is_empty()).then_some(out)
}

fn literal_of(args: &str) -> TypeExpr {
    let v = args.trim();
    if is_quoted(v) {
        TypeExpr::Literal(Lit::Str(unquote(v).to_string()))
    } else if NUMERIC.is_match(v) {
        TypeExpr::Literal(Lit::Num(v.to_string()))
    } else if v == "true" || v == "false" {
        TypeExpr::Literal(Lit::Bool(v == "true"))
    } else {
        TypeExpr::Unknown
    }
}

fn strip_brackets(s: &str) -> Option<&str> {
    let s = s.trim();
    (s.starts_with('[') && scan::find_matching_closer(s, 0) == Some(s.len() - 1))
        .then(|| s[1..s.len() - 1].trim())
}

fn strip_braces(s: &str) -> Option<&str> {
    let s = s.trim();
    (s.starts_with('{') && scan::find_matching_closer(s, 0) == Some(s.len() - 1))
        .then(|| s[1..s.len() - 1].trim())
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && (s.starts_with('"') || s.starts_with('\''))
        && scan::skip_string_literal(s, 0) == s.len() - 1
}

fn unquote(s: &str) -> &str {
    &s[1..s.len() - 1]
}

// ------------------------------- Tests ------------------------------------ //
