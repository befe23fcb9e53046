//! TypeScript front-end: interfaces, type aliases, enums.
//!
//! Extraction finds declaration heads with a line-anchored pattern, then
//! leans on `scan::find_matching_closer` to isolate bodies; nothing here
//! tries to be a real TS parser. Type expressions go through `map_type`,
//! whose branch order is fixed and documented below; the ordering is the
//! design, since several TS shapes overlap syntactically.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::decl::{DeclKind, Declaration, Field};
use crate::diag::Warning;
use crate::expr::{Body, Lit, MappedDecl, ObjField, Prim, TypeExpr, body_from_expr};
use crate::map::{self, Trail};
use crate::scan;

static DECL_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?(interface|type|(?:const\s+)?enum)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
    )
    .unwrap()
});

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$.]*$").unwrap());

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

static GENERIC_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_$][A-Za-z0-9_$]*)\s*<").unwrap());

// ------------------------------ Extraction -------------------------------- //

/// One extracted declaration plus its `extends` bases (interfaces only).
#[derive(Debug, Clone)]
struct TsDecl {
    decl: Declaration,
    extends: Vec<String>,
}

pub fn parse(text: &str, warnings: &mut Vec<Warning>) -> Result<Vec<MappedDecl>, String> {
    let clean = scan::strip_comments(text, scan::CommentStyle::Slashes);
    let raw = extract(&clean, warnings);
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let mut index = BTreeMap::new();
    for (i, d) in raw.iter().enumerate() {
        index.entry(d.decl.name.clone()).or_insert(i);
    }

    let mut mapper = TsMapper { decls: &raw, index: &index, warnings };
    let mut out = Vec::with_capacity(raw.len());
    for d in &raw {
        // own name seeds the trail so self-expansion is caught immediately
        let trail = Trail::root().through(&d.decl.name);
        let body = match d.decl.kind {
            DeclKind::ObjectLike => {
                let expr = mapper.object_body(d, &trail);
                body_from_expr(expr)
            }
            DeclKind::EnumLike => {
                Body::Enum(parse_enum_members(d.decl.alias_body.as_deref().unwrap_or("")))
            }
            DeclKind::AliasExpression => {
                let raw_body = d.decl.alias_body.as_deref().unwrap_or("");
                body_from_expr(mapper.map_type(raw_body, &trail))
            }
        };
        out.push(MappedDecl { name: d.decl.name.clone(), body });
    }
    Ok(out)
}

fn extract(text: &str, warnings: &mut Vec<Warning>) -> Vec<TsDecl> {
    let mut out = Vec::new();
    let mut cursor = 0usize;

    for caps in DECL_HEAD.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if whole.start() < cursor {
            continue; // inside the previous declaration's body
        }
        let keyword = caps.get(1).unwrap().as_str();
        let name = caps.get(2).unwrap().as_str().to_string();
        let mut pos = whole.end();

        // skip generic parameter list on the declaration itself
        if let Some(open) = next_non_ws(text, pos).filter(|&i| text.as_bytes()[i] == b'<') {
            match scan::find_matching_closer(text, open) {
                Some(close) => pos = close + 1,
                None => {
                    warnings.push(Warning::UnbalancedDelimiter { decl: name });
                    cursor = whole.end();
                    continue;
                }
            }
        }

        match keyword {
            "type" => {
                let Some(eq) = scan::find_at_depth_zero(&text[pos..], '=') else {
                    cursor = pos;
                    continue;
                };
                let body_start = pos + eq + 1;
                let body_end = alias_end(text, body_start);
                let body = text[body_start..body_end].trim();
                cursor = body_end;

                // `type X = { ... }` is object-like, not an alias
                let trimmed = body.trim_end_matches(';').trim();
                if trimmed.starts_with('{')
                    && scan::find_matching_closer(trimmed, 0) == Some(trimmed.len() - 1)
                {
                    let fields = parse_members(&trimmed[1..trimmed.len() - 1]);
                    out.push(TsDecl { decl: Declaration::object(name, fields), extends: Vec::new() });
                } else {
                    out.push(TsDecl { decl: Declaration::alias(name, trimmed), extends: Vec::new() });
                }
            }
            kw => {
                // interface or enum: everything up to the brace, then the
                // body. The brace search stops at the next declaration head
                // so a braceless (malformed) head cannot swallow its
                // successor's body.
                let window_end = DECL_HEAD
                    .find(&text[pos..])
                    .map(|m| pos + m.start())
                    .unwrap_or(text.len());
                let Some(open) =
                    scan::find_at_depth_zero(&text[pos..window_end], '{').map(|i| pos + i)
                else {
                    cursor = pos;
                    continue;
                };
                let Some(close) = scan::find_matching_closer(text, open) else {
                    warnings.push(Warning::UnbalancedDelimiter { decl: name });
                    cursor = open + 1;
                    continue;
                };
                let body = &text[open + 1..close];
                cursor = close + 1;

                if kw == "interface" {
                    let extends = parse_extends(&text[pos..open]);
                    let fields = parse_members(body);
                    out.push(TsDecl { decl: Declaration::object(name, fields), extends });
                } else {
                    out.push(TsDecl { decl: Declaration::enumeration(name, body), extends: Vec::new() });
                }
            }
        }
    }
    out
}

/// An alias body runs to a depth-zero `;` or the next declaration head,
/// whichever comes first (TS has no mandatory terminator after `type X = ...`).
fn alias_end(text: &str, start: usize) -> usize {
    let rest = &text[start..];
    let semi = scan::find_at_depth_zero(rest, ';');
    let next_head = DECL_HEAD.find(rest).map(|m| m.start());
    match (semi, next_head) {
        (Some(s), Some(h)) => start + s.min(h),
        (Some(s), None) => start + s,
        (None, Some(h)) => start + h,
        (None, None) => text.len(),
    }
}

fn parse_extends(between: &str) -> Vec<String> {
    let Some(idx) = between.find("extends") else { return Vec::new() };
    scan::split_at_depth_zero(&between[idx + "extends".len()..], ',')
        .into_iter()
        .map(|base| {
            // drop type arguments: `Base<T>` extends the declaration `Base`
            match base.find('<') {
                Some(lt) => base[..lt].trim().to_string(),
                None => base.to_string(),
            }
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a braced body into member `Field`s. Shared by the extractor and
/// by inline-object mapping. Index signatures keep their bracketed key.
fn parse_members(body: &str) -> Vec<Field> {
    let mut out = Vec::new();
    for line in scan::split_at_depth_zero_any(body, &[';', ',', '\n']) {
        match parse_member_line(line) {
            Some(field) => out.push(field),
            None => {}
        }
    }
    out
}

fn parse_member_line(line: &str) -> Option<Field> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // index signature: `[key: string]: V`
    if line.starts_with('[') {
        let close = scan::find_matching_closer(line, 0)?;
        let rest = line[close + 1..].trim_start();
        let value = rest.strip_prefix(':')?.trim();
        return Some(Field {
            key: line[..=close].to_string(),
            raw_type: value.to_string(),
            optional: false,
        });
    }

    let colon = scan::find_at_depth_zero(line, ':')?;
    let mut key = line[..colon].trim();
    let raw_type = line[colon + 1..].trim();
    if raw_type.is_empty() {
        return None;
    }

    key = key.strip_prefix("readonly ").map(str::trim).unwrap_or(key);
    if key.contains('(') {
        return None; // method member, dropped
    }
    let optional = key.ends_with('?');
    let key = key.trim_end_matches('?').trim_end();
    let key = key.trim_matches(|c| c == '"' || c == '\'');
    if key.is_empty() {
        return None;
    }
    Some(Field { key: key.to_string(), raw_type: raw_type.to_string(), optional })
}

fn parse_enum_members(body: &str) -> Vec<Lit> {
    let mut out = Vec::new();
    let mut auto = 0i64;
    for part in scan::split_at_depth_zero(body, ',') {
        let (name, init) = match scan::find_at_depth_zero(part, '=') {
            Some(eq) => (part[..eq].trim(), Some(part[eq + 1..].trim())),
            None => (part.trim(), None),
        };
        if name.is_empty() {
            continue;
        }
        match init {
            None => {
                out.push(Lit::Num(auto.to_string()));
                auto += 1;
            }
            Some(v) if is_quoted(v) => out.push(Lit::Str(unquote(v).to_string())),
            Some(v) if NUMERIC.is_match(v) => {
                if let Ok(n) = v.parse::<i64>() {
                    auto = n + 1;
                }
                out.push(Lit::Num(v.to_string()));
            }
            // computed member: keep the expression text as an opaque value
            Some(v) => out.push(Lit::Str(v.to_string())),
        }
    }
    out
}

fn next_non_ws(text: &str, from: usize) -> Option<usize> {
    text[from..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| from + i)
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && (s.starts_with('"') || s.starts_with('\''))
        && scan::skip_string_literal(s, 0) == s.len() - 1
}

fn unquote(s: &str) -> &str {
    &s[1..s.len() - 1]
}

// ------------------------------- Mapping ---------------------------------- //

struct TsMapper<'a> {
    decls: &'a [TsDecl],
    index: &'a BTreeMap<String, usize>,
    warnings: &'a mut Vec<Warning>,
}

impl TsMapper<'_> {
    /// Map one declaration's members plus its flattened `extends` bases.
    fn object_body(&mut self, d: &TsDecl, trail: &Trail) -> TypeExpr {
        let mut inherited: Vec<ObjField> = Vec::new();
        for base in &d.extends {
            match self.object_fields_of(base, trail) {
                Some(fields) => {
                    for f in fields {
                        inherited.retain(|existing| existing.key != f.key);
                        inherited.push(f);
                    }
                }
                None if trail.visited(base) => {
                    self.warnings.push(Warning::Unrepresentable {
                        context: format!("{} extends {}", d.decl.name, base),
                        detail: "inheritance cycle edge dropped".into(),
                    });
                }
                None => {
                    self.warnings.push(Warning::UnknownReference { name: base.clone() });
                }
            }
        }

        let (own, sigs) = self.map_members(&d.decl.fields, trail);
        for f in own {
            inherited.retain(|existing| existing.key != f.key);
            inherited.push(f);
        }
        compose_object(inherited, sigs)
    }

    /// Map member fields; index signatures come back separately as `Map`s.
    fn map_members(&mut self, fields: &[Field], trail: &Trail) -> (Vec<ObjField>, Vec<TypeExpr>) {
        let mut named = Vec::new();
        let mut sigs = Vec::new();
        for f in fields {
            if f.key.starts_with('[') {
                let inner = f.key.trim_start_matches('[').trim_end_matches(']');
                let key_raw = match scan::find_at_depth_zero(inner, ':') {
                    Some(c) => inner[c + 1..].trim(),
                    None => "string",
                };
                sigs.push(TypeExpr::Map {
                    key: Box::new(self.map_type(key_raw, &trail.deeper())),
                    value: Box::new(self.map_type(&f.raw_type, &trail.deeper())),
                });
            } else {
                named.push(ObjField {
                    key: f.key.clone(),
                    expr: self.map_type(&f.raw_type, &trail.deeper()),
                    optional: f.optional,
                });
            }
        }
        (named, sigs)
    }

    /// The recursive core. Branch order is load-bearing:
    ///   1. depth guard
    ///   2. grouping / prefix operators
    ///   3. exact matches: known reference, primitive keyword, literal
    ///   4. union split
    ///   5. intersection split
    ///   6. array suffix, tuple
    ///   7. generic containers
    ///   8. inline object
    ///   9. unknown sentinel
    fn map_type(&mut self, raw: &str, trail: &Trail) -> TypeExpr {
        let raw = raw.trim();
        if trail.exhausted() {
            self.warnings.push(Warning::DepthExceeded {
                context: map::context_of(raw),
                limit: map::MAX_DEPTH,
            });
            return TypeExpr::Unknown;
        }
        if raw.is_empty() {
            return TypeExpr::Unknown;
        }

        // grouping: `(T)` where the parens span the whole expression
        if raw.starts_with('(')
            && scan::find_matching_closer(raw, 0) == Some(raw.len() - 1)
        {
            return self.map_type(&raw[1..raw.len() - 1], &trail.deeper());
        }

        // prefix operators
        if let Some(rest) = raw.strip_prefix("readonly ") {
            return self.map_type(rest, &trail.deeper());
        }
        if raw.strip_prefix("keyof ").is_some() {
            return TypeExpr::Primitive(Prim::Str);
        }
        if raw.strip_prefix("typeof ").is_some() {
            return TypeExpr::Unknown;
        }

        // function and conditional types have no counterpart anywhere we
        // emit; both degrade to the sentinel
        if scan::find_pair_at_depth_zero(raw, [b'=', b'>']).is_some() {
            return TypeExpr::Unknown;
        }

        // exact identifier: reference first (declared names shadow
        // primitives), then the keyword table
        if IDENT.is_match(raw) {
            return self.map_ident(raw);
        }

        if is_quoted(raw) {
            return TypeExpr::Literal(Lit::Str(unquote(raw).to_string()));
        }
        if raw.starts_with('`') && scan::skip_string_literal(raw, 0) == raw.len() - 1 {
            let inner = &raw[1..raw.len() - 1];
            return if inner.contains("${") {
                TypeExpr::Primitive(Prim::Str)
            } else {
                TypeExpr::Literal(Lit::Str(inner.to_string()))
            };
        }
        if NUMERIC.is_match(raw) {
            return TypeExpr::Literal(Lit::Num(raw.to_string()));
        }

        let unions = scan::split_at_depth_zero(raw, '|');
        if unions.len() > 1 {
            let members = unions.iter().map(|p| self.map_type(p, &trail.deeper())).collect();
            return map::union_of(members);
        }

        let inters = scan::split_at_depth_zero(raw, '&');
        if inters.len() > 1 {
            let members = inters.iter().map(|p| self.map_type(p, &trail.deeper())).collect();
            return map::intersection_of(members);
        }

        if let Some(element) = raw.strip_suffix("[]") {
            let el = self.map_type(element, &trail.deeper());
            return TypeExpr::Array(Box::new(el));
        }

        if raw.starts_with('[') && scan::find_matching_closer(raw, 0) == Some(raw.len() - 1) {
            let elems = scan::split_at_depth_zero(&raw[1..raw.len() - 1], ',')
                .iter()
                .map(|p| self.map_type(p, &trail.deeper()))
                .collect();
            return TypeExpr::Tuple(elems);
        }

        if let Some(generic) = self.try_generic(raw, trail) {
            return generic;
        }

        if raw.starts_with('{') && scan::find_matching_closer(raw, 0) == Some(raw.len() - 1) {
            let members = parse_members(&raw[1..raw.len() - 1]);
            let (named, sigs) = self.map_members(&members, trail);
            return compose_object(named, sigs);
        }

        TypeExpr::Unknown
    }

    fn map_ident(&mut self, name: &str) -> TypeExpr {
        if self.index.contains_key(name) {
            return TypeExpr::Reference(name.to_string());
        }
        match name {
            "string" => TypeExpr::Primitive(Prim::Str),
            "number" => TypeExpr::Primitive(Prim::Float),
            "boolean" => TypeExpr::Primitive(Prim::Bool),
            "bigint" => TypeExpr::Primitive(Prim::BigInt),
            "Date" => TypeExpr::Primitive(Prim::Date),
            "null" | "undefined" | "void" => TypeExpr::Primitive(Prim::Null),
            "never" => TypeExpr::Primitive(Prim::Never),
            "any" | "unknown" | "symbol" => TypeExpr::Unknown,
            "object" => TypeExpr::Map {
                key: Box::new(TypeExpr::Primitive(Prim::Str)),
                value: Box::new(TypeExpr::Unknown),
            },
            "true" => TypeExpr::Literal(Lit::Bool(true)),
            "false" => TypeExpr::Literal(Lit::Bool(false)),
            _ => {
                self.warnings.push(Warning::UnknownReference { name: name.to_string() });
                TypeExpr::Unknown
            }
        }
    }

    fn try_generic(&mut self, raw: &str, trail: &Trail) -> Option<TypeExpr> {
        let caps = GENERIC_HEAD.captures(raw)?;
        let head = caps.get(1).unwrap().as_str();
        let open = caps.get(0).unwrap().end() - 1;
        if scan::find_matching_closer(raw, open) != Some(raw.len() - 1) {
            return None;
        }
        let args: Vec<&str> = scan::split_at_depth_zero(&raw[open + 1..raw.len() - 1], ',');

        let expr = match (head, args.as_slice()) {
            ("Array" | "ReadonlyArray" | "Set" | "Iterable", [el]) => {
                TypeExpr::Array(Box::new(self.map_type(el, &trail.deeper())))
            }
            ("Promise", [inner]) => self.map_type(inner, &trail.deeper()),
            ("Record", [k, v]) => TypeExpr::Map {
                key: Box::new(self.map_type(k, &trail.deeper())),
                value: Box::new(self.map_type(v, &trail.deeper())),
            },
            ("Record", [v]) => TypeExpr::Map {
                key: Box::new(TypeExpr::Primitive(Prim::Str)),
                value: Box::new(self.map_type(v, &trail.deeper())),
            },
            ("Map", [k, v]) => TypeExpr::Map {
                key: Box::new(self.map_type(k, &trail.deeper())),
                value: Box::new(self.map_type(v, &trail.deeper())),
            },
            ("Readonly", [base]) => self.map_type(base, &trail.deeper()),
            ("Partial" | "Required", [base]) => {
                match self.fields_of_text(base, trail) {
                    Some(mut fields) => {
                        let optional = head == "Partial";
                        for f in &mut fields {
                            f.optional = optional;
                        }
                        TypeExpr::Object(fields)
                    }
                    None => self.map_type(base, &trail.deeper()),
                }
            }
            ("Pick" | "Omit", [base, keys]) => {
                match (self.fields_of_text(base, trail), literal_key_set(keys)) {
                    (Some(fields), Some(set)) => {
                        let keep_listed = head == "Pick";
                        let kept = fields
                            .into_iter()
                            .filter(|f| set.contains(&f.key) == keep_listed)
                            .collect();
                        TypeExpr::Object(kept)
                    }
                    // base unknown or keys not literal: plain map of the base
                    _ => self.map_type(base, &trail.deeper()),
                }
            }
            _ => {
                // unrecognized container: type arguments are dropped and the
                // base maps on its own (a known name stays a reference)
                self.map_type(head, &trail.deeper())
            }
        };
        Some(expr)
    }

    /// Resolve a type-argument expression down to object fields, if it
    /// denotes (possibly through aliases) an object-like declaration.
    fn fields_of_text(&mut self, base: &str, trail: &Trail) -> Option<Vec<ObjField>> {
        let base = base.trim();
        if IDENT.is_match(base) {
            return self.object_fields_of(base, trail);
        }
        match self.map_type(base, &trail.deeper()) {
            TypeExpr::Object(fields) => Some(fields),
            TypeExpr::Reference(name) => self.object_fields_of(&name, trail),
            _ => None,
        }
    }

    fn object_fields_of(&mut self, name: &str, trail: &Trail) -> Option<Vec<ObjField>> {
        if trail.exhausted() || trail.visited(name) {
            return None;
        }
        let i = *self.index.get(name)?;
        let d = &self.decls[i];
        let deeper = trail.through(name);
        match d.decl.kind {
            DeclKind::ObjectLike => match self.object_body(&d.clone(), &deeper) {
                TypeExpr::Object(fields) => Some(fields),
                _ => None,
            },
            DeclKind::AliasExpression => {
                let body = d.decl.alias_body.clone().unwrap_or_default();
                match self.map_type(&body, &deeper) {
                    TypeExpr::Object(fields) => Some(fields),
                    TypeExpr::Reference(next) => self.object_fields_of(&next, &deeper),
                    _ => None,
                }
            }
            DeclKind::EnumLike => None,
        }
    }
}

fn compose_object(named: Vec<ObjField>, sigs: Vec<TypeExpr>) -> TypeExpr {
    if sigs.is_empty() {
        return TypeExpr::Object(named);
    }
    if named.is_empty() && sigs.len() == 1 {
        return sigs.into_iter().next().unwrap();
    }
    let mut members = Vec::with_capacity(1 + sigs.len());
    if !named.is_empty() {
        members.push(TypeExpr::Object(named));
    }
    members.extend(sigs);
    map::intersection_of(members)
}

/// `'a' | 'b'` → the set of keys, if every part is a string literal.
fn literal_key_set(keys: &str) -> Option<Vec<String>> {
    let parts = scan::split_at_depth_zero(keys, '|');
    let mut out = Vec::with_capacity(parts.len());
    for p in parts {
        if !is_quoted(p) {
            return None;
        }
        out.push(unquote(p).to_string());
    }
    (!out.is_empty()).then_some(out)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> (Vec<MappedDecl>, Vec<Warning>) {
        let mut warnings = Vec::new();
        let decls = parse(src, &mut warnings).expect("ts parse is total");
        (decls, warnings)
    }

    #[test]
    fn interface_fields_keep_source_order_and_optionality() {
        let (decls, warnings) = parse_ok(
            "interface User {\n  name: string;\n  age?: number;\n}",
        );
        assert!(warnings.is_empty());
        assert_eq!(decls.len(), 1);
        let Body::Object(fields) = &decls[0].body else { panic!("expected object") };
        assert_eq!(fields[0].key, "name");
        assert!(!fields[0].optional);
        assert_eq!(fields[0].expr, TypeExpr::Primitive(Prim::Str));
        assert_eq!(fields[1].key, "age");
        assert!(fields[1].optional);
    }

    #[test]
    fn string_literal_union_becomes_enum_body() {
        let (decls, _) = parse_ok("type Level = 'low' | 'mid' | 'high';");
        let Body::Enum(lits) = &decls[0].body else { panic!("expected enum") };
        let values: Vec<_> = lits
            .iter()
            .map(|l| match l {
                Lit::Str(s) => s.as_str(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(values, vec!["low", "mid", "high"]);
    }

    #[test]
    fn null_union_collapses_to_nullable() {
        let (decls, _) = parse_ok("interface T { x: string | null; }");
        let Body::Object(fields) = &decls[0].body else { panic!() };
        assert_eq!(
            fields[0].expr,
            TypeExpr::Nullable(Box::new(TypeExpr::Primitive(Prim::Str)))
        );
    }

    #[test]
    fn unknown_reference_degrades_field_only() {
        let (decls, warnings) = parse_ok("interface T { a: Missing; b: string; }");
        let Body::Object(fields) = &decls[0].body else { panic!() };
        assert_eq!(fields[0].expr, TypeExpr::Unknown);
        assert_eq!(fields[1].expr, TypeExpr::Primitive(Prim::Str));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnknownReference { name } if name == "Missing")));
    }

    #[test]
    fn array_of_union_stays_grouped() {
        let (decls, _) = parse_ok("interface T { xs: (string | number)[]; }");
        let Body::Object(fields) = &decls[0].body else { panic!() };
        match &fields[0].expr {
            TypeExpr::Array(el) => match el.as_ref() {
                TypeExpr::Union(members) => assert_eq!(members.len(), 2),
                other => panic!("expected union element, got {other:?}"),
            },
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn mutual_references_terminate() {
        let (decls, _) = parse_ok(
            "interface A { b: B; }\ninterface B { a: A; }",
        );
        assert_eq!(decls.len(), 2);
        let Body::Object(fields) = &decls[0].body else { panic!() };
        assert_eq!(fields[0].expr, TypeExpr::Reference("B".into()));
    }

    #[test]
    fn extends_flattens_base_fields_first() {
        let (decls, _) = parse_ok(
            "interface Base { id: string; }\ninterface Sub extends Base { name: string; }",
        );
        let sub = decls.iter().find(|d| d.name == "Sub").unwrap();
        let Body::Object(fields) = &sub.body else { panic!() };
        assert_eq!(fields[0].key, "id");
        assert_eq!(fields[1].key, "name");
    }

    #[test]
    fn pick_selects_declared_fields() {
        let (decls, _) = parse_ok(
            "interface User { id: string; name: string; age: number; }\n\
             type Slim = Pick<User, 'id' | 'name'>;",
        );
        let slim = decls.iter().find(|d| d.name == "Slim").unwrap();
        let Body::Object(fields) = &slim.body else { panic!("pick should inline fields") };
        let keys: Vec<_> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "name"]);
    }

    #[test]
    fn pick_of_unknown_base_degrades_to_reference_map() {
        let (decls, warnings) = parse_ok("type Slim = Pick<Ghost, 'id'>;");
        let Body::Alias(expr) = &decls[0].body else { panic!() };
        assert_eq!(*expr, TypeExpr::Unknown);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnknownReference { name } if name == "Ghost")));
    }

    #[test]
    fn self_referential_pick_is_cut() {
        let (decls, _) = parse_ok("type A = Pick<A, 'x'>;");
        // the cycle cut falls back to a plain reference to A
        let Body::Alias(expr) = &decls[0].body else { panic!() };
        assert_eq!(*expr, TypeExpr::Reference("A".into()));
    }

    #[test]
    fn enum_members_auto_increment() {
        let (decls, _) = parse_ok("enum E { A, B = 5, C, D = 'x' }");
        let Body::Enum(lits) = &decls[0].body else { panic!() };
        assert_eq!(
            lits,
            &vec![
                Lit::Num("0".into()),
                Lit::Num("5".into()),
                Lit::Num("6".into()),
                Lit::Str("x".into())
            ]
        );
    }

    #[test]
    fn index_signature_becomes_map() {
        let (decls, _) = parse_ok("interface Env { [key: string]: string; }");
        let Body::Alias(TypeExpr::Map { key, value }) = &decls[0].body else {
            panic!("expected map alias, got {:?}", decls[0].body)
        };
        assert_eq!(**key, TypeExpr::Primitive(Prim::Str));
        assert_eq!(**value, TypeExpr::Primitive(Prim::Str));
    }

    #[test]
    fn unbalanced_interface_is_skipped_with_warning() {
        let (decls, warnings) = parse_ok(
            "interface Broken { x: string;\ninterface Fine { y: number; }",
        );
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnbalancedDelimiter { decl } if decl == "Broken")));
        // extraction resumes past the broken opener and still finds Fine
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "Fine");
    }
}
