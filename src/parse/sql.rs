//! SQL front-end: `CREATE TABLE` definitions.
//!
//! Column grammar is dialect-blended on purpose (Postgres, MySQL, SQLite
//! type names all land in one lookup table); constraint lines are skipped.
//! `ENUM(...)`/`SET(...)` is the dedicated closed-enumeration construct and
//! is recognized before any union handling.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::decl::{Declaration, Field};
use crate::diag::Warning;
use crate::expr::{Body, MappedDecl, ObjField, Prim, TypeExpr};
use crate::map::{self, Trail};
use crate::scan;

static TABLE_HEAD: Lazy<Regex> = Lazy::new(|| {
    // one name segment, quoted any of the common ways
    const SEG: &str = r#"(?:"[^"]+"|`[^`]+`|\[[^\]]+\]|[A-Za-z_][A-Za-z0-9_$]*)"#;
    Regex::new(&format!(
        r"(?i)\bCREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?({SEG}(?:\s*\.\s*{SEG})*)\s*\(",
    ))
    .unwrap()
});

static COLUMN_TYPE: Lazy<Regex> = Lazy::new(|| {
    // base word(s) plus an optional parenthesized argument list
    Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)(?:\s*\(([^)]*)\))?").unwrap()
});

const CONSTRAINT_STARTERS: [&str; 8] = [
    "PRIMARY", "FOREIGN", "UNIQUE", "CHECK", "CONSTRAINT", "KEY", "INDEX", "EXCLUDE",
];

pub fn parse(text: &str, warnings: &mut Vec<Warning>) -> Result<Vec<MappedDecl>, String> {
    let clean = scan::strip_comments(text, scan::CommentStyle::Sql);
    let tables = extract(&clean, warnings);
    let mut out = Vec::with_capacity(tables.len());
    for table in &tables {
        let fields = table
            .fields
            .iter()
            .map(|f| ObjField {
                key: f.key.clone(),
                expr: map_column_type(&f.raw_type, &Trail::root(), warnings),
                optional: f.optional,
            })
            .collect();
        out.push(MappedDecl { name: table.name.clone(), body: Body::Object(fields) });
    }
    Ok(out)
}

fn extract(text: &str, warnings: &mut Vec<Warning>) -> Vec<Declaration> {
    let mut out = Vec::new();
    let mut cursor = 0usize;

    for caps in TABLE_HEAD.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if whole.start() < cursor {
            continue;
        }
        let name = unquote_ident(caps.get(1).unwrap().as_str());
        let open = whole.end() - 1;
        let Some(close) = scan::find_matching_closer(text, open) else {
            warnings.push(Warning::UnbalancedDelimiter { decl: name });
            cursor = open + 1;
            continue;
        };
        cursor = close + 1;

        let body = &text[open + 1..close];
        let mut fields = Vec::new();
        for line in scan::split_at_depth_zero(body, ',') {
            if let Some(field) = parse_column(line) {
                fields.push(field);
            }
        }
        out.push(Declaration::object(name, fields));
    }
    out
}

fn parse_column(line: &str) -> Option<Field> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (name_token, rest) = take_identifier(line)?;
    if CONSTRAINT_STARTERS.contains(&name_token.to_uppercase().as_str()) {
        return None;
    }

    let rest = rest.trim_start();
    let type_caps = COLUMN_TYPE.captures(rest)?;
    let type_end = type_caps.get(0).unwrap().end();
    let raw_type = rest[..type_end].trim().to_string();
    let modifiers = rest[type_end..].to_uppercase();

    // array columns: `INTEGER[]`
    let raw_type = if rest[type_end..].trim_start().starts_with("[]") {
        format!("{raw_type}[]")
    } else {
        raw_type
    };

    let not_null = modifiers.contains("NOT NULL") || modifiers.contains("PRIMARY KEY");
    Some(Field { key: unquote_ident(name_token), raw_type, optional: !not_null })
}

/// Pop the leading identifier (possibly quoted) off a column line.
fn take_identifier(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    match bytes.first()? {
        b'"' | b'`' => {
            let end = scan::skip_string_literal(line, 0);
            Some((&line[..=end], &line[end + 1..]))
        }
        b'[' => {
            let end = scan::find_matching_closer(line, 0)?;
            Some((&line[..=end], &line[end + 1..]))
        }
        _ => {
            let end = line
                .find(|c: char| c.is_whitespace())
                .unwrap_or(line.len());
            (end > 0).then(|| (&line[..end], &line[end..]))
        }
    }
}

fn unquote_ident(token: &str) -> String {
    // schema-qualified names keep only the final segment
    let segment = token.trim().rsplit('.').next().unwrap_or(token).trim();
    let unquoted = if segment.len() >= 2
        && ((segment.starts_with('"') && segment.ends_with('"'))
            || (segment.starts_with('`') && segment.ends_with('`'))
            || (segment.starts_with('[') && segment.ends_with(']')))
    {
        &segment[1..segment.len() - 1]
    } else {
        segment
    };
    unquoted.to_string()
}

// ------------------------------- Mapping ---------------------------------- //

fn map_column_type(raw: &str, trail: &Trail, warnings: &mut Vec<Warning>) -> TypeExpr {
    let raw = raw.trim();
    if trail.exhausted() {
        warnings.push(Warning::DepthExceeded {
            context: map::context_of(raw),
            limit: map::MAX_DEPTH,
        });
        return TypeExpr::Unknown;
    }

    if let Some(element) = raw.strip_suffix("[]") {
        let el = map_column_type(element, &trail.deeper(), warnings);
        return TypeExpr::Array(Box::new(el));
    }

    let Some(caps) = COLUMN_TYPE.captures(raw) else {
        return TypeExpr::Unknown;
    };
    let base = caps.get(1).unwrap().as_str().to_uppercase();
    let args = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    // dedicated closed-enumeration construct, before anything union-shaped
    if base == "ENUM" || base == "SET" {
        let members = scan::split_at_depth_zero(args, ',')
            .iter()
            .map(|v| {
                let v = v.trim().trim_matches('\'').trim_matches('"');
                TypeExpr::Literal(crate::expr::Lit::Str(v.to_string()))
            })
            .collect::<Vec<_>>();
        if members.is_empty() {
            return TypeExpr::Primitive(Prim::Str);
        }
        return map::union_of(members);
    }

    match base.as_str() {
        "INT" | "INTEGER" | "SMALLINT" | "TINYINT" | "MEDIUMINT" | "SERIAL" | "SMALLSERIAL"
        | "YEAR" => TypeExpr::Primitive(Prim::Int),
        "BIGINT" | "BIGSERIAL" => TypeExpr::Primitive(Prim::BigInt),
        "DECIMAL" | "NUMERIC" | "FLOAT" | "DOUBLE" | "REAL" | "MONEY" => {
            TypeExpr::Primitive(Prim::Float)
        }
        "CHAR" | "VARCHAR" | "CHARACTER" | "NCHAR" | "NVARCHAR" | "TEXT" | "TINYTEXT"
        | "MEDIUMTEXT" | "LONGTEXT" | "CITEXT" | "UUID" | "INET" | "CIDR" | "XML" => {
            TypeExpr::Primitive(Prim::Str)
        }
        "BOOL" | "BOOLEAN" | "BIT" => TypeExpr::Primitive(Prim::Bool),
        "DATE" | "DATETIME" | "TIMESTAMP" | "TIMESTAMPTZ" | "TIME" | "TIMETZ" | "INTERVAL" => {
            TypeExpr::Primitive(Prim::Date)
        }
        "JSON" | "JSONB" => TypeExpr::Map {
            key: Box::new(TypeExpr::Primitive(Prim::Str)),
            value: Box::new(TypeExpr::Unknown),
        },
        "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            warnings.push(Warning::Unrepresentable {
                context: map::context_of(raw),
                detail: "binary column carried as string".into(),
            });
            TypeExpr::Primitive(Prim::Str)
        }
        _ => {
            warnings.push(Warning::UnknownReference { name: base });
            TypeExpr::Unknown
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Lit;

    fn parse_ok(src: &str) -> (Vec<MappedDecl>, Vec<Warning>) {
        let mut warnings = Vec::new();
        let decls = parse(src, &mut warnings).expect("sql parse is total");
        (decls, warnings)
    }

    #[test]
    fn columns_map_through_type_table() {
        let (decls, warnings) = parse_ok(
            "CREATE TABLE users (\n  id SERIAL PRIMARY KEY,\n  name VARCHAR(255) NOT NULL,\n  bio TEXT\n);",
        );
        assert!(warnings.is_empty());
        let Body::Object(fields) = &decls[0].body else { panic!() };
        assert_eq!(decls[0].name, "users");
        assert_eq!(fields[0].key, "id");
        assert_eq!(fields[0].expr, TypeExpr::Primitive(Prim::Int));
        assert!(!fields[0].optional, "primary key is required");
        assert_eq!(fields[1].expr, TypeExpr::Primitive(Prim::Str));
        assert!(!fields[1].optional);
        assert!(fields[2].optional, "no NOT NULL means nullable");
    }

    #[test]
    fn enum_column_is_a_closed_set() {
        let (decls, _) = parse_ok(
            "CREATE TABLE t (status ENUM('new', 'done', 'failed') NOT NULL);",
        );
        let Body::Object(fields) = &decls[0].body else { panic!() };
        match &fields[0].expr {
            TypeExpr::Union(members) => {
                assert_eq!(members.len(), 3);
                assert_eq!(members[0], TypeExpr::Literal(Lit::Str("new".into())));
            }
            other => panic!("expected closed set, got {other:?}"),
        }
    }

    #[test]
    fn constraint_lines_are_skipped() {
        let (decls, _) = parse_ok(
            "CREATE TABLE t (\n  a INT,\n  PRIMARY KEY (a),\n  CONSTRAINT fk FOREIGN KEY (a) REFERENCES o(id)\n);",
        );
        let Body::Object(fields) = &decls[0].body else { panic!() };
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn quoted_and_qualified_names_unwrap() {
        let (decls, _) = parse_ok(
            "CREATE TABLE \"public\".\"order items\" (`weird name` INT);",
        );
        // quoted head token keeps its final segment
        let Body::Object(fields) = &decls[0].body else { panic!() };
        assert_eq!(fields[0].key, "weird name");
    }

    #[test]
    fn unknown_type_degrades_with_warning() {
        let (decls, warnings) = parse_ok("CREATE TABLE t (g GEOMETRY);");
        let Body::Object(fields) = &decls[0].body else { panic!() };
        assert_eq!(fields[0].expr, TypeExpr::Unknown);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnknownReference { name } if name == "GEOMETRY")));
    }

    #[test]
    fn array_suffix_maps_to_array() {
        let (decls, _) = parse_ok("CREATE TABLE t (tags TEXT[] NOT NULL);");
        let Body::Object(fields) = &decls[0].body else { panic!() };
        assert_eq!(
            fields[0].expr,
            TypeExpr::Array(Box::new(TypeExpr::Primitive(Prim::Str)))
        );
    }

    #[test]
    fn unbalanced_table_is_skipped() {
        let (decls, warnings) = parse_ok("CREATE TABLE broken (a INT");
        assert!(decls.is_empty());
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnbalancedDelimiter { decl } if decl == "broken")));
    }
}
