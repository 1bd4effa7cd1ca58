//! Field name canonicalization
//!
//! Column names are lowercased, stripped of characters SQL identifiers cannot
//! hold, kept from starting with a digit, and kept clear of reserved words.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::InferenceError;
use crate::models::{Record, Value};

static ILLEGAL_IN_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_$#]").unwrap());

/// SQL reserved words (SQL:2011 core plus common dialect additions)
const RESERVED_WORDS: &[&str] = &[
    "ABS", "ALL", "ALLOCATE", "ALTER", "AND", "ANY", "ARE", "ARRAY", "AS", "ASC",
    "ASENSITIVE", "ASYMMETRIC", "AT", "ATOMIC", "AUTHORIZATION", "AVG", "BEGIN", "BETWEEN",
    "BIGINT", "BINARY", "BLOB", "BOOLEAN", "BOTH", "BY", "CALL", "CALLED", "CASCADED",
    "CASE", "CAST", "CHAR", "CHARACTER", "CHECK", "CLOB", "CLOSE", "COLLATE", "COLUMN",
    "COMMIT", "CONDITION", "CONNECT", "CONSTRAINT", "CONTINUE", "CONVERT", "COUNT",
    "CREATE", "CROSS", "CUBE", "CURRENT", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR", "CYCLE", "DATABASE", "DATE", "DAY",
    "DEALLOCATE", "DEC", "DECIMAL", "DECLARE", "DEFAULT", "DELETE", "DEREF", "DESC",
    "DESCRIBE", "DETERMINISTIC", "DISCONNECT", "DISTINCT", "DO", "DOUBLE", "DROP",
    "DYNAMIC", "EACH", "ELEMENT", "ELSE", "END", "ESCAPE", "EXCEPT", "EXEC", "EXECUTE",
    "EXISTS", "EXTERNAL", "FALSE", "FETCH", "FILTER", "FLOAT", "FOR", "FOREIGN", "FREE",
    "FROM", "FULL", "FUNCTION", "GET", "GLOBAL", "GRANT", "GROUP", "GROUPING", "HAVING",
    "HOLD", "HOUR", "IDENTITY", "IF", "IN", "INDEX", "INDICATOR", "INNER", "INOUT",
    "INSENSITIVE", "INSERT", "INT", "INTEGER", "INTERSECT", "INTERVAL", "INTO", "IS",
    "JOIN", "KEY", "LANGUAGE", "LARGE", "LATERAL", "LEADING", "LEFT", "LIKE", "LIMIT",
    "LOCAL", "LOCALTIME", "LOCALTIMESTAMP", "MATCH", "MAX", "MEMBER", "MERGE", "METHOD",
    "MIN", "MINUTE", "MODIFIES", "MODULE", "MONTH", "MULTISET", "NATIONAL", "NATURAL",
    "NCHAR", "NCLOB", "NEW", "NO", "NONE", "NOT", "NULL", "NUMERIC", "OF", "OFFSET", "OLD",
    "ON", "ONLY", "OPEN", "OR", "ORDER", "OUT", "OUTER", "OVER", "OVERLAPS", "PARAMETER",
    "PARTITION", "POSITION", "PRECISION", "PREPARE", "PRIMARY", "PROCEDURE", "RANGE",
    "READS", "REAL", "RECURSIVE", "REF", "REFERENCES", "REFERENCING", "RELEASE",
    "RENAME", "RESULT", "RETURN", "RETURNS", "REVOKE", "RIGHT", "ROLLBACK", "ROLLUP",
    "ROW", "ROWS", "SAVEPOINT", "SCHEMA", "SCOPE", "SCROLL", "SEARCH", "SECOND",
    "SELECT", "SENSITIVE", "SESSION_USER", "SET", "SIMILAR", "SMALLINT", "SOME",
    "SPECIFIC", "SQL", "SQLEXCEPTION", "SQLSTATE", "SQLWARNING", "START", "STATIC",
    "SUBMULTISET", "SUM", "SYMMETRIC", "SYSTEM", "SYSTEM_USER", "TABLE", "THEN", "TIME",
    "TIMESTAMP", "TO", "TRAILING", "TRANSLATION", "TREAT", "TRIGGER", "TRUE", "UNION",
    "UNIQUE", "UNKNOWN", "UNNEST", "UPDATE", "USER", "USING", "VALUE", "VALUES",
    "VARCHAR", "VARYING", "VIEW", "WHEN", "WHENEVER", "WHERE", "WINDOW", "WITH",
    "WITHIN", "WITHOUT", "YEAR",
];

static RESERVED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| RESERVED_WORDS.iter().copied().collect());

/// Check whether a name is an SQL reserved word, ignoring case
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(name.to_uppercase().as_str())
}

/// Turn an arbitrary field name into a lowercase SQL-safe identifier
///
/// ```rust
/// use ddl_inference::inference::canonical_name;
///
/// assert_eq!(canonical_name("Date of Birth"), "date_of_birth");
/// assert_eq!(canonical_name("2nd"), "_2nd");
/// assert_eq!(canonical_name("Order"), "_order");
/// ```
pub fn canonical_name(raw: &str) -> String {
    let mut name = ILLEGAL_IN_NAME.replace_all(raw.trim(), "_").into_owned();
    if name.is_empty() {
        return "_".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) || is_reserved(&name) {
        name.insert(0, '_');
    }
    name.to_lowercase()
}

/// Canonicalize every field name in a value tree
///
/// Fails when two names in the same record collapse to one.
pub fn canonicalize(value: Value) -> Result<Value, InferenceError> {
    match value {
        Value::Scalar(s) => Ok(Value::Scalar(s)),
        Value::List(items) => Ok(Value::List(
            items
                .into_iter()
                .map(canonicalize)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Value::Record(record) => canonicalize_record(record).map(Value::Record),
    }
}

fn canonicalize_record(record: Record) -> Result<Record, InferenceError> {
    let mut originals: HashMap<String, String> = HashMap::with_capacity(record.len());
    let mut cleaned = Record::with_capacity(record.len());
    for (key, value) in record {
        let name = canonical_name(&key);
        if let Some(first) = originals.get(&name) {
            return Err(InferenceError::DuplicateFieldName {
                first: first.clone(),
                second: key,
                canonical: name,
            });
        }
        originals.insert(name.clone(), key);
        cleaned.insert(name, canonicalize(value)?);
    }
    Ok(cleaned)
}
