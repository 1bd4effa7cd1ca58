//! Primary key selection and surrogate key generation

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::error::InferenceError;
use super::reshape::RecordSet;
use crate::models::{Record, Scalar, Value};

/// How well a field serves as a primary key for a set of rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeySuitability {
    /// No row carries the field; it can be generated for every row
    Absent,
    /// Two rows share a value
    NonUnique,
    /// Every row carries a distinct value
    Exact,
    /// Distinct where present, missing from some rows
    Partial,
}

/// Kind of values a key generator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyKind {
    Integer,
    /// 32-character hexadecimal strings
    Hash,
}

/// Surrogate key source owned by a single record set
///
/// Integer generators continue above the largest key already in use, so a
/// generated key never collides with an existing one. An integer generator
/// that runs out of room switches to hash keys.
///
/// # Example
///
/// ```rust
/// use ddl_inference::inference::KeyGenerator;
/// use ddl_inference::models::Scalar;
///
/// let mut keys = KeyGenerator::integer("knights", 4);
/// assert_eq!(keys.next_key(), Scalar::Int(5));
/// assert_eq!(keys.next_key(), Scalar::Int(6));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGenerator {
    table: String,
    kind: KeyKind,
    last: i64,
    issued: usize,
}

impl KeyGenerator {
    /// Integer keys starting just above `max_existing`
    pub fn integer(table: impl Into<String>, max_existing: i64) -> Self {
        Self {
            table: table.into(),
            kind: KeyKind::Integer,
            last: max_existing,
            issued: 0,
        }
    }

    /// Hex string keys derived from the table name and a sequence number
    pub fn hash(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind: KeyKind::Hash,
            last: 0,
            issued: 0,
        }
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Number of keys handed out so far
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Produce the next key
    pub fn next_key(&mut self) -> Scalar {
        self.issued += 1;
        self.last = match self.last.checked_add(1) {
            Some(next) => next,
            None => {
                tracing::warn!(table = %self.table, "Integer keys exhausted, switching to hash keys");
                self.kind = KeyKind::Hash;
                1
            }
        };
        match self.kind {
            KeyKind::Integer => Scalar::Int(self.last),
            KeyKind::Hash => {
                let name = format!("{}:{}", self.table, self.last);
                let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes());
                Scalar::Text(id.simple().to_string())
            }
        }
    }
}

/// The key chosen for a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedKey {
    pub name: String,
    pub suitability: KeySuitability,
    /// Rows that received a generated value
    pub generated: usize,
}

/// Key names to try for `table`, in order of preference
pub fn key_candidates(table: &str, requested: Option<&str>) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(4);
    let names = requested
        .map(str::to_string)
        .into_iter()
        .chain([
            "id".to_string(),
            format!("{}_id", table),
            format!("_{}_id", table),
        ]);
    for name in names {
        if !candidates.contains(&name) {
            candidates.push(name);
        }
    }
    candidates
}

/// Test `name` as a primary key over `rows`
///
/// Null and blank values count as missing. Numbers are compared by value
/// whatever their representation, so `1`, `"1"` and `"1.0"` are duplicates;
/// other values are compared by their trimmed printed form.
pub fn suitability<'r>(rows: impl IntoIterator<Item = &'r Record>, name: &str) -> KeySuitability {
    let mut seen = HashSet::new();
    let mut total = 0;
    for row in rows {
        total += 1;
        match row.get(name) {
            None => {}
            Some(value) if value.is_blank() => {}
            Some(Value::Scalar(scalar)) => {
                if !seen.insert(identity(scalar)) {
                    return KeySuitability::NonUnique;
                }
            }
            Some(_) => return KeySuitability::NonUnique,
        }
    }
    match seen.len() {
        0 => KeySuitability::Absent,
        n if n == total => KeySuitability::Exact,
        _ => KeySuitability::Partial,
    }
}

/// Choose and fill a primary key for `set`
///
/// An explicitly `requested` key is used whenever it holds no duplicates,
/// including when no row carries it yet. Otherwise the first candidate that
/// is usable as-is (exact or partial) wins, and failing that the first
/// absent candidate is generated from scratch. Fails when every candidate
/// holds duplicates.
pub fn assign_primary_key(
    set: &mut RecordSet,
    candidates: &[String],
    requested: Option<&str>,
) -> Result<AssignedKey, InferenceError> {
    let mut absent = None;
    let mut chosen = None;
    for name in candidates {
        match suitability(&set.rows, name) {
            KeySuitability::NonUnique => {
                tracing::debug!(
                    table = %set.name,
                    key = %name,
                    "Rejected key candidate with duplicate values"
                );
            }
            KeySuitability::Absent if requested == Some(name.as_str()) => {
                chosen = Some((name, KeySuitability::Absent));
                break;
            }
            KeySuitability::Absent => {
                absent.get_or_insert(name);
            }
            found => {
                chosen = Some((name, found));
                break;
            }
        }
    }

    let (name, found) = match (chosen, absent) {
        (Some(chosen), _) => chosen,
        (None, Some(name)) => (name, KeySuitability::Absent),
        (None, None) => {
            return Err(InferenceError::UnusableKey {
                table: set.name.clone(),
                candidates: candidates.to_vec(),
            });
        }
    };

    let mut generator = match integer_seed(set, name) {
        Some(max) => KeyGenerator::integer(&set.name, max),
        None => KeyGenerator::hash(&set.name),
    };

    for row in set.rows.iter_mut() {
        if row.get(name).is_none_or(Value::is_blank) {
            let key = generator.next_key();
            if row.contains(name) {
                row.insert(name.as_str(), key);
            } else {
                row.insert_first(name.as_str(), key);
            }
        }
    }

    let assigned = AssignedKey {
        name: name.clone(),
        suitability: found,
        generated: generator.issued(),
    };
    tracing::debug!(
        table = %set.name,
        key = %assigned.name,
        suitability = ?assigned.suitability,
        generated = assigned.generated,
        "Assigned primary key"
    );

    set.primary_key = Some(assigned.name.clone());
    set.key_generator = Some(generator);
    Ok(assigned)
}

/// Largest existing integer key (at least 0), or `None` when the present
/// values are not all integers or there is no room above them for every
/// missing key
fn integer_seed(set: &RecordSet, name: &str) -> Option<i64> {
    let mut max = 0i64;
    let mut missing = 0i64;
    for row in &set.rows {
        let value = match row.get(name) {
            Some(value) if !value.is_blank() => value,
            _ => {
                missing += 1;
                continue;
            }
        };
        let n = match value.as_scalar()? {
            Scalar::Int(i) => *i,
            Scalar::Text(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        max = max.max(n);
    }
    max.checked_add(missing).map(|_| max)
}

fn identity(scalar: &Scalar) -> String {
    let number = match scalar {
        Scalar::Int(i) => Some(Decimal::from(*i)),
        Scalar::Float(x) => Decimal::try_from(*x).ok(),
        Scalar::Text(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    };
    match (number, scalar) {
        (Some(d), _) => d.normalize().to_string(),
        (None, Scalar::Text(s)) => s.trim().to_string(),
        (None, other) => other.to_string(),
    }
}
