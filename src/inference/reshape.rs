//! Document reshaping
//!
//! Turns a batch of nested records into flat record sets, one per table:
//!
//! - nested records are flattened into their parent, collapsed to a single
//!   value, or dropped when empty
//! - nested lists become child record sets linked back to their parent row
//!   through a synthesized foreign key
//!
//! Child record sets are reshaped the same way, so nesting of any depth ends
//! up as a flat list of tables.

use std::collections::HashSet;

use super::config::InferenceConfig;
use super::error::InferenceError;
use super::keys::{KeyGenerator, assign_primary_key, key_candidates};
use crate::models::{ForeignKey, Record, Value};

/// Field names that mark a nested record's own identifier
const ID_STUBS: [&str; 4] = ["id", "num", "no", "number"];

/// The rows destined for one table
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    pub name: String,
    pub rows: Vec<Record>,
    /// Field holding the primary key, when one was needed
    pub primary_key: Option<String>,
    /// Link to the parent table, for child sets
    pub foreign_key: Option<ForeignKey>,
    /// Source of surrogate keys for this set only
    pub key_generator: Option<KeyGenerator>,
}

impl RecordSet {
    pub fn new(name: impl Into<String>, rows: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            rows,
            primary_key: None,
            foreign_key: None,
            key_generator: None,
        }
    }

    /// Keys generated for this set
    pub fn generated_keys(&self) -> usize {
        self.key_generator.as_ref().map_or(0, KeyGenerator::issued)
    }
}

/// Result of reshaping one batch of records
#[derive(Debug, Clone)]
pub struct Reshaped {
    /// The set built from the input records themselves
    pub parent: RecordSet,
    /// Child sets, each listed after its parent
    pub children: Vec<RecordSet>,
}

impl Reshaped {
    /// Look up a child set by table name
    pub fn child(&self, name: &str) -> Option<&RecordSet> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All sets, parents before children
    pub fn into_sets(self) -> impl Iterator<Item = RecordSet> {
        std::iter::once(self.parent).chain(self.children)
    }
}

/// Reshape `records` into a parent record set named `table_name` plus one
/// child set per nested list field
pub fn reshape(
    records: Vec<Record>,
    table_name: &str,
    config: &InferenceConfig,
) -> Result<Reshaped, InferenceError> {
    let mut taken = HashSet::from([table_name.to_string()]);
    let mut sets = Vec::new();
    let parent = RecordSet::new(table_name, records);
    reshape_into(
        parent,
        config.primary_key.as_deref(),
        config,
        &mut taken,
        &mut sets,
    )?;

    let mut sets = sets.into_iter();
    let parent = sets.next().ok_or(InferenceError::NoRecords)?;
    Ok(Reshaped {
        parent,
        children: sets.collect(),
    })
}

/// Flatten every nested record inside `record`
///
/// Lists are left in place; they are split off into child sets by
/// [`reshape`].
pub fn flatten_record(record: Record, table: &str) -> Result<Record, InferenceError> {
    flatten_in(record, table, "")
}

fn flatten_in(record: Record, table: &str, path: &str) -> Result<Record, InferenceError> {
    let plain: HashSet<String> = record
        .iter()
        .filter(|(_, v)| v.as_record().is_none())
        .map(|(k, _)| k.to_string())
        .collect();

    let mut out = Record::with_capacity(record.len());
    for (key, value) in record {
        let nested = match value {
            Value::Record(nested) => nested,
            other => {
                out.insert(key, other);
                continue;
            }
        };

        let nested_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };
        let mut nested = flatten_in(nested, table, &nested_path)?;

        if let Some(id) = id_field(&nested, &key) {
            if nested.len() <= 2 {
                tracing::debug!(table, path = %nested_path, field = %id, "Dropping nested id");
                nested.remove(&id);
            }
        }

        match nested.len() {
            0 => {
                tracing::debug!(table, path = %nested_path, "Dropping empty nested record");
            }
            1 => {
                tracing::debug!(table, path = %nested_path, "Collapsing single-field record");
                if out.contains(&key) {
                    return Err(ambiguous(table, &key, &nested_path));
                }
                if let Some((_, only)) = nested.into_iter().next() {
                    out.insert(key, only);
                }
            }
            _ => {
                tracing::debug!(table, path = %nested_path, "Lifting nested fields");
                for (sub, sub_value) in nested {
                    let lifted = format!("{}_{}", key, sub.trim_matches('_'));
                    if plain.contains(&lifted) || out.contains(&lifted) {
                        return Err(ambiguous(table, &lifted, &nested_path));
                    }
                    out.insert(lifted, sub_value);
                }
            }
        }
    }
    Ok(out)
}

fn ambiguous(table: &str, field: &str, path: &str) -> InferenceError {
    InferenceError::AmbiguousMerge {
        table: table.to_string(),
        field: field.to_string(),
        path: path.to_string(),
    }
}

/// The field of `nested` likeliest to be its own identifier
fn id_field(nested: &Record, key: &str) -> Option<String> {
    ID_STUBS.iter().find_map(|stub| {
        [format!("{}_{}", key, stub), stub.to_string(), format!("_{}", stub)]
            .into_iter()
            .find(|name| nested.contains(name))
    })
}

/// Scalars in a list become single-field records named after the list
fn wrap_items(key: &str, items: Vec<Value>) -> Vec<Record> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Record(record) => record,
            other => Record::from([(key, other)]),
        })
        .collect()
}

/// Rows pulled out of one list field, tagged with their parent row
struct ChildRows {
    field: String,
    rows: Vec<(usize, Record)>,
}

fn reshape_into(
    mut set: RecordSet,
    requested_key: Option<&str>,
    config: &InferenceConfig,
    taken: &mut HashSet<String>,
    out: &mut Vec<RecordSet>,
) -> Result<(), InferenceError> {
    let rows = std::mem::take(&mut set.rows);
    set.rows = rows
        .into_iter()
        .map(|row| flatten_record(row, &set.name))
        .collect::<Result<_, _>>()?;

    let mut children: Vec<ChildRows> = Vec::new();
    for (index, row) in set.rows.iter_mut().enumerate() {
        let list_fields: Vec<String> = row
            .iter()
            .filter(|(_, v)| v.is_list())
            .map(|(k, _)| k.to_string())
            .collect();
        for field in list_fields {
            let Some(Value::List(items)) = row.remove(&field) else {
                continue;
            };
            let wrapped = wrap_items(&field, items);
            if wrapped.is_empty() {
                continue;
            }
            let slot = match children.iter().position(|c| c.field == field) {
                Some(pos) => &mut children[pos],
                None => {
                    children.push(ChildRows {
                        field: field.clone(),
                        rows: Vec::new(),
                    });
                    let last = children.len() - 1;
                    &mut children[last]
                }
            };
            slot.rows.extend(wrapped.into_iter().map(|r| (index, r)));
        }
    }

    let needs_key = config.force_primary_key || requested_key.is_some() || !children.is_empty();
    if needs_key {
        let candidates = key_candidates(&set.name, requested_key);
        let assigned = assign_primary_key(&mut set, &candidates, requested_key)?;
        if assigned.generated > 0 && requested_key.is_none() && !config.force_primary_key {
            tracing::warn!(
                table = %set.name,
                key = %assigned.name,
                "Primary key not requested, but nesting demands it"
            );
        }
    }

    let mut child_sets = Vec::with_capacity(children.len());
    if let Some(pk) = set.primary_key.clone() {
        for child in children {
            let fk = foreign_key_name(&set.name, &pk, &child)?;
            let rows = child
                .rows
                .into_iter()
                .map(|(index, mut row)| {
                    let key = set.rows[index].get(&pk).cloned().unwrap_or_else(Value::null);
                    row.insert(fk.as_str(), key);
                    row
                })
                .collect();

            let name = child_table_name(&set.name, &child.field, taken);
            tracing::debug!(parent = %set.name, child = %name, foreign_key = %fk, "Split nested list");
            let mut child_set = RecordSet::new(name, rows);
            child_set.foreign_key = Some(ForeignKey {
                column: fk,
                parent_table: set.name.clone(),
                parent_column: pk.clone(),
            });
            child_sets.push(child_set);
        }
    }

    out.push(set);
    for child in child_sets {
        reshape_into(child, None, config, taken, out)?;
    }
    Ok(())
}

/// Pick a foreign key name no child row already uses
fn foreign_key_name(parent: &str, pk: &str, child: &ChildRows) -> Result<String, InferenceError> {
    let in_use: HashSet<&str> = child.rows.iter().flat_map(|(_, r)| r.keys()).collect();

    let mut candidates: Vec<String> = Vec::with_capacity(4);
    for name in [
        format!("{}_id", parent),
        format!("_{}_id", parent),
        format!("{}_{}", parent, pk.trim_matches('_')),
        "parent_id".to_string(),
    ] {
        if !candidates.contains(&name) {
            candidates.push(name);
        }
    }

    match candidates.iter().find(|c| !in_use.contains(c.as_str())) {
        Some(name) => Ok(name.clone()),
        None => Err(InferenceError::NameExhausted {
            table: parent.to_string(),
            child: child.field.clone(),
            candidates,
        }),
    }
}

/// Name a child table after its field, disambiguating against tables
/// already produced
fn child_table_name(parent: &str, field: &str, taken: &mut HashSet<String>) -> String {
    let mut name = field.to_string();
    if taken.contains(&name) {
        name = format!("{}_{}", parent, field);
    }
    let base = name.clone();
    let mut n = 2;
    while taken.contains(&name) {
        name = format!("{}_{}", base, n);
        n += 1;
    }
    taken.insert(name.clone());
    name
}
