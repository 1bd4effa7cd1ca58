//! Table model

use serde::{Deserialize, Serialize};

use super::column::{Column, ForeignKey};
use super::value::Record;

/// A finished table: resolved columns, keys, and the reshaped rows
///
/// Tables are immutable once the profiler has produced them; the rows are
/// kept for a downstream row emitter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
    pub rows: Vec<Record>,
}

impl Table {
    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Name of the table this one references, if it is a child table
    pub fn parent(&self) -> Option<&str> {
        self.foreign_key.as_ref().map(|fk| fk.parent_table.as_str())
    }
}
