//! Inference result: every table produced from one batch of records

use serde::{Deserialize, Serialize};

use super::table::Table;
use crate::inference::{InferenceStats, Notice};

/// Tables inferred from one batch, parents before children
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredSchema {
    /// Tables in dependency order; the first is the root table
    pub tables: Vec<Table>,
    /// Recoverable problems found while profiling
    pub notices: Vec<Notice>,
    pub stats: InferenceStats,
}

impl InferredSchema {
    /// The table built from the input records themselves
    pub fn root(&self) -> Option<&Table> {
        self.tables.first()
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Tables whose foreign key references `parent`
    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a Table> + 'a {
        self.tables
            .iter()
            .filter(move |t| t.parent() == Some(parent))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
