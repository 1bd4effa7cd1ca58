//! Error types for schema inference

use thiserror::Error;

/// Errors that abort inference for a table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Flattening a nested record would overwrite an existing field
    #[error("Cannot flatten {path} into table {table}: field {field} already exists")]
    AmbiguousMerge {
        table: String,
        field: String,
        path: String,
    },

    /// Every primary key candidate holds duplicate values
    #[error("No usable primary key for table {table}: duplicate values in {}", candidates.join(", "))]
    UnusableKey {
        table: String,
        candidates: Vec<String>,
    },

    /// Every foreign key name is already used by the child rows
    #[error("Cannot find an unused foreign key name in {table}.{child}; tried {}", candidates.join(", "))]
    NameExhausted {
        table: String,
        child: String,
        candidates: Vec<String>,
    },

    /// A row is not a record
    #[error("Row {index} of table {table} should be a record, found {found}")]
    MalformedRow {
        table: String,
        index: usize,
        found: String,
    },

    /// Two source field names canonicalize to the same column name
    #[error("Field names {first:?} and {second:?} both become {canonical:?}")]
    DuplicateFieldName {
        first: String,
        second: String,
        canonical: String,
    },

    /// No records to infer from
    #[error("No records provided for inference")]
    NoRecords,
}
