//! Column model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inference::Extent;

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ColumnType {
    /// Date and time
    Temporal,
    Boolean,
    Integer,
    /// Fixed-point decimal with the given total digits and digits after the point
    ExactDecimal { precision: u32, scale: u32 },
    Float,
    /// Text, bounded to `length` characters unless `None`
    Text { length: Option<usize> },
}

impl ColumnType {
    /// Get the type name (without parameters)
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Temporal => "temporal",
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::ExactDecimal { .. } => "exactDecimal",
            ColumnType::Float => "float",
            ColumnType::Text { .. } => "text",
        }
    }
}

/// Generic SQL spelling, used for logging and diagnostics
impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Temporal => write!(f, "TIMESTAMP"),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::ExactDecimal { precision, scale } => {
                write!(f, "DECIMAL({}, {})", precision, scale)
            }
            ColumnType::Float => write!(f, "FLOAT"),
            ColumnType::Text { length: Some(n) } => write!(f, "VARCHAR({})", n),
            ColumnType::Text { length: None } => write!(f, "TEXT"),
        }
    }
}

/// Reference from a child table's column to its parent's primary key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    /// Column in the child table
    pub column: String,
    /// Referenced table
    pub parent_table: String,
    /// Referenced primary key column
    pub parent_column: String,
}

/// A column resolved from every value observed under one field name
///
/// # Example
///
/// ```rust
/// use ddl_inference::models::{Column, ColumnType};
///
/// let column = Column::new("kg", ColumnType::Integer);
/// assert!(!column.nullable);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name
    pub name: String,
    /// Type able to hold every observed value
    pub column_type: ColumnType,
    /// Some row lacks the field, or holds null or blank text
    pub nullable: bool,
    /// Every non-null value is distinct
    pub unique: bool,
    /// This column is the table's primary key
    #[serde(default)]
    pub primary_key: bool,
    /// Rows with a non-null value
    #[serde(default)]
    pub non_null_count: usize,
    /// Widths and digits backing `column_type`
    #[serde(default)]
    pub extent: Extent,
    /// Diagnostic attached when values had to be down-leveled to text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Column {
    /// Create a non-null, non-unique column of the given type
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            unique: false,
            primary_key: false,
            non_null_count: 0,
            extent: Extent::default(),
            note: None,
        }
    }
}
