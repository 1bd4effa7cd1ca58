//! DDL Inference - Relational schema inference from semi-structured records
//!
//! Provides:
//! - Scalar type coercion and widening across rows
//! - Column profiling (type, nullability, uniqueness, width and precision)
//! - Document reshaping: nested records flattened, nested lists split into child tables
//! - Primary and foreign key assignment linking child tables to their parents
//!
//! Reading input formats and rendering SQL are left to the caller; the engine
//! consumes parsed records and returns a typed table model.

pub mod inference;
pub mod models;

// Re-export commonly used types
pub use inference::{
    ColumnOrder, InferenceConfig, InferenceError, InferenceStats, Notice, SchemaInferrer,
};

// Re-export models
pub use models::{Column, ColumnType, ForeignKey, InferredSchema, Record, Scalar, Table, Value};
