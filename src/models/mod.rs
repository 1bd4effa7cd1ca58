//! Models module
//!
//! Input values (records, lists, scalars) and the table model produced by
//! inference.

pub mod column;
pub mod schema;
pub mod table;
pub mod value;

pub use column::{Column, ColumnType, ForeignKey};
pub use schema::InferredSchema;
pub use table::Table;
pub use value::{Record, Scalar, TEMPORAL_FORMAT, Value};
