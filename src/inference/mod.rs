//! Schema inference engine for semi-structured records
//!
//! This module infers a relational schema from a batch of sample records:
//! typed columns for every field, plus child tables for nested lists linked
//! to their parents by synthesized keys.
//!
//! ## Features
//!
//! - **Scalar coercion** - Detect temporal, boolean, integer, decimal, float and text values
//! - **Type widening** - Fold every value of a column into one worst-case estimate
//! - **Column profiling** - Track nullability, uniqueness, widths and precision
//! - **Reshaping** - Flatten nested records and split nested lists into child tables
//! - **Key assignment** - Reuse or generate primary keys and link children by foreign key
//!
//! ## Example
//!
//! ```rust
//! use ddl_inference::inference::{InferenceConfig, SchemaInferrer};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"name": "Lancelot", "kg": 83, "dob": "9 jan 461"}),
//!     json!({"name": "Gawain", "kg": 69.4}),
//! ];
//!
//! let schema = SchemaInferrer::with_config(InferenceConfig::default())
//!     .infer(records, "knights")?;
//!
//! let knights = schema.table("knights").unwrap();
//! assert_eq!(knights.column("kg").unwrap().column_type.to_string(), "DECIMAL(3, 1)");
//! # Ok::<(), ddl_inference::inference::InferenceError>(())
//! ```

mod coerce;
mod config;
mod error;
mod inferrer;
mod keys;
mod names;
mod profile;
mod reshape;
mod widen;

pub use coerce::{Coerced, coerce, coerce_with_reference, parse_temporal};
pub use config::{ColumnOrder, InferenceConfig, InferenceConfigBuilder};
pub use error::InferenceError;
pub use inferrer::{InferenceStats, SchemaInferrer};
pub use keys::{
    AssignedKey, KeyGenerator, KeyKind, KeySuitability, assign_primary_key, key_candidates,
    suitability,
};
pub use names::{canonical_name, canonicalize, is_reserved};
pub use profile::{ColumnProfiler, Notice, Profile, profile};
pub use reshape::{RecordSet, Reshaped, flatten_record, reshape};
pub use widen::{Estimate, Extent, TypeRank, widen};
