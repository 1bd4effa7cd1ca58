//! Schema inference engine

use serde::{Deserialize, Serialize};

use super::config::InferenceConfig;
use super::error::InferenceError;
use super::names::{canonical_name, canonicalize};
use super::profile::{ColumnProfiler, Profile};
use super::reshape::{RecordSet, reshape};
use crate::models::{InferredSchema, Record, Table, Value};

/// Statistics from schema inference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStats {
    /// Input records read, after sampling
    pub records_read: usize,
    /// Tables produced, the root table included
    pub tables: usize,
    /// Surrogate keys generated across all tables
    pub generated_keys: usize,
}

/// Schema inference engine
///
/// Records can be handed over all at once with [`SchemaInferrer::infer`], or
/// added one at a time and resolved with [`SchemaInferrer::finalize`].
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    config: InferenceConfig,
    /// Values added so far
    pending: Vec<Value>,
}

impl SchemaInferrer {
    /// Create a new schema inferrer with default configuration
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create a new schema inferrer with custom configuration
    pub fn with_config(config: InferenceConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Add a single record for analysis
    pub fn add_value(&mut self, value: impl Into<Value>) {
        // Check sample size limit
        if self.config.sample_size > 0 && self.pending.len() >= self.config.sample_size {
            return;
        }
        self.pending.push(value.into());
    }

    /// Number of records added so far
    pub fn record_count(&self) -> usize {
        self.pending.len()
    }

    /// Infer the schema of every added record
    pub fn finalize(mut self, table_name: &str) -> Result<InferredSchema, InferenceError> {
        let pending = std::mem::take(&mut self.pending);
        self.run(pending, table_name)
    }

    /// Infer tables for `records`, naming the root table `table_name`
    ///
    /// At most `sample_size` records are read when a sample size is set.
    pub fn infer<I>(&self, records: I, table_name: &str) -> Result<InferredSchema, InferenceError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let limit = match self.config.sample_size {
            0 => usize::MAX,
            n => n,
        };
        self.run(records.into_iter().take(limit).map(Into::into), table_name)
    }

    fn run(
        &self,
        values: impl IntoIterator<Item = Value>,
        table_name: &str,
    ) -> Result<InferredSchema, InferenceError> {
        let table = canonical_name(table_name);

        let mut records: Vec<Record> = Vec::new();
        for (index, value) in values.into_iter().enumerate() {
            match canonicalize(value)? {
                Value::Record(record) => records.push(record),
                other => {
                    return Err(InferenceError::MalformedRow {
                        table,
                        index,
                        found: format!("{} {}", other.kind_name(), other.to_json_string()),
                    });
                }
            }
        }
        if records.is_empty() {
            return Err(InferenceError::NoRecords);
        }
        let records_read = records.len();

        // One reference date for every table in the run
        let mut config = self.config.clone();
        config.reference_date = Some(config.today());
        config.primary_key = config.primary_key.as_deref().map(canonical_name);

        let sets: Vec<RecordSet> = reshape(records, &table, &config)?.into_sets().collect();
        let profiles = profile_all(&sets, &config);

        let mut stats = InferenceStats {
            records_read,
            tables: sets.len(),
            generated_keys: 0,
        };
        let mut notices = Vec::new();
        let mut tables = Vec::with_capacity(sets.len());
        for (set, profile) in sets.into_iter().zip(profiles) {
            stats.generated_keys += set.generated_keys();
            notices.extend(profile.notices);
            tables.push(Table {
                name: set.name,
                columns: profile.columns,
                primary_key: set.primary_key,
                foreign_key: set.foreign_key,
                rows: set.rows,
            });
        }

        tracing::info!(
            table = %table,
            records = stats.records_read,
            tables = stats.tables,
            generated_keys = stats.generated_keys,
            notices = notices.len(),
            "Inferred schema"
        );

        Ok(InferredSchema {
            tables,
            notices,
            stats,
        })
    }
}

fn profile_set(set: &RecordSet, config: &InferenceConfig) -> Profile {
    let mut profiler = ColumnProfiler::new(&set.name, config);
    for row in &set.rows {
        profiler.observe_row(row);
    }
    let foreign_key = set.foreign_key.as_ref().map(|fk| fk.column.as_str());
    profiler.finish(set.primary_key.as_deref(), foreign_key)
}

/// Tables are independent once reshaped; each is still profiled in order
#[cfg(feature = "parallel")]
fn profile_all(sets: &[RecordSet], config: &InferenceConfig) -> Vec<Profile> {
    use rayon::prelude::*;

    sets.par_iter().map(|set| profile_set(set, config)).collect()
}

#[cfg(not(feature = "parallel"))]
fn profile_all(sets: &[RecordSet], config: &InferenceConfig) -> Vec<Profile> {
    sets.iter().map(|set| profile_set(set, config)).collect()
}
