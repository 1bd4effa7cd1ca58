//! Configuration for schema inference

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Order in which a table's columns are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnOrder {
    /// Order of first appearance across the rows
    #[default]
    FirstSeen,
    /// Primary key first, then the remaining columns sorted by name
    AlphabeticalKeyFirst,
}

/// Configuration for schema inference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Preferred primary key name, tried before the standard candidates
    pub primary_key: Option<String>,

    /// Give every table a primary key, even when no child table needs one
    pub force_primary_key: bool,

    /// Emit unbounded text columns instead of width-bounded ones
    pub varying_length_text: bool,

    /// Track and report column uniqueness
    pub include_uniqueness: bool,

    /// Column ordering policy
    pub column_order: ColumnOrder,

    /// Extra width added to text lengths and decimal precision
    pub size_cushion: usize,

    /// Maximum number of records to read (0 = all)
    pub sample_size: usize,

    /// Date that partial dates are completed from (defaults to today)
    pub reference_date: Option<NaiveDate>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            primary_key: None,
            force_primary_key: false,
            varying_length_text: false,
            include_uniqueness: true,
            column_order: ColumnOrder::FirstSeen,
            size_cushion: 0,
            sample_size: 0, // All records
            reference_date: None,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }

    /// The date used by the temporal heuristics for this run
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the preferred primary key name
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.config.primary_key = Some(name.into());
        self
    }

    /// Force a primary key on every table
    pub fn force_primary_key(mut self, force: bool) -> Self {
        self.config.force_primary_key = force;
        self
    }

    /// Emit unbounded text columns
    pub fn varying_length_text(mut self, varying: bool) -> Self {
        self.config.varying_length_text = varying;
        self
    }

    /// Enable or disable uniqueness tracking
    pub fn include_uniqueness(mut self, include: bool) -> Self {
        self.config.include_uniqueness = include;
        self
    }

    /// Set the column ordering policy
    pub fn column_order(mut self, order: ColumnOrder) -> Self {
        self.config.column_order = order;
        self
    }

    /// Set the extra width added to sized columns
    pub fn size_cushion(mut self, cushion: usize) -> Self {
        self.config.size_cushion = cushion;
        self
    }

    /// Set the sample size (0 = all records)
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Pin the date partial dates are completed from
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.config.reference_date = Some(date);
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}
