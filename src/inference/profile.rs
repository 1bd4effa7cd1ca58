//! Column profiling
//!
//! Streams the rows of one table once, coercing every value and folding it
//! into a per-column [`Estimate`]. Nullability and uniqueness are tracked on
//! the way.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::coerce::{Coerced, coerce_with_reference};
use super::config::{ColumnOrder, InferenceConfig};
use super::widen::{Estimate, TypeRank, is_numeric_boolean};
use crate::models::{Column, Record, Scalar, Value};

/// A recoverable problem, reported next to the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub table: String,
    pub column: String,
    pub message: String,
}

/// Profiled columns of one table
#[derive(Debug, Clone)]
pub struct Profile {
    pub columns: Vec<Column>,
    pub notices: Vec<Notice>,
    /// Rows observed
    pub rows: usize,
}

/// Value identity after coercion, for uniqueness tracking
///
/// Integers, decimals and booleans written as 0 or 1 share one numeric
/// identity, so `5` and `"5.0"` collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DistinctKey {
    Temporal(NaiveDateTime),
    Boolean(bool),
    Number(Decimal),
    /// Integers beyond the range of `Decimal`
    Wide(i128),
    Float(u64),
    Text(String),
}

impl DistinctKey {
    fn of(raw: &Scalar, coerced: &Coerced) -> Option<Self> {
        Some(match coerced {
            Coerced::Null => return None,
            Coerced::Temporal(t) => DistinctKey::Temporal(*t),
            Coerced::Boolean(b) if is_numeric_boolean(raw) => {
                DistinctKey::Number(if *b { Decimal::ONE } else { Decimal::ZERO })
            }
            Coerced::Boolean(b) => DistinctKey::Boolean(*b),
            Coerced::Integer(i) => match Decimal::try_from_i128_with_scale(*i, 0) {
                Ok(d) => DistinctKey::Number(d),
                Err(_) => DistinctKey::Wide(*i),
            },
            Coerced::Decimal(d) => DistinctKey::Number(d.normalize()),
            Coerced::Float(x) => DistinctKey::Float(x.to_bits()),
            Coerced::Text(s) => DistinctKey::Text(s.clone()),
        })
    }

    /// The identity this value takes once its column settles on `rank`
    fn settle(&self, rank: Option<TypeRank>) -> Self {
        match (rank, self) {
            (Some(TypeRank::Boolean), DistinctKey::Number(d)) => DistinctKey::Boolean(!d.is_zero()),
            (Some(TypeRank::Float), DistinctKey::Number(d)) => match d.to_f64() {
                Some(x) => DistinctKey::Float(x.to_bits()),
                None => self.clone(),
            },
            (Some(TypeRank::Float), DistinctKey::Wide(i)) => DistinctKey::Float((*i as f64).to_bits()),
            _ => self.clone(),
        }
    }
}

#[derive(Debug)]
struct ColumnState {
    estimate: Estimate,
    non_null: usize,
    /// Values seen so far; dropped on the first duplicate
    seen: Option<HashSet<DistinctKey>>,
    duplicated: bool,
    note: Option<String>,
}

impl ColumnState {
    fn new(track_uniqueness: bool) -> Self {
        Self {
            estimate: Estimate::default(),
            non_null: 0,
            seen: track_uniqueness.then(HashSet::new),
            duplicated: false,
            note: None,
        }
    }

    fn track(&mut self, key: Option<DistinctKey>) {
        let Some(key) = key else {
            return;
        };
        if let Some(seen) = self.seen.as_mut() {
            if !seen.insert(key) {
                self.duplicated = true;
                self.seen = None;
            }
        }
    }

    /// Whether two distinct values became equal under the final column type
    fn collides(&self) -> bool {
        let Some(seen) = self.seen.as_ref() else {
            return false;
        };
        let rank = self.estimate.rank();
        let settled: HashSet<DistinctKey> = seen.iter().map(|key| key.settle(rank)).collect();
        settled.len() < seen.len()
    }
}

/// Streaming column profiler for one table
pub struct ColumnProfiler<'a> {
    table: String,
    config: &'a InferenceConfig,
    today: NaiveDate,
    /// Column names in order of first appearance
    order: Vec<String>,
    states: HashMap<String, ColumnState>,
    rows: usize,
    notices: Vec<Notice>,
}

impl<'a> ColumnProfiler<'a> {
    pub fn new(table: impl Into<String>, config: &'a InferenceConfig) -> Self {
        Self {
            table: table.into(),
            config,
            today: config.today(),
            order: Vec::new(),
            states: HashMap::new(),
            rows: 0,
            notices: Vec::new(),
        }
    }

    /// Number of rows observed so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Fold one row into the running column state
    pub fn observe_row(&mut self, row: &Record) {
        self.rows += 1;
        let track = self.config.include_uniqueness;
        for (name, value) in row.iter() {
            let order = &mut self.order;
            let state = self.states.entry(name.to_string()).or_insert_with(|| {
                order.push(name.to_string());
                ColumnState::new(track)
            });

            match value {
                Value::Scalar(raw) => {
                    let coerced = coerce_with_reference(raw, self.today);
                    if coerced.is_null() {
                        continue;
                    }
                    state.non_null += 1;
                    state.estimate.widen_with(Estimate::observe(raw, &coerced));
                    state.track(DistinctKey::of(raw, &coerced));
                }
                nested => {
                    // Only reachable when a nested value survived reshaping
                    let rendered = nested.to_json_string();
                    state.non_null += 1;
                    state
                        .estimate
                        .widen_with(Estimate::opaque_text(rendered.chars().count()));
                    state.track(Some(DistinctKey::Text(rendered)));
                    if state.note.is_none() {
                        let message = format!("{} values stored as text", nested.kind_name());
                        tracing::warn!(
                            table = %self.table,
                            column = name,
                            "Non-scalar {}",
                            message
                        );
                        self.notices.push(Notice {
                            table: self.table.clone(),
                            column: name.to_string(),
                            message: message.clone(),
                        });
                        state.note = Some(message);
                    }
                }
            }
        }
    }

    /// Resolve the final columns
    ///
    /// `primary_key` names the column flagged as key. Under
    /// [`ColumnOrder::AlphabeticalKeyFirst`] it leads the column list,
    /// followed by `foreign_key`.
    pub fn finish(mut self, primary_key: Option<&str>, foreign_key: Option<&str>) -> Profile {
        let mut columns = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let Some(state) = self.states.remove(name) else {
                continue;
            };
            let duplicated = state.duplicated || state.collides();
            columns.push(Column {
                name: name.clone(),
                column_type: state.estimate.column_type(self.config),
                nullable: state.non_null < self.rows,
                unique: self.config.include_uniqueness && !duplicated && state.non_null > 0,
                primary_key: primary_key == Some(name.as_str()),
                non_null_count: state.non_null,
                extent: *state.estimate.extent(),
                note: state.note,
            });
        }

        if self.config.column_order == ColumnOrder::AlphabeticalKeyFirst {
            let rank = |c: &Column| {
                if c.primary_key {
                    0
                } else if foreign_key == Some(c.name.as_str()) {
                    1
                } else {
                    2
                }
            };
            columns.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name)));
        }

        tracing::debug!(
            table = %self.table,
            columns = columns.len(),
            rows = self.rows,
            "Profiled table"
        );

        Profile {
            columns,
            notices: self.notices,
            rows: self.rows,
        }
    }
}

/// Profile every row of a table in one pass
pub fn profile<'r>(
    table: &str,
    rows: impl IntoIterator<Item = &'r Record>,
    config: &InferenceConfig,
    primary_key: Option<&str>,
    foreign_key: Option<&str>,
) -> Profile {
    let mut profiler = ColumnProfiler::new(table, config);
    for row in rows {
        profiler.observe_row(row);
    }
    profiler.finish(primary_key, foreign_key)
}
