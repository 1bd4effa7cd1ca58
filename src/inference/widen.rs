//! Type widening
//!
//! An [`Estimate`] is the running "worst case" for a column: the least
//! specific type seen so far plus the maximal width, digits, scale and
//! magnitude of everything folded into it. Widening only ever takes maxima,
//! so it is commutative and associative and the state per column stays O(1)
//! no matter how many rows are observed.

use serde::{Deserialize, Serialize};

use super::coerce::Coerced;
use super::config::InferenceConfig;
use crate::models::{ColumnType, Scalar};

/// Type preference, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRank {
    Temporal,
    Boolean,
    Integer,
    Decimal,
    Float,
    Text,
}

impl TypeRank {
    /// Get the display name of this rank
    pub fn name(&self) -> &'static str {
        match self {
            TypeRank::Temporal => "temporal",
            TypeRank::Boolean => "boolean",
            TypeRank::Integer => "integer",
            TypeRank::Decimal => "decimal",
            TypeRank::Float => "float",
            TypeRank::Text => "text",
        }
    }
}

impl Coerced {
    /// Preference rank of this value, `None` for null
    pub fn rank(&self) -> Option<TypeRank> {
        match self {
            Coerced::Null => None,
            Coerced::Temporal(_) => Some(TypeRank::Temporal),
            Coerced::Boolean(_) => Some(TypeRank::Boolean),
            Coerced::Integer(_) => Some(TypeRank::Integer),
            Coerced::Decimal(_) => Some(TypeRank::Decimal),
            Coerced::Float(_) => Some(TypeRank::Float),
            Coerced::Text(_) => Some(TypeRank::Text),
        }
    }
}

/// Running maxima over every value folded into an estimate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    /// Longest printed form, in characters
    pub width: usize,
    /// Most digits before the decimal point
    pub integer_digits: u32,
    /// Most digits after the decimal point
    pub scale: u32,
    /// Largest absolute numeric value
    pub magnitude: f64,
    /// A boolean was spelled as a word ("yes", "true", ...) rather than 0/1
    pub worded_boolean: bool,
}

impl Extent {
    pub fn merge(self, other: Extent) -> Extent {
        Extent {
            width: self.width.max(other.width),
            integer_digits: self.integer_digits.max(other.integer_digits),
            scale: self.scale.max(other.scale),
            magnitude: self.magnitude.max(other.magnitude),
            worded_boolean: self.worded_boolean || other.worded_boolean,
        }
    }

    /// Total decimal digits needed, never less than one
    pub fn precision(&self) -> u32 {
        (self.integer_digits + self.scale).max(1)
    }
}

/// Worst-case representative for a column
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    rank: Option<TypeRank>,
    extent: Extent,
}

impl Estimate {
    /// Estimate for a single value
    ///
    /// `raw` is the value as it appeared in the source; its printed width is
    /// what a text column would have to hold.
    pub fn observe(raw: &Scalar, coerced: &Coerced) -> Estimate {
        let width = raw.printed_width();
        let mut extent = Extent {
            width,
            ..Extent::default()
        };
        match coerced {
            Coerced::Null => return Estimate::default(),
            Coerced::Temporal(_) | Coerced::Text(_) => {}
            Coerced::Boolean(b) => {
                extent.integer_digits = 1;
                extent.magnitude = if *b { 1.0 } else { 0.0 };
                extent.worded_boolean = !is_numeric_boolean(raw);
            }
            Coerced::Integer(i) => {
                extent.integer_digits = digit_count(i.unsigned_abs());
                extent.magnitude = (*i as f64).abs();
            }
            Coerced::Decimal(d) => {
                let digits = digit_count(d.mantissa().unsigned_abs());
                extent.scale = d.scale();
                extent.integer_digits = digits.saturating_sub(d.scale());
                extent.magnitude = decimal_magnitude(d);
            }
            Coerced::Float(x) => {
                extent.magnitude = x.abs();
            }
        }
        Estimate {
            rank: coerced.rank(),
            extent,
        }
    }

    /// Estimate for a value that is not a scalar at all
    pub fn opaque_text(width: usize) -> Estimate {
        Estimate {
            rank: Some(TypeRank::Text),
            extent: Extent {
                width,
                ..Extent::default()
            },
        }
    }

    /// The least specific rank seen, `None` when only nulls were seen
    pub fn rank(&self) -> Option<TypeRank> {
        self.rank
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Fold one more value into this estimate
    pub fn widen_with(&mut self, other: Estimate) {
        *self = widen(*self, other);
    }

    /// Printed "all nines" sentinel for numeric estimates, e.g. `999.99`
    pub fn sentinel(&self) -> Option<String> {
        let nines = |n: u32| "9".repeat(n as usize);
        match self.rank? {
            TypeRank::Integer => Some(nines(self.extent.integer_digits.max(1))),
            TypeRank::Decimal if self.extent.scale == 0 => {
                Some(nines(self.extent.integer_digits.max(1)))
            }
            TypeRank::Decimal => Some(format!(
                "{}.{}",
                nines(self.extent.integer_digits.max(1)),
                nines(self.extent.scale)
            )),
            _ => None,
        }
    }

    /// Resolve the column type this estimate needs
    pub fn column_type(&self, config: &InferenceConfig) -> ColumnType {
        let text = |width: usize| ColumnType::Text {
            length: if config.varying_length_text {
                None
            } else {
                Some(width.max(1) + config.size_cushion)
            },
        };
        match self.rank {
            None => text(self.extent.width),
            Some(TypeRank::Temporal) => ColumnType::Temporal,
            Some(TypeRank::Boolean) => ColumnType::Boolean,
            Some(TypeRank::Integer) => ColumnType::Integer,
            Some(TypeRank::Decimal) => ColumnType::ExactDecimal {
                precision: self.extent.precision() + config.size_cushion as u32,
                scale: self.extent.scale,
            },
            Some(TypeRank::Float) => ColumnType::Float,
            Some(TypeRank::Text) => text(self.extent.width),
        }
    }
}

/// Combine two estimates into one broad enough for both
///
/// Differing ranks resolve to the less specific one. A temporal mixed with
/// anything else, or a worded boolean mixed with numbers, can only be held
/// losslessly as text.
pub fn widen(a: Estimate, b: Estimate) -> Estimate {
    let extent = a.extent.merge(b.extent);
    let rank = match (a.rank, b.rank) {
        (None, r) | (r, None) => r,
        (Some(x), Some(y)) => Some(join(x, y, extent.worded_boolean)),
    };
    Estimate { rank, extent }
}

fn join(x: TypeRank, y: TypeRank, worded_boolean: bool) -> TypeRank {
    if x == y {
        return x;
    }
    let (low, high) = if x < y { (x, y) } else { (y, x) };
    match low {
        TypeRank::Temporal => TypeRank::Text,
        TypeRank::Boolean if worded_boolean => TypeRank::Text,
        _ => high,
    }
}

pub(super) fn is_numeric_boolean(raw: &Scalar) -> bool {
    match raw {
        Scalar::Int(i) => *i == 0 || *i == 1,
        Scalar::Text(s) => matches!(s.trim(), "0" | "1"),
        _ => false,
    }
}

fn digit_count(mut n: u128) -> u32 {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

fn decimal_magnitude(d: &rust_decimal::Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    d.abs().to_f64().unwrap_or(f64::MAX)
}
