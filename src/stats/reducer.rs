//! Reduction functions over sample sequences
//!
//! Each operation folds a sequence of samples into a single value. All of them are commutative and associative, so the order in which files
//! are merged never changes the result.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Statistic computed over the combined samples of every input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Arithmetic sum
    Sum,
    /// Sum divided by sample count
    Avg,
    /// Smallest sample
    Min,
    /// Largest sample
    Max,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Sum,
        Operation::Avg,
        Operation::Min,
        Operation::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::Avg => "avg",
            Operation::Min => "min",
            Operation::Max => "max",
        }
    }

    /// Apply the operation to `samples`.
    ///
    /// The sum of no samples is `0`. The other operations have no value for an
    /// empty sequence and report [`Error::EmptyDataset`]. A `NaN` sample makes
    /// every operation yield `NaN`.
    pub fn apply(&self, samples: &[f64]) -> Result<f64> {
        if samples.is_empty() && *self != Operation::Sum {
            return Err(Error::EmptyDataset);
        }

        Ok(match self {
            Operation::Sum => sum(samples),
            Operation::Avg => avg(samples),
            Operation::Min => min(samples),
            Operation::Max => max(samples),
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::InvalidOperation {
                name: s.to_string(),
            })
    }
}

fn sum(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0, |total, v| total + v)
}

fn avg(samples: &[f64]) -> f64 {
    sum(samples) / samples.len() as f64
}

// f64::min/max would skip NaN; once the accumulator is NaN no comparison
// replaces it.
fn min(samples: &[f64]) -> f64 {
    samples
        .iter()
        .copied()
        .fold(f64::INFINITY, |lo, v| if v.is_nan() || v < lo { v } else { lo })
}

fn max(samples: &[f64]) -> f64 {
    samples
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, |hi, v| if v.is_nan() || v > hi { v } else { hi })
}
