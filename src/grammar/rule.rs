//! Field-location rules: where one metric lives inside a comma-delimited line.
//!
//! Example line and the rule that finds its cost:
//!   UPDATE: elapsed: 12.5, cost: 2520055, handled: 295
//!   FieldRule { marker: "cost: ", position: 1, kind: Integer }

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics a telemetry line can carry. Ordering is the field order used
/// everywhere a grammar's rules are iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Elapsed,
    Cost,
    Handled,
    Eval,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Elapsed,
        Metric::Cost,
        Metric::Handled,
        Metric::Eval,
        Metric::Temperature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Elapsed => "elapsed",
            Metric::Cost => "cost",
            Metric::Handled => "handled",
            Metric::Eval => "eval",
            Metric::Temperature => "temperature",
        }
    }

    /// Scalar kind the record stores this metric as.
    pub fn kind(self) -> ScalarKind {
        match self {
            Metric::Cost | Metric::Handled => ScalarKind::Integer,
            Metric::Elapsed | Metric::Eval | Metric::Temperature => ScalarKind::Float,
        }
    }

    /// Every chart needs elapsed, cost and handled.
    pub fn is_required(self) -> bool {
        matches!(self, Metric::Elapsed | Metric::Cost | Metric::Handled)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Float,
    Integer,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Float => f.write_str("float"),
            ScalarKind::Integer => f.write_str("integer"),
        }
    }
}

/// A converted field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Float(f64),
    Integer(i64),
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Float(v) => v,
            Scalar::Integer(v) => v as f64,
        }
    }

    /// Floats truncate toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            Scalar::Integer(v) => v,
            Scalar::Float(v) => v as i64,
        }
    }
}

/// How to obtain one metric from a line: the comma-delimited segment at
/// `position` holds `marker`, and the value is whatever follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub marker: String,
    pub position: usize,
    pub kind: ScalarKind,
}

impl FieldRule {
    pub fn new(marker: impl Into<String>, position: usize, kind: ScalarKind) -> Self {
        Self {
            marker: marker.into(),
            position,
            kind,
        }
    }

    pub fn float(marker: impl Into<String>, position: usize) -> Self {
        Self::new(marker, position, ScalarKind::Float)
    }

    pub fn integer(marker: impl Into<String>, position: usize) -> Self {
        Self::new(marker, position, ScalarKind::Integer)
    }
}
