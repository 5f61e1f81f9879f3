//! Error types shared by the grammar, reader and series layers.

use crate::grammar::{Metric, ScalarKind};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to pull one field out of one line. Always recoverable: the reader
/// drops the line and moves on unless it runs in strict mode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("line has {segments} comma-delimited segments, field needs segment {position}")]
    SegmentIndex { position: usize, segments: usize },

    #[error("marker {marker:?} not found in segment {position}")]
    MarkerNotFound { marker: String, position: usize },

    #[error("cannot convert {text:?} after marker {marker:?} to {kind}")]
    Conversion {
        marker: String,
        text: String,
        kind: ScalarKind,
    },

    #[error("value {value} after marker {marker:?} is negative")]
    Negative { marker: String, value: f64 },

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown solver variant {0:?}")]
    UnknownVariant(String),

    #[error("cannot open log source {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid grammar {name:?}: {reason}")]
    InvalidGrammar { name: String, reason: String },

    #[error("malformed telemetry line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: ExtractError,
    },

    #[error("record has no {0} value but the series tracks it")]
    MissingMetric(Metric),

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
