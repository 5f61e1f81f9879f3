//! Log layer: field extraction and streaming record reading.

pub mod extract;
pub mod reader;
pub mod record;

pub use extract::extract;
pub use reader::{LogReader, ReadStats};
pub use record::LogRecord;

use crate::grammar::GrammarSpec;
use std::io::BufRead;

/// Lazily read telemetry records from `source`, stopping after `cap` records.
pub fn read<R: BufRead>(source: R, grammar: &GrammarSpec, cap: Option<usize>) -> LogReader<'_, R> {
    LogReader::new(source, grammar).with_cap(cap)
}
