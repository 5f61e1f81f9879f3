//! Aggregation model: records accumulated into time series, plus run digests.

pub mod series;
pub mod summary;

pub use series::TimeSeries;
pub use summary::RunSummary;
