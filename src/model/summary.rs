use crate::log::ReadStats;
use crate::model::series::TimeSeries;
use serde::Serialize;

/// Digest of one parsed run, embedded in reports and printed by `summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub variant: String,
    pub records: usize,
    pub first_elapsed: Option<f64>,
    pub last_elapsed: Option<f64>,
    /// Lowest cost seen (lower is better).
    pub best_cost: Option<i64>,
    pub final_cost: Option<i64>,
    pub max_handled: Option<i64>,
    pub final_handled: Option<i64>,
    pub stats: ReadStats,
}

impl RunSummary {
    pub fn new(variant: &str, series: &TimeSeries, stats: ReadStats) -> Self {
        Self {
            variant: variant.to_string(),
            records: series.len(),
            first_elapsed: series.elapsed().first().copied(),
            last_elapsed: series.elapsed().last().copied(),
            best_cost: series.cost().iter().copied().min(),
            final_cost: series.cost().last().copied(),
            max_handled: series.handled().iter().copied().max(),
            final_handled: series.handled().last().copied(),
            stats,
        }
    }
}
