use crate::error::{Error, Result};
use crate::grammar::{GrammarSpec, Metric};
use crate::log::LogRecord;
use serde::Serialize;

/// Parallel per-metric sequences; index i in every sequence is record i.
///
/// eval / temperature are tracked only when the grammar declares them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    elapsed: Vec<f64>,
    cost: Vec<i64>,
    handled: Vec<i64>,
    eval: Option<Vec<f64>>,
    temperature: Option<Vec<f64>>,
}

impl TimeSeries {
    /// Series tracking only the required metrics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_grammar(grammar: &GrammarSpec) -> Self {
        Self {
            eval: grammar.declares(Metric::Eval).then(Vec::new),
            temperature: grammar.declares(Metric::Temperature).then(Vec::new),
            ..Self::default()
        }
    }

    /// Drain a record sequence into a new series, in arrival order.
    pub fn collect<I>(grammar: &GrammarSpec, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<LogRecord>>,
    {
        let mut series = Self::for_grammar(grammar);
        for record in records {
            series.append(&record?)?;
        }
        Ok(series)
    }

    /// Append one record. Fails without touching the series when the record
    /// lacks a tracked optional metric.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        if self.eval.is_some() && record.eval.is_none() {
            return Err(Error::MissingMetric(Metric::Eval));
        }
        if self.temperature.is_some() && record.temperature.is_none() {
            return Err(Error::MissingMetric(Metric::Temperature));
        }

        self.elapsed.push(record.elapsed);
        self.cost.push(record.cost);
        self.handled.push(record.handled);
        if let (Some(seq), Some(v)) = (self.eval.as_mut(), record.eval) {
            seq.push(v);
        }
        if let (Some(seq), Some(v)) = (self.temperature.as_mut(), record.temperature) {
            seq.push(v);
        }

        debug_assert!(self.is_aligned());
        Ok(())
    }

    /// All tracked sequences have the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.elapsed.len();
        self.cost.len() == n
            && self.handled.len() == n
            && self.eval.as_ref().is_none_or(|v| v.len() == n)
            && self.temperature.as_ref().is_none_or(|v| v.len() == n)
    }

    pub fn len(&self) -> usize {
        self.elapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elapsed.is_empty()
    }

    pub fn elapsed(&self) -> &[f64] {
        &self.elapsed
    }

    pub fn cost(&self) -> &[i64] {
        &self.cost
    }

    pub fn handled(&self) -> &[i64] {
        &self.handled
    }

    pub fn eval(&self) -> Option<&[f64]> {
        self.eval.as_deref()
    }

    pub fn temperature(&self) -> Option<&[f64]> {
        self.temperature.as_deref()
    }

    /// (elapsed, cost) points for plotting.
    pub fn cost_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.elapsed
            .iter()
            .zip(&self.cost)
            .map(|(&t, &c)| (t, c as f64))
    }

    /// (elapsed, handled) points for plotting.
    pub fn handled_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.elapsed
            .iter()
            .zip(&self.handled)
            .map(|(&t, &h)| (t, h as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Registry;
    use pretty_assertions::assert_eq;

    fn rec(elapsed: f64, cost: i64, handled: i64, eval: Option<f64>) -> LogRecord {
        LogRecord {
            elapsed,
            cost,
            handled,
            eval,
            temperature: None,
        }
    }

    #[test]
    fn append_keeps_sequences_aligned_and_ordered() {
        let mut s = TimeSeries::new();
        // Out-of-order timestamps are kept as they arrive.
        for r in [rec(2.0, 30, 1, None), rec(1.0, 20, 2, None), rec(3.0, 10, 3, None)] {
            s.append(&r).unwrap();
            assert!(s.is_aligned());
        }
        assert_eq!(s.elapsed(), &[2.0, 1.0, 3.0]);
        assert_eq!(s.cost(), &[30, 20, 10]);
        assert_eq!(s.handled(), &[1, 2, 3]);
        assert_eq!(s.eval(), None);
    }

    #[test]
    fn tracks_optional_metrics_declared_by_grammar() {
        let reg = Registry::builtin();
        let mut s = TimeSeries::for_grammar(reg.resolve("simulated-annealing").unwrap());
        s.append(&rec(1.0, 5, 1, Some(0.5))).unwrap();
        assert_eq!(s.eval(), Some(&[0.5][..]));
        assert_eq!(s.temperature(), None);

        let err = s.append(&rec(2.0, 4, 1, None)).unwrap_err();
        assert!(matches!(err, Error::MissingMetric(Metric::Eval)));
        assert_eq!(s.len(), 1);
        assert!(s.is_aligned());
    }

    #[test]
    fn temperature_series_fills_and_rejects_records_without_it() {
        let reg = Registry::builtin();
        let mut s = TimeSeries::for_grammar(reg.resolve("simulated-annealing-temp").unwrap());
        let hot = LogRecord {
            temperature: Some(90.0),
            ..rec(1.0, 50, 4, Some(0.75))
        };
        let cooler = LogRecord {
            temperature: Some(72.5),
            ..rec(2.0, 45, 5, Some(0.5))
        };
        s.append(&hot).unwrap();
        s.append(&cooler).unwrap();
        assert_eq!(s.temperature(), Some(&[90.0, 72.5][..]));
        assert_eq!(s.eval(), Some(&[0.75, 0.5][..]));

        let err = s.append(&rec(3.0, 40, 6, Some(0.25))).unwrap_err();
        assert!(matches!(err, Error::MissingMetric(Metric::Temperature)));
        assert_eq!(s.len(), 2);
        assert!(s.is_aligned());
    }

    #[test]
    fn untracked_optional_values_are_ignored() {
        let mut s = TimeSeries::new();
        s.append(&rec(1.0, 5, 1, Some(0.5))).unwrap();
        assert_eq!(s.eval(), None);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn collect_propagates_reader_errors() {
        let reg = Registry::builtin();
        let g = reg.resolve("hybrid-tabu").unwrap();
        let records = vec![
            Ok(rec(1.0, 5, 1, None)),
            Err(Error::Io(std::io::Error::other("disk gone"))),
        ];
        assert!(matches!(TimeSeries::collect(g, records), Err(Error::Io(_))));
    }

    #[test]
    fn points_pair_elapsed_with_each_axis() {
        let mut s = TimeSeries::new();
        s.append(&rec(0.5, 7, 2, None)).unwrap();
        assert_eq!(s.cost_points().collect::<Vec<_>>(), vec![(0.5, 7.0)]);
        assert_eq!(s.handled_points().collect::<Vec<_>>(), vec![(0.5, 2.0)]);
    }
}
