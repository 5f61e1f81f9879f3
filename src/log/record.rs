use crate::error::ExtractError;
use crate::grammar::{FieldRule, GrammarSpec, Metric, Scalar};
use crate::log::extract::extract;
use serde::Serialize;

/// One parsed telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogRecord {
    /// Seconds since the solver started.
    pub elapsed: f64,
    pub cost: i64,
    pub handled: i64,
    pub eval: Option<f64>,
    pub temperature: Option<f64>,
}

impl LogRecord {
    /// Parse every field the grammar declares. Any single failure rejects
    /// the whole line, and so does a negative elapsed time.
    pub fn parse(line: &str, grammar: &GrammarSpec) -> Result<Self, ExtractError> {
        let float = |rule: &FieldRule| extract(line, rule).map(Scalar::as_f64);
        let integer = |rule: &FieldRule| extract(line, rule).map(Scalar::as_i64);
        let elapsed_time = |rule: &FieldRule| {
            let value = float(rule)?;
            if value < 0.0 {
                return Err(ExtractError::Negative {
                    marker: rule.marker.clone(),
                    value,
                });
            }
            Ok(value)
        };

        let mut elapsed = 0.0;
        let mut cost = 0;
        let mut handled = 0;
        let mut eval = None;
        let mut temperature = None;

        for (metric, rule) in grammar.rules() {
            match metric {
                Metric::Elapsed => elapsed = elapsed_time(rule)?,
                Metric::Cost => cost = integer(rule)?,
                Metric::Handled => handled = integer(rule)?,
                Metric::Eval => eval = Some(float(rule)?),
                Metric::Temperature => temperature = Some(float(rule)?),
            }
        }

        Ok(Self {
            elapsed,
            cost,
            handled,
            eval,
            temperature,
        })
    }
}
