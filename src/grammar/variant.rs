//! Per-variant grammar: which lines are telemetry and where each metric sits.
//!
//! JSON shape (one entry of a grammar file):
//! {
//!   "name": "my-solver",
//!   "select": ["UPDATE"],            // a line is telemetry if it contains any of these
//!   "cap": 100,                      // optional default record cap
//!   "fields": {
//!     "elapsed": { "marker": "elapsed: ", "position": 0, "kind": "float" },
//!     "cost":    { "marker": "cost: ",    "position": 1, "kind": "integer" },
//!     "handled": { "marker": "handled: ", "position": 4, "kind": "integer" },
//!     "eval":    { "marker": "eval: ",    "position": 5, "kind": "float" }
//!   }
//! }
//!
//! Raw entries are validated into a GrammarSpec; the required metrics become
//! plain fields so a validated grammar can never lack them.

use crate::error::{Error, Result};
use crate::grammar::rule::{FieldRule, Metric};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Raw grammar shape as it appears in a grammar file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGrammar {
    pub name: String,

    #[serde(default)]
    pub select: Vec<String>,

    #[serde(default)]
    pub cap: Option<usize>,

    #[serde(default)]
    pub fields: BTreeMap<Metric, FieldRule>,
}

/// Validated, immutable grammar for one solver variant.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarSpec {
    name: String,
    select: Vec<String>,
    default_cap: Option<usize>,
    elapsed: FieldRule,
    cost: FieldRule,
    handled: FieldRule,
    eval: Option<FieldRule>,
    temperature: Option<FieldRule>,
}

impl GrammarSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn select_markers(&self) -> &[String] {
        &self.select
    }

    pub fn default_cap(&self) -> Option<usize> {
        self.default_cap
    }

    /// True when the line carries any of the variant's selection markers.
    pub fn selects(&self, line: &str) -> bool {
        self.select.iter().any(|m| line.contains(m.as_str()))
    }

    pub fn rule(&self, metric: Metric) -> Option<&FieldRule> {
        match metric {
            Metric::Elapsed => Some(&self.elapsed),
            Metric::Cost => Some(&self.cost),
            Metric::Handled => Some(&self.handled),
            Metric::Eval => self.eval.as_ref(),
            Metric::Temperature => self.temperature.as_ref(),
        }
    }

    /// Declared rules in metric order.
    pub fn rules(&self) -> impl Iterator<Item = (Metric, &FieldRule)> + '_ {
        Metric::ALL
            .into_iter()
            .filter_map(|m| self.rule(m).map(|r| (m, r)))
    }

    pub fn declares(&self, metric: Metric) -> bool {
        self.rule(metric).is_some()
    }

    pub fn from_raw(raw: RawGrammar) -> Result<Self> {
        let RawGrammar {
            name,
            select,
            cap,
            mut fields,
        } = raw;

        let invalid = |reason: String| Error::InvalidGrammar {
            name: name.clone(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(invalid("variant name is empty".into()));
        }
        if select.is_empty() || select.iter().any(|m| m.is_empty()) {
            return Err(invalid(
                "at least one non-empty selection marker is required".into(),
            ));
        }
        if cap == Some(0) {
            return Err(invalid("cap must be positive".into()));
        }

        for (metric, rule) in &fields {
            if rule.marker.is_empty() {
                return Err(invalid(format!("{} rule has an empty marker", metric)));
            }
            if rule.kind != metric.kind() {
                return Err(invalid(format!(
                    "{} must be extracted as {}, rule says {}",
                    metric,
                    metric.kind(),
                    rule.kind
                )));
            }
        }

        let mut take_required = |metric: Metric| {
            fields
                .remove(&metric)
                .ok_or_else(|| invalid(format!("missing required field rule {}", metric)))
        };
        let elapsed = take_required(Metric::Elapsed)?;
        let cost = take_required(Metric::Cost)?;
        let handled = take_required(Metric::Handled)?;

        Ok(Self {
            eval: fields.remove(&Metric::Eval),
            temperature: fields.remove(&Metric::Temperature),
            name,
            select,
            default_cap: cap,
            elapsed,
            cost,
            handled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::rule::ScalarKind;

    fn raw(fields: Vec<(Metric, FieldRule)>) -> RawGrammar {
        RawGrammar {
            name: "test".into(),
            select: vec!["UPDATE".into()],
            cap: None,
            fields: fields.into_iter().collect(),
        }
    }

    fn required() -> Vec<(Metric, FieldRule)> {
        vec![
            (Metric::Elapsed, FieldRule::float("elapsed: ", 0)),
            (Metric::Cost, FieldRule::integer("cost: ", 1)),
            (Metric::Handled, FieldRule::integer("handled: ", 2)),
        ]
    }

    #[test]
    fn builds_from_required_rules() {
        let g = GrammarSpec::from_raw(raw(required())).unwrap();
        assert_eq!(g.name(), "test");
        assert!(g.declares(Metric::Cost));
        assert!(!g.declares(Metric::Eval));
        let metrics: Vec<Metric> = g.rules().map(|(m, _)| m).collect();
        assert_eq!(metrics, vec![Metric::Elapsed, Metric::Cost, Metric::Handled]);
    }

    #[test]
    fn rejects_missing_required_rule() {
        let mut fields = required();
        fields.retain(|(m, _)| *m != Metric::Handled);
        let err = GrammarSpec::from_raw(raw(fields)).unwrap_err();
        assert!(err.to_string().contains("missing required field rule handled"));
    }

    #[test]
    fn rejects_kind_mismatch() {
        let mut fields = required();
        fields.push((Metric::Eval, FieldRule::new("eval: ", 3, ScalarKind::Integer)));
        let err = GrammarSpec::from_raw(raw(fields)).unwrap_err();
        assert!(matches!(err, Error::InvalidGrammar { .. }));
    }

    #[test]
    fn rejects_empty_selection() {
        let mut r = raw(required());
        r.select.clear();
        assert!(GrammarSpec::from_raw(r).is_err());
    }

    #[test]
    fn selects_on_any_marker() {
        let mut r = raw(required());
        r.select = vec!["X".into(), "UPDATE".into()];
        let g = GrammarSpec::from_raw(r).unwrap();
        assert!(g.selects("X elapsed: 1, cost: 2, handled: 3"));
        assert!(g.selects("UPDATE: elapsed: 1"));
        assert!(!g.selects("x lowercase only"));
    }
}
