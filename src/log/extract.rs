use crate::error::ExtractError;
use crate::grammar::{FieldRule, Scalar, ScalarKind};

/// Extract one scalar from a telemetry line.
///
/// The line is split on commas, the segment at `rule.position` must contain
/// `rule.marker`, and the text after the marker (whitespace-trimmed) is parsed
/// as `rule.kind`.
///
/// Example:
/// "UPDATE: elapsed: 12.5, cost: 200"  +  { "cost: ", 1, Integer }  =>  Integer(200)
pub fn extract(line: &str, rule: &FieldRule) -> Result<Scalar, ExtractError> {
    let segment = line
        .split(',')
        .nth(rule.position)
        .ok_or_else(|| ExtractError::SegmentIndex {
            position: rule.position,
            segments: line.split(',').count(),
        })?;

    let at = segment
        .find(rule.marker.as_str())
        .ok_or_else(|| ExtractError::MarkerNotFound {
            marker: rule.marker.clone(),
            position: rule.position,
        })?;

    let text = segment[at + rule.marker.len()..].trim();
    convert(text, rule)
}

fn convert(text: &str, rule: &FieldRule) -> Result<Scalar, ExtractError> {
    let converted = match rule.kind {
        ScalarKind::Float => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Scalar::Float),
        ScalarKind::Integer => text.parse::<i64>().ok().map(Scalar::Integer),
    };

    converted.ok_or_else(|| ExtractError::Conversion {
        marker: rule.marker.clone(),
        text: text.to_string(),
        kind: rule.kind,
    })
}
