//! Splits response attributes into journey-level constants and per-segment
//! variables.

use crate::response::{AttributeSeries, AttributeValue, RouteResponse};

/// How an attribute series ends up in the segment table.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Missing in every segment; the summary value is broadcast.
    Constant(AttributeValue),
    /// Present in every segment.
    Variable(Vec<AttributeValue>),
    /// Partially missing, excluded metadata, or nothing to broadcast.
    Dropped,
}

/// Bearing and record-type metadata never become per-segment columns.
pub fn is_excluded(name: &str) -> bool {
    name == "type" || name.to_ascii_lowercase().contains("bearing")
}

pub fn classify_attribute(series: &AttributeSeries) -> Classification {
    let segments = series.segment_values();
    let missing = series.missing_segments();

    if missing == segments.len() {
        return match series.summary() {
            Some(value) => Classification::Constant(value.clone().coerce_numeric()),
            None => Classification::Dropped,
        };
    }

    if missing == 0 && !is_excluded(&series.name) {
        return Classification::Variable(segments.iter().flatten().cloned().collect());
    }

    Classification::Dropped
}

/// Disjoint constant and variable attribute sets, in response order.
#[derive(Debug, Clone, Default)]
pub struct ColumnSets {
    pub constant: Vec<(String, AttributeValue)>,
    pub variable: Vec<(String, Vec<AttributeValue>)>,
}

impl ColumnSets {
    pub fn classify(response: &RouteResponse) -> Self {
        let mut sets = ColumnSets::default();
        for series in response.attributes() {
            match classify_attribute(series) {
                Classification::Constant(value) => {
                    sets.constant.push((series.name.clone(), value));
                }
                Classification::Variable(values) => {
                    sets.variable.push((series.name.clone(), values));
                }
                Classification::Dropped => {
                    tracing::debug!("dropping attribute `{}`", series.name);
                }
            }
        }
        sets
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constant.iter().any(|(n, _)| n == name) || self.variable.iter().any(|(n, _)| n == name)
    }
}
