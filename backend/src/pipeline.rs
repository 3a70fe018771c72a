use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    columns::ColumnSets,
    error::PipelineError,
    response::RouteResponse,
    segment::decode_segments,
    smoothing::{SmoothingOptions, smooth_with_cutoffs},
    table::{Diagnostic, RouteTable, TableOptions},
};

pub const GRADIENT_SMOOTH: &str = "gradient_smooth";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineOptions {
    #[serde(default)]
    pub table: TableOptions,
    #[serde(default)]
    pub smoothing: SmoothingOptions,
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.smoothing.enabled {
            self.smoothing.validate()?;
        }
        Ok(())
    }
}

/// Decoded JSON journey → segment table.
pub fn json_to_table(json: &Value, options: &PipelineOptions) -> Result<RouteTable, PipelineError> {
    options.validate()?;
    let response = RouteResponse::from_json(json)?;
    response_to_table(&response, options)
}

pub fn response_to_table(
    response: &RouteResponse,
    options: &PipelineOptions,
) -> Result<RouteTable, PipelineError> {
    options.validate()?;

    let segments = decode_segments(response)?;
    tracing::debug!("decoded {} segment(s)", segments.len());

    let sets = ColumnSets::classify(response);
    tracing::debug!(
        "{} constant and {} variable attribute(s)",
        sets.constant.len(),
        sets.variable.len()
    );

    let mut table = RouteTable::assemble(sets, &segments, &options.table)?;

    if options.smoothing.enabled {
        let gradients: Vec<f64> = segments.iter().map(|s| s.metrics.gradient_segment).collect();
        let changes: Vec<f64> = segments.iter().map(|s| s.metrics.elevation_change).collect();
        let distances: Vec<f64> = segments.iter().map(|s| s.metrics.distance).collect();

        let smoothed = smooth_with_cutoffs(&gradients, &changes, &distances, &options.smoothing)?;
        if let Some(fallback) = smoothed.fallback {
            table.push_diagnostic(Diagnostic::AnomalyCorrected {
                rows: smoothed.fallback_rows.clone(),
                fallback,
            });
        }
        table.push_column(GRADIENT_SMOOTH, smoothed.values);
    }

    Ok(table)
}
