use geo_types::LineString;
use rayon::prelude::*;

use crate::{
    decode::{DecodedSegment, decode_distance_total},
    distance::sequential_distances,
    error::{PipelineError, SchemaError},
    metrics::SegmentMetrics,
    response::{AttributeValue, DISTANCES, ELEVATIONS, POINTS, RouteResponse},
};

/// One route leg, decoded once and consumed by every downstream stage.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Marker index in the response (1-based, 0 is the journey summary).
    pub marker: usize,
    pub decoded: DecodedSegment,
    pub sequential_distances: Vec<f64>,
    pub metrics: SegmentMetrics,
}

impl Segment {
    pub fn from_response(response: &RouteResponse, marker: usize) -> Result<Self, PipelineError> {
        let points = required_text(response, POINTS, marker)?;
        let elevations = required_text(response, ELEVATIONS, marker)?;
        let decoded = DecodedSegment::decode(&points, &elevations, marker)?;
        let sequential_distances = sequential_distances(&decoded.coordinates);

        let reported = match response.value(DISTANCES, marker) {
            Some(value) => Some(decode_distance_total(&text_of(value), marker)?),
            None => None,
        };
        let distance = reported.unwrap_or_else(|| sequential_distances.iter().sum());

        let metrics = SegmentMetrics::derive(&decoded.elevations, &sequential_distances, distance);
        if metrics.is_degenerate() {
            tracing::warn!("segment {marker} has zero distance; gradient_segment is undefined");
        }

        Ok(Self {
            marker,
            decoded,
            sequential_distances,
            metrics,
        })
    }

    pub fn line_string(&self) -> LineString<f64> {
        LineString::new(self.decoded.coordinates.clone())
    }

    pub fn geodesic_length(&self) -> f64 {
        self.sequential_distances.iter().sum()
    }
}

/// Decodes every segment of the response, in parallel, preserving order. The
/// first failing segment aborts the whole batch.
pub fn decode_segments(response: &RouteResponse) -> Result<Vec<Segment>, PipelineError> {
    response.require(POINTS)?;
    response.require(ELEVATIONS)?;

    (1..=response.segment_count())
        .into_par_iter()
        .map(|marker| Segment::from_response(response, marker))
        .collect()
}

fn required_text(
    response: &RouteResponse,
    attribute: &str,
    marker: usize,
) -> Result<String, SchemaError> {
    response
        .value(attribute, marker)
        .map(text_of)
        .ok_or_else(|| SchemaError::MissingValue {
            attribute: attribute.to_string(),
            segment: marker,
        })
}

/// Encoded series occasionally arrive as bare numbers or JSON arrays.
fn text_of(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Text(s) => s.clone(),
        AttributeValue::Number(n) => n.to_string(),
        AttributeValue::List(items) => items.iter().map(text_of).collect::<Vec<_>>().join(","),
    }
}
