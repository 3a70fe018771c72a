use thiserror::Error;

use crate::client::ClientError;
use crate::smoothing::SmoothingError;

/// Malformed encoded series in one segment. Segment numbers are marker
/// indices, so the first segment is 1.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("segment {segment}: `{attribute}` holds no values")]
    Empty {
        segment: usize,
        attribute: &'static str,
    },
    #[error("segment {segment}: `{attribute}` has non-numeric token `{token}`")]
    InvalidNumber {
        segment: usize,
        attribute: &'static str,
        token: String,
    },
    #[error("segment {segment}: coordinate string has {count} numbers, expected lon/lat pairs")]
    OddCoordinateCount { segment: usize, count: usize },
    #[error("segment {segment}: reported distance `{value}` is negative or not finite")]
    InvalidDistance { segment: usize, value: f64 },
    #[error("segment {segment}: {coordinates} coordinates but {elevations} elevation samples")]
    LengthMismatch {
        segment: usize,
        coordinates: usize,
        elevations: usize,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("response has no `marker` or `segments` collection")]
    MissingSegments,
    #[error("response contains a journey summary but no segments")]
    NoSegments,
    #[error("attribute `{0}` is absent from the response")]
    MissingAttribute(String),
    #[error("segment {segment} has no value for `{attribute}`")]
    MissingValue { attribute: String, segment: usize },
    #[error("column `{0}` is not present in the segment table")]
    MissingColumn(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Smoothing(#[from] SmoothingError),
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("segment pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("journey request failed: {0}")]
    Client(#[from] ClientError),
    #[error("failed to read response: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid response JSON: {0}")]
    Json(#[from] serde_json::Error),
}
