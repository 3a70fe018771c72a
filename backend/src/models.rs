use serde::{Deserialize, Serialize};

pub use shared::{ApiError, Coordinate, JourneyPlan, JourneyRequest, SegmentsResponse};

use crate::pipeline::PipelineOptions;

/// Body of `POST /api/segments`: an already fetched journey payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentsRequest {
    pub response: serde_json::Value,
    #[serde(default)]
    pub options: PipelineOptions,
}

/// Body of `POST /api/journey`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyTableRequest {
    #[serde(flatten)]
    pub journey: JourneyRequest,
    #[serde(default)]
    pub options: PipelineOptions,
}
