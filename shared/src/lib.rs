use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// CycleStreets itinerary points are written longitude first.
    pub fn to_itinerary_point(self) -> String {
        format!("{},{}", self.lon, self.lat)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyPlan {
    #[default]
    Fastest,
    Quietest,
    Balanced,
    Shortest,
}

impl JourneyPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            JourneyPlan::Fastest => "fastest",
            JourneyPlan::Quietest => "quietest",
            JourneyPlan::Balanced => "balanced",
            JourneyPlan::Shortest => "shortest",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyRequest {
    pub from: Coordinate,
    pub to: Coordinate,
    #[serde(default)]
    pub plan: JourneyPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentsResponse {
    /// GeoJSON FeatureCollection, one feature per segment.
    pub geojson: serde_json::Value,
    pub gpx_base64: String,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
