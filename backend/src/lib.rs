pub mod client;
pub mod columns;
pub mod decode;
pub mod distance;
pub mod error;
pub mod gpx_export;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod response;
pub mod segment;
pub mod smoothing;
pub mod table;

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tower_http::cors::CorsLayer;

use crate::client::{ClientError, JourneyClient};
use crate::error::{PipelineError, RouteError};
use crate::gpx_export::encode_table_as_gpx;
use crate::models::{ApiError, JourneyTableRequest, SegmentsRequest, SegmentsResponse};
use crate::pipeline::json_to_table;
use crate::table::RouteTable;

pub use crate::pipeline::PipelineOptions;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<JourneyClient>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/segments", post(segments_handler))
        .route("/api/journey", post(journey_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

async fn segments_handler(Json(req): Json<SegmentsRequest>) -> ApiResult<SegmentsResponse> {
    let table = json_to_table(&req.response, &req.options).map_err(pipeline_error)?;
    table_response(&table).map(Json)
}

async fn journey_handler(
    State(state): State<AppState>,
    Json(req): Json<JourneyTableRequest>,
) -> ApiResult<SegmentsResponse> {
    tracing::info!(
        "journey request: {:?} -> {:?} ({})",
        req.journey.from,
        req.journey.to,
        req.journey.plan.as_str()
    );
    let table = state
        .client
        .journey_table(&req.journey, &req.options)
        .await
        .map_err(route_error)?;
    table_response(&table).map(Json)
}

fn table_response(table: &RouteTable) -> Result<SegmentsResponse, (StatusCode, Json<ApiError>)> {
    let gpx_base64 = encode_table_as_gpx(table).map_err(route_error)?;
    Ok(SegmentsResponse {
        geojson: table.to_geojson(),
        gpx_base64,
        row_count: table.row_count(),
        diagnostics: table.diagnostics().iter().map(ToString::to_string).collect(),
    })
}

fn pipeline_error(err: PipelineError) -> (StatusCode, Json<ApiError>) {
    tracing::warn!("rejecting journey payload: {err}");
    api_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
}

fn route_error(err: RouteError) -> (StatusCode, Json<ApiError>) {
    match err {
        RouteError::Pipeline(err) => pipeline_error(err),
        RouteError::Client(ClientError::Url(_)) => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        RouteError::Client(_) => {
            tracing::warn!("upstream journey request failed: {err}");
            api_error(StatusCode::BAD_GATEWAY, err.to_string())
        }
        other => api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn api_error(status: StatusCode, message: String) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { message }))
}
