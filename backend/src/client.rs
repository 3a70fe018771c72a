//! Thin CycleStreets journey client. It builds the request, fetches it and
//! rejects error payloads before handing the decoded JSON to the pipeline.

use reqwest::{Url, header::CONTENT_TYPE};
use serde_json::Value;
use shared::JourneyRequest;

use crate::{
    error::RouteError,
    pipeline::{PipelineOptions, json_to_table},
    table::RouteTable,
};

pub const DEFAULT_BASE_URL: &str = "https://www.cyclestreets.net";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("expected a JSON response, got content type `{0}`")]
    ContentType(String),
    #[error("deserialize error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("CycleStreets API error: {0}")]
    Api(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct JourneyClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl JourneyClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cycle_segments/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn journey_url(&self, req: &JourneyRequest) -> ClientResult<Url> {
        let base = Url::parse(&self.config.base_url)?;
        let mut url = base.join("api/journey.json")?;
        let itinerary = format!(
            "{}|{}",
            req.from.to_itinerary_point(),
            req.to.to_itinerary_point()
        );
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("plan", req.plan.as_str())
            .append_pair("itinerarypoints", &itinerary)
            .append_pair("reporterrors", "1");
        Ok(url)
    }

    /// Fetches the raw journey JSON.
    pub async fn fetch_journey(&self, req: &JourneyRequest) -> ClientResult<Value> {
        let url = self.journey_url(req)?;
        tracing::debug!("requesting {}", redact_key(&url));

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if !content_type.contains("json") {
            return Err(ClientError::ContentType(content_type));
        }
        parse_journey_body(&body)
    }

    /// Fetch + pipeline.
    pub async fn journey_table(
        &self,
        req: &JourneyRequest,
        options: &PipelineOptions,
    ) -> Result<RouteTable, RouteError> {
        let json = self.fetch_journey(req).await?;
        Ok(json_to_table(&json, options)?)
    }
}

/// Decodes a journey body and rejects `{"error": ...}` payloads.
pub fn parse_journey_body(body: &str) -> ClientResult<Value> {
    let json: Value = serde_json::from_str(body)?;
    if let Some(error) = json.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ClientError::Api(message));
    }
    Ok(json)
}

fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
