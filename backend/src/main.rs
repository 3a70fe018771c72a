use std::{net::SocketAddr, sync::Arc};

use cycle_segments::{
    AppState,
    client::{ClientConfig, DEFAULT_BASE_URL, JourneyClient},
    create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cycle_segments=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_key = std::env::var("CYCLESTREETS").unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("CYCLESTREETS is not set; /api/journey requests will be rejected upstream");
    }
    let base_url =
        std::env::var("CYCLESTREETS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let client = JourneyClient::new(ClientConfig { api_key, base_url })?;

    let state = AppState {
        client: Arc::new(client),
    };
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    tracing::info!("starting segment service on http://{addr}");
    tracing::info!("  POST /api/segments - table from a fetched journey payload");
    tracing::info!("  POST /api/journey  - fetch a CycleStreets journey and build its table");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
