use std::{fs, path::PathBuf};

use clap::{Parser, ValueEnum};
use cycle_segments::{
    client::{ClientConfig, DEFAULT_BASE_URL, JourneyClient},
    gpx_export::write_table_as_gpx,
    models::{Coordinate, JourneyPlan, JourneyRequest},
    pipeline::{PipelineOptions, response_to_table},
    response::RouteResponse,
    smoothing::SmoothingOptions,
    table::{RouteTable, TableOptions},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Geojson,
    Gpx,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Plan {
    Fastest,
    Quietest,
    Balanced,
    Shortest,
}

impl From<Plan> for JourneyPlan {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Fastest => JourneyPlan::Fastest,
            Plan::Quietest => JourneyPlan::Quietest,
            Plan::Balanced => JourneyPlan::Balanced,
            Plan::Shortest => JourneyPlan::Shortest,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Build a per-segment table from a CycleStreets journey"
)]
struct Args {
    /// Saved journey JSON. When omitted, the journey is fetched with --from/--to
    #[arg(long, conflicts_with_all = ["from", "to"])]
    input: Option<PathBuf>,

    /// Start point as `lon,lat`
    #[arg(long, value_parser = parse_lon_lat, requires = "to")]
    from: Option<Coordinate>,

    /// End point as `lon,lat`
    #[arg(long, value_parser = parse_lon_lat, requires = "from")]
    to: Option<Coordinate>,

    #[arg(long, value_enum, default_value_t = Plan::Fastest)]
    plan: Plan,

    /// CycleStreets API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Required output columns, in order (comma-separated). All columns when omitted
    #[arg(long, value_delimiter = ',')]
    cols: Option<Vec<String>>,

    /// Optional columns appended after --cols when present
    #[arg(long, value_delimiter = ',')]
    cols_extra: Vec<String>,

    /// Use the CycleStreets journey column selection
    #[arg(long, conflicts_with_all = ["cols", "cols_extra"])]
    journey_columns: bool,

    /// Append a smoothed gradient column
    #[arg(long)]
    smooth: bool,

    #[arg(long, default_value_t = 50.0)]
    distance_cutoff: f64,

    #[arg(long, default_value_t = 0.1)]
    gradient_cutoff: f64,

    /// Odd number of segments in the smoothing window
    #[arg(long, default_value_t = 3)]
    window: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Geojson)]
    format: OutputFormat,

    /// Output file, stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> PipelineOptions {
        let table = if self.journey_columns {
            TableOptions::journey_defaults()
        } else {
            TableOptions {
                cols: self.cols.clone(),
                cols_extra: self.cols_extra.clone(),
            }
        };
        PipelineOptions {
            table,
            smoothing: SmoothingOptions {
                enabled: self.smooth,
                distance_cutoff: self.distance_cutoff,
                gradient_cutoff: self.gradient_cutoff,
                window: self.window,
            },
        }
    }
}

fn parse_lon_lat(raw: &str) -> Result<Coordinate, String> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `lon,lat`, got `{raw}`"))?;
    let lon = lon.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let lat = lat.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Coordinate { lat, lon })
}

async fn build_table(args: &Args, options: &PipelineOptions) -> Result<RouteTable, Box<dyn std::error::Error>> {
    if let Some(path) = &args.input {
        tracing::info!("reading journey from {:?}", path);
        let response = RouteResponse::from_path(path)?;
        return Ok(response_to_table(&response, options)?);
    }

    let (Some(from), Some(to)) = (args.from, args.to) else {
        return Err("either --input or both --from and --to are required".into());
    };
    let api_key = std::env::var("CYCLESTREETS")
        .map_err(|_| "set CYCLESTREETS to your CycleStreets API key")?;
    let client = JourneyClient::new(ClientConfig {
        api_key,
        base_url: args.base_url.clone(),
    })?;
    let request = JourneyRequest {
        from,
        to,
        plan: args.plan.into(),
    };
    Ok(client.journey_table(&request, options).await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = args.options();
    let table = build_table(&args, &options).await?;
    tracing::info!(
        "table rows={} columns={}",
        table.row_count(),
        table.columns().len()
    );
    for diagnostic in table.diagnostics() {
        tracing::warn!("{diagnostic}");
    }

    let bytes = match args.format {
        OutputFormat::Geojson => serde_json::to_vec_pretty(&table.to_geojson())?,
        OutputFormat::Gpx => write_table_as_gpx(&table)?,
    };
    match &args.output {
        Some(path) => {
            fs::write(path, bytes)?;
            tracing::info!("table written to {:?}", path);
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
        }
    }

    Ok(())
}
