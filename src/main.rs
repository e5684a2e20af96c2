mod agenda;
mod api_types;
mod fetch;
mod filters;
mod funnel;
mod hemicycle;
mod models;
mod orchestrator;
mod status;
mod timeline;
mod viz_export;

use anyhow::Result;
use chrono::Utc;
use chrono_tz::Europe::Lisbon;
use clap::Parser;
use orchestrator::{run_export, RunOptions};
use tracing::info;

/// Viriato - Portuguese Parliament open-data visualization exporter
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output directory for generated files
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Base URL of the Viriato API
    #[arg(
        long,
        env = "VIRIATO_API_BASE",
        default_value = "https://viriato-api.onrender.com"
    )]
    base_url: String,

    /// Legislature to export (e.g. XVII)
    #[arg(short, long, default_value = "XVII")]
    legislature: String,

    /// Restrict initiative views to these type codes (e.g. J,P)
    #[arg(short, long, value_delimiter = ',')]
    types: Vec<String>,

    /// Free-text search query; adds a viz.search.json bundle
    #[arg(short, long)]
    search: Option<String>,

    /// Export only these views: initiatives, agenda, hemicycle, committees
    /// (initiatives covers the funnels and search bundles)
    #[arg(long, value_delimiter = ',')]
    views: Vec<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting viriato");

    let args = Args::parse();

    // Bundle dates follow parliament time, not UTC.
    let today = Utc::now().with_timezone(&Lisbon).date_naive();
    let date = today.format("%Y-%m-%d").to_string();

    info!(
        "Run parameters - date={}, legislature={}, base_url={}",
        date, args.legislature, args.base_url
    );

    let opts = RunOptions {
        base_url: args.base_url.trim_end_matches('/').to_string(),
        legislature: args.legislature,
        output_dir: args.output_dir,
        types: args.types,
        search: args.search,
        views: args.views,
        timeout_secs: args.timeout_secs,
    };
    run_export(&opts, &date).await
}
