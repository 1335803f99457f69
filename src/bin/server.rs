//! HTTP server for the sales dashboard.
//! Loads the dataset once, then serves JSON metrics until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use sales_dashboard::cli::SourceArgs;
use sales_dashboard::config::AppConfig;
use sales_dashboard::http::{serve, AppContext};
use sales_dashboard::{loader, logging};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Sales dashboard JSON API")]
struct Args {
    /// Interface to bind (overrides SALES_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT / SALES_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Include debug details in metric error payloads
    #[arg(long)]
    debug_errors: bool,

    #[command(flatten)]
    source: SourceArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid environment configuration")?;
    args.source.apply(&mut config);
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.debug_errors {
        config.debug_errors = true;
    }

    info!("🚀 Starting sales dashboard API...");
    let source = loader::from_source(&config.source);
    let sample_fallback = config.sample_fallback;
    let dataset = tokio::task::spawn_blocking(move || {
        loader::load_or_fallback(source.as_ref(), sample_fallback)
    })
    .await
    .context("dataset loader task failed")?;

    let addr = config.bind_addr();
    let ctx = Arc::new(AppContext::new(dataset, config));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("📡 Listening on http://{}", listener.local_addr()?);

    tokio::select! {
        result = serve(listener, ctx) => result.context("server stopped")?,
        _ = tokio::signal::ctrl_c() => info!("👋 Shutting down"),
    }

    Ok(())
}
