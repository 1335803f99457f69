use anyhow::{bail, Result};
use clap::Parser;
use sales_dashboard::cli::SourceArgs;
use sales_dashboard::config::AppConfig;
use sales_dashboard::engine::{respond, GrowthBasis, Metric, MetricOptions};
use sales_dashboard::{loader, logging};
use tracing::info;

#[derive(Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Compute a sales dashboard metric and print it as JSON")]
struct Args {
    /// Metric to compute, or `list` to print every metric name
    metric: String,

    /// Growth basis for month_over_month_growth
    #[arg(long, default_value = "total")]
    basis: GrowthBasis,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Include debug details in error payloads
    #[arg(long)]
    debug_errors: bool,

    #[command(flatten)]
    source: SourceArgs,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let args = Args::parse();

    if args.metric == "list" {
        for metric in Metric::ALL {
            println!("{:<28} {}", metric.slug(), metric.title());
        }
        return Ok(());
    }

    let Some(metric) = Metric::from_slug(&args.metric) else {
        bail!("unknown metric '{}' (try `list`)", args.metric);
    };

    let mut config = AppConfig::from_env()?;
    args.source.apply(&mut config);

    let loader = loader::from_source(&config.source);
    let dataset = loader::load_or_fallback(loader.as_ref(), config.sample_fallback);
    info!("Computing {} over {} rows", metric.slug(), dataset.len());

    let options = MetricOptions {
        growth_basis: args.basis,
    };
    let response = respond(
        metric,
        &dataset,
        &options,
        args.debug_errors || config.debug_errors,
    );
    let failed = response.is_error();
    let value = response.into_value();

    if args.compact {
        println!("{}", serde_json::to_string(&value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
