//! cvecurate
//!
//! Scores CVE records on four quality dimensions and filters them into
//! training, review, rejected, and quarantine streams.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use cvecurate_cli::commands;
use cvecurate_cli::{ConfigLoader, ConfigOverrides};
use cvecurate_filter::CurationEngine;
use cvecurate_telemetry::StageMetrics;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cvecurate")]
#[command(about = "Quality scoring and curation of CVE training data", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path [default: cvecurate.yaml, if present]
    #[arg(short, long, global = true, env = "CVECURATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Write Prometheus-format stage counters here on exit
    #[arg(long, global = true, value_name = "PATH")]
    metrics_out: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert saved NVD CVE 2.0 feed pages into source-record JSONL
    ImportNvd {
        /// Feed documents
        #[arg(long, required = true, num_args = 1..)]
        feed: Vec<PathBuf>,

        /// Source-record JSONL to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Normalize and score source records
    Score {
        /// Source-record JSONL files, concatenated in order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Scored JSONL to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split scored records into curated streams
    Filter {
        /// Scored JSONL produced by `score`
        #[arg(short, long)]
        scored: PathBuf,

        /// Directory for the stream files and run ledger
        #[arg(short = 'd', long)]
        output_dir: PathBuf,
    },

    /// Normalize, score, and filter in one pass
    Run {
        /// Source-record JSONL files, concatenated in order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Directory for scored_all, the stream files, and the run ledger
        #[arg(short = 'd', long)]
        output_dir: PathBuf,
    },

    /// Print the effective configuration as YAML
    CheckConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    let config = ConfigLoader::new(cli.config.clone()).load(&cli.overrides)?;
    let metrics_handle = init_metrics()?;

    if let Command::CheckConfig = cli.command {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let metrics = StageMetrics::new();
    let engine = Arc::new(CurationEngine::new(config)?.with_metrics(metrics.clone()));
    // One timestamp for every record of the run
    let scored_at = Utc::now();

    match cli.command {
        Command::ImportNvd { feed, output } => {
            let count = commands::import_nvd(&feed, &output).await?;
            info!(records = count, output = %output.display(), "NVD import complete");
        }
        Command::Score { input, output } => {
            let summary = commands::score(engine, &input, &output, scored_at).await?;
            println!("{}", summary);
        }
        Command::Filter { scored, output_dir } => {
            let summary = commands::filter(engine, &scored, &output_dir).await?;
            println!("{}", summary);
        }
        Command::Run { input, output_dir } => {
            let report = commands::run(engine, &input, &output_dir, scored_at).await?;
            println!("{}", report.score);
            println!("{}", report.filter);
            if let Some(head) = &report.ledger_head {
                info!(head = %head, "Run ledger sealed");
            }
        }
        Command::CheckConfig => {}
    }

    let snapshot = metrics.snapshot();
    info!(
        ingested = snapshot.ingested,
        training_rate = snapshot.training_rate(),
        quarantine_rate = snapshot.quarantine_rate(),
        "Curation finished"
    );

    if let Some(path) = &cli.metrics_out {
        write_metrics(path, &metrics_handle)?;
    }
    Ok(())
}

/// Initialize tracing/logging; logs go to stderr so summaries own stdout
fn init_tracing(verbose: bool, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("cvecurate=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cvecurate=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Install the Prometheus recorder and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    cvecurate_telemetry::metrics::describe_metrics();
    Ok(handle)
}

fn write_metrics(path: &Path, handle: &PrometheusHandle) -> Result<()> {
    std::fs::write(path, handle.render())?;
    info!(path = %path.display(), "Metrics written");
    Ok(())
}
