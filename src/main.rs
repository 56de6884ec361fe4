//! VitalDash - static analytics dashboard for newborn vital signs
//!
//! A CLI tool that loads a JSON dataset of vital-sign records, aggregates
//! it and renders risk, gender and temperature charts plus a table of the
//! most recent records.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (dataset load failure, config, output write, etc.)

mod analysis;
mod cli;
mod config;
mod dashboard;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use dashboard::RenderOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use loader::DataSource;
use models::{ChartConfig, DashboardReport, ReportMetadata, TableRow};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("VitalDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_dashboard(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .vitaldash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  .vitaldash.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .vitaldash.toml")?;

    println!("✅ Created .vitaldash.toml with default settings.");
    println!("   Edit it to customize the data source, labels, palette and table size.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Spinner shown while the dataset loads.
fn load_spinner(args: &Args, source: &DataSource) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Loading {}", source));
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Load, aggregate and render the dashboard. Returns the exit code.
async fn run_dashboard(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let source = DataSource::parse(&config.source.location);
    let timeout = Duration::from_secs(config.source.timeout_seconds);

    if args.summary {
        return handle_summary(&source, timeout).await;
    }

    let spinner = load_spinner(&args, &source);
    let load = async {
        let result = loader::load_dataset(&source, timeout).await;
        if let Some(ref pb) = spinner {
            pb.finish_and_clear();
        }
        result
    };

    let mut charts: Vec<ChartConfig> = Vec::new();
    let mut rows: Vec<TableRow> = Vec::new();

    let outcome = dashboard::load_and_render(
        load,
        &config.dashboard,
        &config.palette,
        &mut charts,
        &mut rows,
    )
    .await;

    let record_count = match outcome {
        RenderOutcome::Rendered {
            records,
            charts: drawn,
            rows: appended,
        } => {
            debug!("{} charts drawn, {} rows appended", drawn, appended);
            records
        }
        RenderOutcome::LoadFailed => return Ok(1),
    };

    let report = DashboardReport {
        title: config.dashboard.title.clone(),
        metadata: ReportMetadata {
            source: source.to_string(),
            generated_at: Utc::now(),
            record_count,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        charts,
        rows,
    };

    let output = match args.format {
        OutputFormat::Html => report::generate_html_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = std::path::PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write dashboard to {}", output_path.display()))?;

    if !args.quiet {
        println!("\n📊 Dashboard Summary:");
        println!("   Records: {}", record_count);
        println!("   Charts: {}", report.charts.len());
        println!("   Table rows: {}", report.rows.len());
        println!(
            "\n✅ Dashboard saved to: {}",
            output_path.display()
        );
    }

    Ok(0)
}

/// Handle --summary: load the dataset and print field coverage.
async fn handle_summary(source: &DataSource, timeout: Duration) -> Result<i32> {
    let records = match loader::load_dataset(source, timeout).await {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to load dataset: {}", e);
            return Ok(1);
        }
    };

    print!("{}", report::generate_dataset_summary(&source.to_string(), &records));
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .vitaldash.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
