//! Centrals Analytics - volume verification metrics for composting centrals
//!
//! A CLI tool and HTTP service that reads centrals and their volume
//! verification posts from a WordPress site and aggregates them into
//! monthly, quarterly and semesterly volume metrics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing configuration, upstream failure, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod server;
mod wordpress;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use error::AnalyticsError;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use wordpress::WordPressClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Centrals Analytics v{}", env!("CARGO_PKG_VERSION"));

    let result = if args.serve {
        run_server(&args).await
    } else {
        run_report(&args).await
    };

    if let Err(e) = result {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default configuration file.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Credentials are best left to WORDPRESS_SITE_URL, WORDPRESS_EMAIL and WORDPRESS_PASS.");
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

/// Serve the analysis over HTTP until interrupted.
async fn run_server(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    server::run(&config).await
}

/// Run one analysis and write the report.
async fn run_report(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let config = load_config(args)?;

    // Fail before any request when credentials are incomplete
    let credentials = config.wordpress.credentials()?;
    let client = WordPressClient::new(credentials, &config.wordpress, &config.http)?;
    let site_url = client.site_url().to_string();

    println!("📥 Fetching centrals from {}", site_url);
    println!("   Timeout: {}s per request", config.http.timeout_seconds);

    let progress = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let budget = Duration::from_secs(config.http.request_budget_seconds);
    let report = tokio::time::timeout(
        budget,
        analysis::analyze_centrals(&client, progress.as_ref()),
    )
    .await
    .map_err(|_| AnalyticsError::BudgetExceeded(budget.as_secs()))??;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    println!("\n📝 Generating report...");

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(
            &report,
            &site_url,
            config.report.include_monthly_tables,
        ),
    };

    let output_path = Path::new(&config.report.output);
    report::write_report(&output, output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    let summary = &report.summary;
    let duration = start_time.elapsed().as_secs_f64();

    println!("\n📊 Analysis Summary:");
    println!("   Centrals: {}", summary.total_centrals);
    println!("   Verifications: {}", summary.total_posts);
    println!("   Total volume: {:.2} kg", summary.total_volume);
    println!(
        "   Average per central: {:.2} kg",
        summary.average_volume_per_central
    );
    if report.failed_count() > 0 {
        println!("   ⚠️  Failed centrals: {}", report.failed_count());
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    Ok(())
}

/// Load configuration from file or use defaults, then apply CLI and
/// environment overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => {
                info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
                config
            }
            Ok(None) => {
                debug!("No config file found, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!("Failed to load config: {:#}", e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    config.validate()?;
    debug!("Configuration: {:?}", config);

    Ok(config)
}
