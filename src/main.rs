//! Run the credit KPI pipeline over a contracts file and a payments file
//!
//! Writes the workbook as one CSV per table plus a manifest, then mirrors
//! and announces it.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use credit_kpi::external::{CsvWorkbookWriter, DirectoryMirror, FileFetcher, GitMirror, LogNotifier};
use credit_kpi::{Pipeline, PipelineConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "credit-kpi")]
#[command(about = "Loan portfolio credit KPIs and valuation", long_about = None)]
struct Cli {
    /// Contracts CSV
    #[arg(long, default_value = "data/contracts.csv")]
    contracts: String,
    /// Payments CSV
    #[arg(long, default_value = "data/payments.csv")]
    payments: String,
    #[arg(long, default_value = "output/credit_kpis")]
    output_dir: PathBuf,
    /// JSON file with pipeline parameters
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    discount_rate: Option<f64>,
    /// Reporting horizon (YYYY-MM-DD)
    #[arg(long)]
    horizon: Option<NaiveDate>,
    /// First projected month (YYYY-MM-DD)
    #[arg(long)]
    projection_start: Option<NaiveDate>,
    /// Fail when payments reference unknown contracts
    #[arg(long, default_value_t = false)]
    strict_join: bool,
    /// Copy the workbook into this directory after writing it
    #[arg(long)]
    mirror_dir: Option<PathBuf>,
    /// Commit the workbook into this git checkout
    #[arg(long)]
    git_repo: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    no_push: bool,
    /// Recipient named in the completion notice
    #[arg(long)]
    notify: Option<String>,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(rate) = cli.discount_rate {
        config.annual_discount_rate = rate;
    }
    if let Some(horizon) = cli.horizon {
        config.reporting_horizon = horizon;
    }
    if let Some(start) = cli.projection_start {
        config.projection_start = start;
    }
    config.strict_join |= cli.strict_join;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let fetcher = FileFetcher::new();
    let sink = CsvWorkbookWriter::new(&cli.output_dir);

    let mut pipeline = Pipeline::new(config, &fetcher, &sink);
    if let Some(dir) = &cli.mirror_dir {
        pipeline = pipeline.with_publisher(Box::new(DirectoryMirror::new(dir)));
    }
    if let Some(repo) = &cli.git_repo {
        let mut mirror = GitMirror::new(repo);
        if cli.no_push {
            mirror = mirror.without_push();
        }
        pipeline = pipeline.with_publisher(Box::new(mirror));
    }
    pipeline = pipeline.with_publisher(Box::new(LogNotifier { recipient: cli.notify.clone() }));

    let summary = pipeline
        .run(&cli.contracts, &cli.payments)
        .context("credit KPI run failed")?;

    println!("Workbook: {}", summary.output.display());
    println!("Portfolio value: {:.2}", summary.portfolio_value);
    for (name, err) in &summary.publish_failures {
        eprintln!("warning: publisher {} failed: {}", name, err);
    }
    Ok(())
}
