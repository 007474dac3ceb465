//! recdiff - compare configuration records between two platform instances
//!
//! `compare` runs a full comparison and writes a report; `probe` lists the
//! records instance A returns for one table to check connection and query.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use recdiff::{
    run_comparison, write_report, InstanceClient, InstanceInfo, RecordCatalog, ReportFormat,
    ReportMeta,
};
use recdiff_common::config::{load_config, resolve_config_path, AppConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for recdiff
#[derive(Parser, Debug)]
#[command(name = "recdiff")]
#[command(about = "Compare configuration records between two instances")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the configured tables and write a report
    Compare(CompareArgs),
    /// List records from instance A for one table
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
struct ConfigArg {
    /// Config file (TOML, or JSON when the name ends in .json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CompareArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Html)]
    format: ReportFormat,

    /// Directory for the report, overrides output_dir
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Table to compare, overrides the configured list (repeatable)
    #[arg(short, long = "table")]
    tables: Vec<String>,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// Table to list
    #[arg(short, long)]
    table: String,

    /// Listing limit, overrides page_size
    #[arg(short, long, default_value = "10")]
    limit: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting recdiff v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    match cli.command {
        Command::Compare(args) => compare(args).await,
        Command::Probe(args) => probe(args).await,
    }
}

fn load(arg: &ConfigArg) -> Result<AppConfig> {
    let path = resolve_config_path(arg.config.as_deref()).context("Failed to locate config file")?;
    info!("Config file: {}", path.display());
    let config = load_config(&path).with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(config)
}

async fn compare(args: CompareArgs) -> Result<()> {
    let mut config = load(&args.config)?;
    if !args.tables.is_empty() {
        config.tables = args.tables;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    config.validate().context("Invalid configuration")?;

    let client_a = InstanceClient::from_config(&config.instance_a, &config)
        .context("Failed to create client for instance A")?;
    let client_b = InstanceClient::from_config(&config.instance_b, &config)
        .context("Failed to create client for instance B")?;

    info!(
        "Comparing {} ({}) with {} ({}), {} tables",
        client_a.label(),
        client_a.base_url(),
        client_b.label(),
        client_b.base_url(),
        config.tables.len()
    );

    let run = run_comparison(&config.tables, &config.query, &client_a, &client_a, &client_b).await;

    let meta = ReportMeta {
        instance_a: InstanceInfo {
            label: client_a.label().to_string(),
            url: client_a.base_url().to_string(),
        },
        instance_b: InstanceInfo {
            label: client_b.label().to_string(),
            url: client_b.base_url().to_string(),
        },
        query: config.query.clone(),
        generated_at: Utc::now(),
    };

    let path = write_report(&run, &meta, args.format, &config.output_dir, &config.report_name)
        .context("Failed to write report")?;

    println!("Report saved to: {}", path.display());
    Ok(())
}

async fn probe(args: ProbeArgs) -> Result<()> {
    let mut config = load(&args.config)?;
    config.page_size = args.limit;
    config.validate().context("Invalid configuration")?;

    let client = InstanceClient::from_config(&config.instance_a, &config)
        .context("Failed to create client for instance A")?;

    println!("Instance: {} ({})", client.label(), client.base_url());
    println!("Table:    {}", args.table);
    println!("Query:    {}", config.query);

    let records = client
        .list_records(&args.table, &config.query)
        .await
        .with_context(|| format!("Failed to list {}", args.table))?;

    for record in &records {
        println!("{}  {}", record.sys_id, record.display_name);
    }
    println!("Records found: {}", records.len());
    Ok(())
}
