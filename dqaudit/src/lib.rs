//! Library module for the dqaudit command-line tool.
//!
//! Argument parsing and command execution live here so they can be tested
//! without spawning the binary. `main.rs` only parses, initializes logging
//! and prints.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dqaudit_core::{
    QualityAnalyzer, QualityConfig, QualityReport, Table,
    ingest::read_table_file,
    infer_schema, profile_table,
    quality::AnomalyConfig,
    report::{IssueLogger, SummaryOptions, render_summary, report_json, violations_csv},
};
use tracing::{info, warn};

/// CLI argument structure
#[derive(Parser, Debug)]
#[command(name = "dqaudit")]
#[command(about = "Rule-based data quality audit for tabular files")]
#[command(version)]
#[command(long_about = "
dqaudit - rule-based data quality audit

Loads a CSV, JSON or JSON Lines file and runs a fixed battery of checks:
- Datatype consistency, numeric ranges and missing/blank cells
- Categorical lookups and email/phone formats
- Duplicate rows and values, foreign-key-like columns
- IQR outliers, consecutive spikes/drops and an isolation-forest scan

Findings are reduced to one score in [0, 70].

EXAMPLES:
  dqaudit check customers.csv
  dqaudit check --format json -o report.json customers.csv
  dqaudit --threshold completeness:0.9,missingness:10 check orders.jsonl
  dqaudit profile --schema customers.csv
  dqaudit issues customers.csv
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub quality: QualityArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run all quality checks and print a report
    Check(CheckArgs),
    /// Profile columns and optionally infer a schema
    Profile(ProfileArgs),
    /// Raise issue tickets for every violation
    Issues(IssuesArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Input file (.csv, .json, .jsonl)
    pub input: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable compression
    #[arg(long, help = "Compress the output file using Zstandard")]
    pub compress: bool,
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Input file (.csv, .json, .jsonl)
    pub input: PathBuf,

    /// Include the inferred schema
    #[arg(long)]
    pub schema: bool,
}

#[derive(Args, Debug)]
pub struct IssuesArgs {
    /// Input file (.csv, .json, .jsonl)
    pub input: PathBuf,

    /// List issues without sample rows
    #[arg(long)]
    pub flat: bool,
}

/// Report formats for `check`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain-text summary
    Text,
    /// Full JSON report
    Json,
    /// Violations as CSV
    Csv,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct QualityArgs {
    /// JSON configuration file
    #[arg(long, global = true, env = "DQAUDIT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Expected share of anomalous rows for the isolation forest
    #[arg(long, global = true)]
    pub contamination: Option<f64>,

    /// Disable anomaly detection
    #[arg(long, global = true, help = "Skip the isolation-forest anomaly scan")]
    pub disable_anomaly_detection: bool,

    /// Threshold overrides (format: metric:value)
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        help = "Thresholds (completeness:0.9,missingness:10,type_conformance:0.3,lookup_top_n:5)"
    )]
    pub threshold: Vec<String>,
}

/// Parsed threshold overrides.
#[derive(Debug, Default, PartialEq)]
pub struct Thresholds {
    /// Minimum column completeness (0.0-1.0)
    pub completeness: Option<f64>,
    /// Maximum missing percent
    pub missingness: Option<f64>,
    /// Maximum share of values failing coercion
    pub type_conformance: Option<f64>,
    /// Categories allowed per text column
    pub lookup_top_n: Option<usize>,
    /// IQR fence multiplier
    pub iqr_multiplier: Option<f64>,
    /// Spike/drop percent threshold
    pub spike_threshold: Option<f64>,
}

/// Parses `metric:value` overrides, warning on anything unusable.
pub fn parse_thresholds(thresholds: &[String]) -> Thresholds {
    let mut parsed = Thresholds::default();

    for threshold in thresholds {
        let Some((metric, value)) = threshold.split_once(':') else {
            warn!("Ignoring malformed threshold '{}', expected metric:value", threshold);
            continue;
        };
        let Ok(v) = value.trim().parse::<f64>() else {
            warn!("Invalid threshold value for {}: {}", metric, value);
            continue;
        };
        match metric.trim().to_lowercase().as_str() {
            "completeness" => parsed.completeness = Some(v),
            "missingness" => parsed.missingness = Some(v),
            "type_conformance" => parsed.type_conformance = Some(v),
            "lookup_top_n" if v >= 1.0 && v.fract() == 0.0 => parsed.lookup_top_n = Some(v as usize),
            "lookup_top_n" => warn!("lookup_top_n must be a positive integer, got {}", v),
            "iqr_multiplier" => parsed.iqr_multiplier = Some(v),
            "spike_threshold" => parsed.spike_threshold = Some(v),
            _ => warn!("Unknown quality metric: {}", metric),
        }
    }

    parsed
}

/// Builds the quality config from an optional file plus CLI overrides.
pub fn build_config(args: &QualityArgs) -> anyhow::Result<QualityConfig> {
    let mut config = match &args.config {
        Some(path) => QualityConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => QualityConfig::new(),
    };

    let thresholds = parse_thresholds(&args.threshold);
    if let Some(c) = thresholds.completeness {
        config = config.with_completeness_min(c);
    }
    if let Some(m) = thresholds.missingness {
        config = config.with_missingness_max_pct(m);
    }
    if let Some(t) = thresholds.type_conformance {
        config = config.with_type_conformance_max_bad(t);
    }
    if let Some(n) = thresholds.lookup_top_n {
        config = config.with_lookup_top_n(n);
    }
    if let Some(m) = thresholds.iqr_multiplier {
        config.iqr_multiplier = m;
    }
    if let Some(s) = thresholds.spike_threshold {
        config.spike_threshold_pct = s;
    }

    let mut anomaly = config.anomaly_detection.clone();
    if let Some(contamination) = args.contamination {
        anomaly = anomaly.with_contamination(contamination);
    }
    if args.disable_anomaly_detection {
        anomaly = anomaly.with_enabled(false);
    }
    config = config.with_anomaly_detection(anomaly);

    config.validate().context("Invalid quality configuration")?;
    Ok(config)
}

async fn load(path: &Path) -> anyhow::Result<Table> {
    let table = read_table_file(path)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;
    info!(
        "Loaded '{}': {} rows, {} columns",
        table.name(),
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

async fn analyze(table: Arc<Table>, config: QualityConfig) -> anyhow::Result<QualityReport> {
    let report = QualityAnalyzer::new(config)
        .analyze_parallel(table)
        .await
        .context("Quality analysis failed")?;
    for failure in &report.failed_checks {
        warn!("Check '{}' failed: {}", failure.rule, failure.error);
    }
    Ok(report)
}

/// Renders a report in the requested format.
pub fn render_report(
    table: &Table,
    report: &QualityReport,
    format: OutputFormat,
) -> anyhow::Result<Vec<u8>> {
    let bytes = match format {
        OutputFormat::Text => {
            render_summary(&profile_table(table).summary, report, &SummaryOptions::default())?
                .into_bytes()
        }
        OutputFormat::Json => report_json(report)?.into_bytes(),
        OutputFormat::Csv => violations_csv(&report.violations)?,
    };
    Ok(bytes)
}

#[cfg(feature = "compression")]
fn compress(bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    Ok(dqaudit_core::report::export::compress(bytes)?)
}

#[cfg(not(feature = "compression"))]
fn compress(_bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    bail!("Compression not available. Compile with --features compression")
}

async fn write_output(path: &Path, bytes: Vec<u8>) -> anyhow::Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write to {}", path.display()))?;
    info!("Output written to {}", path.display());
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}

async fn run_check(args: &CheckArgs, config: QualityConfig) -> anyhow::Result<String> {
    if args.compress && args.output.is_none() {
        bail!("--compress requires --output");
    }

    let table = Arc::new(load(&args.input).await?);
    let report = analyze(Arc::clone(&table), config).await?;
    let mut bytes = render_report(&table, &report, args.format)?;

    match &args.output {
        Some(path) => {
            if args.compress {
                bytes = compress(&bytes)?;
            }
            write_output(path, bytes).await?;
            Ok(format!(
                "Checked '{}': {} violations, score {:.2}\nOutput: {}\n",
                report.table_name,
                report.violation_count(),
                report.score,
                path.display()
            ))
        }
        None => String::from_utf8(bytes).context("Report is not valid UTF-8"),
    }
}

async fn run_profile(args: &ProfileArgs) -> anyhow::Result<String> {
    let table = load(&args.input).await?;
    let profile = profile_table(&table);

    if args.schema {
        to_json(&serde_json::json!({
            "profile": profile,
            "schema": infer_schema(&table),
        }))
    } else {
        to_json(&profile)
    }
}

async fn run_issues(args: &IssuesArgs, config: QualityConfig) -> anyhow::Result<String> {
    let table = Arc::new(load(&args.input).await?);
    let report = analyze(Arc::clone(&table), config).await?;

    let mut logger = IssueLogger::new();
    logger.log_violations(&table, &report.violations);
    info!("Raised {} issues for '{}'", logger.len(), report.table_name);

    if args.flat {
        to_json(&logger.to_records())
    } else {
        to_json(&logger.issues())
    }
}

/// Executes the parsed command and returns the text destined for stdout.
pub async fn execute_cli(cli: &Cli) -> anyhow::Result<String> {
    match &cli.command {
        Command::Check(args) => run_check(args, build_config(&cli.quality)?).await,
        Command::Profile(args) => run_profile(args).await,
        Command::Issues(args) => run_issues(args, build_config(&cli.quality)?).await,
    }
}
