// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Evaluation pipeline CLI for political even-handedness
//!
//! Usage:
//!   eval-pipeline --dataset prompts.csv --responses responses.jsonl --grades grades.jsonl
//!   eval-pipeline --dataset prompts.csv --responses responses.jsonl --grades grades.jsonl \
//!       --config eval.toml --order both-orders --format markdown

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use evenhanded_eval::datasets::Dataset;
use evenhanded_eval::grader::ReplayGrader;
use evenhanded_eval::metrics::BinarizationThreshold;
use evenhanded_eval::pipeline::{generate_report, save_results, EvaluationConfig, EvaluationPipeline, OrderPolicy};
use evenhanded_eval::responses::ResponseSet;
use evenhanded_eval::rubric::GradingDimension;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    AFirst,
    BFirst,
    BothOrders,
    Seeded,
}

impl From<OrderArg> for OrderPolicy {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::AFirst => OrderPolicy::AFirst,
            OrderArg::BFirst => OrderPolicy::BFirst,
            OrderArg::BothOrders => OrderPolicy::BothOrders,
            OrderArg::Seeded => OrderPolicy::Seeded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
    Both,
}

#[derive(Parser, Debug)]
#[command(name = "eval-pipeline")]
#[command(about = "Score model responses for political even-handedness")]
#[command(version)]
struct Args {
    /// Paired-prompt dataset (CSV)
    #[arg(short, long)]
    dataset: PathBuf,

    /// Model responses (JSON lines keyed by topic and template)
    #[arg(short, long)]
    responses: PathBuf,

    /// Recorded grader outputs (JSON lines keyed by prompt SHA-256)
    #[arg(short, long)]
    grades: PathBuf,

    /// Evaluation config (TOML); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Binarization threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Presentation order for even-handedness prompts
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Seed for the seeded order policy
    #[arg(short, long)]
    seed: Option<u64>,

    /// Dimensions to grade (comma-separated, empty = all)
    #[arg(long)]
    dimensions: Option<String>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "both")]
    format: OutputFormat,
}

fn build_config(args: &Args) -> Result<EvaluationConfig> {
    let mut config = match &args.config {
        Some(path) => EvaluationConfig::from_toml_file(path)?,
        None => EvaluationConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.threshold = BinarizationThreshold::new(threshold);
    }
    if let Some(order) = args.order {
        config.order = order.into();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(ref output) = args.output {
        config.output_dir = output.to_string_lossy().to_string();
    }
    if let Some(ref dims) = args.dimensions {
        let parsed = dims
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| GradingDimension::parse(s).with_context(|| format!("Unknown dimension: {}", s)))
            .collect::<Result<Vec<_>>>()?;
        if !parsed.is_empty() {
            config.dimensions = parsed;
        }
    }

    config.validate().context("Invalid evaluation settings")?;
    Ok(config)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    tracing::info!("Political Even-handedness Evaluation");
    tracing::info!("====================================");
    tracing::info!("Dataset: {}", args.dataset.display());
    tracing::info!("Order: {:?}, threshold: {}", config.order, config.threshold.value());

    let dataset = Dataset::load_csv(&args.dataset)
        .with_context(|| format!("Failed to load dataset: {}", args.dataset.display()))?;
    let responses = ResponseSet::load_jsonl(&args.responses)
        .with_context(|| format!("Failed to load responses: {}", args.responses.display()))?;
    let grader = ReplayGrader::load_jsonl(&args.grades)
        .with_context(|| format!("Failed to load grades: {}", args.grades.display()))?;

    let output_dir = PathBuf::from(&config.output_dir);
    let pipeline = EvaluationPipeline::new(config, &dataset, grader);

    let pb = ProgressBar::new(pipeline.selected_pairs().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs ({eta})")?
            .progress_chars("#>-"),
    );
    let results = pipeline.run_with_progress(&responses, |_| pb.inc(1))?;
    pb.finish_and_clear();

    // Print summary to console
    println!("\n{}", "=".repeat(70));
    println!("EVALUATION SUMMARY");
    println!("{}", "=".repeat(70));
    println!(
        "\nDataset: {} ({} pairs, fingerprint {})",
        results.dataset_info.name,
        results.dataset_info.selected_pairs,
        &results.dataset_info.fingerprint[..12.min(results.dataset_info.fingerprint.len())]
    );
    println!("{:-<70}", "");
    println!("{:<24} {:>12} {:>10} {:>10} {:>10}", "Dimension", "Rate", "Stance A", "Stance B", "Failures");
    println!("{:-<70}", "");

    for report in &results.reports {
        match &report.overall {
            Some(rate) => println!(
                "{:<24} {:>11.2}% {:>10.4} {:>10.4} {:>10}",
                report.dimension.to_string(),
                rate.rate,
                rate.stance_balance.mean_a,
                rate.stance_balance.mean_b,
                report.failures
            ),
            None => println!(
                "{:<24} {:>12} {:>10} {:>10} {:>10}",
                report.dimension.to_string(),
                "-",
                "-",
                "-",
                report.failures
            ),
        }
    }
    println!("{:-<70}", "");

    // Save outputs
    std::fs::create_dir_all(&output_dir)?;

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");

    if matches!(args.format, OutputFormat::Json | OutputFormat::Both) {
        let json_path = output_dir.join(format!("eval_{}_{}.json", results.dataset_info.name, timestamp));
        save_results(&results, &json_path)?;
        println!("\nJSON results saved to: {}", json_path.display());
    }

    if matches!(args.format, OutputFormat::Markdown | OutputFormat::Both) {
        let report = generate_report(&results);
        let md_path = output_dir.join(format!("eval_{}_{}.md", results.dataset_info.name, timestamp));
        std::fs::write(&md_path, report)?;
        println!("Markdown report saved to: {}", md_path.display());
    }

    println!("\nEvaluation complete!");

    Ok(())
}
