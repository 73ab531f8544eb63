// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Grading prompt renderer
//!
//! Writes every grading prompt an evaluation would send, one JSON object per
//! line, so an external grading job can answer them. Its output is keyed by
//! `prompt_sha256`, the same key `eval-pipeline --grades` replays from.

use anyhow::{Context, Result};
use clap::Parser;
use evenhanded_eval::datasets::{Dataset, PairFilter, TemplateType};
use evenhanded_eval::grader::ReplayGrader;
use evenhanded_eval::pipeline::{EvaluationConfig, EvaluationPipeline};
use evenhanded_eval::prompts::{GradingPrompt, PromptTarget};
use evenhanded_eval::responses::ResponseSet;
use evenhanded_eval::rubric::GradingDimension;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "render-prompts")]
#[command(about = "Render grading prompts for an external grader")]
#[command(version)]
struct Args {
    /// Paired-prompt dataset (CSV); a synthetic dataset is used when omitted
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Model responses (JSON lines)
    #[arg(short, long)]
    responses: Option<PathBuf>,

    /// Evaluation config (TOML), for order policy, seed and dimensions
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only render this topic id
    #[arg(long)]
    topic: Option<String>,

    /// Only render this template type
    #[arg(long)]
    template: Option<String>,

    /// Number of topics for the synthetic dataset
    #[arg(short, long, default_value_t = 20)]
    num_topics: usize,

    /// Random seed for the synthetic dataset
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Output file (JSON lines); prompts are printed as text when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print dataset statistics and exit
    #[arg(long)]
    stats: bool,
}

#[derive(Serialize)]
struct PromptRecord<'a> {
    prompt_sha256: &'a str,
    dimension: GradingDimension,
    topic: &'a str,
    template: TemplateType,
    target: PromptTarget,
    text: &'a str,
}

impl<'a> From<&'a GradingPrompt> for PromptRecord<'a> {
    fn from(prompt: &'a GradingPrompt) -> Self {
        Self {
            prompt_sha256: &prompt.sha256,
            dimension: prompt.dimension,
            topic: &prompt.topic_id,
            template: prompt.template_type,
            target: prompt.target,
            text: &prompt.text,
        }
    }
}

fn print_stats(dataset: &Dataset) {
    let stats = dataset.stats();

    println!("\nDataset: {}", dataset.name());
    println!("  Prompt pairs: {} ({} prompts)", stats.pairs, stats.total_prompts);
    println!("  Topics: {}", stats.topics);
    println!("  Categories: {}", stats.categories);
    println!("  Partisan pairs: {}", stats.partisan_pairs);
    println!("  Fingerprint: {}", dataset.fingerprint());

    println!("\nBy category:");
    for (category, count) in &stats.by_category {
        println!("  {}: {} ({:.1}%)", category, count, *count as f64 / stats.pairs.max(1) as f64 * 100.0);
    }

    println!("\nBy template:");
    for (template, count) in &stats.by_template {
        println!("  {}: {}", template, count);
    }

    println!("\nBy stance group:");
    for (group, count) in &stats.by_group {
        println!("  {}: {}", group, count);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let dataset = match args.dataset {
        Some(ref path) => Dataset::load_csv(path)
            .with_context(|| format!("Failed to load dataset: {}", path.display()))?,
        None => {
            tracing::info!("Generating synthetic dataset ({} topics, seed={})", args.num_topics, args.seed);
            Dataset::synthetic(args.num_topics, args.seed)
        }
    };

    if args.stats {
        print_stats(&dataset);
        return Ok(());
    }

    let mut config = match args.config {
        Some(ref path) => EvaluationConfig::from_toml_file(path)?,
        None => EvaluationConfig::default(),
    };
    let template = args
        .template
        .as_deref()
        .map(|t| TemplateType::parse(t).with_context(|| format!("Unknown template type: {}", t)))
        .transpose()?;
    config.filter = PairFilter {
        topic: args.topic.clone().or(config.filter.topic),
        template: template.or(config.filter.template),
        ..config.filter
    };
    config.validate().context("Invalid evaluation settings")?;

    let responses = match args.responses {
        Some(ref path) => ResponseSet::load_jsonl(path)
            .with_context(|| format!("Failed to load responses: {}", path.display()))?,
        None => ResponseSet::new(),
    };

    let pipeline = EvaluationPipeline::new(config, &dataset, ReplayGrader::new("render"));
    let (prompts, failures) = pipeline.prompts(&responses);

    for failure in &failures {
        tracing::warn!(
            "No {} prompt for '{}' ({}): {}",
            failure.dimension,
            failure.topic_id,
            failure.template_type,
            failure.message
        );
    }

    match args.output {
        Some(ref path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::new(
                File::create(path).with_context(|| format!("Failed to create output: {}", path.display()))?,
            );
            for prompt in &prompts {
                serde_json::to_writer(&mut writer, &PromptRecord::from(prompt))?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
            println!(
                "Wrote {} prompts to {} ({} pairs skipped)",
                prompts.len(),
                path.display(),
                failures.len()
            );
        }
        None => {
            for prompt in &prompts {
                println!("\n{}", "=".repeat(70));
                println!(
                    "{} | {} | {} | {:?}",
                    prompt.dimension, prompt.topic_id, prompt.template_type, prompt.target
                );
                println!("sha256: {}", prompt.sha256);
                println!("{}", "-".repeat(70));
                println!("{}", prompt.text);
            }
        }
    }

    Ok(())
}
