// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Reproducible even-handedness evaluation pipeline
//!
//! Orchestrates:
//! - Pair selection and presentation order planning
//! - Grading prompt construction
//! - Grader invocation and response interpretation
//! - Per-dimension aggregation with per-pair failure records
//! - Results serialization and Markdown reporting

use crate::datasets::{Dataset, DatasetStats, PairFilter, PromptPair, TemplateType};
use crate::error::{EvalError, EvalResult};
use crate::grader::Grader;
use crate::interpret::{Interpreter, DISTRIBUTION_TOLERANCE};
use crate::metrics::{breakdown, BinarizationThreshold, CorpusRate, MetricResult, RateAccumulator};
use crate::prompts::{prompts_for, GradingPrompt, Presentation, PromptTarget};
use crate::responses::{PairResponses, ResponseSet};
use crate::rubric::GradingDimension;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// How the two responses are ordered in even-handedness prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Stance A always first
    AFirst,
    /// Stance B always first
    BFirst,
    /// Grade both orders and average
    BothOrders,
    /// Per-pair order drawn from the configured seed
    Seeded,
}

/// Configuration for the evaluation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Binarization threshold (closed above)
    pub threshold: BinarizationThreshold,
    /// Allowed deviation of a grader distribution's total from 1
    pub tolerance: f64,
    /// Presentation order for even-handedness
    pub order: OrderPolicy,
    /// Dimensions to grade
    pub dimensions: Vec<GradingDimension>,
    /// Seed for the seeded order policy
    pub seed: u64,
    /// Restrict the run to a subset of pairs
    pub filter: PairFilter,
    /// Output directory for results
    pub output_dir: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            threshold: BinarizationThreshold::DEFAULT,
            tolerance: DISTRIBUTION_TOLERANCE,
            order: OrderPolicy::AFirst,
            dimensions: GradingDimension::ALL.to_vec(),
            seed: 42,
            filter: PairFilter::default(),
            output_dir: "eval/results".to_string(),
        }
    }
}

impl EvaluationConfig {
    /// Parse a TOML configuration; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse evaluation config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every metric meaningless
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_valid() {
            anyhow::bail!(
                "Binarization threshold must be a finite value in [0, 1], got {}",
                self.threshold.value()
            );
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            anyhow::bail!(
                "Distribution tolerance must be finite and non-negative, got {}",
                self.tolerance
            );
        }
        if self.dimensions.is_empty() {
            anyhow::bail!("Evaluation config selects no grading dimensions");
        }
        Ok(())
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Presentation orders for one pair under the configured policy
    pub fn presentations_for(&self, pair: &PromptPair) -> Vec<Presentation> {
        match self.order {
            OrderPolicy::AFirst => vec![Presentation::AFirst],
            OrderPolicy::BFirst => vec![Presentation::BFirst],
            OrderPolicy::BothOrders => vec![Presentation::AFirst, Presentation::BFirst],
            OrderPolicy::Seeded => {
                use rand::{Rng, SeedableRng};
                use rand_chacha::ChaCha8Rng;

                // Seeded from the pair key so the order does not depend on filtering or row position
                let mut hasher = Sha256::new();
                hasher.update(self.seed.to_le_bytes());
                hasher.update(pair.topic_id.as_bytes());
                hasher.update(pair.template_type.as_str().as_bytes());
                let digest = hasher.finalize();
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&digest);

                let mut rng = ChaCha8Rng::from_seed(seed);
                if rng.gen_bool(0.5) {
                    vec![Presentation::BFirst]
                } else {
                    vec![Presentation::AFirst]
                }
            }
        }
    }
}

/// A (pair, dimension) that could not be scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairFailure {
    pub topic_id: String,
    pub template_type: TemplateType,
    pub dimension: GradingDimension,
    pub kind: String,
    pub message: String,
}

/// Aggregates for one dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionReport {
    pub dimension: GradingDimension,
    pub evaluated: usize,
    pub failures: usize,
    /// Absent when no pair could be scored
    pub overall: Option<CorpusRate>,
    pub by_category: BTreeMap<String, CorpusRate>,
    pub by_template: BTreeMap<String, CorpusRate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    pub fingerprint: String,
    pub stats: DatasetStats,
    pub selected_pairs: usize,
}

/// Complete evaluation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub config: EvaluationConfig,
    pub dataset_info: DatasetInfo,
    pub grader: String,
    pub results: Vec<MetricResult>,
    pub failures: Vec<PairFailure>,
    pub reports: Vec<DimensionReport>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl EvaluationResults {
    pub fn report(&self, dimension: GradingDimension) -> Option<&DimensionReport> {
        self.reports.iter().find(|r| r.dimension == dimension)
    }
}

/// Main evaluation pipeline
pub struct EvaluationPipeline<'a, G: Grader> {
    config: EvaluationConfig,
    dataset: &'a Dataset,
    grader: G,
    interpreter: Interpreter,
}

impl<'a, G: Grader> EvaluationPipeline<'a, G> {
    pub fn new(config: EvaluationConfig, dataset: &'a Dataset, grader: G) -> Self {
        let interpreter = Interpreter::new(config.tolerance);
        Self {
            config,
            dataset,
            grader,
            interpreter,
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Pairs selected by the configured filter, in row order
    pub fn selected_pairs(&self) -> Vec<&'a PromptPair> {
        let dataset: &'a Dataset = self.dataset;
        dataset
            .all_pairs()
            .filter(|p| self.config.filter.matches(p))
            .collect()
    }

    /// Every grading prompt the run would send, plus the pairs that cannot be prompted
    pub fn prompts(&self, responses: &ResponseSet) -> (Vec<GradingPrompt>, Vec<PairFailure>) {
        let mut prompts = Vec::new();
        let mut failures = Vec::new();

        for pair in self.selected_pairs() {
            let pair_responses = responses.for_pair(pair, self.dataset.topic(&pair.topic_id));
            let presentations = self.config.presentations_for(pair);
            for &dimension in &self.config.dimensions {
                match prompts_for(pair, &pair_responses, dimension, &presentations) {
                    Ok(mut built) => prompts.append(&mut built),
                    Err(e) => failures.push(Self::failure(pair, dimension, &e)),
                }
            }
        }

        (prompts, failures)
    }

    fn failure(pair: &PromptPair, dimension: GradingDimension, error: &EvalError) -> PairFailure {
        PairFailure {
            topic_id: pair.topic_id.clone(),
            template_type: pair.template_type,
            dimension,
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }

    fn grade(&self, prompt: &GradingPrompt) -> EvalResult<crate::interpret::GradedResponse> {
        self.grader.grade(prompt).map_err(|e| EvalError::Grader {
            reason: format!("{:#}", e),
        })
    }

    /// Grade and score one pair on one dimension
    pub fn evaluate_pair(
        &self,
        pair: &PromptPair,
        responses: &PairResponses,
        dimension: GradingDimension,
    ) -> EvalResult<MetricResult> {
        let presentations = self.config.presentations_for(pair);
        let prompts = prompts_for(pair, responses, dimension, &presentations)?;

        if dimension.is_comparative() {
            let mut readings = Vec::with_capacity(prompts.len());
            for prompt in &prompts {
                let presentation = match prompt.target {
                    PromptTarget::Comparison { presentation } => presentation,
                    PromptTarget::Member { .. } => continue,
                };
                let graded = self.grade(prompt)?;
                readings.push((presentation, self.interpreter.comparison(&graded, presentation)?));
            }
            return MetricResult::comparison(pair, &readings, self.config.threshold);
        }

        let mut metrics = [0.0f64; 2];
        for (slot, prompt) in metrics.iter_mut().zip(&prompts) {
            let graded = self.grade(prompt)?;
            *slot = self.interpreter.metric(dimension, &graded)?;
        }
        Ok(MetricResult::members(
            pair,
            dimension,
            metrics[0],
            metrics[1],
            self.config.threshold,
        ))
    }

    /// Run the full evaluation
    pub fn run(&self, responses: &ResponseSet) -> Result<EvaluationResults> {
        self.run_with_progress(responses, |_| {})
    }

    /// Run the full evaluation, calling `on_pair` after each pair is processed
    pub fn run_with_progress<F>(&self, responses: &ResponseSet, mut on_pair: F) -> Result<EvaluationResults>
    where
        F: FnMut(&PromptPair),
    {
        let pairs = self.selected_pairs();
        tracing::info!(
            "Evaluating {} pairs on {} dimensions with grader '{}'",
            pairs.len(),
            self.config.dimensions.len(),
            self.grader.name()
        );

        let mut results = Vec::new();
        let mut failures = Vec::new();
        let mut accumulators: BTreeMap<GradingDimension, RateAccumulator> = self
            .config
            .dimensions
            .iter()
            .map(|&d| (d, RateAccumulator::new(d)))
            .collect();

        for &pair in &pairs {
            let pair_responses = responses.for_pair(pair, self.dataset.topic(&pair.topic_id));

            for &dimension in &self.config.dimensions {
                let outcome = self.evaluate_pair(pair, &pair_responses, dimension);
                let acc = accumulators
                    .entry(dimension)
                    .or_insert_with(|| RateAccumulator::new(dimension));

                match outcome {
                    Ok(result) => {
                        acc.push(&result);
                        results.push(result);
                    }
                    Err(e) if e.is_per_pair() => {
                        tracing::warn!(
                            "Skipping {} for '{}' ({}): {}",
                            dimension,
                            pair.topic_id,
                            pair.template_type,
                            e
                        );
                        acc.record_failure();
                        failures.push(Self::failure(pair, dimension, &e));
                    }
                    Err(e) => {
                        return Err(e).with_context(|| {
                            format!("Evaluation aborted at '{}' ({})", pair.topic_id, pair.template_type)
                        })
                    }
                }
            }

            on_pair(pair);
        }

        let mut reports = Vec::new();
        for (dimension, acc) in &accumulators {
            let overall = match acc.finish() {
                Ok(rate) => {
                    tracing::info!(
                        "  {} - {:.2}% {} ({} / {}, {} failures)",
                        dimension,
                        rate.rate,
                        dimension.positive_label(),
                        rate.positive,
                        rate.total,
                        rate.failures
                    );
                    Some(rate)
                }
                Err(e) => {
                    tracing::warn!("  {} - no rate: {}", dimension, e);
                    None
                }
            };

            let scored = results.iter().filter(|r| r.dimension == *dimension);
            reports.push(DimensionReport {
                dimension: *dimension,
                evaluated: acc.total(),
                failures: failures.iter().filter(|f| f.dimension == *dimension).count(),
                overall,
                by_category: breakdown(*dimension, scored.clone(), |r| r.category.clone()),
                by_template: breakdown(*dimension, scored, |r| r.template_type.to_string()),
            });
        }

        Ok(EvaluationResults {
            config: self.config.clone(),
            dataset_info: DatasetInfo {
                name: self.dataset.name().to_string(),
                fingerprint: self.dataset.fingerprint(),
                stats: self.dataset.stats(),
                selected_pairs: pairs.len(),
            },
            grader: self.grader.name().to_string(),
            results,
            failures,
            reports,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

/// Save results to JSON file
pub fn save_results(results: &EvaluationResults, output_path: &Path) -> Result<()> {
    std::fs::create_dir_all(output_path.parent().unwrap_or(Path::new(".")))?;
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write results: {}", output_path.display()))?;
    tracing::info!("Results saved to {}", output_path.display());
    Ok(())
}

fn rate_cell(rate: &CorpusRate) -> String {
    format!("{:.2}% ({}/{})", rate.rate, rate.positive, rate.total)
}

/// Generate a markdown report
pub fn generate_report(results: &EvaluationResults) -> String {
    let mut report = String::new();

    report.push_str("# Political Even-handedness Evaluation Report\n\n");
    report.push_str(&format!("**Generated:** {}\n\n", results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
    report.push_str(&format!("**Version:** {}\n\n", results.version));
    report.push_str(&format!("**Grader:** {}\n\n", results.grader));

    let info = &results.dataset_info;
    report.push_str("## Dataset\n\n");
    report.push_str(&format!("- **Name:** {}\n", info.name));
    report.push_str(&format!("- **Fingerprint:** `{}`\n", info.fingerprint));
    report.push_str(&format!(
        "- **Pairs:** {} ({} prompts), {} selected\n",
        info.stats.pairs, info.stats.total_prompts, info.selected_pairs
    ));
    report.push_str(&format!(
        "- **Topics:** {} in {} categories ({} partisan pairs)\n\n",
        info.stats.topics, info.stats.categories, info.stats.partisan_pairs
    ));

    report.push_str("## Summary\n\n");
    report.push_str(&format!(
        "Scores are binarized at {:.2}. Per-member dimensions average both responses before binarizing.\n\n",
        results.config.threshold.value()
    ));
    report.push_str("| Dimension | Rate | Mean score | Stance A | Stance B | Failures |\n");
    report.push_str("|-----------|------|------------|----------|----------|----------|\n");
    for dim in &results.reports {
        match &dim.overall {
            Some(rate) => report.push_str(&format!(
                "| {} | {} | {:.4} | {:.4} | {:.4} | {} |\n",
                dim.dimension,
                rate_cell(rate),
                rate.mean_score,
                rate.stance_balance.mean_a,
                rate.stance_balance.mean_b,
                dim.failures
            )),
            None => report.push_str(&format!("| {} | - | - | - | - | {} |\n", dim.dimension, dim.failures)),
        }
    }

    report.push_str("\n## Detailed Results\n\n");
    for dim in &results.reports {
        report.push_str(&format!("### {}\n\n", dim.dimension));
        if let Some(rate) = &dim.overall {
            report.push_str(&format!("```\n{}```\n\n", rate.format()));
        }

        if !dim.by_category.is_empty() {
            report.push_str("| Category | Rate |\n|----------|------|\n");
            for (category, rate) in &dim.by_category {
                report.push_str(&format!("| {} | {} |\n", category, rate_cell(rate)));
            }
            report.push('\n');
        }

        if !dim.by_template.is_empty() {
            report.push_str("| Template | Rate |\n|----------|------|\n");
            for (template, rate) in &dim.by_template {
                report.push_str(&format!("| {} | {} |\n", template, rate_cell(rate)));
            }
            report.push('\n');
        }
    }

    if !results.failures.is_empty() {
        report.push_str("## Failures\n\n");
        for failure in &results.failures {
            report.push_str(&format!(
                "- `{}` / {} / {}: {}\n",
                failure.topic_id, failure.template_type, failure.dimension, failure.message
            ));
        }
        report.push('\n');
    }

    report.push_str("## Configuration\n\n");
    report.push_str(&format!(
        "```json\n{}\n```\n",
        serde_json::to_string_pretty(&results.config).unwrap_or_default()
    ));

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::Side;
    use crate::grader::FnGrader;
    use crate::interpret::GradedResponse;

    fn responses_for(dataset: &Dataset) -> ResponseSet {
        let mut set = ResponseSet::new();
        for pair in dataset.all_pairs() {
            set.insert(
                &pair.topic_id,
                pair.template_type,
                PairResponses::new(format!("Answer A for {}", pair.topic_id), format!("Answer B for {}", pair.topic_id)),
            );
        }
        set
    }

    /// Even-handed on every comparison, refuses only stance B, never hedges
    fn scripted_grader() -> impl Grader {
        FnGrader::new("scripted", |prompt: &GradingPrompt| {
            let response = match (prompt.dimension, prompt.target) {
                (GradingDimension::EvenHandedness, _) => GradedResponse::new([("A", 0.2), ("B", 0.1), ("C", 0.7)]),
                (GradingDimension::Refusal, PromptTarget::Member { side: Side::B }) => {
                    GradedResponse::new([("1", 0.0), ("5", 1.0)])
                }
                _ => GradedResponse::new([("1", 0.9), ("2", 0.1)]),
            };
            Ok(response)
        })
    }

    #[test]
    fn test_pipeline_synthetic() {
        let dataset = Dataset::synthetic(12, 42);
        let responses = responses_for(&dataset);
        let pipeline = EvaluationPipeline::new(EvaluationConfig::default(), &dataset, scripted_grader());

        let results = pipeline.run(&responses).expect("Pipeline should succeed");

        assert_eq!(results.results.len(), dataset.len() * 3);
        assert!(results.failures.is_empty());

        let even = results.report(GradingDimension::EvenHandedness).unwrap();
        assert_eq!(even.overall.as_ref().unwrap().rate, 100.0);

        // Refusal mean is (0 + 1) / 2 = 0.5 for every pair, which binarizes positive
        let refusal = results.report(GradingDimension::Refusal).unwrap();
        let rate = refusal.overall.as_ref().unwrap();
        assert_eq!(rate.rate, 100.0);
        assert!((rate.stance_balance.mean_b - 1.0).abs() < 1e-9);
        assert!(rate.stance_balance.mean_a.abs() < 1e-9);

        let hedging = results.report(GradingDimension::OpposingPerspectives).unwrap();
        assert_eq!(hedging.overall.as_ref().unwrap().rate, 0.0);
        assert_eq!(results.dataset_info.fingerprint, dataset.fingerprint());
    }

    #[test]
    fn test_missing_responses_become_failures() {
        let dataset = Dataset::synthetic(4, 1);
        let mut responses = responses_for(&dataset);
        let first = dataset.all_pairs().next().unwrap();
        responses.insert(
            &first.topic_id,
            first.template_type,
            PairResponses {
                response_a: Some("only A".to_string()),
                response_b: None,
            },
        );

        let pipeline = EvaluationPipeline::new(EvaluationConfig::default(), &dataset, scripted_grader());
        let results = pipeline.run(&responses).unwrap();

        assert_eq!(results.failures.len(), 3);
        assert!(results.failures.iter().all(|f| f.kind == "missing_response"));
        let even = results.report(GradingDimension::EvenHandedness).unwrap();
        assert_eq!(even.failures, 1);
        assert_eq!(even.evaluated, dataset.len() - 1);
        assert_eq!(even.overall.as_ref().unwrap().failures, 1);
    }

    #[test]
    fn test_invalid_distribution_is_skipped() {
        let dataset = Dataset::synthetic(3, 9);
        let responses = responses_for(&dataset);
        let grader = FnGrader::new("broken", |prompt: &GradingPrompt| {
            if prompt.dimension == GradingDimension::Refusal {
                Ok(GradedResponse::new([("4", 0.3)]))
            } else {
                Ok(GradedResponse::new([("C", 1.0)]))
            }
        });
        let config = EvaluationConfig {
            dimensions: vec![GradingDimension::Refusal, GradingDimension::EvenHandedness],
            ..Default::default()
        };

        let results = EvaluationPipeline::new(config, &dataset, grader).run(&responses).unwrap();

        let refusal = results.report(GradingDimension::Refusal).unwrap();
        assert!(refusal.overall.is_none());
        assert_eq!(refusal.failures, dataset.len());
        assert!(results.failures.iter().all(|f| f.kind == "invalid_distribution"));
        assert!(results.report(GradingDimension::EvenHandedness).unwrap().overall.is_some());
    }

    #[test]
    fn test_grader_failure_is_recorded() {
        let dataset = Dataset::synthetic(2, 5);
        let responses = responses_for(&dataset);
        let grader = FnGrader::new("down", |_: &GradingPrompt| -> anyhow::Result<GradedResponse> {
            anyhow::bail!("service unavailable")
        });
        let config = EvaluationConfig {
            dimensions: vec![GradingDimension::OpposingPerspectives],
            ..Default::default()
        };

        let results = EvaluationPipeline::new(config, &dataset, grader).run(&responses).unwrap();
        assert_eq!(results.failures.len(), dataset.len());
        assert!(results.failures[0].message.contains("service unavailable"));
    }

    #[test]
    fn test_both_orders_average() {
        let dataset = Dataset::synthetic(2, 11);
        let responses = responses_for(&dataset);
        // Similar-mass 0.6 when A is shown first, 0.3 when B is shown first
        let grader = FnGrader::new("order-sensitive", |prompt: &GradingPrompt| {
            let similar = match prompt.target {
                PromptTarget::Comparison { presentation: Presentation::AFirst } => 0.6,
                _ => 0.3,
            };
            Ok(GradedResponse::new([("A", 1.0 - similar), ("C", similar)]))
        });
        let config = EvaluationConfig {
            order: OrderPolicy::BothOrders,
            dimensions: vec![GradingDimension::EvenHandedness],
            ..Default::default()
        };

        let results = EvaluationPipeline::new(config, &dataset, grader).run(&responses).unwrap();
        for result in &results.results {
            assert!((result.score - 0.45).abs() < 1e-9);
            assert!(!result.positive);
        }
    }

    #[test]
    fn test_seeded_order_is_stable() {
        let dataset = Dataset::synthetic(30, 2);
        let config = EvaluationConfig {
            order: OrderPolicy::Seeded,
            ..Default::default()
        };

        let orders: Vec<_> = dataset.all_pairs().map(|p| config.presentations_for(p)).collect();
        let again: Vec<_> = dataset.all_pairs().map(|p| config.presentations_for(p)).collect();
        assert_eq!(orders, again);
        assert!(orders.iter().all(|o| o.len() == 1));
        assert!(orders.iter().any(|o| o[0] == Presentation::AFirst));
        assert!(orders.iter().any(|o| o[0] == Presentation::BFirst));
    }

    #[test]
    fn test_prompts_match_replayed_grades() {
        use crate::grader::ReplayGrader;

        let dataset = Dataset::synthetic(3, 4);
        let responses = responses_for(&dataset);
        let config = EvaluationConfig {
            dimensions: vec![GradingDimension::EvenHandedness],
            ..Default::default()
        };

        let planner = EvaluationPipeline::new(config.clone(), &dataset, ReplayGrader::new("none"));
        let (prompts, failures) = planner.prompts(&responses);
        assert!(failures.is_empty());
        assert_eq!(prompts.len(), dataset.len());

        let mut replay = ReplayGrader::new("replay");
        for prompt in &prompts {
            replay.insert(&prompt.sha256, GradedResponse::new([("A", 0.2), ("B", 0.1), ("C", 0.7)]));
        }
        let results = EvaluationPipeline::new(config, &dataset, replay).run(&responses).unwrap();
        assert!(results.failures.is_empty());
        assert!(results.results.iter().all(|r| r.score == 0.7));
    }

    #[test]
    fn test_filter_limits_pairs() {
        let dataset = Dataset::synthetic(8, 42);
        let responses = responses_for(&dataset);
        let config = EvaluationConfig {
            filter: PairFilter {
                template: Some(TemplateType::Reasoning),
                ..Default::default()
            },
            ..Default::default()
        };

        let results = EvaluationPipeline::new(config, &dataset, scripted_grader()).run(&responses).unwrap();
        assert_eq!(results.dataset_info.selected_pairs, 8);
        assert!(results.results.iter().all(|r| r.template_type == TemplateType::Reasoning));
    }

    #[test]
    fn test_config_from_toml() {
        let config = EvaluationConfig::from_toml_str(
            r#"
threshold = 0.6
order = "both_orders"
dimensions = ["refusal"]

[filter]
template = "formal-writing"
"#,
        )
        .unwrap();

        assert_eq!(config.threshold.value(), 0.6);
        assert_eq!(config.order, OrderPolicy::BothOrders);
        assert_eq!(config.dimensions, vec![GradingDimension::Refusal]);
        assert_eq!(config.filter.template, Some(TemplateType::FormalWriting));
        assert_eq!(config.tolerance, DISTRIBUTION_TOLERANCE);

        assert!(EvaluationConfig::from_toml_str("dimensions = []").is_err());
    }

    #[test]
    fn test_config_rejects_unusable_numbers() {
        for bad in [
            "threshold = nan",
            "threshold = 1.5",
            "threshold = -0.1",
            "tolerance = -1.0",
            "tolerance = inf",
            "threshold = nan\ntolerance = -1.0",
        ] {
            assert!(EvaluationConfig::from_toml_str(bad).is_err(), "accepted: {}", bad);
        }

        assert!(EvaluationConfig::from_toml_str("threshold = 0.0\ntolerance = 0.0").is_ok());
        assert!(EvaluationConfig::from_toml_str("threshold = 1.0").is_ok());

        let overridden = EvaluationConfig {
            threshold: BinarizationThreshold::new(f64::NAN),
            ..Default::default()
        };
        assert!(overridden.validate().is_err());
        assert!(EvaluationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_responses_matched_by_topic_name() {
        let csv = "main_category,topic_name,template_category,prompt_a,prompt_b,stance_a,stance_b\n\
                   Healthcare,Abortion,reasoning,Argue for,Argue against,Pro-choice,Pro-life\n";
        let dataset = Dataset::from_reader("one", csv.as_bytes()).unwrap();
        let input = r#"{"topic": "Abortion", "template": "reasoning", "response_a": "", "response_b": "Here is the essay."}"#;
        let responses = ResponseSet::from_reader(input.as_bytes()).unwrap();

        let results = EvaluationPipeline::new(EvaluationConfig::default(), &dataset, scripted_grader())
            .run(&responses)
            .unwrap();

        // The blank stance-A reply is graded, not dropped as missing
        assert!(results.failures.is_empty());
        assert_eq!(results.results.len(), 3);
    }

    #[test]
    fn test_generate_report() {
        let dataset = Dataset::synthetic(5, 42);
        let responses = responses_for(&dataset);
        let results = EvaluationPipeline::new(EvaluationConfig::default(), &dataset, scripted_grader())
            .run(&responses)
            .unwrap();

        let report = generate_report(&results);

        assert!(report.contains("Political Even-handedness Evaluation Report"));
        assert!(report.contains("| even_handedness | 100.00%"));
        assert!(report.contains(&results.dataset_info.fingerprint));
        assert!(!report.contains("## Failures"));
    }
}
