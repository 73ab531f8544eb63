// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Political even-handedness evaluation core
//!
//! This crate provides:
//! - Paired-prompt dataset loading and validation
//! - Grading prompt construction (even-handedness, refusal, opposing perspectives)
//! - Interpretation of grader probability distributions
//! - Binarization and corpus-level bias metrics
//! - Reproducible evaluation pipeline over a pluggable grader

pub mod datasets;
pub mod error;
pub mod grader;
pub mod interpret;
pub mod metrics;
pub mod pipeline;
pub mod prompts;
pub mod responses;
pub mod rubric;

pub use datasets::{Dataset, PairFilter, PromptPair, Side, Stance, TemplateType, Topic};
pub use error::{EvalError, EvalResult};
pub use grader::{FnGrader, Grader, ReplayGrader};
pub use interpret::{GradedResponse, Interpreter};
pub use metrics::{BinarizationThreshold, CorpusRate, MetricResult, RateAccumulator};
pub use pipeline::{EvaluationConfig, EvaluationPipeline, EvaluationResults, OrderPolicy};
pub use prompts::{GradingPrompt, Presentation};
pub use responses::{PairResponses, ResponseSet};
pub use rubric::GradingDimension;
