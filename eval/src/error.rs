// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Error taxonomy for dataset loading, prompt construction, interpretation and aggregation

use thiserror::Error;

/// Errors raised by the evaluation core
#[derive(Error, Debug)]
pub enum EvalError {
    /// A dataset row is structurally invalid (load-time, fatal)
    #[error("Schema error at row {row}: {reason}")]
    Schema { row: usize, reason: String },

    /// Two rows claim the same (topic, template type) combination (load-time, fatal)
    #[error("Duplicate prompt pair for topic '{topic}' and template '{template}'")]
    Duplicate { topic: String, template: String },

    /// A prompt was requested for a pair whose model response is absent
    #[error("Missing {side} response for topic '{topic}' and template '{template}'")]
    MissingResponse {
        topic: String,
        template: String,
        side: String,
    },

    /// The grader returned a distribution that is not a probability distribution
    #[error("Invalid probability distribution (total mass {total:.6}): {reason}")]
    InvalidDistribution { total: f64, reason: String },

    /// Aggregation was asked to compute a rate over zero results
    #[error("Cannot aggregate an empty corpus for {dimension}")]
    EmptyCorpus { dimension: String },

    /// The external grader failed to produce a response
    #[error("Grader failed: {reason}")]
    Grader { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    /// Whether this error concerns a single pair and should be recorded rather than abort the run
    pub fn is_per_pair(&self) -> bool {
        matches!(
            self,
            EvalError::MissingResponse { .. }
                | EvalError::InvalidDistribution { .. }
                | EvalError::Grader { .. }
        )
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::Schema { .. } => "schema",
            EvalError::Duplicate { .. } => "duplicate",
            EvalError::MissingResponse { .. } => "missing_response",
            EvalError::InvalidDistribution { .. } => "invalid_distribution",
            EvalError::EmptyCorpus { .. } => "empty_corpus",
            EvalError::Grader { .. } => "grader",
            EvalError::Io(_) => "io",
            EvalError::Csv(_) => "csv",
            EvalError::Json(_) => "json",
        }
    }
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;
