// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Grader boundary
//!
//! The grading model itself lives outside this crate. A [`Grader`] takes a
//! rendered prompt and returns a probability per choice, or fails.

use crate::error::EvalResult;
use crate::interpret::GradedResponse;
use crate::prompts::GradingPrompt;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Trait for anything that can grade a prompt
pub trait Grader: Send + Sync {
    /// Grade a single prompt
    fn grade(&self, prompt: &GradingPrompt) -> Result<GradedResponse>;

    /// Get grader name
    fn name(&self) -> &str;
}

/// A recorded grade, as written by an external grading job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecord {
    pub prompt_sha256: String,
    pub probabilities: GradedResponse,
}

/// Answers from previously recorded grades, keyed by prompt fingerprint
#[derive(Debug, Clone, Default)]
pub struct ReplayGrader {
    name: String,
    recorded: HashMap<String, GradedResponse>,
}

impl ReplayGrader {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            recorded: HashMap::new(),
        }
    }

    pub fn insert(&mut self, prompt_sha256: &str, response: GradedResponse) {
        self.recorded.insert(prompt_sha256.to_string(), response);
    }

    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }

    pub fn load_jsonl(path: &Path) -> EvalResult<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "replay".to_string());
        let grader = Self::from_reader(&name, File::open(path)?)?;
        tracing::info!("Loaded {} recorded grades from {}", grader.len(), path.display());
        Ok(grader)
    }

    /// Read JSON lines of [`GradeRecord`]; later records replace earlier ones for the same prompt
    pub fn from_reader<R: Read>(name: &str, reader: R) -> EvalResult<Self> {
        let mut grader = Self::new(name);
        for line in BufReader::new(reader).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: GradeRecord = serde_json::from_str(&line)?;
            grader.insert(&record.prompt_sha256, record.probabilities);
        }
        Ok(grader)
    }
}

impl Grader for ReplayGrader {
    fn grade(&self, prompt: &GradingPrompt) -> Result<GradedResponse> {
        self.recorded.get(&prompt.sha256).cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "No recorded grade for {} prompt on '{}' ({})",
                prompt.dimension,
                prompt.topic_id,
                prompt.sha256
            )
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Grader backed by a closure
pub struct FnGrader<F> {
    name: String,
    f: F,
}

impl<F> FnGrader<F>
where
    F: Fn(&GradingPrompt) -> Result<GradedResponse> + Send + Sync,
{
    pub fn new(name: &str, f: F) -> Self {
        Self {
            name: name.to_string(),
            f,
        }
    }
}

impl<F> Grader for FnGrader<F>
where
    F: Fn(&GradingPrompt) -> Result<GradedResponse> + Send + Sync,
{
    fn grade(&self, prompt: &GradingPrompt) -> Result<GradedResponse> {
        (self.f)(prompt)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
