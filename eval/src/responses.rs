// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Responses of the model under evaluation
//!
//! Loaded from JSON lines, one object per prompt pair:
//! `{"topic": "...", "template": "narrative", "response_a": "...", "response_b": "..."}`
//!
//! `topic` may be a topic id or a topic name; both are keyed by their slug, the
//! same rule the dataset uses to derive ids from names.

use crate::datasets::{slugify, PromptPair, Side, TemplateType, Topic};
use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// The model's two responses to a prompt pair; either may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairResponses {
    pub response_a: Option<String>,
    pub response_b: Option<String>,
}

impl PairResponses {
    pub fn new(response_a: impl Into<String>, response_b: impl Into<String>) -> Self {
        Self {
            response_a: Some(response_a.into()),
            response_b: Some(response_b.into()),
        }
    }

    /// Response for a side. Empty text is a response (and is graded); only a
    /// response that was never collected is absent.
    pub fn get(&self, side: Side) -> Option<&str> {
        match side {
            Side::A => self.response_a.as_deref(),
            Side::B => self.response_b.as_deref(),
        }
    }

    /// Sides whose response is present but blank
    pub fn blank_sides(&self) -> Vec<Side> {
        [Side::A, Side::B]
            .into_iter()
            .filter(|&side| self.get(side).is_some_and(|r| r.trim().is_empty()))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ResponseRecord {
    topic: String,
    template: String,
    #[serde(default)]
    response_a: Option<String>,
    #[serde(default)]
    response_b: Option<String>,
}

/// Responses keyed by (topic id, template type)
#[derive(Debug, Clone, Default)]
pub struct ResponseSet {
    entries: HashMap<(String, TemplateType), PairResponses>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert responses for a topic id or name
    pub fn insert(&mut self, topic: &str, template: TemplateType, responses: PairResponses) {
        self.entries.insert((slugify(topic), template), responses);
    }

    /// Responses for a topic id or name, or an empty record when none were collected
    pub fn get(&self, topic: &str, template: TemplateType) -> PairResponses {
        self.entries
            .get(&(slugify(topic), template))
            .cloned()
            .unwrap_or_default()
    }

    /// Responses for a pair, matched on its topic id first and then on the topic name
    pub fn for_pair(&self, pair: &PromptPair, topic: Option<&Topic>) -> PairResponses {
        let by_id = self.entries.get(&(slugify(&pair.topic_id), pair.template_type));
        by_id
            .or_else(|| topic.and_then(|t| self.entries.get(&(slugify(&t.label), pair.template_type))))
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load_jsonl(path: &Path) -> EvalResult<Self> {
        let file = File::open(path)?;
        let set = Self::from_reader(file)?;
        tracing::info!("Loaded responses for {} pairs from {}", set.len(), path.display());
        Ok(set)
    }

    /// Read JSON lines; blank lines are skipped. Topics are matched by id or by name slug.
    pub fn from_reader<R: Read>(reader: R) -> EvalResult<Self> {
        let mut set = Self::new();

        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ResponseRecord = serde_json::from_str(&line)?;
            let template = TemplateType::parse(&record.template).ok_or_else(|| EvalError::Schema {
                row: idx + 1,
                reason: format!("unrecognized template '{}'", record.template),
            })?;

            let responses = PairResponses {
                response_a: record.response_a,
                response_b: record.response_b,
            };
            for side in responses.blank_sides() {
                tracing::debug!(
                    "Blank {} response for '{}' ({}) on line {}",
                    side,
                    record.topic,
                    template,
                    idx + 1
                );
            }

            set.insert(&record.topic, template, responses);
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_is_not_missing() {
        let r = PairResponses {
            response_a: Some("   ".to_string()),
            response_b: None,
        };
        assert_eq!(r.get(Side::A), Some("   "));
        assert_eq!(r.get(Side::B), None);
        assert_eq!(r.blank_sides(), vec![Side::A]);
    }

    #[test]
    fn test_single_word_topic_name_matches_dataset_id() {
        let csv = "main_category,topic_name,template_category,prompt_a,prompt_b,stance_a,stance_b\n\
                   Healthcare,Abortion,reasoning,Argue for,Argue against,Pro-choice,Pro-life\n";
        let dataset = crate::datasets::Dataset::from_reader("one", csv.as_bytes()).unwrap();
        let pair = dataset.all_pairs().next().unwrap();
        assert_eq!(pair.topic_id, "abortion");

        let input = r#"{"topic": "Abortion", "template": "reasoning", "response_a": "x", "response_b": "y"}"#;
        let set = ResponseSet::from_reader(input.as_bytes()).unwrap();

        assert_eq!(set.get(&pair.topic_id, pair.template_type).get(Side::A), Some("x"));
        let matched = set.for_pair(pair, dataset.topic(&pair.topic_id));
        assert_eq!(matched.get(Side::B), Some("y"));
    }

    #[test]
    fn test_explicit_id_matched_by_topic_name() {
        let csv = "topic_id,topic_name,main_category,template_category,prompt_a,prompt_b,stance_a,stance_b\n\
                   T_001,Minimum Wage,Economy,analysis,a,b,Raise it,Keep it\n";
        let dataset = crate::datasets::Dataset::from_reader("ids", csv.as_bytes()).unwrap();
        let pair = dataset.all_pairs().next().unwrap();

        let input = r#"{"topic": "Minimum Wage", "template": "analysis", "response_a": "x", "response_b": "y"}"#;
        let set = ResponseSet::from_reader(input.as_bytes()).unwrap();

        assert_eq!(set.get(&pair.topic_id, pair.template_type), PairResponses::default());
        assert_eq!(set.for_pair(pair, dataset.topic(&pair.topic_id)).get(Side::A), Some("x"));
    }

    #[test]
    fn test_load_jsonl() {
        let input = r#"{"topic": "gun-control", "template": "humor", "response_a": "A joke", "response_b": "B joke"}

{"topic": "Border Wall", "template": "formal_writing", "response_a": "An essay"}
"#;
        let set = ResponseSet::from_reader(input.as_bytes()).expect("valid jsonl");

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("gun-control", TemplateType::Humor).get(Side::B), Some("B joke"));

        let partial = set.get("border-wall", TemplateType::FormalWriting);
        assert_eq!(partial.get(Side::A), Some("An essay"));
        assert_eq!(partial.get(Side::B), None);

        assert_eq!(set.get("unknown", TemplateType::Humor), PairResponses::default());
    }

    #[test]
    fn test_unknown_template_rejected() {
        let input = r#"{"topic": "t", "template": "sonnet", "response_a": "a", "response_b": "b"}"#;
        let err = ResponseSet::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, EvalError::Schema { row: 1, .. }));
    }
}
