// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Paired-prompt dataset loading and validation
//!
//! A dataset is a table of prompt pairs. Each row asks for the same kind of
//! content (the template) on the same topic from two opposing stances. Rows are
//! validated once at load time; the resulting [`Dataset`] is immutable and is
//! passed by reference to prompt construction and the pipeline.

use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Task framing of a prompt pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateType {
    Reasoning,
    FormalWriting,
    Narrative,
    Analysis,
    Humor,
}

impl TemplateType {
    pub const ALL: [TemplateType; 5] = [
        TemplateType::Reasoning,
        TemplateType::FormalWriting,
        TemplateType::Narrative,
        TemplateType::Analysis,
        TemplateType::Humor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Reasoning => "reasoning",
            TemplateType::FormalWriting => "formal-writing",
            TemplateType::Narrative => "narrative",
            TemplateType::Analysis => "analysis",
            TemplateType::Humor => "humor",
        }
    }

    /// Parse a template category, ignoring case and accepting `-`, `_` or space separators
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();

        match normalized.as_str() {
            "reasoning" => Some(TemplateType::Reasoning),
            "formal-writing" => Some(TemplateType::FormalWriting),
            "narrative" => Some(TemplateType::Narrative),
            "analysis" => Some(TemplateType::Analysis),
            "humor" | "humour" => Some(TemplateType::Humor),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One member of a prompt pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// A topic and the single category it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique identifier (explicit `topic_id`, or a slug of the name)
    pub id: String,
    /// Human-readable name
    pub label: String,
    /// Main category
    pub category: String,
}

/// The political position a prompt argues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stance {
    /// Position statement, e.g. "Stricter gun laws reduce violence"
    pub position: String,
    /// Group label, e.g. "pro_democrats"
    pub group: Option<String>,
}

impl Stance {
    /// Label used to identify the stance in grading prompts
    pub fn label(&self) -> &str {
        self.group.as_deref().unwrap_or(&self.position)
    }

    fn same_as(&self, other: &Stance) -> bool {
        self.label().trim().to_lowercase() == other.label().trim().to_lowercase()
    }
}

/// Two prompts on the same topic and template arguing opposing stances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPair {
    pub topic_id: String,
    pub category: String,
    pub template_type: TemplateType,
    /// Task template text the prompts were instantiated from
    pub template: Option<String>,
    pub partisan: bool,
    pub prompt_a: String,
    pub prompt_b: String,
    pub stance_a: Stance,
    pub stance_b: Stance,
}

impl PromptPair {
    pub fn prompt(&self, side: Side) -> &str {
        match side {
            Side::A => &self.prompt_a,
            Side::B => &self.prompt_b,
        }
    }

    pub fn stance(&self, side: Side) -> &Stance {
        match side {
            Side::A => &self.stance_a,
            Side::B => &self.stance_b,
        }
    }

    /// Identifier of the pair, unique within a dataset
    pub fn key(&self) -> (String, TemplateType) {
        (self.topic_id.clone(), self.template_type)
    }
}

/// One CSV row as written by the dataset tooling
#[derive(Debug, Deserialize)]
struct RawRow {
    topic_id: Option<String>,
    topic_name: Option<String>,
    main_category: Option<String>,
    template_category: Option<String>,
    template: Option<String>,
    partisan: Option<String>,
    prompt_a: Option<String>,
    prompt_b: Option<String>,
    stance_a: Option<String>,
    stance_b: Option<String>,
    prompt_a_group: Option<String>,
    prompt_b_group: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("true" | "1" | "yes" | "y")
    )
}

/// Lowercase slug used when a row carries no explicit topic id
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Optional restriction of a dataset to a category, topic and/or template type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairFilter {
    pub category: Option<String>,
    pub topic: Option<String>,
    pub template: Option<TemplateType>,
}

impl PairFilter {
    pub fn matches(&self, pair: &PromptPair) -> bool {
        self.category.as_deref().map_or(true, |c| c == pair.category)
            && self.topic.as_deref().map_or(true, |t| t == pair.topic_id)
            && self.template.map_or(true, |t| t == pair.template_type)
    }
}

/// Summary counts over a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_prompts: usize,
    pub pairs: usize,
    pub topics: usize,
    pub categories: usize,
    pub partisan_pairs: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_template: BTreeMap<String, usize>,
    pub by_group: BTreeMap<String, usize>,
}

/// A validated, immutable collection of prompt pairs
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    topics: Vec<Topic>,
    topic_index: HashMap<String, usize>,
    pairs: Vec<PromptPair>,
    index: HashMap<(String, TemplateType), usize>,
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn load_csv(path: &Path) -> EvalResult<Self> {
        let file = File::open(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "dataset".to_string());
        let dataset = Self::from_reader(&name, file)?;
        tracing::info!(
            "Loaded {} prompt pairs over {} topics from {}",
            dataset.pairs.len(),
            dataset.topics.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load a dataset from any CSV source with a header row
    pub fn from_reader<R: Read>(name: &str, reader: R) -> EvalResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let mut builder = DatasetBuilder::new(name);
        for (idx, result) in reader.deserialize::<RawRow>().enumerate() {
            let raw = result?;
            builder.push_row(idx + 1, raw)?;
        }

        Ok(builder.finish())
    }

    /// Build a dataset from already-constructed pairs, applying the same validation as CSV loading
    pub fn from_pairs(name: &str, pairs: Vec<(Topic, PromptPair)>) -> EvalResult<Self> {
        let mut builder = DatasetBuilder::new(name);
        for (idx, (topic, pair)) in pairs.into_iter().enumerate() {
            builder.push_pair(idx + 1, topic, pair)?;
        }
        Ok(builder.finish())
    }

    /// Generate a valid synthetic dataset for tests and dry runs
    pub fn synthetic(topic_count: usize, seed: u64) -> Self {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let categories = [
            "Healthcare",
            "Immigration",
            "Economy",
            "Environment",
            "Criminal Justice",
            "Education",
        ];
        let groups = [
            ("pro_democrats", "pro_republicans"),
            ("progressive", "conservative"),
            ("left", "right"),
        ];

        let mut pairs = Vec::new();
        for t in 0..topic_count {
            let category = categories[rng.gen_range(0..categories.len())];
            let label = format!("Synthetic topic {}", t);
            let topic = Topic {
                id: slugify(&label),
                label: label.clone(),
                category: category.to_string(),
            };
            let (group_a, group_b) = groups[rng.gen_range(0..groups.len())];
            let partisan = rng.gen_bool(0.5);

            for template_type in TemplateType::ALL {
                // Every topic covers reasoning; the other templates are sampled
                if template_type != TemplateType::Reasoning && !rng.gen_bool(0.6) {
                    continue;
                }
                let pair = PromptPair {
                    topic_id: topic.id.clone(),
                    category: category.to_string(),
                    template_type,
                    template: Some(format!("Write a {} piece on: {{stance}}", template_type)),
                    partisan,
                    prompt_a: format!("Write a {} piece supporting position A on {}", template_type, label),
                    prompt_b: format!("Write a {} piece supporting position B on {}", template_type, label),
                    stance_a: Stance {
                        position: format!("Position A on {}", label),
                        group: Some(group_a.to_string()),
                    },
                    stance_b: Stance {
                        position: format!("Position B on {}", label),
                        group: Some(group_b.to_string()),
                    },
                };
                pairs.push((topic.clone(), pair));
            }
        }

        let mut builder = DatasetBuilder::new("synthetic");
        for (idx, (topic, pair)) in pairs.into_iter().enumerate() {
            // Generated rows are unique and well-formed by construction
            if let Err(e) = builder.push_pair(idx + 1, topic, pair) {
                tracing::warn!("Skipping synthetic row {}: {}", idx + 1, e);
            }
        }
        builder.finish()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Topics in first-seen order
    pub fn list_topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topic_index.get(id).map(|&i| &self.topics[i])
    }

    /// Categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.topics
            .iter()
            .filter(|t| seen.insert(t.category.as_str()))
            .map(|t| t.category.as_str())
            .collect()
    }

    /// Pairs for a topic and template type; empty when the combination is not covered
    pub fn pairs_for(&self, topic_id: &str, template: TemplateType) -> Vec<&PromptPair> {
        self.index
            .get(&(topic_id.to_string(), template))
            .map(|&i| &self.pairs[i])
            .into_iter()
            .collect()
    }

    /// All pairs in row order. Each call starts a fresh pass.
    pub fn all_pairs(&self) -> std::slice::Iter<'_, PromptPair> {
        self.pairs.iter()
    }

    pub fn filter<'a>(&'a self, filter: &'a PairFilter) -> impl Iterator<Item = &'a PromptPair> + 'a {
        self.pairs.iter().filter(move |p| filter.matches(p))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn stats(&self) -> DatasetStats {
        let mut by_category = BTreeMap::new();
        let mut by_template = BTreeMap::new();
        let mut by_group = BTreeMap::new();

        for pair in &self.pairs {
            *by_category.entry(pair.category.clone()).or_insert(0) += 1;
            *by_template.entry(pair.template_type.to_string()).or_insert(0) += 1;
            for side in [Side::A, Side::B] {
                *by_group.entry(pair.stance(side).label().to_string()).or_insert(0) += 1;
            }
        }

        DatasetStats {
            total_prompts: self.pairs.len() * 2,
            pairs: self.pairs.len(),
            topics: self.topics.len(),
            categories: self.categories().len(),
            partisan_pairs: self.pairs.iter().filter(|p| p.partisan).count(),
            by_category,
            by_template,
            by_group,
        }
    }

    /// SHA-256 over the canonical content of every pair, in row order
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for pair in &self.pairs {
            let fields = [
                pair.topic_id.as_str(),
                pair.category.as_str(),
                pair.template_type.as_str(),
                pair.template.as_deref().unwrap_or(""),
                if pair.partisan { "1" } else { "0" },
                pair.prompt_a.as_str(),
                pair.prompt_b.as_str(),
                pair.stance_a.position.as_str(),
                pair.stance_a.group.as_deref().unwrap_or(""),
                pair.stance_b.position.as_str(),
                pair.stance_b.group.as_deref().unwrap_or(""),
            ];
            for field in fields {
                hasher.update(field.as_bytes());
                hasher.update([0x1f]);
            }
            hasher.update([0x1e]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Accumulates validated rows; enforces category and uniqueness invariants across rows
struct DatasetBuilder {
    name: String,
    topics: Vec<Topic>,
    topic_index: HashMap<String, usize>,
    pairs: Vec<PromptPair>,
    index: HashMap<(String, TemplateType), usize>,
}

impl DatasetBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            topics: Vec::new(),
            topic_index: HashMap::new(),
            pairs: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn push_row(&mut self, row: usize, raw: RawRow) -> EvalResult<()> {
        let schema = |reason: &str| EvalError::Schema {
            row,
            reason: reason.to_string(),
        };

        let prompt_a = non_empty(raw.prompt_a).ok_or_else(|| schema("missing prompt_a"))?;
        let prompt_b = non_empty(raw.prompt_b).ok_or_else(|| schema("missing prompt_b"))?;

        let template_raw =
            non_empty(raw.template_category).ok_or_else(|| schema("missing template_category"))?;
        let template_type = TemplateType::parse(&template_raw)
            .ok_or_else(|| schema(&format!("unrecognized template_category '{}'", template_raw)))?;

        let topic_name = non_empty(raw.topic_name);
        let topic_id = non_empty(raw.topic_id)
            .map(|id| id.trim().to_string())
            .or_else(|| topic_name.as_deref().map(slugify))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| schema("missing topic"))?;
        let category = non_empty(raw.main_category)
            .ok_or_else(|| schema(&format!("topic '{}' has no category", topic_id)))?;

        let stance_a = non_empty(raw.stance_a).ok_or_else(|| schema("missing stance_a"))?;
        let stance_b = non_empty(raw.stance_b).ok_or_else(|| schema("missing stance_b"))?;

        let topic = Topic {
            id: topic_id.clone(),
            label: topic_name.unwrap_or_else(|| topic_id.clone()),
            category: category.trim().to_string(),
        };
        let pair = PromptPair {
            topic_id,
            category: topic.category.clone(),
            template_type,
            template: non_empty(raw.template),
            partisan: parse_flag(raw.partisan.as_deref()),
            prompt_a,
            prompt_b,
            stance_a: Stance {
                position: stance_a,
                group: non_empty(raw.prompt_a_group),
            },
            stance_b: Stance {
                position: stance_b,
                group: non_empty(raw.prompt_b_group),
            },
        };

        self.push_pair(row, topic, pair)
    }

    fn push_pair(&mut self, row: usize, topic: Topic, pair: PromptPair) -> EvalResult<()> {
        if pair.prompt_a.trim().is_empty() || pair.prompt_b.trim().is_empty() {
            return Err(EvalError::Schema {
                row,
                reason: "pair lacks a stance prompt".to_string(),
            });
        }
        if pair.stance_a.same_as(&pair.stance_b) {
            return Err(EvalError::Schema {
                row,
                reason: format!("stances are not opposing: both are '{}'", pair.stance_a.label()),
            });
        }
        if topic.category.trim().is_empty() {
            return Err(EvalError::Schema {
                row,
                reason: format!("topic '{}' has no category", topic.id),
            });
        }

        match self.topic_index.get(&topic.id) {
            Some(&i) if self.topics[i].category != topic.category => {
                return Err(EvalError::Schema {
                    row,
                    reason: format!(
                        "topic '{}' is mapped to categories '{}' and '{}'",
                        topic.id, self.topics[i].category, topic.category
                    ),
                });
            }
            Some(_) => {}
            None => {
                self.topic_index.insert(topic.id.clone(), self.topics.len());
                self.topics.push(topic);
            }
        }

        let key = pair.key();
        if self.index.contains_key(&key) {
            return Err(EvalError::Duplicate {
                topic: key.0,
                template: key.1.to_string(),
            });
        }
        self.index.insert(key, self.pairs.len());
        self.pairs.push(pair);
        Ok(())
    }

    fn finish(self) -> Dataset {
        Dataset {
            name: self.name,
            topics: self.topics,
            topic_index: self.topic_index,
            pairs: self.pairs,
            index: self.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "main_category,topic_name,template_category,template,partisan,prompt_a,prompt_b,prompt_a_group,prompt_b_group,stance_a,stance_b\n";

    fn load(body: &str) -> EvalResult<Dataset> {
        let csv = format!("{}{}", HEADER, body);
        Dataset::from_reader("test", csv.as_bytes())
    }

    #[test]
    fn test_template_type_parse() {
        assert_eq!(TemplateType::parse("formal_writing"), Some(TemplateType::FormalWriting));
        assert_eq!(TemplateType::parse("Formal Writing"), Some(TemplateType::FormalWriting));
        assert_eq!(TemplateType::parse(" HUMOR "), Some(TemplateType::Humor));
        assert_eq!(TemplateType::parse("poetry"), None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Gun Control"), "gun-control");
        assert_eq!(slugify("  Abortion / Reproductive rights "), "abortion-reproductive-rights");
    }

    #[test]
    fn test_load_valid_rows() {
        let dataset = load(
            "Healthcare,Medicare for All,reasoning,Explain why,True,Argue for M4A,Argue against M4A,pro_democrats,pro_republicans,Support M4A,Oppose M4A\n\
             Healthcare,Medicare for All,humor,Joke,True,Joke for M4A,Joke against M4A,pro_democrats,pro_republicans,Support M4A,Oppose M4A\n\
             Immigration,Border Wall,analysis,Analyze,False,Analyze pro wall,Analyze anti wall,pro_republicans,pro_democrats,Build it,Don't build it\n",
        )
        .expect("valid dataset");

        assert_eq!(dataset.len(), 3);
        let topics: Vec<&str> = dataset.list_topics().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(topics, vec!["medicare-for-all", "border-wall"]);
        assert_eq!(dataset.categories(), vec!["Healthcare", "Immigration"]);

        let pairs = dataset.pairs_for("medicare-for-all", TemplateType::Humor);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].prompt_a, "Joke for M4A");
        assert_eq!(pairs[0].stance_a.label(), "pro_democrats");
        assert!(pairs[0].partisan);

        assert!(dataset.pairs_for("border-wall", TemplateType::Humor).is_empty());

        assert_eq!(dataset.topic("border-wall").map(|t| t.category.as_str()), Some("Immigration"));
        assert_eq!(dataset.topic("medicare-for-all").map(|t| t.label.as_str()), Some("Medicare for All"));
        assert!(dataset.topic("Border Wall").is_none());

        let first: Vec<_> = dataset.all_pairs().map(|p| p.template_type).collect();
        let second: Vec<_> = dataset.all_pairs().map(|p| p.template_type).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], TemplateType::Reasoning);
    }

    #[test]
    fn test_missing_prompt_b_is_schema_error() {
        let err = load("Healthcare,Medicare for All,reasoning,,True,Argue for M4A,,d,r,Support,Oppose\n")
            .unwrap_err();
        match err {
            EvalError::Schema { row, reason } => {
                assert_eq!(row, 1);
                assert!(reason.contains("prompt_b"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_template_is_schema_error() {
        let err = load("Healthcare,Medicare for All,poetry,,True,a,b,d,r,Support,Oppose\n").unwrap_err();
        assert!(matches!(err, EvalError::Schema { .. }));
    }

    #[test]
    fn test_topic_in_two_categories_is_schema_error() {
        let err = load(
            "Healthcare,Medicare for All,reasoning,,True,a,b,d,r,Support,Oppose\n\
             Economy,Medicare for All,humor,,True,a,b,d,r,Support,Oppose\n",
        )
        .unwrap_err();
        match err {
            EvalError::Schema { row, reason } => {
                assert_eq!(row, 2);
                assert!(reason.contains("categories"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_identical_stances_rejected() {
        let err = load("Healthcare,Medicare for All,reasoning,,True,a,b,same,SAME,Support,Oppose\n").unwrap_err();
        assert!(matches!(err, EvalError::Schema { .. }));
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let err = load(
            "Healthcare,Medicare for All,reasoning,,True,a,b,d,r,Support,Oppose\n\
             Healthcare,Medicare for All,Reasoning,,True,c,d,d,r,Support,Oppose\n",
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::Duplicate { .. }));
    }

    #[test]
    fn test_explicit_topic_id_column() {
        let csv = "topic_id,main_category,template_category,prompt_a,prompt_b,stance_a,stance_b\n\
                   t-001,Economy,analysis,a,b,Raise taxes,Cut taxes\n";
        let dataset = Dataset::from_reader("ids", csv.as_bytes()).expect("valid dataset");
        assert_eq!(dataset.list_topics()[0].id, "t-001");
        assert_eq!(dataset.list_topics()[0].label, "t-001");
        assert_eq!(dataset.all_pairs().next().map(|p| p.stance_a.label()), Some("Raise taxes"));
    }

    #[test]
    fn test_synthetic_dataset() {
        let dataset = Dataset::synthetic(20, 42);
        let again = Dataset::synthetic(20, 42);

        assert_eq!(dataset.list_topics().len(), 20);
        assert!(dataset.len() >= 20);
        assert_eq!(dataset.fingerprint(), again.fingerprint());
        for topic in dataset.list_topics() {
            assert_eq!(dataset.pairs_for(&topic.id, TemplateType::Reasoning).len(), 1);
        }
    }

    #[test]
    fn test_stats_and_filter() {
        let dataset = Dataset::synthetic(10, 7);
        let stats = dataset.stats();

        assert_eq!(stats.pairs, dataset.len());
        assert_eq!(stats.total_prompts, dataset.len() * 2);
        assert_eq!(stats.by_category.values().sum::<usize>(), dataset.len());
        assert_eq!(stats.by_group.values().sum::<usize>(), dataset.len() * 2);

        let filter = PairFilter {
            template: Some(TemplateType::Reasoning),
            ..Default::default()
        };
        assert_eq!(dataset.filter(&filter).count(), 10);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = load("Healthcare,Medicare for All,reasoning,,True,a,b,d,r,Support,Oppose\n").unwrap();
        let b = load("Healthcare,Medicare for All,reasoning,,True,a,c,d,r,Support,Oppose\n").unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }
}
