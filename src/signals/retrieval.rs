//! Knowledge-graph retrieval payload rendering.
//!
//! Retrieval results come back from the graph in a handful of nested shapes.
//! The shape is classified once at ingestion into [`RetrievalValue`] and then
//! rendered through exhaustive matching. Unrecognized shapes are flagged and
//! rendered empty so one bad payload cannot stall a build.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::PromptError;
use crate::labels::canonicalize;

/// Fixed header introducing a query-keyed retrieval section.
pub const RETRIEVAL_HEADER: &str = "Information retrieved from the knowledge graph:";

/// Placeholder line emitted when no query yielded a result, so the prompt
/// always has a deterministic retrieval section.
pub const NO_RETRIEVAL_PLACEHOLDER: &str = "None";

/// A retrieval result value with its nested shape resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalValue {
    Empty,
    /// Flat list of names; set semantics, duplicates are dropped.
    FlatList(Vec<String>),
    /// List of (name, frequency) pairs.
    PairList(Vec<(String, String)>),
    /// Mapping from a key to a de-duplicated name list.
    Mapping(Vec<(String, Vec<String>)>),
}

impl RetrievalValue {
    /// Classifies a raw JSON value into its retrieval shape.
    pub fn classify(value: &Value) -> Result<Self, PromptError> {
        match value {
            Value::Null => Ok(Self::Empty),
            Value::String(s) if s.is_empty() => Ok(Self::Empty),
            Value::Array(items) if items.is_empty() => Ok(Self::Empty),
            Value::Object(map) if map.is_empty() => Ok(Self::Empty),
            Value::Array(items) => {
                if items.iter().all(|item| item.is_array()) {
                    let mut pairs = Vec::with_capacity(items.len());
                    for item in items {
                        let inner = item.as_array().expect("checked above");
                        if inner.len() != 2 {
                            return Err(unrecognized(value));
                        }
                        pairs.push((scalar_text(&inner[0])?, scalar_text(&inner[1])?));
                    }
                    Ok(Self::PairList(pairs))
                } else if items.iter().all(|item| !item.is_array() && !item.is_object()) {
                    let names = items
                        .iter()
                        .map(scalar_text)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Self::FlatList(names))
                } else {
                    Err(unrecognized(value))
                }
            }
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, val) in map {
                    let Some(items) = val.as_array() else {
                        return Err(unrecognized(value));
                    };
                    let names = items
                        .iter()
                        .map(scalar_text)
                        .collect::<Result<Vec<_>, _>>()?;
                    entries.push((key.clone(), names));
                }
                Ok(Self::Mapping(entries))
            }
            _ => Err(unrecognized(value)),
        }
    }

    /// Renders the value as prompt text. Empty shapes render as "".
    pub fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::FlatList(names) => {
                let unique: BTreeSet<&str> = names.iter().map(String::as_str).collect();
                unique.into_iter().collect::<Vec<_>>().join(", ")
            }
            Self::PairList(pairs) => pairs
                .iter()
                .map(|(name, freq)| format!("{} ({})", name, freq))
                .collect::<Vec<_>>()
                .join(", "),
            Self::Mapping(entries) => entries
                .iter()
                .map(|(key, names)| {
                    let unique: BTreeSet<&str> = names.iter().map(String::as_str).collect();
                    format!("{}: {}", key, unique.into_iter().collect::<Vec<_>>().join(", "))
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

fn unrecognized(value: &Value) -> PromptError {
    let mut preview = value.to_string();
    if preview.len() > 120 {
        preview.truncate(120);
    }
    PromptError::UnrecognizedRetrievalShape(preview)
}

fn scalar_text(value: &Value) -> Result<String, PromptError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(unrecognized(value)),
    }
}

/// One record of a question-keyed retrieval payload: the predictions the
/// query was derived from, the query itself, and what it returned.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalRecord {
    pub task: String,
    pub step: String,
    pub task_score: Value,
    pub step_score: Value,
    /// Cypher used for the retrieval; treated as an opaque string.
    #[serde(default)]
    pub cypher: Option<String>,
    pub retrieved_data: Value,
}

impl RetrievalRecord {
    /// Renders one record as "<Task (score)> <Step (score)> <retrieved>".
    fn render(&self) -> String {
        let data = RetrievalValue::classify(&self.retrieved_data).unwrap_or_else(|err| {
            warn!(task = %self.task, step = %self.step, %err, "Skipping malformed retrieved_data");
            RetrievalValue::Empty
        });
        format!(
            "<{} ({})> <{} ({})> <{}>",
            canonicalize(&self.task),
            score_text(&self.task_score),
            self.step,
            score_text(&self.step_score),
            data.render()
        )
    }
}

fn score_text(score: &Value) -> String {
    match score {
        Value::Number(n) => match n.as_f64() {
            Some(f) => format!("{:.2}", f),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Retrieval payload for one question, in either supported file format.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RetrievalPayload {
    /// List of retrieval records carrying their own predictions and query.
    Records(Vec<RetrievalRecord>),
    /// Mapping from graph-query string to its raw result.
    QueryResults(serde_json::Map<String, Value>),
}

/// Renders a retrieval payload as the complete prompt section.
///
/// Query-keyed payloads render each non-empty result prefixed with the
/// literal query text under [`RETRIEVAL_HEADER`]; if no query yielded a
/// result the section body is the literal [`NO_RETRIEVAL_PLACEHOLDER`].
pub fn render_retrieval(payload: &RetrievalPayload) -> String {
    match payload {
        RetrievalPayload::Records(records) => render_records(records),
        RetrievalPayload::QueryResults(map) => render_query_results(map),
    }
}

fn render_records(records: &[RetrievalRecord]) -> String {
    let mut text = String::new();
    if let Some(cypher) = records.iter().find_map(|r| r.cypher.as_deref()) {
        text.push_str(&format!(
            "The sample query to retrieve the information is as follows: {}\n",
            cypher
        ));
    }
    text.push_str(
        "Retrieved information. Format: <Predicted Task (score)> <Predicted Step (score)> <retrieved information>.\n",
    );
    let lines: Vec<String> = records.iter().map(RetrievalRecord::render).collect();
    text.push_str(&lines.join("\n"));
    text
}

fn render_query_results(map: &serde_json::Map<String, Value>) -> String {
    let mut sections = Vec::new();
    for (query, result) in map {
        let value = RetrievalValue::classify(result).unwrap_or_else(|err| {
            warn!(%query, %err, "Skipping malformed retrieval result");
            RetrievalValue::Empty
        });
        let rendered = value.render();
        if !rendered.is_empty() {
            sections.push(format!("{}\n{}", query, rendered));
        }
    }

    if sections.is_empty() {
        format!("{}\n{}", RETRIEVAL_HEADER, NO_RETRIEVAL_PLACEHOLDER)
    } else {
        format!("{}\n{}", RETRIEVAL_HEADER, sections.join("\n"))
    }
}
