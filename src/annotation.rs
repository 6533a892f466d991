//! Annotation and sample records for the knowledge-graph VQA benchmark.
//!
//! An [`AnnotationRecord`] is one raw multi-choice question tied to a COIN
//! video segment. A [`QaSample`] is the chat-style SFT record the build
//! pipeline emits: a two-turn conversation plus the choice metadata the
//! answer parser needs at evaluation time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The fixed set of question-type tags, in bucket order.
///
/// Accuracy buckets are selected by the "qa<N>_" prefix of these tags.
pub const QUESTION_TYPES: [&str; 19] = [
    "qa1_step2tool",
    "qa2_bestNextStep",
    "qa3_nextStep",
    "qa4_step",
    "qa5_task",
    "qa6_precedingStep",
    "qa7_bestPrecedingStep",
    "qa8_toolNextStep",
    "qa9_bestInitial",
    "qa10_bestFinal",
    "qa11_domain",
    "qa12_toolPurpose",
    "qa13_actionPurpose",
    "qa14_objectPurpose",
    "qa15_ToolOtherPurpose",
    "qa16_ObjectOtherPurpose",
    "qa17_AlternativeTool",
    "qa18_TaskSameToolSamePurpose",
    "qa19_TaskSameObjectSamePurpose",
];

/// Sentinel video path used when no video file could be resolved.
pub const UNRESOLVED_VIDEO: &str = "None";

/// One raw annotation record, as found in the benchmark JSON files.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationRecord {
    /// Question identifier, e.g. "qa1_step2tool_33305".
    pub qid: String,
    /// COIN video identifier the question is grounded in.
    pub video_id: String,
    /// Natural-language question text.
    pub question: String,
    /// Ordered raw option strings.
    pub options: Vec<String>,
    /// Zero-based index of the correct option.
    pub answer: usize,
    /// Compact camel-case task name the video belongs to.
    pub task_label: String,
    /// Step the question is anchored to.
    pub step: StepAnnotation,
    /// Question-type tag, one of [`QUESTION_TYPES`].
    pub quest_type: String,
}

/// Step reference inside an annotation record.
#[derive(Debug, Clone, Deserialize)]
pub struct StepAnnotation {
    pub id: i64,
    pub label: String,
    /// Time segment [start, end] in seconds.
    pub segment: [f64; 2],
}

/// One turn of the emitted two-turn conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub from: String,
    pub value: String,
}

impl ConversationTurn {
    /// The human turn carrying the assembled prompt.
    pub fn human(value: impl Into<String>) -> Self {
        Self {
            from: "human".to_string(),
            value: value.into(),
        }
    }

    /// The expected assistant turn, "<index> <answer text>".
    pub fn assistant(value: impl Into<String>) -> Self {
        Self {
            from: "gpt".to_string(),
            value: value.into(),
        }
    }
}

/// One emitted SFT sample. Created once per accepted annotation record and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaSample {
    pub qid: String,
    /// Video path relative to the video directory, or [`UNRESOLVED_VIDEO`].
    pub video: String,
    /// Two turns: the human prompt and the expected assistant answer.
    pub conversations: Vec<ConversationTurn>,
    pub quest_type: String,
    pub start_secs: f64,
    pub end_secs: f64,
    /// Valid choice tokens "1".."N".
    pub all_choices: Vec<String>,
    /// Choice token to canonicalized option text.
    pub index2ans: BTreeMap<String, String>,
    pub task_label: String,
    pub step_label: String,
}

impl QaSample {
    /// The assembled human prompt.
    pub fn prompt(&self) -> &str {
        &self.conversations[0].value
    }

    /// The expected answer string "<index> <answer text>".
    pub fn expected_answer(&self) -> &str {
        &self.conversations[1].value
    }
}
