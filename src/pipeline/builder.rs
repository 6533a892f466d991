//! Per-record sample construction.
//!
//! [`SampleBuilder`] drives the state machine for one annotation record:
//! dropped when the video id is on the miss-list or a required prediction is
//! absent, emitted exactly once otherwise. A missing retrieval payload never
//! drops a record; the prompt gets an explicit placeholder section and the
//! miss is counted for the end-of-run report.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::annotation::{AnnotationRecord, ConversationTurn, QaSample};
use crate::error::PromptError;
use crate::options::OptionSet;
use crate::prompt::{
    assemble_blind, assemble_with_predictions, assemble_with_retrieval, cypher, PromptStyle,
};
use crate::signals::{
    render_predictions, render_retrieval, PredictionPayload, RetrievalPayload,
    NO_RETRIEVAL_PLACEHOLDER, RETRIEVAL_HEADER,
};
use crate::storage::VideoIndex;

/// What kind of prompt a build emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// One of the closed multi-choice QA templates.
    Qa(PromptStyle),
    /// Cypher-generation prompts for the knowledge graph.
    Cypher { use_example: bool },
}

impl PromptKind {
    fn needs_predictions(&self) -> bool {
        match self {
            PromptKind::Qa(style) => style.needs_predictions(),
            PromptKind::Cypher { .. } => true,
        }
    }
}

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Video id on the miss-list. Expected, not an error.
    MissingVideo,
    /// Required prediction payload absent for this qid.
    MissingPrediction,
    /// The incremented answer index has no choice token. Never guess.
    InvalidAnswerIndex,
}

/// Outcome of building one record.
#[derive(Debug)]
pub enum BuildOutcome {
    Emitted(Box<QaSample>),
    Skipped(SkipReason),
}

/// Running counters for one build, reported once processing completes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub emitted: usize,
    pub excluded: usize,
    pub missing_prediction: usize,
    pub invalid_answer: usize,
    pub retrieval_not_found: usize,
}

impl BuildReport {
    /// Logs the final counters.
    pub fn log_summary(&self) {
        info!(
            emitted = self.emitted,
            excluded = self.excluded,
            missing_prediction = self.missing_prediction,
            invalid_answer = self.invalid_answer,
            "Build complete"
        );
        if self.retrieval_not_found > 0 {
            warn!(
                count = self.retrieval_not_found,
                "Questions had no retrieval payload; placeholder sections were emitted"
            );
        }
    }
}

/// Builds samples from annotation records against eagerly loaded lookups.
pub struct SampleBuilder {
    kind: PromptKind,
    topk: usize,
    miss_list: HashSet<String>,
    predictions: HashMap<String, PredictionPayload>,
    retrieval: HashMap<String, RetrievalPayload>,
    video_index: VideoIndex,
    report: BuildReport,
}

impl SampleBuilder {
    pub fn new(
        kind: PromptKind,
        topk: usize,
        miss_list: HashSet<String>,
        predictions: HashMap<String, PredictionPayload>,
        retrieval: HashMap<String, RetrievalPayload>,
        video_index: VideoIndex,
    ) -> Self {
        Self {
            kind,
            topk,
            miss_list,
            predictions,
            retrieval,
            video_index,
            report: BuildReport::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Runs one record through the state machine.
    ///
    /// Errors are reserved for malformed prediction payloads; both drop
    /// states are ordinary outcomes that keep the pipeline running.
    pub fn build(&mut self, record: &AnnotationRecord) -> Result<BuildOutcome, PromptError> {
        if self.miss_list.contains(&record.video_id) {
            warn!(video_id = %record.video_id, qid = %record.qid, "Video file is missing, skipping record");
            self.report.excluded += 1;
            return Ok(BuildOutcome::Skipped(SkipReason::MissingVideo));
        }

        let option_set = OptionSet::new(&record.options);
        let answer_token = (record.answer + 1).to_string();
        let Some(answer_text) = option_set.answer_text(&answer_token) else {
            warn!(
                qid = %record.qid,
                answer = record.answer,
                options = record.options.len(),
                "Answer index has no matching choice token, skipping record"
            );
            self.report.invalid_answer += 1;
            return Ok(BuildOutcome::Skipped(SkipReason::InvalidAnswerIndex));
        };
        let expected_answer = format!("{} {}", answer_token, answer_text);

        let rendered_preds = if self.kind.needs_predictions() {
            match self.predictions.get(&record.qid) {
                Some(payload) => Some(render_predictions(payload, self.topk)?),
                None => {
                    warn!(qid = %record.qid, "No prediction payload, skipping record");
                    self.report.missing_prediction += 1;
                    return Ok(BuildOutcome::Skipped(SkipReason::MissingPrediction));
                }
            }
        } else {
            None
        };

        let prompt = match self.kind {
            PromptKind::Qa(PromptStyle::Blind) => {
                assemble_blind(&record.question, &option_set.display)
            }
            PromptKind::Qa(PromptStyle::Predictions) => assemble_with_predictions(
                &record.question,
                &option_set.display,
                self.topk,
                rendered_preds.as_ref().expect("predictions rendered above"),
            ),
            PromptKind::Qa(PromptStyle::Retrieval) => {
                let section = match self.retrieval.get(&record.qid) {
                    Some(payload) => render_retrieval(payload),
                    None => {
                        self.report.retrieval_not_found += 1;
                        format!("{}\n{}", RETRIEVAL_HEADER, NO_RETRIEVAL_PLACEHOLDER)
                    }
                };
                assemble_with_retrieval(
                    &record.question,
                    &option_set.display,
                    self.topk,
                    rendered_preds.as_ref().expect("predictions rendered above"),
                    &section,
                )
            }
            PromptKind::Cypher { use_example } => cypher::assemble_cypher_prompt(
                &record.question,
                rendered_preds.as_ref().expect("predictions rendered above"),
                use_example,
            ),
        };

        let sample = QaSample {
            qid: record.qid.clone(),
            video: self.video_index.resolve(&record.video_id),
            conversations: vec![
                ConversationTurn::human(prompt),
                ConversationTurn::assistant(expected_answer),
            ],
            quest_type: record.quest_type.clone(),
            start_secs: record.step.segment[0],
            end_secs: record.step.segment[1],
            all_choices: option_set.choices,
            index2ans: option_set.index2ans,
            task_label: record.task_label.clone(),
            step_label: record.step.label.clone(),
        };
        self.report.emitted += 1;
        Ok(BuildOutcome::Emitted(Box::new(sample)))
    }
}
