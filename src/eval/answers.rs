//! Scoring of an inference answers file.
//!
//! The answers file maps qid to the question, ground truth, raw model
//! response, and the choice token the (external) answer parser extracted.
//! Scoring only needs the question type, ground truth, and parsed token.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::EvalError;

use super::accuracy::Scoreboard;

/// One record of the evaluation-side answers file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRecord {
    pub qid: String,
    pub quest_type: String,
    /// The prompt shown to the model.
    #[serde(default)]
    pub qs: String,
    /// Ground-truth expected answer, "<index> <text>".
    pub gt: String,
    /// Raw model response text.
    #[serde(default)]
    pub response: String,
    /// Choice token the answer parser extracted, when it found one.
    #[serde(default)]
    pub parser: Option<String>,
    #[serde(default)]
    pub task_label: String,
    #[serde(default)]
    pub step_label: String,
}

/// Loads an answers file: a JSON mapping {qid: record}.
pub fn load_answers(path: &Path) -> Result<BTreeMap<String, AnswerRecord>, EvalError> {
    let raw = std::fs::read_to_string(path).map_err(|source| EvalError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let answers: BTreeMap<String, AnswerRecord> =
        serde_json::from_str(&raw).map_err(|source| EvalError::FileParse {
            path: path.to_path_buf(),
            source,
        })?;
    if answers.is_empty() {
        return Err(EvalError::EmptyAnswers(path.to_path_buf()));
    }
    Ok(answers)
}

/// Runs every answer record through a fresh scoreboard.
///
/// Records whose parser produced no token count as attempts that match
/// nothing, the same as a wrong answer.
pub fn evaluate_answers<'a>(
    answers: impl IntoIterator<Item = &'a AnswerRecord>,
) -> Scoreboard {
    let mut board = Scoreboard::new();
    for record in answers {
        let predicted = record.parser.as_deref().unwrap_or("");
        board.update(&record.quest_type, &record.gt, predicted);
    }
    board
}
