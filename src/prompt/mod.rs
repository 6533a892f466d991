//! Prompt assembly for multi-choice video QA.
//!
//! A prompt is assembled by positional substitution into one of a closed set
//! of templates, selected by [`PromptStyle`]. The final instruction sentence
//! is a literal contract with the models being queried and must never be
//! paraphrased.

pub mod cypher;

use std::fmt;
use std::str::FromStr;

use crate::error::PromptError;
use crate::signals::RenderedPredictions;

/// Literal instruction suffix shared by every template. Part of the external
/// contract with the queried model; do not reword.
pub const ANSWER_FORMAT_INSTRUCTION: &str =
    "Return only the index of the correct answer (e.g. 1, 2, 3, 4, or 5).";

/// Placeholder the inference side replaces with per-frame image tokens.
pub const VIDEO_TOKEN: &str = "<video>\n";

/// Which auxiliary signals a prompt carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Question and options only.
    Blind,
    /// Question, options, and top-K task/step predictions.
    Predictions,
    /// Question, options, predictions, and graph-retrieval text.
    Retrieval,
}

impl PromptStyle {
    /// Whether this style requires a prediction payload per question.
    pub fn needs_predictions(&self) -> bool {
        !matches!(self, PromptStyle::Blind)
    }

    /// Whether this style requires a retrieval payload per question.
    pub fn needs_retrieval(&self) -> bool {
        matches!(self, PromptStyle::Retrieval)
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PromptStyle::Blind => "blind",
            PromptStyle::Predictions => "predictions",
            PromptStyle::Retrieval => "retrieval",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PromptStyle {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blind" => Ok(PromptStyle::Blind),
            "predictions" | "pred" => Ok(PromptStyle::Predictions),
            "retrieval" => Ok(PromptStyle::Retrieval),
            other => Err(PromptError::UnknownStyle(other.to_string())),
        }
    }
}

/// Assembles the blind QA prompt: question and option block only.
pub fn assemble_blind(question: &str, options: &str) -> String {
    format!(
        "{}{} select one from options:\n{}\n{}",
        VIDEO_TOKEN, question, options, ANSWER_FORMAT_INSTRUCTION
    )
}

/// Assembles the prediction-augmented QA prompt.
pub fn assemble_with_predictions(
    question: &str,
    options: &str,
    topk: usize,
    preds: &RenderedPredictions,
) -> String {
    format!(
        "{}A vision model's prediction results of task recognition and step recognition are provided below.\n\
         Top {} task predictions:\n{}\nTop {} step predictions:\n{}\n\
         {} select one from options:\n{}\n{}",
        VIDEO_TOKEN,
        topk,
        preds.task,
        topk,
        preds.step,
        question,
        options,
        ANSWER_FORMAT_INSTRUCTION
    )
}

/// Assembles the prediction-plus-retrieval QA prompt. The retrieval section
/// arrives fully rendered, including its header or "None" placeholder.
pub fn assemble_with_retrieval(
    question: &str,
    options: &str,
    topk: usize,
    preds: &RenderedPredictions,
    retrieval_section: &str,
) -> String {
    format!(
        "{}A vision model's prediction results of task recognition and step recognition are provided below.\n\
         Top {} task predictions:\n{}\nTop {} step predictions:\n{}\n{}\n\
         {} select one from options:\n{}\n{}",
        VIDEO_TOKEN,
        topk,
        preds.task,
        topk,
        preds.step,
        retrieval_section,
        question,
        options,
        ANSWER_FORMAT_INSTRUCTION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds() -> RenderedPredictions {
        RenderedPredictions {
            task: "Make RJ45 Cable (0.8), Assemble Desktop PC (0.2)".to_string(),
            step: "crimp the cable (0.7), cut the cable (0.3)".to_string(),
        }
    }

    #[test]
    fn blind_prompt_has_question_options_and_suffix() {
        let prompt = assemble_blind("What tool is used?", "(1) Hammer\n(2) Wrench");
        assert_eq!(
            prompt,
            "<video>\nWhat tool is used? select one from options:\n(1) Hammer\n(2) Wrench\n\
             Return only the index of the correct answer (e.g. 1, 2, 3, 4, or 5)."
        );
    }

    #[test]
    fn prediction_prompt_lists_both_heads() {
        let prompt =
            assemble_with_predictions("What tool is used?", "(1) Hammer", 2, &preds());
        assert!(prompt.contains("Top 2 task predictions:\nMake RJ45 Cable (0.8)"));
        assert!(prompt.contains("Top 2 step predictions:\ncrimp the cable (0.7)"));
        assert!(prompt.ends_with(ANSWER_FORMAT_INSTRUCTION));
    }

    #[test]
    fn retrieval_prompt_includes_rendered_section() {
        let prompt = assemble_with_retrieval(
            "What tool is used?",
            "(1) Hammer",
            2,
            &preds(),
            "Information retrieved from the knowledge graph:\nNone",
        );
        assert!(prompt.contains("knowledge graph:\nNone\nWhat tool is used?"));
        assert!(prompt.ends_with(ANSWER_FORMAT_INSTRUCTION));
    }

    #[test]
    fn style_round_trips_through_from_str() {
        for style in [PromptStyle::Blind, PromptStyle::Predictions, PromptStyle::Retrieval] {
            assert_eq!(style.to_string().parse::<PromptStyle>().unwrap(), style);
        }
        assert!("chain-of-thought".parse::<PromptStyle>().is_err());
    }
}
