//! Top-K task/step prediction rendering.
//!
//! Upstream classifiers emit the five highest-scoring classes for two heads,
//! task recognition and step recognition. Prompts show a configurable prefix
//! of those lists with the scores renormalized to sum to 1 over exactly the
//! displayed subset.

use serde::Deserialize;

use crate::error::PromptError;
use crate::labels::canonicalize;

/// Number of decimal digits for displayed scores.
const SCORE_DECIMALS: i32 = 2;

/// Top-K class/score pairs for the task and step classification heads.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionPayload {
    #[serde(rename = "task_top5_classes")]
    pub task_classes: Vec<String>,
    #[serde(rename = "task_top5_scores")]
    pub task_scores: Vec<f64>,
    #[serde(rename = "step_top5_classes")]
    pub step_classes: Vec<String>,
    #[serde(rename = "step_top5_scores")]
    pub step_scores: Vec<f64>,
}

/// Prompt-ready prediction strings for both heads.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPredictions {
    pub task: String,
    pub step: String,
}

/// Renders both prediction heads for display.
///
/// Task class names are canonicalized; step names are free-form phrases and
/// pass through untouched. With `topk == 1` only the top class name is
/// rendered, with no score.
pub fn render_predictions(
    payload: &PredictionPayload,
    topk: usize,
) -> Result<RenderedPredictions, PromptError> {
    let task = render_head("task", &payload.task_classes, &payload.task_scores, topk, true)?;
    let step = render_head("step", &payload.step_classes, &payload.step_scores, topk, false)?;
    Ok(RenderedPredictions { task, step })
}

fn render_head(
    head: &str,
    classes: &[String],
    scores: &[f64],
    topk: usize,
    canonicalize_names: bool,
) -> Result<String, PromptError> {
    if classes.len() != scores.len() {
        return Err(PromptError::ClassScoreMismatch {
            head: head.to_string(),
            classes: classes.len(),
            scores: scores.len(),
        });
    }
    if topk == 0 || topk > classes.len() {
        return Err(PromptError::TopKOutOfRange {
            head: head.to_string(),
            requested: topk,
            available: classes.len(),
        });
    }
    if let Some(score) = scores.iter().find(|s| **s < 0.0) {
        return Err(PromptError::NegativeScore {
            head: head.to_string(),
            score: *score,
        });
    }

    let name = |class: &String| {
        if canonicalize_names {
            canonicalize(class)
        } else {
            class.clone()
        }
    };

    if topk == 1 {
        return Ok(name(&classes[0]));
    }

    let shown = &scores[..topk];
    let sum: f64 = shown.iter().sum();
    if sum == 0.0 {
        return Err(PromptError::ZeroScoreSum {
            head: head.to_string(),
        });
    }

    let rendered: Vec<String> = classes[..topk]
        .iter()
        .zip(shown)
        .map(|(class, score)| format!("{} ({})", name(class), round_score(score / sum)))
        .collect();
    Ok(rendered.join(", "))
}

fn round_score(value: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> PredictionPayload {
        PredictionPayload {
            task_classes: vec![
                "UnclogSinkWithBakingSoda".to_string(),
                "CleanBathtub".to_string(),
                "DrillHole".to_string(),
            ],
            task_scores: vec![0.62, 0.29, 0.04],
            step_classes: vec![
                "add baking soda to the sink hole".to_string(),
                "clean bathtub with water".to_string(),
                "drill the wall".to_string(),
            ],
            step_scores: vec![0.44, 0.25, 0.12],
        }
    }

    #[test]
    fn renders_comma_joined_classes_with_scores() {
        let rendered = render_predictions(&payload(), 2).unwrap();
        // 0.62 / 0.91 = 0.68, 0.29 / 0.91 = 0.32
        assert_eq!(
            rendered.task,
            "Unclog Sink With Baking Soda (0.68), Clean Bathtub (0.32)"
        );
        assert_eq!(
            rendered.step,
            "add baking soda to the sink hole (0.64), clean bathtub with water (0.36)"
        );
    }

    #[test]
    fn displayed_scores_sum_to_one() {
        let rendered = render_predictions(&payload(), 3).unwrap();
        let sum: f64 = rendered
            .task
            .split(", ")
            .map(|part| {
                let open = part.rfind('(').unwrap();
                part[open + 1..part.len() - 1].parse::<f64>().unwrap()
            })
            .sum();
        assert!((sum - 1.0).abs() < 0.02, "scores sum to {}", sum);
    }

    #[test]
    fn topk_one_renders_bare_top_class() {
        let rendered = render_predictions(&payload(), 1).unwrap();
        assert_eq!(rendered.task, "Unclog Sink With Baking Soda");
        assert_eq!(rendered.step, "add baking soda to the sink hole");
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let mut bad = payload();
        bad.task_scores.pop();
        let err = render_predictions(&bad, 2).unwrap_err();
        assert!(matches!(err, PromptError::ClassScoreMismatch { .. }));
    }

    #[test]
    fn rejects_out_of_range_topk() {
        let err = render_predictions(&payload(), 4).unwrap_err();
        assert!(matches!(err, PromptError::TopKOutOfRange { .. }));
        let err = render_predictions(&payload(), 0).unwrap_err();
        assert!(matches!(err, PromptError::TopKOutOfRange { .. }));
    }

    #[test]
    fn rejects_negative_scores() {
        let mut bad = payload();
        bad.step_scores[1] = -0.1;
        let err = render_predictions(&bad, 2).unwrap_err();
        assert!(matches!(err, PromptError::NegativeScore { .. }));
    }
}
