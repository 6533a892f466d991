//! Per-question-type accuracy counters.
//!
//! Ground truth is the full expected-answer string "<index> <text>" and the
//! prediction is just the choice token, so correctness is a substring test,
//! not equality. Totals start at a small epsilon so accuracy reads 0.0
//! before any update instead of dividing by zero.

use crate::annotation::QUESTION_TYPES;

/// Initial bucket total; keeps `get_accuracy` defined before any update.
const INITIAL_TOTAL: f64 = 1e-8;

/// Correct/total counter for one question-type bucket.
#[derive(Debug, Clone)]
pub struct TypeAccuracy {
    name: String,
    correct: u64,
    total: f64,
}

impl TypeAccuracy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            correct: 0,
            total: INITIAL_TOTAL,
        }
    }

    /// Records one attempt. Correct when the predicted token appears in the
    /// ground-truth string. An empty token never matches.
    pub fn update(&mut self, ground_truth: &str, predicted: &str) {
        self.total += 1.0;
        if !predicted.is_empty() && ground_truth.contains(predicted) {
            self.correct += 1;
        }
    }

    /// Accuracy as correct/total; 0.0 before any update.
    pub fn get_accuracy(&self) -> f64 {
        self.correct as f64 / self.total
    }

    /// One report line, e.g. "qa1_ Accuracy: 0.6667 | 2/3".
    pub fn format_line(&self) -> String {
        format!(
            "{} Accuracy: {:.4} | {}/{}",
            self.name,
            self.get_accuracy(),
            self.correct,
            self.total as u64
        )
    }
}

/// All accuracy buckets for one evaluation run: one per question type plus
/// the Global bucket. One instance per run, owned by the caller.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    global: TypeAccuracy,
    buckets: Vec<TypeAccuracy>,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Scoreboard {
    pub fn new() -> Self {
        Self {
            global: TypeAccuracy::new("Global"),
            buckets: (1..=QUESTION_TYPES.len())
                .map(|n| TypeAccuracy::new(format!("qa{}_", n)))
                .collect(),
        }
    }

    /// Records one result against the Global bucket and every type bucket
    /// whose "qa<N>_" prefix appears in the question-type tag.
    pub fn update(&mut self, quest_type: &str, ground_truth: &str, predicted: &str) {
        self.global.update(ground_truth, predicted);
        let mut matched = false;
        for (n, bucket) in self.buckets.iter_mut().enumerate() {
            if quest_type.contains(&format!("qa{}_", n + 1)) {
                bucket.update(ground_truth, predicted);
                matched = true;
            }
        }
        if !matched {
            tracing::warn!(quest_type, "Question type matches no accuracy bucket");
        }
    }

    pub fn global_accuracy(&self) -> f64 {
        self.global.get_accuracy()
    }

    /// Unweighted mean accuracy across all type buckets. Divides by the
    /// bucket count so rare question types weigh the same as common ones.
    pub fn mean_accuracy_over_types(&self) -> f64 {
        let sum: f64 = self.buckets.iter().map(TypeAccuracy::get_accuracy).sum();
        sum / self.buckets.len() as f64
    }

    /// The full multi-line report: per-type lines, Global, and the mean.
    pub fn format_report(&self) -> String {
        let rule = "-".repeat(25);
        let mut lines = vec![rule.clone()];
        for bucket in &self.buckets {
            lines.push(bucket.format_line());
        }
        lines.push(self.global.format_line());
        lines.push(rule);
        lines.push(format!(
            "Average Acc over Type: {:.4}",
            self.mean_accuracy_over_types()
        ));
        lines.join("\n")
    }
}
