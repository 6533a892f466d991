//! Answer scoring and accuracy aggregation.

pub mod accuracy;
pub mod answers;

pub use accuracy::{Scoreboard, TypeAccuracy};
pub use answers::{evaluate_answers, load_answers, AnswerRecord};
