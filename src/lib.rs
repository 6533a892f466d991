//! kgvqa-forge: dataset builder and scorer for knowledge-graph video QA.
//!
//! This library turns COIN-derived annotation files into chat-style SFT
//! samples and scores per-question-type accuracy from inference answers.

// Core modules
pub mod annotation;
pub mod cli;
pub mod error;
pub mod eval;
pub mod labels;
pub mod options;
pub mod pipeline;
pub mod prompt;
pub mod signals;
pub mod storage;

// Re-export commonly used error types
pub use error::{DatasetError, EvalError, PromptError};
