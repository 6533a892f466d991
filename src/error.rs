//! Error types for kgvqa-forge operations.
//!
//! Defines error types for the major subsystems:
//! - Dataset loading and sample construction
//! - Prompt assembly and signal rendering
//! - Answer-file evaluation

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading inputs or building samples.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}' as JSON: {source}")]
    FileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No annotation files found under '{0}'")]
    NoAnnotationFiles(PathBuf),

    #[error("Prediction entry for '{0}' has no class/score data")]
    EmptyPrediction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during prompt assembly and signal rendering.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Unknown prompt style '{0}': must be 'blind', 'predictions', or 'retrieval'")]
    UnknownStyle(String),

    #[error("Prompt style '{style}' requires a prediction file")]
    MissingPredictionFile { style: String },

    #[error("Prompt style 'retrieval' requires a retrieval file")]
    MissingRetrievalFile,

    #[error("Prediction head '{head}' has {classes} classes but {scores} scores")]
    ClassScoreMismatch {
        head: String,
        classes: usize,
        scores: usize,
    },

    #[error("Requested top-{requested} but prediction head '{head}' only has {available} entries")]
    TopKOutOfRange {
        head: String,
        requested: usize,
        available: usize,
    },

    #[error("Prediction head '{head}' has a negative score: {score}")]
    NegativeScore { head: String, score: f64 },

    #[error("Displayed scores for head '{head}' sum to zero, cannot normalize")]
    ZeroScoreSum { head: String },

    #[error("Unrecognized retrieval shape: {0}")]
    UnrecognizedRetrievalShape(String),
}

/// Errors that can occur while scoring an answers file.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Failed to read answers file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse answers file '{path}': {source}")]
    FileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Answers file '{0}' contains no records")]
    EmptyAnswers(PathBuf),
}
