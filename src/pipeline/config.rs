//! Configuration for the dataset build commands.

use std::path::PathBuf;

use crate::error::PromptError;
use crate::prompt::PromptStyle;

/// Configuration for a `build` run over annotation splits.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding the annotation split files (*.json) and miss-list.
    pub annotation_dir: PathBuf,
    /// Newline-delimited video ids to exclude.
    pub miss_list_file: PathBuf,
    /// COIN video directory; when absent, video paths stay unresolved.
    pub video_dir: Option<PathBuf>,
    /// Output directory for the emitted sample files.
    pub out_dir: PathBuf,
    /// Only process split files whose stem contains this substring.
    pub split_filter: Option<String>,
    /// Which auxiliary signals the prompts carry.
    pub style: PromptStyle,
    /// Prediction file; required unless `style` is blind.
    pub pred_file: Option<PathBuf>,
    /// Retrieval file; required for the retrieval style.
    pub retrieval_file: Option<PathBuf>,
    /// How many prediction entries to display per head.
    pub topk: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            annotation_dir: PathBuf::from("data/kgvqa"),
            miss_list_file: PathBuf::from("data/kgvqa/miss_vid_list.txt"),
            video_dir: None,
            out_dir: PathBuf::from("data"),
            split_filter: None,
            style: PromptStyle::Blind,
            pred_file: None,
            retrieval_file: None,
            topk: 3,
        }
    }
}

impl BuildConfig {
    /// Checks that the selected prompt style has the files it needs.
    pub fn validate(&self) -> Result<(), PromptError> {
        if self.style.needs_predictions() && self.pred_file.is_none() {
            return Err(PromptError::MissingPredictionFile {
                style: self.style.to_string(),
            });
        }
        if self.style.needs_retrieval() && self.retrieval_file.is_none() {
            return Err(PromptError::MissingRetrievalFile);
        }
        Ok(())
    }
}

/// Configuration for a `sample` run: a per-type subset of one split.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub annotation_file: PathBuf,
    pub miss_list_file: PathBuf,
    pub out_file: PathBuf,
    /// Records to keep per question type.
    pub per_type: usize,
}

/// Configuration for a `cypher` run: Cypher-generation prompts for one split.
#[derive(Debug, Clone)]
pub struct CypherConfig {
    pub annotation_file: PathBuf,
    pub miss_list_file: PathBuf,
    pub pred_file: PathBuf,
    pub video_dir: Option<PathBuf>,
    pub out_file: PathBuf,
    /// Include the worked example in each prompt.
    pub use_example: bool,
    /// Prediction entries to render per head.
    pub topk: usize,
}
