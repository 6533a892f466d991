//! File loading and artifact writing.
//!
//! Every input file is loaded eagerly at startup and held as a read-only
//! lookup structure for the rest of the run. Load failures are fatal;
//! there is no partial recovery.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::annotation::{AnnotationRecord, QaSample, UNRESOLVED_VIDEO};
use crate::error::DatasetError;
use crate::signals::{PredictionPayload, RetrievalPayload};

fn read_to_string(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path).map_err(|source| DatasetError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, raw: &str) -> Result<T, DatasetError> {
    serde_json::from_str(raw).map_err(|source| DatasetError::FileParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads one annotation split: a JSON array of records.
pub fn load_annotations(path: &Path) -> Result<Vec<AnnotationRecord>, DatasetError> {
    let raw = read_to_string(path)?;
    parse_json(path, &raw)
}

/// Loads the newline-delimited list of video ids with no video file.
pub fn load_miss_list(path: &Path) -> Result<HashSet<String>, DatasetError> {
    let raw = read_to_string(path)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Loads the prediction file: a JSON array of single-key {qid: payload} maps.
pub fn load_predictions(path: &Path) -> Result<HashMap<String, PredictionPayload>, DatasetError> {
    let raw = read_to_string(path)?;
    let entries: Vec<HashMap<String, PredictionPayload>> = parse_json(path, &raw)?;

    let mut predictions = HashMap::new();
    for entry in entries {
        for (qid, payload) in entry {
            if payload.task_classes.is_empty() || payload.step_classes.is_empty() {
                return Err(DatasetError::EmptyPrediction(qid));
            }
            predictions.insert(qid, payload);
        }
    }
    Ok(predictions)
}

/// Loads the retrieval file: a JSON mapping {qid: retrieval payload}.
pub fn load_retrieval(path: &Path) -> Result<HashMap<String, RetrievalPayload>, DatasetError> {
    let raw = read_to_string(path)?;
    parse_json(path, &raw)
}

/// Lists annotation split files (*.json) under a directory, sorted by name.
/// With `split_filter` set, only file stems containing the filter are kept.
pub fn list_annotation_files(
    dir: &Path,
    split_filter: Option<&str>,
) -> Result<Vec<PathBuf>, DatasetError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| DatasetError::FileRead {
        path: dir.to_path_buf(),
        source,
    })? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(filter) = split_filter {
            if !stem.contains(filter) {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    if files.is_empty() {
        return Err(DatasetError::NoAnnotationFiles(dir.to_path_buf()));
    }
    Ok(files)
}

/// Writes the emitted samples as a pretty-printed JSON array.
pub fn write_samples(path: &Path, samples: &[QaSample]) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(samples)?;
    fs::write(path, json)?;
    Ok(())
}

/// Writes an arbitrary JSON value as a pretty-printed artifact.
pub fn write_json(path: &Path, value: &Value) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Index of video files under the video directory, built once per run.
///
/// COIN video files embed the video id in the file name, so resolution is a
/// substring match against the indexed file names.
#[derive(Debug, Default)]
pub struct VideoIndex {
    /// (file name, path relative to the video directory)
    entries: Vec<(String, String)>,
}

impl VideoIndex {
    /// Walks the video directory and indexes every file found.
    pub fn build(video_dir: &Path) -> Result<Self, DatasetError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(video_dir) {
            let entry = entry.map_err(|err| DatasetError::FileRead {
                path: video_dir.to_path_buf(),
                source: err.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let relative = entry
                .path()
                .strip_prefix(video_dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            entries.push((name, relative));
        }
        debug!(files = entries.len(), dir = %video_dir.display(), "Indexed video directory");
        Ok(Self { entries })
    }

    /// An index that resolves nothing; used when no video directory is given.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves a video id to a relative path, or the "None" sentinel.
    pub fn resolve(&self, video_id: &str) -> String {
        self.entries
            .iter()
            .find(|(name, _)| name.contains(video_id))
            .map(|(_, path)| path.clone())
            .unwrap_or_else(|| UNRESOLVED_VIDEO.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn miss_list_trims_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("miss.txt");
        fs::write(&path, "abc123\n\n  def456  \n").unwrap();

        let miss = load_miss_list(&path).unwrap();
        assert_eq!(miss.len(), 2);
        assert!(miss.contains("abc123"));
        assert!(miss.contains("def456"));
    }

    #[test]
    fn predictions_flatten_single_key_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preds.json");
        fs::write(
            &path,
            r#"[{"qa1_step2tool_1": {
                "task_top5_classes": ["A"], "task_top5_scores": [1.0],
                "step_top5_classes": ["s"], "step_top5_scores": [1.0]
            }}]"#,
        )
        .unwrap();

        let preds = load_predictions(&path).unwrap();
        assert!(preds.contains_key("qa1_step2tool_1"));
    }

    #[test]
    fn video_index_resolves_by_id_substring() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("cooking");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("XyZ_8ATOBmPvMho.mp4"), b"").unwrap();

        let index = VideoIndex::build(dir.path()).unwrap();
        assert_eq!(
            index.resolve("8ATOBmPvMho"),
            format!("cooking{}XyZ_8ATOBmPvMho.mp4", std::path::MAIN_SEPARATOR)
        );
        assert_eq!(index.resolve("missing"), UNRESOLVED_VIDEO);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_annotations(Path::new("/nonexistent/annotations.json")).unwrap_err();
        assert!(matches!(err, DatasetError::FileRead { .. }));
    }
}
