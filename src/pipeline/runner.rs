//! Build, sample, and cypher run loops.
//!
//! Each run loads its inputs eagerly, makes one sequential pass over the
//! records, and writes a single JSON artifact per split. File-load failures
//! abort the run; per-record conditions are logged and counted.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tracing::{info, warn};

use crate::annotation::QUESTION_TYPES;
use crate::storage::{
    self, list_annotation_files, load_annotations, load_miss_list, load_predictions,
    load_retrieval, VideoIndex,
};

use super::builder::{BuildOutcome, BuildReport, PromptKind, SampleBuilder};
use super::config::{BuildConfig, CypherConfig, SampleConfig};

fn build_video_index(video_dir: Option<&Path>) -> anyhow::Result<VideoIndex> {
    match video_dir {
        Some(dir) => {
            VideoIndex::build(dir).with_context(|| format!("indexing videos under {}", dir.display()))
        }
        None => Ok(VideoIndex::empty()),
    }
}

/// Runs a full dataset build over every matching annotation split.
///
/// Emits `<stem>_vqa.json` per split under the output directory and returns
/// the accumulated counters.
pub fn run_build(config: &BuildConfig) -> anyhow::Result<BuildReport> {
    config.validate()?;

    let miss_list = load_miss_list(&config.miss_list_file)?;
    let predictions = match &config.pred_file {
        Some(path) => load_predictions(path)?,
        None => HashMap::new(),
    };
    let retrieval = match &config.retrieval_file {
        Some(path) => load_retrieval(path)?,
        None => HashMap::new(),
    };
    let video_index = build_video_index(config.video_dir.as_deref())?;

    let splits = list_annotation_files(&config.annotation_dir, config.split_filter.as_deref())?;
    let mut builder = SampleBuilder::new(
        PromptKind::Qa(config.style),
        config.topk,
        miss_list,
        predictions,
        retrieval,
        video_index,
    );

    for split_path in &splits {
        info!(split = %split_path.display(), "Processing split");
        let records = load_annotations(split_path)?;

        let mut samples = Vec::with_capacity(records.len());
        for record in &records {
            if let BuildOutcome::Emitted(sample) = builder.build(record)? {
                samples.push(*sample);
            }
        }

        let stem = split_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out_path = config.out_dir.join(format!("{}_vqa.json", stem));
        storage::write_samples(&out_path, &samples)?;
        info!(samples = samples.len(), out = %out_path.display(), "Wrote split");
    }

    let report = builder.report().clone();
    report.log_summary();
    Ok(report)
}

/// Takes up to `per_type` records per question type from one split,
/// skipping miss-list videos, and writes the subset unchanged.
///
/// Records are kept as raw JSON so fields this crate does not model
/// survive the round trip.
pub fn run_sample(config: &SampleConfig) -> anyhow::Result<usize> {
    let miss_list = load_miss_list(&config.miss_list_file)?;
    let raw = std::fs::read_to_string(&config.annotation_file)
        .with_context(|| format!("reading {}", config.annotation_file.display()))?;
    let records: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", config.annotation_file.display()))?;

    let budget = config.per_type * QUESTION_TYPES.len();
    let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
    let mut taken = 0usize;

    for record in records {
        if taken >= budget {
            break;
        }
        let Some(video_id) = record.get("video_id").and_then(Value::as_str) else {
            warn!("Record without video_id, skipping");
            continue;
        };
        if miss_list.contains(video_id) {
            warn!(video_id, "Video file is missing, skipping record");
            continue;
        }
        let Some(quest_type) = record.get("quest_type").and_then(Value::as_str) else {
            warn!("Record without quest_type, skipping");
            continue;
        };

        let idx = match grouped.iter().position(|(tag, _)| tag == quest_type) {
            Some(idx) => idx,
            None => {
                grouped.push((quest_type.to_string(), Vec::new()));
                grouped.len() - 1
            }
        };
        if grouped[idx].1.len() < config.per_type {
            grouped[idx].1.push(record);
            taken += 1;
        }
    }

    let sampled: Vec<Value> = grouped.into_iter().flat_map(|(_, bucket)| bucket).collect();
    let count = sampled.len();
    storage::write_json(&config.out_file, &Value::Array(sampled))?;
    info!(
        records = count,
        out = %config.out_file.display(),
        "Wrote sampled subset"
    );
    Ok(count)
}

/// Builds Cypher-generation prompts for one split.
pub fn run_cypher(config: &CypherConfig) -> anyhow::Result<BuildReport> {
    let miss_list = load_miss_list(&config.miss_list_file)?;
    let predictions = load_predictions(&config.pred_file)?;
    let video_index = build_video_index(config.video_dir.as_deref())?;

    let records = load_annotations(&config.annotation_file)?;
    let mut builder = SampleBuilder::new(
        PromptKind::Cypher {
            use_example: config.use_example,
        },
        config.topk,
        miss_list,
        predictions,
        HashMap::new(),
        video_index,
    );

    let mut samples = Vec::with_capacity(records.len());
    for record in &records {
        if let BuildOutcome::Emitted(sample) = builder.build(record)? {
            samples.push(*sample);
        }
    }
    storage::write_samples(&config.out_file, &samples)?;
    info!(samples = samples.len(), out = %config.out_file.display(), "Wrote cypher prompts");

    let report = builder.report().clone();
    report.log_summary();
    Ok(report)
}
