//! Dataset build pipeline.
//!
//! A build is a single-threaded pass over annotation splits: each record is
//! either dropped (miss-list, missing prediction) or emitted exactly once as
//! a [`crate::annotation::QaSample`].

pub mod builder;
pub mod config;
pub mod runner;

pub use builder::{BuildOutcome, BuildReport, PromptKind, SampleBuilder, SkipReason};
pub use config::{BuildConfig, CypherConfig, SampleConfig};
pub use runner::{run_build, run_cypher, run_sample};
