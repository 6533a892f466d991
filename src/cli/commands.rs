//! CLI command definitions for kgvqa-forge.
//!
//! Four subcommands cover the pipeline: `build` turns annotation splits into
//! SFT sample files, `sample` takes per-type subsets, `cypher` builds
//! Cypher-generation prompts, and `evaluate` scores an answers file.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::eval::{evaluate_answers, load_answers};
use crate::pipeline::{run_build, run_cypher, run_sample, BuildConfig, CypherConfig, SampleConfig};
use crate::prompt::PromptStyle;

/// Default location of the annotation splits.
const DEFAULT_KGVQA_DIR: &str = "data/kgvqa";

/// Multi-choice video QA dataset builder and scorer.
#[derive(Parser)]
#[command(name = "kgvqa-forge")]
#[command(about = "Build and evaluate knowledge-graph video QA datasets")]
#[command(version)]
#[command(
    long_about = "kgvqa-forge turns raw COIN-derived annotation files into chat-style SFT \
                  samples, optionally injecting model predictions or knowledge-graph retrieval \
                  text into the prompts, and scores per-question-type accuracy from an answers \
                  file.\n\nExample usage:\n  kgvqa-forge build --style predictions --pred-file \
                  data/preds.json --out-dir data"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Build SFT sample files from annotation splits.
    Build(BuildArgs),

    /// Take a fixed-size per-question-type subset of one split.
    Sample(SampleArgs),

    /// Build Cypher-generation prompts from one split plus predictions.
    Cypher(CypherArgs),

    /// Score an inference answers file and print per-type accuracy.
    #[command(alias = "eval")]
    Evaluate(EvaluateArgs),
}

/// Arguments for `kgvqa-forge build`.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Directory holding the annotation split files (*.json).
    #[arg(long, default_value = DEFAULT_KGVQA_DIR)]
    pub kgvqa_dir: PathBuf,

    /// Miss-list file name, relative to the annotation directory.
    #[arg(long, default_value = "miss_vid_list.txt")]
    pub miss_vid_file: String,

    /// COIN video directory; omit to leave video paths unresolved.
    #[arg(long)]
    pub video_dir: Option<PathBuf>,

    /// Output directory for the emitted sample files.
    #[arg(short = 'o', long, default_value = "data")]
    pub out_dir: PathBuf,

    /// Only process split files whose stem contains this substring.
    #[arg(long)]
    pub split: Option<String>,

    /// Prompt style: blind, predictions, or retrieval.
    #[arg(long, default_value = "blind")]
    pub style: String,

    /// Prediction file; required unless --style is blind.
    #[arg(long)]
    pub pred_file: Option<PathBuf>,

    /// Retrieval file; required for --style retrieval.
    #[arg(long)]
    pub retrieval_file: Option<PathBuf>,

    /// Prediction entries to display per head.
    #[arg(long, default_value = "3")]
    pub topk: usize,
}

/// Arguments for `kgvqa-forge sample`.
#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Annotation split to sample from.
    #[arg(long)]
    pub in_file: PathBuf,

    /// Miss-list file of video ids to exclude.
    #[arg(long)]
    pub miss_vid_file: PathBuf,

    /// Output file for the sampled subset.
    #[arg(short = 'o', long)]
    pub out_file: PathBuf,

    /// Records to keep per question type.
    #[arg(long, default_value = "30")]
    pub per_type: usize,
}

/// Arguments for `kgvqa-forge cypher`.
#[derive(Parser, Debug)]
pub struct CypherArgs {
    /// Annotation split to build prompts from.
    #[arg(long)]
    pub in_file: PathBuf,

    /// Miss-list file of video ids to exclude.
    #[arg(long)]
    pub miss_vid_file: PathBuf,

    /// Prediction file with top-5 task/step classes per question.
    #[arg(long)]
    pub pred_file: PathBuf,

    /// COIN video directory; omit to leave video paths unresolved.
    #[arg(long)]
    pub video_dir: Option<PathBuf>,

    /// Output file for the prompt samples.
    #[arg(short = 'o', long)]
    pub out_file: PathBuf,

    /// Include a worked example in each prompt.
    #[arg(long)]
    pub use_example: bool,

    /// Prediction entries to render per head.
    #[arg(long, default_value = "5")]
    pub topk: usize,
}

/// Arguments for `kgvqa-forge evaluate`.
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Answers file produced by the inference side.
    #[arg(long)]
    pub answers_file: PathBuf,
}

/// Parses the command line.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI to its command handler.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build(args) => run_build_command(args),
        Commands::Sample(args) => run_sample_command(args),
        Commands::Cypher(args) => run_cypher_command(args),
        Commands::Evaluate(args) => run_evaluate_command(args),
    }
}

fn run_build_command(args: BuildArgs) -> anyhow::Result<()> {
    let style: PromptStyle = args.style.parse()?;
    let config = BuildConfig {
        miss_list_file: args.kgvqa_dir.join(&args.miss_vid_file),
        annotation_dir: args.kgvqa_dir,
        video_dir: args.video_dir,
        out_dir: args.out_dir,
        split_filter: args.split,
        style,
        pred_file: args.pred_file,
        retrieval_file: args.retrieval_file,
        topk: args.topk,
    };
    let report = run_build(&config)?;
    info!(emitted = report.emitted, "Process finished");
    Ok(())
}

fn run_sample_command(args: SampleArgs) -> anyhow::Result<()> {
    let config = SampleConfig {
        annotation_file: args.in_file,
        miss_list_file: args.miss_vid_file,
        out_file: args.out_file,
        per_type: args.per_type,
    };
    let count = run_sample(&config)?;
    info!(records = count, "Process finished");
    Ok(())
}

fn run_cypher_command(args: CypherArgs) -> anyhow::Result<()> {
    let config = CypherConfig {
        annotation_file: args.in_file,
        miss_list_file: args.miss_vid_file,
        pred_file: args.pred_file,
        video_dir: args.video_dir,
        out_file: args.out_file,
        use_example: args.use_example,
        topk: args.topk,
    };
    let report = run_cypher(&config)?;
    info!(emitted = report.emitted, "Process finished");
    Ok(())
}

fn run_evaluate_command(args: EvaluateArgs) -> anyhow::Result<()> {
    let answers = load_answers(&args.answers_file)?;
    let board = evaluate_answers(answers.values());
    println!("{}", board.format_report());
    Ok(())
}
