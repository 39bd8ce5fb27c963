use std::fs;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chess_annotator::collaborators::{EmptyOpeningDb, MockEngine, MockHumanMoveModel, NullLlmClient};
use chess_annotator::intent::Density;
use chess_annotator::orchestrator::{annotate_pgn, Collaborators};
use chess_annotator::{AnnotatorConfig, AnnotatorError};

fn git_hash() -> String {
    process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Annotates a PGN game with evaluations, themes, and prose.", long_about = None)]
struct Args {
    /// Path to the PGN file to annotate.
    pgn: String,

    /// Comment density.
    #[arg(long, value_enum, default_value = "normal")]
    verbosity: VerbosityArg,

    /// Skip the LLM collaborator entirely; use deterministic templates.
    #[arg(long)]
    skip_llm: bool,

    /// Reserved for future agentic tool-calling narration; currently a no-op
    /// beyond being recorded in the emitted config.
    #[arg(long)]
    agentic: bool,

    /// Caps how many collaborator calls the agentic narrator may make.
    #[arg(long)]
    max_tool_calls: Option<u32>,

    /// Target player rating used by the human-move-model collaborator.
    #[arg(long, default_value_t = 1500)]
    target_rating: u32,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum VerbosityArg {
    Sparse,
    Normal,
    Verbose,
}

impl From<VerbosityArg> for Density {
    fn from(value: VerbosityArg) -> Self {
        match value {
            VerbosityArg::Sparse => Density::Sparse,
            VerbosityArg::Normal => Density::Normal,
            VerbosityArg::Verbose => Density::Verbose,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    tracing::debug!(git_hash = %git_hash(), "starting chess-annotator");

    let pgn_text = match fs::read_to_string(&args.pgn) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("could not read {}: {err}", args.pgn);
            process::exit(1);
        }
    };

    let config = AnnotatorConfig {
        density: args.verbosity.into(),
        skip_llm: args.skip_llm,
        target_rating: args.target_rating,
        max_tool_calls: args.max_tool_calls,
        ..AnnotatorConfig::default()
    };

    let collaborators = Collaborators {
        engine: Box::new(MockEngine),
        human_model: Box::new(MockHumanMoveModel { engine: MockEngine }),
        opening_db: Box::new(EmptyOpeningDb),
        llm: Box::new(NullLlmClient),
    };

    match annotate_pgn(&pgn_text, &config, &collaborators).await {
        Ok(report) => {
            println!("{}", report.rendered_pgn);
            eprintln!(
                "analyzed {} plies, {} comments, {} transpositions merged",
                report.dag_stats.max_ply, report.comments_emitted, report.dag_stats.transposition_merges
            );
        }
        Err(err) => {
            eprintln!("annotation failed: {err}");
            process::exit(exit_code_for(&err));
        }
    }
}

fn exit_code_for(err: &AnnotatorError) -> i32 {
    match err {
        AnnotatorError::InvalidFen(_) | AnnotatorError::ValidationError(_) => 1,
        AnnotatorError::IllegalMove { .. } | AnnotatorError::NavigationError(_) => 2,
        AnnotatorError::EngineUnavailable(_)
        | AnnotatorError::EngineTimeout(_)
        | AnnotatorError::LlmCircuitOpen { .. }
        | AnnotatorError::LlmRateLimit(_)
        | AnnotatorError::LlmUnavailable(_) => 3,
    }
}
