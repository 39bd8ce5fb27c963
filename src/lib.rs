//! Chess game annotator: reads a PGN, analyzes each position with a
//! pluggable engine/human-model/opening-book/LLM collaborator set, and
//! renders an annotated PGN with NAGs and natural-language comments.

pub mod artifact;
pub mod classify;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod criticality;
pub mod dag;
pub mod error;
pub mod explore;
pub mod hce;
pub mod idea_tracker;
pub mod intent;
pub mod line_memory;
pub mod narrator;
pub mod orchestrator;
pub mod pgn;
pub mod position;
pub mod theme;

pub use config::AnnotatorConfig;
pub use error::{AnnotatorError, Result};
pub use orchestrator::{annotate_pgn, AnnotationReport, Collaborators};
