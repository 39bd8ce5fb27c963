//! Error taxonomy for the annotation core.

use thiserror::Error;

/// Errors surfaced by the analysis core.
///
/// Recoverable failures are handled locally where they occur (an engine
/// timeout skips that candidate, a circuit-open LLM call falls back to the
/// template narrator); everything else propagates to the nearest phase
/// boundary in the orchestrator.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("illegal move {uci} in position {fen}")]
    IllegalMove { fen: String, uci: String },

    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("engine call timed out after {0:?}")]
    EngineTimeout(std::time::Duration),

    #[error("LLM circuit breaker open, retry after {retry_after:?}")]
    LlmCircuitOpen { retry_after: std::time::Duration },

    #[error("LLM rate limited: {0}")]
    LlmRateLimit(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DAG navigation error: {0}")]
    NavigationError(String),
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;
