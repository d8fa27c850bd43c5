use thiserror::Error;

use triage_vector::error::IndexError;

/// Typed error variants for the resolution engine.
///
/// Every failure surfaces distinctly; there is no silent fallback and no
/// default answer. An empty retrieval result is not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input record or query — the caller's fault, not retried.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Embedding backend unreachable or misbehaving; aborts the enclosing
    /// operation, never substitutes zero vectors.
    #[error("Embedding backend unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Generation backend unreachable or timed out; no partial answer.
    #[error("Generation backend unavailable: {0}")]
    GenerationUnavailable(String),

    /// Persisted index corrupt, unreadable, or built with another model.
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl EngineError {
    /// Machine-readable error code, reported alongside JSON-RPC errors.
    pub fn code(&self) -> &str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::EmbeddingUnavailable(_) => "EMBEDDING_UNAVAILABLE",
            Self::GenerationUnavailable(_) => "GENERATION_UNAVAILABLE",
            Self::Index(e) => e.code(),
        }
    }
}
