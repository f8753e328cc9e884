//! Embedding backend boundary.
//!
//! The core requires only two things of a backend: `embed` and an
//! informational `is_accelerated`. The trait is synchronous, like other
//! IO boundaries in this workspace; async callers wrap calls in
//! `spawn_blocking`.

use thiserror::Error;

/// Failure to load or use an embedding backend. Distinct from an
/// assertion failure: this is an infrastructure problem.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Model or tokenizer could not be loaded.
    #[error("backend initialization failed: {0}")]
    InitializationFailed(String),

    /// Text exceeds the model's maximum sequence length.
    #[error("text exceeds maximum sequence length: got {got} tokens, max {max}")]
    TextTooLong { got: usize, max: usize },

    /// Tokenization, inference, or post-processing failed.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// The backend produced a vector that cannot be scored
    /// (zero norm, or a length mismatch between the two sides).
    #[error("degenerate embedding: {0}")]
    DegenerateEmbedding(String),
}

/// A sentence-embedding backend.
///
/// Implementations must be safe for concurrent read-only use once
/// constructed; the shared handle guarantees single construction.
pub trait EmbeddingBackend: Send + Sync {
    /// Embed one text into a fixed-length vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;

    /// Whether a compute accelerator backs this instance. Informational
    /// only — the contract is identical either way, just slower on the
    /// general-purpose path.
    fn is_accelerated(&self) -> bool;
}
