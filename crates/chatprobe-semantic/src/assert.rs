//! Semantic-equivalence scoring and assertion.
//!
//! Three failure kinds stay distinct: a [`ConfigError`] for inputs that
//! must never reach the backend (empty text), a [`BackendError`] for
//! infrastructure problems, and `AssertionFailed` carrying the full
//! [`SimilarityResult`] for diagnostics. None of them are retried here;
//! retry policy belongs to the caller.

use thiserror::Error;

use chatprobe_core::{
    ConfigError, DEFAULT_SIMILARITY_THRESHOLD, SimilarityResult, cosine_similarity,
};

use crate::backend::BackendError;
use crate::shared::SharedBackend;

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("embedding backend unavailable: {0}")]
    Backend(#[from] BackendError),

    #[error("semantic assertion failed: {0}")]
    AssertionFailed(SimilarityResult),
}

impl SemanticError {
    /// The similarity result behind an assertion failure, if that is what
    /// this error is.
    pub fn similarity(&self) -> Option<SimilarityResult> {
        match self {
            Self::AssertionFailed(result) => Some(*result),
            _ => None,
        }
    }
}

/// Score two texts without asserting.
///
/// Empty or all-whitespace input on either side is a configuration
/// error — never silently scored.
pub fn score_similarity(
    backend: &SharedBackend,
    expected: &str,
    actual: &str,
    threshold: f32,
) -> Result<SimilarityResult, SemanticError> {
    require_text("expected", expected)?;
    require_text("actual", actual)?;

    let backend = backend.get()?;
    let expected_vec = backend.embed(expected)?;
    let actual_vec = backend.embed(actual)?;

    let score = cosine_similarity(&expected_vec, &actual_vec).ok_or_else(|| {
        BackendError::DegenerateEmbedding(format!(
            "cannot score vectors of lengths {} and {}",
            expected_vec.len(),
            actual_vec.len()
        ))
    })?;

    let result = SimilarityResult::new(score as f32, threshold);
    tracing::debug!(
        score = f64::from(result.score()),
        threshold = f64::from(threshold),
        passed = result.passed(),
        "scored similarity"
    );
    Ok(result)
}

/// Assert semantic equivalence at the default threshold.
///
/// Returns the [`SimilarityResult`] when it passes; fails with
/// [`SemanticError::AssertionFailed`] carrying the result otherwise.
pub fn assert_semantically_equal(
    backend: &SharedBackend,
    expected: &str,
    actual: &str,
) -> Result<SimilarityResult, SemanticError> {
    assert_semantically_equal_with(backend, expected, actual, DEFAULT_SIMILARITY_THRESHOLD)
}

/// Assert semantic equivalence at a caller-chosen threshold.
pub fn assert_semantically_equal_with(
    backend: &SharedBackend,
    expected: &str,
    actual: &str,
    threshold: f32,
) -> Result<SimilarityResult, SemanticError> {
    let result = score_similarity(backend, expected, actual, threshold)?;
    if result.passed() {
        Ok(result)
    } else {
        Err(SemanticError::AssertionFailed(result))
    }
}

fn require_text(side: &'static str, text: &str) -> Result<(), ConfigError> {
    if text.trim().is_empty() {
        return Err(ConfigError::EmptyText { side });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
