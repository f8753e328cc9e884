//! Cosine similarity scoring for embedding vectors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default pass threshold for semantic equivalence.
///
/// Conservative enough that trivially different strings fail while
/// ordinary paraphrases of the same statement pass with
/// sentence-transformer embeddings.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.8;

// ─── SimilarityResult ────────────────────────────────────────────────

/// Outcome of scoring one expected/actual text pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    score: f32,
    threshold: f32,
    passed: bool,
}

impl SimilarityResult {
    /// `passed` is a pure function of score and threshold.
    pub fn new(score: f32, threshold: f32) -> Self {
        Self {
            score,
            threshold,
            passed: score >= threshold,
        }
    }

    /// Cosine score in [-1, 1].
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}

impl fmt::Display for SimilarityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "similarity {:.4} vs threshold {:.2} ({})",
            self.score,
            self.threshold,
            if self.passed { "pass" } else { "fail" },
        )
    }
}

// ─── Cosine ──────────────────────────────────────────────────────────

/// Cosine similarity of two vectors, accumulated in f64.
///
/// Returns `None` for mismatched lengths, empty inputs, or a zero-norm
/// side — degenerate cases the caller must surface, never score.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(*x);
        let y64 = f64::from(*y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(dot / denom)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── cosine basics ───────────────────────────────────────────────

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.3, -0.5, 0.8];
        let s = cosine_similarity(&v, &v).expect("non-degenerate");
        assert!((s - 1.0).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let s = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).expect("non-degenerate");
        assert!(s.abs() < 1e-9);
    }

    #[test]
    fn opposed_vectors_score_negative_one() {
        let s = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).expect("non-degenerate");
        assert!((s + 1.0).abs() < 1e-9);
    }

    #[test]
    fn scale_invariant() {
        let a = [0.1, 0.7, -0.2];
        let b: Vec<f32> = a.iter().map(|x| x * 42.0).collect();
        let s = cosine_similarity(&a, &b).expect("non-degenerate");
        assert!((s - 1.0).abs() < 1e-6);
    }

    // ── degenerate inputs ───────────────────────────────────────────

    #[test]
    fn mismatched_lengths_rejected() {
        assert!(cosine_similarity(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn empty_inputs_rejected() {
        assert!(cosine_similarity(&[], &[]).is_none());
    }

    #[test]
    fn zero_norm_rejected() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).is_none());
    }

    // ── SimilarityResult ────────────────────────────────────────────

    #[test]
    fn passed_is_pure_function_of_score_and_threshold() {
        assert!(SimilarityResult::new(0.85, 0.8).passed());
        assert!(SimilarityResult::new(0.8, 0.8).passed(), "boundary passes");
        assert!(!SimilarityResult::new(0.79, 0.8).passed());
    }

    #[test]
    fn display_reports_verdict() {
        let fail = SimilarityResult::new(0.42, 0.8).to_string();
        assert!(fail.contains("fail"), "got: {fail}");
        let pass = SimilarityResult::new(0.95, 0.8).to_string();
        assert!(pass.contains("pass"), "got: {pass}");
    }

    // ── Property: symmetry ──────────────────────────────────────────

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn vector_pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
            (1usize..32).prop_flat_map(|n| {
                (
                    proptest::collection::vec(-10.0f32..10.0, n),
                    proptest::collection::vec(-10.0f32..10.0, n),
                )
            })
        }

        proptest! {
            #[test]
            fn cosine_is_symmetric((a, b) in vector_pair()) {
                match (cosine_similarity(&a, &b), cosine_similarity(&b, &a)) {
                    (Some(ab), Some(ba)) => prop_assert!((ab - ba).abs() < 1e-9),
                    (None, None) => {}
                    other => prop_assert!(false, "asymmetric degeneracy: {other:?}"),
                }
            }

            #[test]
            fn cosine_is_bounded((a, b) in vector_pair()) {
                if let Some(s) = cosine_similarity(&a, &b) {
                    prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&s));
                }
            }
        }
    }
}
