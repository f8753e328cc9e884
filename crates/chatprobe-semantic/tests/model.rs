//! Integration tests against a real ONNX sentence-embedding model.
//!
//! Ignored by default; point `CHATPROBE_MODEL_DIR` at a directory holding
//! `model.onnx` + `tokenizer.json` (a sentence-transformers paraphrase
//! export) and run with `--ignored`.

use chatprobe_semantic::{
    OnnxConfig, SharedBackend, assert_semantically_equal_with, score_similarity,
};

fn model_backend() -> Option<SharedBackend> {
    let dir = std::env::var("CHATPROBE_MODEL_DIR").ok()?;
    Some(SharedBackend::onnx(OnnxConfig::from_dir(dir, "local-model")))
}

#[test]
#[ignore = "requires CHATPROBE_MODEL_DIR with model.onnx + tokenizer.json"]
fn identical_strings_score_above_099() {
    let Some(backend) = model_backend() else {
        panic!("CHATPROBE_MODEL_DIR is not set");
    };
    let text = "The capital of France is Paris.";
    let result = score_similarity(&backend, text, text, 0.99).expect("model scores");
    assert!(result.score() >= 0.99, "got {}", result.score());
}

#[test]
#[ignore = "requires CHATPROBE_MODEL_DIR with model.onnx + tokenizer.json"]
fn paraphrase_passes_at_point_eight() {
    let Some(backend) = model_backend() else {
        panic!("CHATPROBE_MODEL_DIR is not set");
    };
    let result = assert_semantically_equal_with(
        &backend,
        "The capital of France is Paris.",
        "Paris is France's capital city.",
        0.8,
    )
    .expect("paraphrase should pass at 0.8");
    assert!(result.passed());
}

#[test]
#[ignore = "requires CHATPROBE_MODEL_DIR with model.onnx + tokenizer.json"]
fn unrelated_statement_fails_at_point_eight() {
    let Some(backend) = model_backend() else {
        panic!("CHATPROBE_MODEL_DIR is not set");
    };
    let err = assert_semantically_equal_with(
        &backend,
        "The capital of France is Paris.",
        "The sky is blue.",
        0.8,
    )
    .expect_err("unrelated statement should fail at 0.8");
    let result = err.similarity().expect("assertion failure carries score");
    assert!(result.score() < 0.8, "got {}", result.score());
}

#[test]
#[ignore = "requires CHATPROBE_MODEL_DIR with model.onnx + tokenizer.json"]
fn scores_are_symmetric_within_tolerance() {
    let Some(backend) = model_backend() else {
        panic!("CHATPROBE_MODEL_DIR is not set");
    };
    let a = "Good morning, how may I help you?";
    let b = "Hi, how can I assist you today?";
    let ab = score_similarity(&backend, a, b, 0.5).expect("model scores");
    let ba = score_similarity(&backend, b, a, 0.5).expect("model scores");
    assert!((ab.score() - ba.score()).abs() < 1e-4);
}
