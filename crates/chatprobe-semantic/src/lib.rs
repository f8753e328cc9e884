//! chatprobe-semantic: semantic-equivalence assertion for captured
//! responses. An embedding backend turns expected/actual text into
//! vectors; cosine similarity against a threshold decides equivalence.
//! The backend loads lazily, once per process, behind an explicit
//! injectable handle.

pub mod assert;
pub mod backend;
pub mod onnx;
pub mod shared;

pub use assert::{SemanticError, assert_semantically_equal, assert_semantically_equal_with, score_similarity};
pub use backend::{BackendError, EmbeddingBackend};
pub use onnx::{OnnxBackend, OnnxConfig};
pub use shared::SharedBackend;
