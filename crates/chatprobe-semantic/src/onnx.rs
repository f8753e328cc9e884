//! Sentence-transformer inference via ONNX Runtime.
//!
//! Loads a sentence-transformers model exported to ONNX alongside its
//! HuggingFace tokenizer, and produces embeddings by attention-masked
//! mean pooling of the last hidden state. Expects a two-input export
//! (`input_ids`, `attention_mask`), the shape the multilingual
//! paraphrase models ship with.
//!
//! With the `cuda` feature, the CUDA execution provider is registered
//! when present on the host and `is_accelerated` reports true; otherwise
//! inference runs on the CPU path with identical outputs.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::{Array2, ArrayView2};
#[cfg(feature = "cuda")]
use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use ort::session::builder::SessionBuilder;
use ort::{session::Session, session::builder::GraphOptimizationLevel, value::Value};
use tokenizers::Tokenizer;

use crate::backend::{BackendError, EmbeddingBackend};

/// Maximum sequence length for typical sentence-transformers models.
const MAX_SEQUENCE_LENGTH: usize = 512;

/// File locations for one ONNX sentence-embedding model.
#[derive(Debug, Clone)]
pub struct OnnxConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    /// Model identifier, for diagnostics only.
    pub model_name: String,
}

impl OnnxConfig {
    /// Conventional layout: `<dir>/model.onnx` + `<dir>/tokenizer.json`.
    pub fn from_dir(dir: impl AsRef<Path>, model_name: impl Into<String>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join("model.onnx"),
            tokenizer_path: dir.join("tokenizer.json"),
            model_name: model_name.into(),
        }
    }
}

/// ONNX Runtime embedding backend.
pub struct OnnxBackend {
    tokenizer: Tokenizer,
    // ort sessions take &mut self to run; serialize inference.
    session: Mutex<Session>,
    accelerated: bool,
    model_name: String,
}

impl OnnxBackend {
    /// Load the model and tokenizer. Expensive; do it once and share via
    /// [`crate::shared::SharedBackend`].
    pub fn load(config: &OnnxConfig) -> Result<Self, BackendError> {
        let tokenizer = Tokenizer::from_file(&config.tokenizer_path).map_err(|e| {
            BackendError::InitializationFailed(format!(
                "failed to load tokenizer from {}: {e}",
                config.tokenizer_path.display()
            ))
        })?;

        let builder = Session::builder()
            .map_err(|e| {
                BackendError::InitializationFailed(format!("ONNX Runtime init failed: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                BackendError::InitializationFailed(format!("ONNX optimization failed: {e}"))
            })?;

        let (builder, accelerated) = register_accelerator(builder)?;

        let session = builder.commit_from_file(&config.model_path).map_err(|e| {
            BackendError::InitializationFailed(format!(
                "failed to load ONNX model from {}: {e}",
                config.model_path.display()
            ))
        })?;

        tracing::debug!(
            model = %config.model_name,
            accelerated,
            "embedding backend loaded"
        );

        Ok(Self {
            tokenizer,
            session: Mutex::new(session),
            accelerated,
            model_name: config.model_name.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| BackendError::EncodingFailed(format!("tokenization failed: {e}")))?;

        let token_ids = encoding.get_ids();
        let attention_mask = encoding.get_attention_mask();

        if token_ids.len() > MAX_SEQUENCE_LENGTH {
            return Err(BackendError::TextTooLong {
                got: token_ids.len(),
                max: MAX_SEQUENCE_LENGTH,
            });
        }

        let input_ids = Array2::from_shape_vec(
            (1, token_ids.len()),
            token_ids.iter().map(|&id| i64::from(id)).collect(),
        )
        .map_err(|e| BackendError::EncodingFailed(format!("failed to build input tensor: {e}")))?;

        let mask = Array2::from_shape_vec(
            (1, attention_mask.len()),
            attention_mask.iter().map(|&m| i64::from(m)).collect(),
        )
        .map_err(|e| BackendError::EncodingFailed(format!("failed to build mask tensor: {e}")))?;

        let input_ids_value = Value::from_array(input_ids).map_err(|e| {
            BackendError::EncodingFailed(format!("failed to build input value: {e}"))
        })?;
        let mask_value = Value::from_array(mask.clone()).map_err(|e| {
            BackendError::EncodingFailed(format!("failed to build mask value: {e}"))
        })?;

        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_value,
                "attention_mask" => mask_value
            ])
            .map_err(|e| BackendError::EncodingFailed(format!("ONNX inference failed: {e}")))?;

        // Last hidden state: (batch, seq_len, hidden)
        let (shape, data) = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            BackendError::EncodingFailed(format!("failed to extract output tensor: {e}"))
        })?;

        let dims = shape.as_ref();
        let seq_len = dims[1] as usize;
        let hidden = dims[2] as usize;

        let hidden_states = ArrayView2::from_shape((seq_len, hidden), data).map_err(|e| {
            BackendError::EncodingFailed(format!("failed to reshape output: {e}"))
        })?;

        Ok(mean_pool(&hidden_states, &mask))
    }

    pub fn max_sequence_length(&self) -> usize {
        MAX_SEQUENCE_LENGTH
    }
}

impl EmbeddingBackend for OnnxBackend {
    fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        self.encode(text)
    }

    fn is_accelerated(&self) -> bool {
        self.accelerated
    }
}

/// Register a compute accelerator on the session when one is present.
/// Returns whether inference will run accelerated.
#[cfg(feature = "cuda")]
fn register_accelerator(builder: SessionBuilder) -> Result<(SessionBuilder, bool), BackendError> {
    let cuda = CUDAExecutionProvider::default();
    if cuda.is_available().unwrap_or(false) {
        let builder = builder
            .with_execution_providers([cuda.build()])
            .map_err(|e| {
                BackendError::InitializationFailed(format!(
                    "CUDA execution provider registration failed: {e}"
                ))
            })?;
        return Ok((builder, true));
    }
    Ok((builder, false))
}

#[cfg(not(feature = "cuda"))]
fn register_accelerator(builder: SessionBuilder) -> Result<(SessionBuilder, bool), BackendError> {
    Ok((builder, false))
}

/// Attention-masked mean pooling over the sequence dimension, the
/// standard sentence-transformers pooling strategy.
fn mean_pool(embeddings: &ArrayView2<f32>, attention_mask: &Array2<i64>) -> Vec<f32> {
    let seq_len = embeddings.shape()[0];
    let hidden = embeddings.shape()[1];

    let mut pooled = vec![0.0; hidden];
    let mut mask_sum = 0.0f32;

    for t in 0..seq_len {
        let mask_value = attention_mask[[0, t]] as f32;
        mask_sum += mask_value;
        for h in 0..hidden {
            pooled[h] += embeddings[[t, h]] * mask_value;
        }
    }

    if mask_sum > 0.0 {
        for value in &mut pooled {
            *value /= mask_sum;
        }
    }

    pooled
}
