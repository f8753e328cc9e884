//! Process-wide shared backend handle.
//!
//! Model loading is expensive, so the host constructs one [`SharedBackend`]
//! and shares it by reference into every assertion call. The underlying
//! backend is built lazily on first use behind a synchronized one-time
//! initialization cell: concurrent first users race to a single load, and
//! processes that never assert semantically never pay the load cost.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::backend::{BackendError, EmbeddingBackend};
use crate::onnx::{OnnxBackend, OnnxConfig};

type Loader = dyn Fn() -> Result<Arc<dyn EmbeddingBackend>, BackendError> + Send + Sync;

/// Lazily-initialized, process-shared embedding backend.
pub struct SharedBackend {
    cell: OnceCell<Arc<dyn EmbeddingBackend>>,
    loader: Box<Loader>,
}

impl SharedBackend {
    /// Wrap an arbitrary loader. The loader runs at most once
    /// successfully; a failed load propagates to the caller that
    /// triggered it and the next caller tries again.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn EmbeddingBackend>, BackendError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Box::new(loader),
        }
    }

    /// Lazy ONNX backend for the given model files.
    pub fn onnx(config: OnnxConfig) -> Self {
        Self::new(move || {
            let backend = OnnxBackend::load(&config)?;
            Ok(Arc::new(backend) as Arc<dyn EmbeddingBackend>)
        })
    }

    /// Wrap an already-constructed backend (tests, custom hosts).
    pub fn from_backend(backend: Arc<dyn EmbeddingBackend>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Arc::clone(&backend));
        Self {
            cell,
            loader: Box::new(move || Ok(Arc::clone(&backend))),
        }
    }

    /// The backend, loading it on first use.
    pub fn get(&self) -> Result<&Arc<dyn EmbeddingBackend>, BackendError> {
        self.cell.get_or_try_init(|| (self.loader)())
    }

    /// True once a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
