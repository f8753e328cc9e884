//! chatprobe-core: shared types for streaming-response test probes.
//! Pure data and math — timelines, wait settings, latency metrics,
//! similarity scoring. No async, no IO; the watch and semantic crates
//! build on these.

pub mod error;
pub mod metrics;
pub mod settings;
pub mod similarity;
pub mod timeline;

pub use error::ConfigError;
pub use metrics::LatencyMetrics;
pub use settings::WaitSettings;
pub use similarity::{DEFAULT_SIMILARITY_THRESHOLD, SimilarityResult, cosine_similarity};
pub use timeline::{ChangeEvent, QuiescenceResult, Timeline};
