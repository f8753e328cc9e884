//! Demo run: simulated stream → quiescence detection → latency report →
//! optional semantic assertion.

use serde::Serialize;

use chatprobe_core::SimilarityResult;
use chatprobe_semantic::{OnnxConfig, SemanticError, SharedBackend, assert_semantically_equal_with};
use chatprobe_watch::{LatencyScope, region_channel};
use chatprobe_watch::region::DEFAULT_CHANNEL_CAPACITY;

use crate::cli::{Cli, FileConfig, resolve};
use crate::sim;

/// Serializable run summary for `--json` output.
#[derive(Debug, Serialize)]
struct Summary {
    message: String,
    final_text: String,
    completed: bool,
    timed_out: bool,
    time_to_first_change_ms: Option<u64>,
    time_to_completion_ms: u64,
    change_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<SimilarityResult>,
}

/// Run the demo.
///
/// Exit codes: 0 — stream settled (and the semantic assertion, if any,
/// passed); 1 — timeout or failed assertion; 2 — configuration or
/// backend error.
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let resolved = resolve(&cli, &file);

    if let Err(e) = resolved.settings.validate() {
        tracing::error!("invalid wait settings: {e}");
        return Ok(2);
    }

    let reply = sim::reply_for(&cli.message);
    tracing::info!(message = %cli.message, "sending message to simulated chat page");

    // Open the scope before the action that triggers streaming.
    let (tx, sub) = region_channel("", DEFAULT_CHANNEL_CAPACITY);
    let (scope, _handle) = LatencyScope::begin();
    sim::stream_response(tx, reply, resolved.chunk_size, resolved.chunk_delay);

    let (result, metrics) = match scope.measure(sub, resolved.settings).await {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("detection failed: {e}");
            return Ok(2);
        }
    };

    let mut summary = Summary {
        message: cli.message.clone(),
        final_text: result.final_text().to_string(),
        completed: result.is_completed(),
        timed_out: result.is_timed_out(),
        time_to_first_change_ms: metrics.time_to_first_change().map(|d| d.as_millis() as u64),
        time_to_completion_ms: metrics.time_to_completion().as_millis() as u64,
        change_count: metrics.change_count(),
        similarity: None,
    };

    let mut code = if result.is_timed_out() { 1 } else { 0 };

    // Semantic assertion when a model directory and expected answer are
    // both provided.
    if let (Some(dir), Some(expected)) = (&cli.model_dir, &cli.expected) {
        let backend = SharedBackend::onnx(OnnxConfig::from_dir(dir, "chatprobe-demo-model"));
        let expected = expected.clone();
        let actual = summary.final_text.clone();
        let threshold = resolved.threshold;

        let outcome = tokio::task::spawn_blocking(move || {
            assert_semantically_equal_with(&backend, &expected, &actual, threshold)
        })
        .await?;

        match outcome {
            Ok(similarity) => {
                tracing::info!(%similarity, "semantic assertion passed");
                summary.similarity = Some(similarity);
            }
            Err(SemanticError::AssertionFailed(similarity)) => {
                tracing::warn!(%similarity, "semantic assertion failed");
                summary.similarity = Some(similarity);
                code = code.max(1);
            }
            Err(e) => {
                tracing::error!("semantic assertion unavailable: {e}");
                return Ok(2);
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(code)
}

fn print_summary(summary: &Summary) {
    println!("response: {}", summary.final_text);
    println!(
        "outcome:  {}",
        if summary.completed { "settled" } else { "timed out" },
    );
    match summary.time_to_first_change_ms {
        Some(ms) => println!("ttfc:     {ms}ms"),
        None => println!("ttfc:     n/a (no change observed)"),
    }
    println!("total:    {}ms", summary.time_to_completion_ms);
    println!("changes:  {}", summary.change_count);
    if let Some(similarity) = &summary.similarity {
        println!("semantic: {similarity}");
    }
}
