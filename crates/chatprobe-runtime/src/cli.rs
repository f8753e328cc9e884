//! CLI definition using clap derive, plus the optional TOML config layer.
//!
//! Precedence: CLI flag > config file > built-in default.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use chatprobe_core::WaitSettings;

#[derive(Parser)]
#[command(name = "chatprobe", about = "streaming chat UI test probe demo")]
pub struct Cli {
    /// Message to "send" to the simulated chat page
    #[arg(long, default_value = "hello")]
    pub message: String,

    /// Inactivity window (ms) required to declare the stream settled
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Absolute cap (ms) on the total wait
    #[arg(long)]
    pub max_ms: Option<u64>,

    /// Settlement re-check granularity (ms)
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Delay between simulated stream chunks (ms)
    #[arg(long)]
    pub chunk_delay_ms: Option<u64>,

    /// Characters per simulated stream chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Optional TOML config file with the same knobs
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Expected answer for the semantic assertion
    #[arg(long)]
    pub expected: Option<String>,

    /// Similarity threshold for the semantic assertion
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Directory holding model.onnx + tokenizer.json; enables the
    /// semantic assertion
    #[arg(long, env = "CHATPROBE_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Emit the run summary as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Knobs loadable from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub settle_ms: Option<u64>,
    pub max_ms: Option<u64>,
    pub poll_ms: Option<u64>,
    pub chunk_delay_ms: Option<u64>,
    pub chunk_size: Option<usize>,
    pub threshold: Option<f32>,
}

impl FileConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Resolved demo parameters after merging flag, file, and default layers.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: WaitSettings,
    pub chunk_delay: Duration,
    pub chunk_size: usize,
    pub threshold: f32,
}

pub fn resolve(cli: &Cli, file: &FileConfig) -> Resolved {
    let defaults = WaitSettings::default();
    let pick_ms = |flag: Option<u64>, file: Option<u64>, default: Duration| {
        flag.or(file).map(Duration::from_millis).unwrap_or(default)
    };

    Resolved {
        settings: WaitSettings {
            settle: pick_ms(cli.settle_ms, file.settle_ms, defaults.settle),
            max_wait: pick_ms(cli.max_ms, file.max_ms, defaults.max_wait),
            poll_interval: pick_ms(cli.poll_ms, file.poll_ms, defaults.poll_interval),
        },
        chunk_delay: pick_ms(
            cli.chunk_delay_ms,
            file.chunk_delay_ms,
            Duration::from_millis(35),
        ),
        chunk_size: cli.chunk_size.or(file.chunk_size).unwrap_or(3),
        threshold: cli
            .threshold
            .or(file.threshold)
            .unwrap_or(chatprobe_core::DEFAULT_SIMILARITY_THRESHOLD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_cli() -> Cli {
        Cli::parse_from(["chatprobe"])
    }

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let r = resolve(&bare_cli(), &FileConfig::default());
        assert_eq!(r.settings, WaitSettings::default());
        assert_eq!(r.chunk_size, 3);
        assert_eq!(r.threshold, chatprobe_core::DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn file_overrides_defaults() {
        let file: FileConfig = toml::from_str("settle_ms = 250\nthreshold = 0.6").expect("valid");
        let r = resolve(&bare_cli(), &file);
        assert_eq!(r.settings.settle, Duration::from_millis(250));
        assert_eq!(r.threshold, 0.6);
        // Untouched knobs keep defaults.
        assert_eq!(r.settings.max_wait, WaitSettings::default().max_wait);
    }

    #[test]
    fn flags_override_file() {
        let cli = Cli::parse_from(["chatprobe", "--settle-ms", "500"]);
        let file: FileConfig = toml::from_str("settle_ms = 250").expect("valid");
        let r = resolve(&cli, &file);
        assert_eq!(r.settings.settle, Duration::from_millis(500));
    }

    #[test]
    fn unknown_config_keys_rejected() {
        let parsed: Result<FileConfig, _> = toml::from_str("settle_msec = 250");
        assert!(parsed.is_err());
    }
}
