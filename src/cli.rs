//! Command-line interface for livescribe.
//!
//! Provides argument parsing using clap derive macros and resolution into a
//! [`SessionConfig`].

use crate::config::{DeviceSelector, SessionConfig, SessionMode};
use crate::defaults;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Whisper model variants accepted by `--model`.
pub const MODEL_CHOICES: &[&str] = &[
    "tiny.en", "base.en", "tiny", "base", "small", "medium", "large",
];

/// Live audio transcription with Whisper
#[derive(Parser, Debug)]
#[command(name = "livescribe", version, about = "Live audio transcription with Whisper")]
pub struct Cli {
    /// Input audio file (if not specified, captures from an input device)
    #[arg(long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Output file to save transcriptions (append-only, cleared at session start)
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Disable timestamps in output
    #[arg(long)]
    pub no_timestamps: bool,

    /// Whisper model to use
    #[arg(long, default_value = defaults::DEFAULT_MODEL, value_parser = clap::builder::PossibleValuesParser::new(MODEL_CHOICES))]
    pub model: String,

    /// Language code for transcription (auto, en, de, es, fr, ...)
    #[arg(long, value_name = "LANG", default_value = defaults::DEFAULT_LANGUAGE)]
    pub language: String,

    /// List available audio devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Input device index (overrides name matching)
    #[arg(long, value_name = "INDEX")]
    pub input_device: Option<usize>,

    /// Device name substring searched when no index is given
    #[arg(long, value_name = "SUBSTRING", default_value = defaults::DEVICE_MATCH)]
    pub device_match: String,

    /// Audio sample rate in Hz
    #[arg(long, value_name = "HZ", default_value_t = defaults::SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Chunk duration in seconds for live transcription
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = defaults::CHUNK_DURATION_MS as f64 / 1000.0,
        value_parser = parse_chunk_duration
    )]
    pub chunk_duration: f64,

    /// Number of CPU threads for inference (default: auto)
    #[arg(long, value_name = "THREADS")]
    pub threads: Option<usize>,
}

/// Parse and validate the chunk duration flag.
fn parse_chunk_duration(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("invalid duration: {s}"))?;
    if secs <= 0.0 || !secs.is_finite() {
        return Err("chunk duration must be a positive number of seconds".to_string());
    }
    Ok(secs)
}

impl Cli {
    /// Resolve parsed arguments into a [`SessionConfig`].
    pub fn into_config(self) -> SessionConfig {
        let mode = match self.input_file {
            Some(path) => SessionMode::File { path },
            None => SessionMode::Live {
                device: match self.input_device {
                    Some(index) => DeviceSelector::Index(index),
                    None => DeviceSelector::NameContains {
                        pattern: self.device_match,
                        fallback_index: defaults::FALLBACK_DEVICE_INDEX,
                    },
                },
            },
        };

        SessionConfig {
            mode,
            sample_rate: self.sample_rate,
            chunk_duration: Duration::from_secs_f64(self.chunk_duration),
            language: self.language,
            output_path: self.output_file,
            timestamps: !self.no_timestamps,
        }
    }
}
