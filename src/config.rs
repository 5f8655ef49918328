//! Resolved session configuration.
//!
//! The CLI layer produces a [`SessionConfig`] once at startup; everything
//! downstream receives it (or pieces of it) as explicit parameters.

use crate::defaults;
use std::path::PathBuf;
use std::time::Duration;

/// How the input device is selected in live mode.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceSelector {
    /// Explicit device index from the enumeration order.
    Index(usize),
    /// Search device names for a substring (case-insensitive), falling back
    /// to `fallback_index` when nothing matches.
    NameContains {
        pattern: String,
        fallback_index: usize,
    },
}

impl Default for DeviceSelector {
    fn default() -> Self {
        DeviceSelector::NameContains {
            pattern: defaults::DEVICE_MATCH.to_string(),
            fallback_index: defaults::FALLBACK_DEVICE_INDEX,
        }
    }
}

/// Input mode for a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMode {
    /// Continuous capture from an input device, transcribed per chunk.
    Live { device: DeviceSelector },
    /// Single-pass transcription of a pre-recorded audio file.
    File { path: PathBuf },
}

/// Fully resolved configuration for one transcription session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: SessionMode,
    /// Capture/engine sample rate in Hz.
    pub sample_rate: u32,
    /// Wall-clock window length for live chunking.
    pub chunk_duration: Duration,
    /// Language code, or "auto" for detection.
    pub language: String,
    /// Optional append-only transcript log.
    pub output_path: Option<PathBuf>,
    /// Prefix output lines with `[HH:MM:SS]` timestamps.
    pub timestamps: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::Live {
                device: DeviceSelector::default(),
            },
            sample_rate: defaults::SAMPLE_RATE,
            chunk_duration: Duration::from_millis(defaults::CHUNK_DURATION_MS),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            output_path: None,
            timestamps: true,
        }
    }
}
