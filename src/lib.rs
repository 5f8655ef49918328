//! livescribe - Live audio transcription for the terminal
//!
//! Captures audio from an input device (or reads a WAV file), chunks it into
//! fixed-duration windows, and transcribes each window with Whisper.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod chunk;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod output;
pub mod session;
pub mod stt;

// Core traits (source → chunk → transcribe → sink)
pub use chunk::{AudioChunk, ChunkAccumulator, SampleBlock};
pub use output::{CollectorSink, StdoutSink, TranscriptSink};
pub use stt::transcriber::{TranscribeOptions, Transcriber, Transcription};

// Error handling
pub use error::{LivescribeError, Result};

// Config
pub use config::{DeviceSelector, SessionConfig, SessionMode};
