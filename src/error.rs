//! Error types for livescribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LivescribeError {
    // Audio device errors (fatal, before any thread starts)
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Audio file errors
    #[error("Failed to decode audio file: {message}")]
    AudioDecode { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    // Output errors (per-line, never fatal for the worker)
    #[error("Failed to write transcript: {message}")]
    TranscriptWrite { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LivescribeError>;
