//! Default configuration constants for livescribe.
//!
//! These are resolved once at startup into a [`crate::config::SessionConfig`]
//! and threaded through as parameters; no module reads them as ambient state.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default chunk duration in milliseconds.
///
/// Each live transcription call covers one window of this length. Shorter
/// windows lower latency but give Whisper less context per call.
pub const CHUNK_DURATION_MS: u64 = 1500;

/// Preferred capture block size in frames per callback delivery.
///
/// Smaller blocks keep the capture-to-queue latency low; the accumulation
/// loop concatenates them, so the value does not affect chunk boundaries.
pub const CAPTURE_BLOCK_FRAMES: u32 = 4096;

/// Substring searched (case-insensitively) in device names when no explicit
/// input device is given.
pub const DEVICE_MATCH: &str = "QuickTime Player Input";

/// Fallback device index used when no device name matches [`DEVICE_MATCH`].
pub const FALLBACK_DEVICE_INDEX: usize = 6;

/// Default Whisper model name.
///
/// "tiny.en" is the fastest English-only model, suitable for keeping up
/// with 1.5s chunks on modest hardware.
pub const DEFAULT_MODEL: &str = "tiny.en";

/// Default language code for transcription.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";
