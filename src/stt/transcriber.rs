use crate::error::{LivescribeError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Per-call transcription options.
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    /// When true, the engine computes per-segment timestamps (file mode).
    /// Live per-chunk calls leave this false: chunk-relative timestamps
    /// would not reflect absolute session time, so the caller stamps lines
    /// from the wall clock instead.
    pub timestamps: bool,
}

/// An engine-reported sub-span of a transcription, offsets in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f32,
    pub end: f32,
    pub text: String,
}

/// Result of one transcription call.
#[derive(Debug, Clone, Default)]
pub struct Transcription {
    pub text: String,
    /// Populated only when [`TranscribeOptions::timestamps`] was set.
    pub segments: Vec<Segment>,
}

impl Transcription {
    /// Plain text result without segments.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            segments: Vec::new(),
        }
    }
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples to text.
    ///
    /// # Arguments
    /// * `audio` - Mono f32 samples in [-1.0, 1.0] at the engine sample rate
    /// * `options` - Per-call options (segment timestamps on/off)
    fn transcribe(&self, audio: &[f32], options: &TranscribeOptions) -> Result<Transcription>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Implement Transcriber for Arc<T> to allow sharing across threads.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[f32], options: &TranscribeOptions) -> Result<Transcription> {
        (**self).transcribe(audio, options)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// One scripted outcome for [`MockTranscriber`].
#[derive(Debug, Clone)]
enum ScriptedCall {
    Respond(Transcription),
    Fail(String),
}

/// Mock transcriber for testing.
///
/// Plays back a script of responses/failures in order, then falls back to a
/// default response. Records the sample count of every call so tests can
/// assert what audio actually reached the engine.
#[derive(Debug)]
pub struct MockTranscriber {
    model_name: String,
    script: Mutex<VecDeque<ScriptedCall>>,
    seen_sample_counts: Mutex<Vec<usize>>,
    default_response: String,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            script: Mutex::new(VecDeque::new()),
            seen_sample_counts: Mutex::new(Vec::new()),
            default_response: "mock transcription".to_string(),
        }
    }

    /// Script a plain-text response for the next unscripted call.
    pub fn with_response(self, text: &str) -> Self {
        self.push(ScriptedCall::Respond(Transcription::from_text(text)));
        self
    }

    /// Script a response carrying engine segments (file-mode shape).
    pub fn with_segments(self, text: &str, segments: Vec<Segment>) -> Self {
        self.push(ScriptedCall::Respond(Transcription {
            text: text.to_string(),
            segments,
        }));
        self
    }

    /// Script a failure for the next unscripted call.
    pub fn with_failure(self, message: &str) -> Self {
        self.push(ScriptedCall::Fail(message.to_string()));
        self
    }

    fn push(&self, call: ScriptedCall) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(call);
        }
    }

    /// Number of transcribe calls received so far.
    pub fn call_count(&self) -> usize {
        self.seen_sample_counts.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Sample counts of every call, in order.
    pub fn seen_sample_counts(&self) -> Vec<usize> {
        self.seen_sample_counts
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, audio: &[f32], _options: &TranscribeOptions) -> Result<Transcription> {
        if let Ok(mut counts) = self.seen_sample_counts.lock() {
            counts.push(audio.len());
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(ScriptedCall::Respond(result)) => Ok(result),
            Some(ScriptedCall::Fail(message)) => Err(LivescribeError::Transcription { message }),
            None => Ok(Transcription::from_text(self.default_response.clone())),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
