//! Speech-to-text: the transcriber seam and the Whisper implementation.

pub mod transcriber;
pub mod whisper;
