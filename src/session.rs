//! Session orchestration: the live capture loop and single-pass file mode.
//!
//! Live mode wiring:
//! - the CPAL callback sends [`SampleBlock`]s over the channel,
//! - a worker thread drains one window at a time and calls the transcriber,
//! - the async main task waits for Ctrl+C and flips the session flag.
//!
//! The flag is only checked at window boundaries. A transcription already in
//! flight when the flag drops runs to completion and its line is written;
//! audio queued between the last boundary and stream close is flushed as one
//! final chunk.

use crate::chunk::ChunkAccumulator;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::output::{TranscriptSink, format_clock_offset, local_clock};
use crate::stt::transcriber::{TranscribeOptions, Transcriber};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "cpal-audio")]
use crate::audio::capture::CpalCapture;
#[cfg(feature = "cpal-audio")]
use crate::config::SessionMode;
#[cfg(feature = "cpal-audio")]
use crate::error::LivescribeError;

/// Transcribe one chunk and write the resulting line.
///
/// Transcription and write failures are reported to stderr and swallowed:
/// one bad chunk must not take down the session or affect later chunks.
/// Empty and whitespace-only results are suppressed.
fn process_chunk<T, S>(chunk: &[f32], transcriber: &T, sink: &mut S, timestamps: bool)
where
    T: Transcriber + ?Sized,
    S: TranscriptSink + ?Sized,
{
    let options = TranscribeOptions { timestamps: false };
    let result = match transcriber.transcribe(chunk, &options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Transcription error: {}", e);
            return;
        }
    };

    let text = result.text.trim();
    if text.is_empty() {
        return;
    }

    let stamp = timestamps.then(local_clock);
    if let Err(e) = sink.write_line(text, stamp.as_deref()) {
        eprintln!("Output error: {}", e);
    }
}

/// Run the live consumer loop until `running` is cleared.
///
/// Each iteration collects one window of audio and transcribes it. Windows
/// with no audio produce nothing. On exit, audio already queued past the
/// last window boundary is flushed as a final chunk.
pub fn run_transcription_loop<T, S>(
    accumulator: &ChunkAccumulator,
    transcriber: &T,
    sink: &mut S,
    running: &AtomicBool,
    timestamps: bool,
) where
    T: Transcriber + ?Sized,
    S: TranscriptSink + ?Sized,
{
    while running.load(Ordering::Acquire) {
        if let Some(chunk) = accumulator.collect_window() {
            process_chunk(&chunk.samples, transcriber, sink, timestamps);
        }
    }

    if let Some(chunk) = accumulator.drain_pending() {
        process_chunk(&chunk.samples, transcriber, sink, timestamps);
    }
}

/// Run a live capture session until Ctrl+C.
///
/// # Errors
/// Fails when the input device cannot be resolved or the stream cannot be
/// started. Per-chunk transcription errors are reported and skipped, not
/// propagated.
#[cfg(feature = "cpal-audio")]
pub async fn run_live<T, S>(config: &SessionConfig, transcriber: Arc<T>, mut sink: S) -> Result<()>
where
    T: Transcriber + ?Sized + 'static,
    S: TranscriptSink + 'static,
{
    let SessionMode::Live { device: selector } = &config.mode else {
        return Err(LivescribeError::Other(
            "run_live called with a file-mode config".to_string(),
        ));
    };

    let (device, device_name) = crate::audio::device::resolve_input_device(selector)?;
    eprintln!("Using input device: {}", device_name);

    let (sender, receiver) = crossbeam_channel::unbounded();
    let mut capture = CpalCapture::new(device, sender, config.sample_rate);
    capture.start()?;

    let running = Arc::new(AtomicBool::new(true));
    let accumulator = ChunkAccumulator::new(receiver, config.chunk_duration);
    let timestamps = config.timestamps;

    let worker = {
        let running = Arc::clone(&running);
        let transcriber = Arc::clone(&transcriber);
        std::thread::spawn(move || {
            run_transcription_loop(&accumulator, &transcriber, &mut sink, &running, timestamps);
        })
    };

    eprintln!("Starting live transcription... (Press Ctrl+C to stop)");
    tokio::signal::ctrl_c()
        .await
        .map_err(LivescribeError::Io)?;
    eprintln!();
    eprintln!("Stopping...");

    running.store(false, Ordering::Release);
    // A failed stop must not leave the worker unjoined; dropping the capture
    // disconnects the sender either way, so the worker's final drain sees a
    // closed, fully-flushed queue.
    if let Err(e) = capture.stop() {
        eprintln!("Failed to stop audio stream: {}", e);
    }
    drop(capture);

    worker
        .join()
        .map_err(|_| LivescribeError::Other("Transcription worker panicked".to_string()))?;

    Ok(())
}

/// Transcribe a pre-recorded audio file in one pass.
///
/// With timestamps enabled, each engine segment becomes one output line
/// stamped with its offset from the start of the file. Without timestamps
/// (or when the engine reports no segments), the whole text is written as a
/// single line.
///
/// # Errors
/// Unlike live chunks, a failed file transcription propagates: there is
/// nothing to continue with.
pub fn run_file<T, S>(
    path: &std::path::Path,
    config: &SessionConfig,
    transcriber: &T,
    sink: &mut S,
) -> Result<()>
where
    T: Transcriber + ?Sized,
    S: TranscriptSink + ?Sized,
{
    let samples = crate::audio::wav::load_wav_mono(path, config.sample_rate)?;

    let options = TranscribeOptions {
        timestamps: config.timestamps,
    };
    let result = transcriber.transcribe(&samples, &options)?;

    if config.timestamps && !result.segments.is_empty() {
        for segment in &result.segments {
            let text = segment.text.trim();
            if text.is_empty() {
                continue;
            }
            sink.write_line(text, Some(&format_clock_offset(segment.start)))?;
        }
        return Ok(());
    }

    let text = result.text.trim();
    if !text.is_empty() {
        sink.write_line(text, None)?;
    }
    Ok(())
}
