//! Chunk buffer between the capture callback and the transcription loop.
//!
//! The capture side sends [`SampleBlock`]s over an unbounded channel; the
//! accumulation side drains them into fixed-duration [`AudioChunk`]s. This is
//! the single producer/single consumer seam between the real-time audio
//! callback and the blocking transcription call.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Smallest unit of audio delivered by the capture subsystem per callback.
///
/// Samples are interleaved when `channels > 1`. Blocks are immutable once
/// sent and consumed exactly once by the accumulation loop.
#[derive(Debug, Clone)]
pub struct SampleBlock {
    pub samples: Vec<f32>,
    pub channels: u16,
}

impl SampleBlock {
    /// Create a mono block.
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            samples,
            channels: 1,
        }
    }

    /// Number of frames (samples per channel) in this block.
    pub fn frames(&self) -> usize {
        if self.channels <= 1 {
            self.samples.len()
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Append this block to `out`, averaging channels to mono.
    fn append_mono_to(&self, out: &mut Vec<f32>) {
        if self.channels <= 1 {
            out.extend_from_slice(&self.samples);
        } else {
            let channels = self.channels as usize;
            out.extend(
                self.samples
                    .chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }
}

/// A mono f32 concatenation of the blocks that arrived in one window.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
}

impl AudioChunk {
    /// Duration of the chunk at the given sample rate.
    pub fn duration(&self, sample_rate: u32) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / sample_rate as f64)
    }
}

/// Accumulates sample blocks into fixed-duration chunks.
///
/// The queue is unbounded on the producer side: blocking the capture
/// callback would stall the audio subsystem, and dropping blocks would lose
/// samples. The consumer drains a full window per iteration, so the queue
/// depth is bounded in practice by transcription latency.
pub struct ChunkAccumulator {
    receiver: Receiver<SampleBlock>,
    chunk_duration: Duration,
}

impl ChunkAccumulator {
    pub fn new(receiver: Receiver<SampleBlock>, chunk_duration: Duration) -> Self {
        Self {
            receiver,
            chunk_duration,
        }
    }

    /// Collect blocks for one wall-clock window and concatenate them.
    ///
    /// Blocks until the window elapses, sleeping inside `recv_timeout`
    /// rather than spinning on an empty queue. Returns `None` when no block
    /// arrived in the window (silence/gap — nothing to transcribe) or when
    /// all senders are gone and the queue is drained.
    pub fn collect_window(&self) -> Option<AudioChunk> {
        let deadline = Instant::now() + self.chunk_duration;
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.receiver.recv_timeout(deadline - now) {
                Ok(block) => block.append_mono_to(&mut samples),
                Err(RecvTimeoutError::Timeout) => break,
                // Capture side closed; return whatever the window holds.
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if samples.is_empty() {
            None
        } else {
            Some(AudioChunk { samples })
        }
    }

    /// Drain blocks already queued without waiting for a full window.
    ///
    /// Used during shutdown to flush audio captured between the last window
    /// boundary and stream close.
    pub fn drain_pending(&self) -> Option<AudioChunk> {
        let mut samples: Vec<f32> = Vec::new();
        while let Ok(block) = self.receiver.try_recv() {
            block.append_mono_to(&mut samples);
        }
        if samples.is_empty() {
            None
        } else {
            Some(AudioChunk { samples })
        }
    }
}
