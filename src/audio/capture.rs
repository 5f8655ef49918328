//! Real audio capture using CPAL (Cross-Platform Audio Library).
//!
//! The capture callback does no work beyond pushing a [`SampleBlock`] onto
//! the channel: no locks shared with the transcription loop, no allocation
//! beyond the block itself, no blocking sends.

use crate::audio::device::with_suppressed_stderr;
use crate::chunk::SampleBlock;
use crate::error::{LivescribeError, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: The stream is owned by the capture struct and only touched from
/// the thread that drives start/stop. It never crosses thread boundaries
/// while in use.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live input capture feeding the chunk accumulator.
///
/// Tries the preferred format first (f32 at the engine rate, mono), then
/// i16 with conversion, then the device's native config. Native capture
/// sends interleaved multi-channel blocks; the accumulator downmixes.
pub struct CpalCapture {
    device: cpal::Device,
    sender: Sender<SampleBlock>,
    stream: Option<SendableStream>,
    callback_count: Arc<AtomicU64>,
    sample_rate: u32,
    block_frames: u32,
}

impl CpalCapture {
    pub fn new(device: cpal::Device, sender: Sender<SampleBlock>, sample_rate: u32) -> Self {
        Self {
            device,
            sender,
            stream: None,
            callback_count: Arc::new(AtomicU64::new(0)),
            sample_rate,
            block_frames: crate::defaults::CAPTURE_BLOCK_FRAMES,
        }
    }

    /// Start the input stream.
    ///
    /// # Errors
    /// Returns `LivescribeError::AudioCapture` if no supported stream
    /// configuration can be opened or the stream fails to start.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(()); // Already started
        }

        let stream = with_suppressed_stderr(|| self.build_stream())?;
        stream.play().map_err(|e| LivescribeError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        // Wait briefly to check if the CPAL callback actually fires.
        // Some PipeWire-ALSA setups accept non-native configs but never deliver data.
        std::thread::sleep(std::time::Duration::from_millis(200));

        let final_stream = if self.callback_count.load(Ordering::Relaxed) == 0 {
            drop(stream);
            let native = with_suppressed_stderr(|| self.build_stream_native())?;
            native.play().map_err(|e| LivescribeError::AudioCapture {
                message: format!("Failed to start native audio stream: {}", e),
            })?;
            native
        } else {
            stream
        };

        self.stream = Some(SendableStream(final_stream));
        Ok(())
    }

    /// Stop the input stream. No blocks are sent after this returns.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream.0.pause().map_err(|e| LivescribeError::AudioCapture {
                message: format!("Failed to stop audio stream: {}", e),
            })?;
        }
        Ok(())
    }

    /// Build the audio stream with the configured format.
    ///
    /// Tries in order:
    /// 1. f32 at the engine rate, mono — preferred, zero-conversion path
    /// 2. i16 at the engine rate, mono — for devices without float formats
    /// 3. Device default config — native rate/channels, resampled in the callback
    fn build_stream(&self) -> Result<cpal::Stream> {
        let preferred_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.block_frames),
        };

        let err_callback = |err| {
            eprintln!("Audio stream error: {}", err);
        };

        // f32 path: PipeWire/PulseAudio convert rate and channels transparently
        let sender = self.sender.clone();
        let counter = Arc::clone(&self.callback_count);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                counter.fetch_add(1, Ordering::Relaxed);
                let _ = sender.try_send(SampleBlock::mono(data.to_vec()));
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        // i16 path, converted to f32 in the callback
        let sender = self.sender.clone();
        let counter = Arc::clone(&self.callback_count);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                counter.fetch_add(1, Ordering::Relaxed);
                let samples: Vec<f32> =
                    data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                let _ = sender.try_send(SampleBlock::mono(samples));
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native()
    }

    /// Build a stream using the device's default/native config, resampling
    /// to the engine rate in the callback. Channel downmixing is left to the
    /// accumulator.
    fn build_stream_native(&self) -> Result<cpal::Stream> {
        use cpal::SampleFormat;

        let default_config =
            self.device
                .default_input_config()
                .map_err(|e| LivescribeError::AudioCapture {
                    message: format!("Failed to query default input config: {}", e),
                })?;

        let native_rate = default_config.sample_rate().0;
        let native_channels = default_config.channels();
        let target_rate = self.sample_rate;
        let stream_config: cpal::StreamConfig = default_config.clone().into();

        eprintln!(
            "livescribe: using native audio format ({}ch/{}Hz/{:?}), converting in software",
            native_channels,
            native_rate,
            default_config.sample_format(),
        );

        let err_callback = |err| {
            eprintln!("Audio stream error: {}", err);
        };

        let sender = self.sender.clone();
        let counter = Arc::clone(&self.callback_count);

        match default_config.sample_format() {
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        counter.fetch_add(1, Ordering::Relaxed);
                        let samples = crate::audio::wav::resample_interleaved(
                            data,
                            native_channels,
                            native_rate,
                            target_rate,
                        );
                        let _ = sender.try_send(SampleBlock {
                            samples,
                            channels: native_channels,
                        });
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| LivescribeError::AudioCapture {
                    message: format!("Failed to build native f32 stream: {}", e),
                }),
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        counter.fetch_add(1, Ordering::Relaxed);
                        let float: Vec<f32> =
                            data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                        let samples = crate::audio::wav::resample_interleaved(
                            &float,
                            native_channels,
                            native_rate,
                            target_rate,
                        );
                        let _ = sender.try_send(SampleBlock {
                            samples,
                            channels: native_channels,
                        });
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| LivescribeError::AudioCapture {
                    message: format!("Failed to build native i16 stream: {}", e),
                }),
            fmt => Err(LivescribeError::AudioCapture {
                message: format!(
                    "Unsupported native sample format: {:?}. \
                     Try selecting a device with --input-device.",
                    fmt
                ),
            }),
        }
    }
}
