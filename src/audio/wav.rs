//! WAV decoding for file mode, plus resampling helpers shared with capture.

use crate::error::{LivescribeError, Result};
use std::io::Read;
use std::path::Path;

/// Decode a WAV file to mono f32 samples at the target rate.
///
/// Supports arbitrary source rates, channel counts, and integer or float
/// encodings. Channels are averaged to mono, then linearly resampled.
///
/// # Errors
/// Returns `LivescribeError::AudioDecode` if the file cannot be parsed.
pub fn load_wav_mono(path: &Path, target_rate: u32) -> Result<Vec<f32>> {
    let file = std::fs::File::open(path).map_err(|e| LivescribeError::AudioDecode {
        message: format!("Failed to open {}: {}", path.display(), e),
    })?;
    decode_wav_mono(Box::new(std::io::BufReader::new(file)), target_rate)
}

/// Decode WAV data from any reader (for testing/flexibility).
pub fn decode_wav_mono(reader: Box<dyn Read + Send>, target_rate: u32) -> Result<Vec<f32>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| LivescribeError::AudioDecode {
        message: format!("Failed to parse WAV file: {}", e),
    })?;

    let spec = wav_reader.spec();
    let source_rate = spec.sample_rate;
    let channels = spec.channels;

    let raw: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => wav_reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| LivescribeError::AudioDecode {
                message: format!("Failed to read WAV samples: {}", e),
            })?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            wav_reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| LivescribeError::AudioDecode {
                    message: format!("Failed to read WAV samples: {}", e),
                })?
        }
    };

    // Mix to mono by averaging channels
    let mono: Vec<f32> = if channels <= 1 {
        raw
    } else {
        let channels = channels as usize;
        raw.chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(resample(&mono, source_rate, target_rate))
}

/// Simple linear interpolation resampling of a mono signal.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = (source_pos - source_idx as f64) as f32;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx];
                let right = samples[source_idx + 1];
                left + (right - left) * fraction
            }
        })
        .collect()
}

/// Resample an interleaved multi-channel block, keeping it interleaved.
///
/// Each channel is resampled independently so interpolation never mixes
/// neighboring channels.
pub fn resample_interleaved(
    samples: &[f32],
    channels: u16,
    from_rate: u32,
    to_rate: u32,
) -> Vec<f32> {
    if channels <= 1 {
        return resample(samples, from_rate, to_rate);
    }
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let channels = channels as usize;
    let per_channel: Vec<Vec<f32>> = (0..channels)
        .map(|ch| {
            let lane: Vec<f32> = samples.iter().skip(ch).step_by(channels).copied().collect();
            resample(&lane, from_rate, to_rate)
        })
        .collect();

    let frames = per_channel.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * channels);
    for frame in 0..frames {
        for lane in &per_channel {
            out.push(lane[frame]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn decode(data: Vec<u8>, target_rate: u32) -> Result<Vec<f32>> {
        decode_wav_mono(Box::new(Cursor::new(data)), target_rate)
    }

    #[test]
    fn mono_16khz_decodes_without_resampling() {
        let data = make_wav_data(16000, 1, &[16384, -16384, 0]);
        let samples = decode(data, 16000).unwrap();

        assert_eq!(samples.len(), 3);
        assert!((samples[0] - 0.5).abs() < 1e-3);
        assert!((samples[1] + 0.5).abs() < 1e-3);
        assert!(samples[2].abs() < 1e-6);
    }

    #[test]
    fn stereo_downmixes_by_averaging() {
        // Pairs: (0.25, 0.75) -> 0.5, (0.5, -0.5) -> 0.0
        let data = make_wav_data(16000, 2, &[8192, 24576, 16384, -16384]);
        let samples = decode(data, 16000).unwrap();

        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 0.5).abs() < 1e-3);
        assert!(samples[1].abs() < 1e-3);
    }

    #[test]
    fn high_rate_input_is_resampled_down() {
        let data = make_wav_data(48000, 1, &vec![1000i16; 48000]); // 1s at 48kHz
        let samples = decode(data, 16000).unwrap();

        assert!((15900..=16100).contains(&samples.len()));
    }

    #[test]
    fn resample_identity_same_rate() {
        let samples = vec![0.1f32, 0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn resample_doubles_sample_count_when_upsampling() {
        let samples = vec![0.0f32, 0.5, 1.0];
        let out = resample(&samples, 8000, 16000);

        assert_eq!(out.len(), 6);
        assert_eq!(out[0], 0.0);
        assert!(out[1] > 0.0 && out[1] < 0.5);
        assert_eq!(out[2], 0.5);
    }

    #[test]
    fn resample_halves_sample_count_when_downsampling() {
        let samples = vec![0.0f32; 3200];
        assert_eq!(resample(&samples, 16000, 8000).len(), 1600);
    }

    #[test]
    fn resample_handles_empty_and_single_sample() {
        assert!(resample(&[], 16000, 8000).is_empty());
        let single = resample(&[0.7f32], 16000, 8000);
        assert_eq!(single, vec![0.7f32]);
    }

    #[test]
    fn resample_interleaved_keeps_channels_separate() {
        // Left channel constant 1.0, right channel constant -1.0. Mixing
        // lanes during interpolation would pull values toward zero.
        let samples: Vec<f32> = std::iter::repeat([1.0f32, -1.0])
            .take(100)
            .flatten()
            .collect();
        let out = resample_interleaved(&samples, 2, 48000, 16000);

        assert!(out.len() >= 2);
        for frame in out.chunks_exact(2) {
            assert!((frame[0] - 1.0).abs() < 1e-6);
            assert!((frame[1] + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn invalid_wav_data_returns_decode_error() {
        let result = decode(vec![0u8, 1, 2, 3, 4, 5], 16000);
        match result {
            Err(LivescribeError::AudioDecode { message }) => {
                assert!(message.contains("Failed to parse WAV file"));
            }
            _ => panic!("Expected AudioDecode error"),
        }
    }

    #[test]
    fn empty_wav_data_returns_error() {
        assert!(decode(Vec::new(), 16000).is_err());
    }

    #[test]
    fn missing_file_returns_decode_error() {
        let result = load_wav_mono(Path::new("/nonexistent/audio.wav"), 16000);
        match result {
            Err(LivescribeError::AudioDecode { message }) => {
                assert!(message.contains("/nonexistent/audio.wav"));
            }
            _ => panic!("Expected AudioDecode error"),
        }
    }

    #[test]
    fn truncated_header_is_rejected() {
        let result = decode(b"RIFF\x00\x00".to_vec(), 16000);
        assert!(result.is_err());
    }
}
