//! Input device enumeration and selection.

use crate::config::DeviceSelector;
use crate::error::{LivescribeError, Result};
use cpal::traits::{DeviceTrait, HostTrait};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
pub(crate) fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA error messages that occur during audio backend probing.
/// These are harmless but confusing to users.
///
/// # Safety
/// This modifies environment variables which is safe when called before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// One entry from the input device catalog.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub max_input_channels: u16,
    pub max_output_channels: u16,
    pub default_sample_rate: u32,
}

/// List all available audio input devices with their capabilities.
///
/// Indices are positions in the host's input device enumeration and match
/// what [`resolve_input_device`] accepts.
///
/// # Errors
/// Returns `LivescribeError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<DeviceInfo>> {
    let devices = enumerate_input_devices()?;

    let mut catalog = Vec::new();
    for (index, device) in devices.into_iter().enumerate() {
        let Ok(name) = device.name() else {
            continue;
        };
        let (in_channels, rate, out_channels) = with_suppressed_stderr(|| {
            let (in_channels, rate) = match device.default_input_config() {
                Ok(config) => (config.channels(), config.sample_rate().0),
                Err(_) => (0, 0),
            };
            let out_channels = device
                .default_output_config()
                .map(|config| config.channels())
                .unwrap_or(0);
            (in_channels, rate, out_channels)
        });
        catalog.push(DeviceInfo {
            index,
            name,
            max_input_channels: in_channels,
            max_output_channels: out_channels,
            default_sample_rate: rate,
        });
    }

    Ok(catalog)
}

fn enumerate_input_devices() -> Result<Vec<cpal::Device>> {
    let devices = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        host.input_devices().map(|iter| iter.collect::<Vec<_>>())
    })
    .map_err(|e| LivescribeError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;
    Ok(devices)
}

/// Resolve a selector to a concrete input device.
///
/// Resolution order mirrors the selector:
/// - `Index`: position in the input device enumeration, no search.
/// - `NameContains`: first device whose name contains the pattern
///   (case-insensitive); if nothing matches, the fallback index; if that is
///   also out of range, `AudioDeviceNotFound`.
///
/// Returns the device together with its reported name for diagnostics.
pub fn resolve_input_device(selector: &DeviceSelector) -> Result<(cpal::Device, String)> {
    let devices = enumerate_input_devices()?;

    let device = match selector {
        DeviceSelector::Index(index) => {
            devices
                .into_iter()
                .nth(*index)
                .ok_or_else(|| LivescribeError::AudioDeviceNotFound {
                    device: format!("index {}", index),
                })?
        }
        DeviceSelector::NameContains {
            pattern,
            fallback_index,
        } => {
            let needle = pattern.to_lowercase();
            let mut by_name = None;
            let mut by_index = None;
            for (index, device) in devices.into_iter().enumerate() {
                if by_name.is_none()
                    && let Ok(name) = device.name()
                    && name.to_lowercase().contains(&needle)
                {
                    by_name = Some(device);
                    break;
                }
                if index == *fallback_index {
                    by_index = Some(device);
                }
            }
            by_name
                .or(by_index)
                .ok_or_else(|| LivescribeError::AudioDeviceNotFound {
                    device: format!("'{}' (fallback index {})", pattern, fallback_index),
                })?
        }
    };

    let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
    Ok((device, name))
}
