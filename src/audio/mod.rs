//! Audio input: live capture, device selection, and WAV decoding.

#[cfg(feature = "cpal-audio")]
pub mod capture;
#[cfg(feature = "cpal-audio")]
pub mod device;
pub mod wav;
