//! Transcript output sinks.
//!
//! Lines go to stdout immediately and, when configured, to an append-only
//! log file flushed after every write, so a crash mid-session loses at most
//! the in-flight line. Diagnostics go to stderr; stdout carries only the
//! transcript.

use crate::error::{LivescribeError, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Pluggable transcript output handler.
///
/// Pairs with the Transcriber seam on the input side - implementations must
/// write each line exactly once, in call order.
pub trait TranscriptSink: Send {
    /// Write one transcription line, optionally prefixed with a timestamp.
    fn write_line(&mut self, text: &str, timestamp: Option<&str>) -> Result<()>;
}

/// Format a line with an optional `[HH:MM:SS]` prefix.
pub fn format_line(text: &str, timestamp: Option<&str>) -> String {
    match timestamp {
        Some(stamp) => format!("[{}] {}", stamp, text),
        None => text.to_string(),
    }
}

/// Format a second offset from session/file start as `HH:MM:SS`.
pub fn format_clock_offset(seconds: f32) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Current local wall-clock time as `HH:MM:SS`.
pub fn local_clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Sink writing to stdout and an optional transcript log.
pub struct StdoutSink {
    log: Option<File>,
}

impl StdoutSink {
    /// Console-only sink.
    pub fn new() -> Self {
        Self { log: None }
    }

    /// Sink that also appends to a log file.
    ///
    /// `reset` truncates the file; live sessions pass it exactly once at
    /// session start. The handle stays open, so every later write appends.
    ///
    /// # Errors
    /// Returns `LivescribeError::TranscriptWrite` if the file cannot be opened.
    pub fn with_log(path: &Path, reset: bool) -> Result<Self> {
        let log = OpenOptions::new()
            .create(true)
            .append(!reset)
            .write(true)
            .truncate(reset)
            .open(path)
            .map_err(|e| LivescribeError::TranscriptWrite {
                message: format!("Failed to open {}: {}", path.display(), e),
            })?;
        Ok(Self { log: Some(log) })
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSink for StdoutSink {
    fn write_line(&mut self, text: &str, timestamp: Option<&str>) -> Result<()> {
        let line = format_line(text, timestamp);

        println!("{}", line);
        io::stdout().flush().ok();

        if let Some(log) = self.log.as_mut() {
            writeln!(log, "{}", line).map_err(|e| LivescribeError::TranscriptWrite {
                message: e.to_string(),
            })?;
            log.flush().map_err(|e| LivescribeError::TranscriptWrite {
                message: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// Sink collecting lines in memory, for tests.
///
/// Clones share the same backing storage, so a test can keep one handle
/// while the worker thread owns the other.
#[derive(Debug, Clone, Default)]
pub struct CollectorSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far, in order.
    pub fn collected(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl TranscriptSink for CollectorSink {
    fn write_line(&mut self, text: &str, timestamp: Option<&str>) -> Result<()> {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format_line(text, timestamp));
        }
        Ok(())
    }
}
