use anyhow::Result;
use clap::Parser;
use livescribe::cli::Cli;
use livescribe::config::SessionMode;
use livescribe::output::StdoutSink;
use livescribe::stt::transcriber::Transcriber;
use livescribe::stt::whisper::{WhisperConfig, WhisperTranscriber, resolve_model_path};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    livescribe::audio::device::suppress_audio_warnings();

    let cli = Cli::parse();

    if cli.list_devices {
        return list_audio_devices();
    }

    let model = cli.model.clone();
    let threads = cli.threads;
    let config = cli.into_config();

    eprintln!("Loading Whisper model '{}'...", model);
    let model_path = resolve_model_path(&model)?;
    let transcriber = WhisperTranscriber::new(WhisperConfig {
        model_path,
        language: config.language.clone(),
        threads,
    })?;
    eprintln!("Model '{}' loaded.", transcriber.model_name());

    match &config.mode {
        SessionMode::File { path } => {
            let path = path.clone();
            // File mode appends to an existing transcript; only a live
            // session resets the log at start.
            let mut sink = match &config.output_path {
                Some(log) => StdoutSink::with_log(log, false)?,
                None => StdoutSink::new(),
            };
            eprintln!("Transcribing {}...", path.display());
            livescribe::session::run_file(&path, &config, &transcriber, &mut sink)?;
        }
        SessionMode::Live { .. } => {
            let sink = match &config.output_path {
                Some(log) => StdoutSink::with_log(log, true)?,
                None => StdoutSink::new(),
            };
            livescribe::session::run_live(&config, Arc::new(transcriber), sink).await?;
        }
    }

    Ok(())
}

/// List available audio input devices.
fn list_audio_devices() -> Result<()> {
    let devices = livescribe::audio::device::list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for info in &devices {
        println!(
            "  [{}] {} ({} in, {} out, {} Hz)",
            info.index,
            info.name,
            info.max_input_channels,
            info.max_output_channels,
            info.default_sample_rate
        );
    }

    Ok(())
}
