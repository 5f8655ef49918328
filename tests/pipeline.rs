//! End-to-end pipeline tests: producer → accumulator → transcriber → sink,
//! driven through the public API with a scripted transcriber.

use livescribe::chunk::{ChunkAccumulator, SampleBlock};
use livescribe::config::SessionConfig;
use livescribe::output::{CollectorSink, StdoutSink, TranscriptSink};
use livescribe::session::{run_file, run_transcription_loop};
use livescribe::stt::transcriber::{
    MockTranscriber, Segment, TranscribeOptions, Transcriber, Transcription,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const WINDOW: Duration = Duration::from_millis(30);

struct Worker {
    running: Arc<AtomicBool>,
    handle: std::thread::JoinHandle<()>,
}

/// Spawn the consumer loop the way live mode does.
fn spawn_worker(
    accumulator: ChunkAccumulator,
    transcriber: Arc<MockTranscriber>,
    sink: CollectorSink,
    timestamps: bool,
) -> Worker {
    let running = Arc::new(AtomicBool::new(true));
    let handle = {
        let running = Arc::clone(&running);
        let mut sink = sink;
        std::thread::spawn(move || {
            run_transcription_loop(&accumulator, &transcriber, &mut sink, &running, timestamps);
        })
    };
    Worker { running, handle }
}

impl Worker {
    fn shutdown(self) {
        self.running.store(false, Ordering::Release);
        self.handle.join().unwrap();
    }
}

#[test]
fn output_lines_preserve_chunk_order() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let transcriber = Arc::new(
        MockTranscriber::new("ordered")
            .with_response("chunk one")
            .with_response("chunk two")
            .with_response("chunk three"),
    );
    let sink = CollectorSink::new();
    let worker = spawn_worker(
        ChunkAccumulator::new(rx, WINDOW),
        Arc::clone(&transcriber),
        sink.clone(),
        false,
    );

    // One burst of audio per window, spaced past the window length so each
    // lands in its own chunk.
    for _ in 0..3 {
        tx.send(SampleBlock::mono(vec![0.1; 480])).unwrap();
        std::thread::sleep(WINDOW * 2);
    }

    drop(tx);
    worker.shutdown();

    assert_eq!(
        sink.collected(),
        vec![
            "chunk one".to_string(),
            "chunk two".to_string(),
            "chunk three".to_string(),
        ]
    );
    assert_eq!(transcriber.call_count(), 3);
}

#[test]
fn failure_on_one_chunk_skips_only_that_chunk() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let transcriber = Arc::new(
        MockTranscriber::new("flaky")
            .with_response("before")
            .with_failure("engine hiccup")
            .with_response("after"),
    );
    let sink = CollectorSink::new();
    let worker = spawn_worker(
        ChunkAccumulator::new(rx, WINDOW),
        Arc::clone(&transcriber),
        sink.clone(),
        false,
    );

    for _ in 0..3 {
        tx.send(SampleBlock::mono(vec![0.2; 480])).unwrap();
        std::thread::sleep(WINDOW * 2);
    }

    drop(tx);
    worker.shutdown();

    // The failing middle chunk vanishes; its neighbors are untouched.
    assert_eq!(
        sink.collected(),
        vec!["before".to_string(), "after".to_string()]
    );
    assert_eq!(transcriber.call_count(), 3);
}

#[test]
fn speech_gap_speech_produces_exactly_two_lines() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let transcriber = Arc::new(
        MockTranscriber::new("gap")
            .with_response("first utterance")
            .with_response("second utterance"),
    );
    let sink = CollectorSink::new();
    let worker = spawn_worker(
        ChunkAccumulator::new(rx, WINDOW),
        Arc::clone(&transcriber),
        sink.clone(),
        false,
    );

    tx.send(SampleBlock::mono(vec![0.3; 480])).unwrap();
    // Long silence: several windows elapse with no audio and no output.
    std::thread::sleep(WINDOW * 5);
    tx.send(SampleBlock::mono(vec![0.3; 480])).unwrap();
    std::thread::sleep(WINDOW * 2);

    drop(tx);
    worker.shutdown();

    assert_eq!(
        sink.collected(),
        vec!["first utterance".to_string(), "second utterance".to_string()]
    );
    assert_eq!(transcriber.call_count(), 2);
}

/// Transcriber that holds every call for a fixed delay before delegating.
struct SlowTranscriber {
    inner: MockTranscriber,
    delay: Duration,
}

impl Transcriber for SlowTranscriber {
    fn transcribe(
        &self,
        audio: &[f32],
        options: &TranscribeOptions,
    ) -> livescribe::Result<Transcription> {
        std::thread::sleep(self.delay);
        self.inner.transcribe(audio, options)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[test]
fn cancellation_lets_the_in_flight_transcription_finish() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let accumulator = ChunkAccumulator::new(rx, WINDOW);
    let transcriber = Arc::new(SlowTranscriber {
        inner: MockTranscriber::new("slow").with_response("last words"),
        delay: Duration::from_millis(150),
    });
    let sink = CollectorSink::new();
    let running = Arc::new(AtomicBool::new(true));

    let handle = {
        let running = Arc::clone(&running);
        let transcriber = Arc::clone(&transcriber);
        let mut sink = sink.clone();
        std::thread::spawn(move || {
            run_transcription_loop(&accumulator, &transcriber, &mut sink, &running, false);
        })
    };

    tx.send(SampleBlock::mono(vec![0.4; 480])).unwrap();
    // Wait until the worker is inside the slow transcribe call, then cancel.
    std::thread::sleep(WINDOW + Duration::from_millis(50));
    running.store(false, Ordering::Release);
    drop(tx);
    handle.join().unwrap();

    // The line from the in-flight call still made it out.
    assert_eq!(sink.collected(), vec!["last words".to_string()]);
}

#[test]
fn shutdown_flushes_queued_tail_audio() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let accumulator = ChunkAccumulator::new(rx, WINDOW);
    let transcriber = MockTranscriber::new("tail").with_response("tail chunk");
    let mut sink = CollectorSink::new();
    let running = AtomicBool::new(false);

    // Audio arrives after the flag already dropped (between the last window
    // boundary and stream close in live mode).
    tx.send(SampleBlock::mono(vec![0.5; 100])).unwrap();
    tx.send(SampleBlock::mono(vec![0.5; 60])).unwrap();
    run_transcription_loop(&accumulator, &transcriber, &mut sink, &running, false);

    assert_eq!(transcriber.seen_sample_counts(), vec![160]);
    assert_eq!(sink.collected(), vec!["tail chunk".to_string()]);
}

fn write_wav(path: &std::path::Path, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn file_mode_stamps_segments_with_file_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("speech.wav");
    write_wav(&wav, 16000, &vec![500i16; 16000 * 5]);

    let transcriber = MockTranscriber::new("file").with_segments(
        "hello world again",
        vec![
            Segment {
                start: 0.0,
                end: 2.0,
                text: "hello world".to_string(),
            },
            Segment {
                start: 4.2,
                end: 5.0,
                text: "again".to_string(),
            },
        ],
    );
    let mut sink = CollectorSink::new();

    run_file(&wav, &SessionConfig::default(), &transcriber, &mut sink).unwrap();

    assert_eq!(
        sink.collected(),
        vec![
            "[00:00:00] hello world".to_string(),
            "[00:00:04] again".to_string(),
        ]
    );
}

#[test]
fn file_mode_resamples_before_transcribing() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("hi_rate.wav");
    // 1 second at 48kHz must reach the engine as ~16k samples.
    write_wav(&wav, 48000, &vec![500i16; 48000]);

    let transcriber = MockTranscriber::new("rate");
    let mut sink = CollectorSink::new();
    run_file(&wav, &SessionConfig::default(), &transcriber, &mut sink).unwrap();

    let counts = transcriber.seen_sample_counts();
    assert_eq!(counts.len(), 1);
    assert!((15900..=16100).contains(&counts[0]), "got {}", counts[0]);
}

#[test]
fn transcript_log_is_cleared_once_then_appended() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("transcript.txt");
    std::fs::write(&log, "leftover from a previous run\n").unwrap();

    let mut sink = StdoutSink::with_log(&log, true).unwrap();

    let (tx, rx) = crossbeam_channel::unbounded();
    let accumulator = ChunkAccumulator::new(rx, WINDOW);
    let transcriber = MockTranscriber::new("log")
        .with_response("line one")
        .with_response("line two");
    let running = AtomicBool::new(false);

    tx.send(SampleBlock::mono(vec![0.1; 100])).unwrap();
    run_transcription_loop(&accumulator, &transcriber, &mut sink, &running, false);
    tx.send(SampleBlock::mono(vec![0.1; 100])).unwrap();
    run_transcription_loop(&accumulator, &transcriber, &mut sink, &running, false);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert_eq!(contents, "line one\nline two\n");
}

#[test]
fn file_mode_appends_to_an_existing_transcript_log() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("speech.wav");
    write_wav(&wav, 16000, &vec![500i16; 1600]);

    let log = dir.path().join("transcript.txt");
    std::fs::write(&log, "earlier live session\n").unwrap();

    // File mode opens the log without resetting it; only a live session
    // clears the file at start.
    let mut sink = StdoutSink::with_log(&log, false).unwrap();
    let transcriber = MockTranscriber::new("append").with_response("from the file");
    let config = SessionConfig {
        timestamps: false,
        ..Default::default()
    };

    run_file(&wav, &config, &transcriber, &mut sink).unwrap();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert_eq!(contents, "earlier live session\nfrom the file\n");
}
