//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;

use hearken::voice::{
    SAMPLE_RATE, SegmentEvent, SegmenterState, SpeechSegmenter, SttProvider, TtsProvider,
    normalize_transcript, rms, samples_to_wav,
};

/// Generate sine wave audio samples
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    vec![0.0; (SAMPLE_RATE as f32 * duration_secs) as usize]
}

/// Feed audio in 100ms blocks until a phrase completes, like the microphone listener
fn feed(segmenter: &mut SpeechSegmenter, audio: &[f32]) -> Vec<SegmentEvent> {
    let mut events = Vec::new();
    for block in audio.chunks(SAMPLE_RATE as usize / 10) {
        match segmenter.process(block) {
            SegmentEvent::None => {}
            SegmentEvent::Complete => {
                events.push(SegmentEvent::Complete);
                break;
            }
            event => events.push(event),
        }
    }
    events
}

#[test]
fn test_segmenter_starts_idle() {
    let segmenter = SpeechSegmenter::new(8.0);
    assert_eq!(segmenter.state(), SegmenterState::Idle);
    assert!(!segmenter.is_speaking());
}

#[test]
fn test_phrase_in_small_blocks() {
    let mut segmenter = SpeechSegmenter::new(8.0);

    let mut audio = generate_silence(0.3);
    audio.extend(generate_sine_samples(440.0, 1.0, 0.3));
    audio.extend(generate_silence(0.8));

    let events = feed(&mut segmenter, &audio);
    assert_eq!(events, vec![SegmentEvent::Started, SegmentEvent::Complete]);

    let phrase = segmenter.take_phrase();
    // Leading silence is not part of the phrase
    assert!(phrase.len() <= audio.len() - generate_silence(0.3).len());
    assert!(rms(&phrase) > 0.1);
    assert_eq!(segmenter.state(), SegmenterState::Idle);
}

#[test]
fn test_phrase_limit_in_small_blocks() {
    let mut segmenter = SpeechSegmenter::new(2.0);
    let speech = generate_sine_samples(440.0, 3.0, 0.3);

    let events = feed(&mut segmenter, &speech);
    assert_eq!(events, vec![SegmentEvent::Started, SegmentEvent::Complete]);

    let phrase = segmenter.take_phrase();
    assert!(phrase.len() >= SAMPLE_RATE as usize * 2);
}

#[test]
fn test_quiet_noise_never_starts() {
    let mut segmenter = SpeechSegmenter::new(8.0);
    let hum = generate_sine_samples(60.0, 2.0, 0.01);

    assert!(feed(&mut segmenter, &hum).is_empty());
    assert_eq!(segmenter.state(), SegmenterState::Idle);
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");
    assert!(wav_data.len() > 44);
}

#[test]
fn test_wav_roundtrip() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), original_samples.len());
}

#[test]
fn test_transcripts_become_utterances() {
    assert_eq!(normalize_transcript("Hey Assistant."), "hey assistant");
    assert_eq!(
        normalize_transcript("  Set timer for 3 seconds!  "),
        "set timer for 3 seconds"
    );
}

#[test]
fn test_provider_defaults() {
    assert_eq!(SttProvider::Whisper.default_model(), "whisper-1");
    assert_eq!(SttProvider::Deepgram.default_model(), "nova-2");
    assert_eq!(TtsProvider::OpenAi.default_voice(), "alloy");
    assert_eq!(TtsProvider::ElevenLabs.default_model(), "eleven_monolingual_v1");
}
