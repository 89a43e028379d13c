//! Microphone listener: capture, segment, transcribe

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
use super::segmenter::{SegmentEvent, SpeechSegmenter};
use super::stt::{Transcriber, normalize_transcript};
use crate::Result;
use crate::capability::{ListenWindow, Listener};

/// How often the capture buffer is drained
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest phrase worth sending to the transcriber (0.25s)
const MIN_PHRASE_SAMPLES: usize = SAMPLE_RATE as usize / 4;

/// Listens on the default microphone and returns transcribed phrases
pub struct MicListener {
    capture: AudioCapture,
    transcriber: Transcriber,
}

impl MicListener {
    /// Open the microphone and start capturing
    ///
    /// # Errors
    ///
    /// Returns error if no usable input device is available
    pub fn new(transcriber: Transcriber) -> Result<Self> {
        let mut capture = AudioCapture::new()?;
        capture.start()?;
        tracing::info!(device = capture.device_name(), "microphone ready");
        Ok(Self {
            capture,
            transcriber,
        })
    }

    /// Record one phrase within `window`, empty when none started in time
    #[allow(clippy::cast_precision_loss)]
    async fn record(&self, window: ListenWindow) -> Vec<f32> {
        let mut segmenter = SpeechSegmenter::new(window.phrase_limit.as_secs_f32());
        // Audio captured while we were speaking or dispatching is stale
        self.capture.clear();

        let started_at = Instant::now();
        let mut speech_started: Option<Instant> = None;

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            let samples = self.capture.drain();
            if samples.is_empty() {
                if speech_started.is_none() && started_at.elapsed() >= window.timeout {
                    return Vec::new();
                }
                continue;
            }

            match segmenter.process(&samples) {
                SegmentEvent::Started => {
                    tracing::debug!("speech detected");
                    speech_started = Some(Instant::now());
                }
                SegmentEvent::Complete => return segmenter.take_phrase(),
                SegmentEvent::None => {}
            }

            match speech_started {
                Some(at) if at.elapsed() >= window.phrase_limit => {
                    return segmenter.take_phrase();
                }
                Some(_) if !segmenter.is_speaking() => {
                    // Segmenter discarded the burst as noise; keep waiting
                    speech_started = None;
                }
                None if started_at.elapsed() >= window.timeout => {
                    tracing::trace!(
                        waited_secs = started_at.elapsed().as_secs_f32(),
                        "listen timed out"
                    );
                    return Vec::new();
                }
                _ => {}
            }
        }
    }
}

impl Drop for MicListener {
    fn drop(&mut self) {
        self.capture.stop();
    }
}

#[async_trait(?Send)]
impl Listener for MicListener {
    async fn listen(&mut self, window: ListenWindow) -> String {
        let phrase = self.record(window).await;
        if phrase.len() < MIN_PHRASE_SAMPLES {
            return String::new();
        }

        let wav = match samples_to_wav(&phrase, SAMPLE_RATE) {
            Ok(wav) => wav,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode phrase");
                return String::new();
            }
        };

        match self.transcriber.transcribe(&wav).await {
            Ok(raw) => {
                let text = normalize_transcript(&raw);
                tracing::info!(transcript = %text, "heard");
                text
            }
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                String::new()
            }
        }
    }
}
