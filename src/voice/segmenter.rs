//! Energy-based speech segmentation
//!
//! Splits the microphone stream into phrases: a phrase starts when the level
//! rises above a threshold and ends after enough trailing silence, or when it
//! hits the phrase-length cap.

use super::capture::{SAMPLE_RATE, rms};

/// Minimum audio energy threshold to consider speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum duration of speech to count as a phrase (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence duration to consider end of utterance (in samples)
const SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// State of the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Waiting for speech
    Idle,
    /// Speech detected, accumulating a phrase
    Speaking,
}

/// What a block of samples did to the current phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEvent {
    /// Nothing of note
    None,
    /// Speech began in this block
    Started,
    /// The phrase is finished; take it with [`SpeechSegmenter::take_phrase`]
    Complete,
}

/// Accumulates one phrase at a time
#[derive(Debug)]
pub struct SpeechSegmenter {
    state: SegmenterState,
    phrase: Vec<f32>,
    silence_counter: usize,
    max_phrase_samples: usize,
}

impl SpeechSegmenter {
    /// Create a segmenter that cuts phrases at `max_phrase_secs`
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn new(max_phrase_secs: f32) -> Self {
        let max_phrase_samples = (max_phrase_secs.max(0.0) * SAMPLE_RATE as f32) as usize;
        Self {
            state: SegmenterState::Idle,
            phrase: Vec::new(),
            silence_counter: 0,
            max_phrase_samples,
        }
    }

    /// Feed captured samples
    pub fn process(&mut self, samples: &[f32]) -> SegmentEvent {
        let energy = rms(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            SegmenterState::Idle => {
                if is_speech {
                    self.state = SegmenterState::Speaking;
                    self.phrase.clear();
                    self.phrase.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                    return SegmentEvent::Started;
                }
            }
            SegmenterState::Speaking => {
                self.phrase.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.phrase.len() >= self.max_phrase_samples {
                    tracing::debug!(samples = self.phrase.len(), "phrase limit reached");
                    return SegmentEvent::Complete;
                }

                if self.silence_counter > SILENCE_SAMPLES
                    && self.phrase.len() > MIN_SPEECH_SAMPLES + self.silence_counter
                {
                    tracing::debug!(samples = self.phrase.len(), "phrase complete");
                    return SegmentEvent::Complete;
                }

                // A blip followed by a long silence was noise, not speech
                if self.silence_counter > SILENCE_SAMPLES * 2 {
                    tracing::trace!("noise burst, resetting");
                    self.reset();
                }
            }
        }

        SegmentEvent::None
    }

    /// Take the finished phrase and go back to idle
    pub fn take_phrase(&mut self) -> Vec<f32> {
        let phrase = std::mem::take(&mut self.phrase);
        self.reset();
        phrase
    }

    /// Reset to idle, discarding any partial phrase
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.phrase.clear();
        self.silence_counter = 0;
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SegmenterState {
        self.state
    }

    /// Whether a phrase is in progress
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.state == SegmenterState::Speaking
    }
}
