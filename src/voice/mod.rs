//! Voice input and output
//!
//! Microphone capture is segmented into phrases and transcribed by a cloud
//! STT provider; replies are synthesized by a TTS provider and played on the
//! default output device. The console pair stands in for both in text mode.

mod capture;
mod console;
mod mic;
mod playback;
mod segmenter;
mod speaker;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, rms, samples_to_wav};
pub use console::{ConsoleListener, ConsoleSpeaker};
pub use mic::MicListener;
pub use playback::{AudioPlayback, decode_mp3};
pub use segmenter::{SegmentEvent, SegmenterState, SpeechSegmenter};
pub use speaker::VoiceSpeaker;
pub use stt::{SttProvider, Transcriber, normalize_transcript};
pub use tts::{Synthesizer, TtsProvider};
