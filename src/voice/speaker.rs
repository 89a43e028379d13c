//! Spoken output through TTS and the default speakers

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::playback::AudioPlayback;
use super::tts::Synthesizer;
use crate::capability::Speaker;

/// Synthesizes and plays replies, one at a time
///
/// The playback lock serializes utterances so a timer firing mid-reply waits
/// for the current sentence instead of talking over it.
pub struct VoiceSpeaker {
    synthesizer: Synthesizer,
    playback: Mutex<AudioPlayback>,
}

impl VoiceSpeaker {
    /// Create a speaker from a synthesizer and an output device
    #[must_use]
    pub fn new(synthesizer: Synthesizer, playback: AudioPlayback) -> Self {
        Self {
            synthesizer,
            playback: Mutex::new(playback),
        }
    }
}

#[async_trait]
impl Speaker for VoiceSpeaker {
    async fn speak(&self, text: &str) {
        let playback = self.playback.lock().await;
        tracing::info!(text, "speaking");

        let audio = match self.synthesizer.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(error = %e, "speech synthesis failed");
                return;
            }
        };

        if let Err(e) = playback.play_mp3(audio).await {
            tracing::warn!(error = %e, "playback failed");
        }
    }
}
