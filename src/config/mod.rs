//! Configuration management for hearken
//!
//! Built once at startup and then only read. Sources, highest priority first:
//! command-line options, environment, `config.toml`, built-in defaults.

pub mod file;

use std::path::PathBuf;

use crate::capability::ListenWindow;
use crate::voice::{SttProvider, TtsProvider};
use crate::{Error, Result};

use file::HearkenConfigFile;

/// Wake phrases used when nothing else is configured
pub const DEFAULT_WAKE_WORDS: &[&str] = &["hey assistant", "ok assistant", "assistant", "hello"];

/// Default note log, relative to the working directory
pub const DEFAULT_NOTES_FILE: &str = "assistant_notes.txt";

/// Default search URL prefix
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Most characters of the note log ever read aloud
pub const NOTES_READ_CAP: usize = 1000;

/// hearken configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Phrases that wake the assistant, lowercase, in match order
    pub wake_words: Vec<String>,

    /// Append-only note log
    pub notes_file: PathBuf,

    /// Listen bounds while waiting for a wake phrase
    pub wake_window: ListenWindow,

    /// Listen bounds while capturing a command
    pub command_window: ListenWindow,

    /// Search URL prefix; the percent-encoded query is appended
    pub search_url: String,

    /// Sentences per encyclopedia summary
    pub summary_sentences: usize,

    /// Characters of the note log read aloud, at most [`NOTES_READ_CAP`]
    pub notes_read_limit: usize,

    /// Enable the built-in joke book
    pub jokes_enabled: bool,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Use microphone and speaker (otherwise stdin/stdout)
    pub enabled: bool,

    /// STT backend
    pub stt_provider: SttProvider,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// TTS backend
    pub tts_provider: TtsProvider,

    /// TTS model (e.g. "tts-1", "`eleven_monolingual_v1`")
    pub tts_model: String,

    /// TTS voice identifier (`OpenAI` voice name or `ElevenLabs` voice id)
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stt_provider: SttProvider::Whisper,
            stt_model: "whisper-1".to_string(),
            tts_provider: TtsProvider::OpenAi,
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
        }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (for Whisper and TTS)
    pub openai: Option<String>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,
}

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Replace the configured wake phrases
    pub wake_words: Vec<String>,

    /// Replace the note log path
    pub notes_file: Option<PathBuf>,

    /// Run over stdin/stdout instead of audio devices
    pub text_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wake_words: DEFAULT_WAKE_WORDS.iter().map(ToString::to_string).collect(),
            notes_file: PathBuf::from(DEFAULT_NOTES_FILE),
            wake_window: ListenWindow::from_secs(5, 4),
            command_window: ListenWindow::from_secs(8, 8),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            summary_sentences: 2,
            notes_read_limit: NOTES_READ_CAP,
            jokes_enabled: true,
            voice: VoiceConfig::default(),
            api_keys: ApiKeys::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load() -> Result<Self> {
        Self::load_with_options(LoadOptions::default())
    }

    /// Load configuration with command-line overrides
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load_with_options(options: LoadOptions) -> Result<Self> {
        Self::from_sources(
            file::load_config_file(),
            |key| std::env::var(key).ok(),
            options,
        )
    }

    /// Merge all sources (options > env > file > default) and validate
    ///
    /// # Errors
    ///
    /// Returns error for unknown provider names or an unusable result
    pub fn from_sources(
        fc: HearkenConfigFile,
        env: impl Fn(&str) -> Option<String>,
        options: LoadOptions,
    ) -> Result<Self> {
        let defaults = Self::default();

        let wake_words = if options.wake_words.is_empty() {
            env("HEARKEN_WAKE_WORDS")
                .map(|s| s.split(',').map(ToString::to_string).collect())
                .or(fc.assistant.wake_words)
                .unwrap_or(defaults.wake_words)
        } else {
            options.wake_words
        };
        let wake_words = normalize_wake_words(wake_words);

        let notes_file = options
            .notes_file
            .or_else(|| env("HEARKEN_NOTES_FILE").map(PathBuf::from))
            .or_else(|| fc.assistant.notes_file.map(PathBuf::from))
            .unwrap_or(defaults.notes_file);

        let search_url = env("HEARKEN_SEARCH_URL")
            .or(fc.assistant.search_url)
            .unwrap_or(defaults.search_url);

        let listen = fc.listen;
        let wake_window = ListenWindow::from_secs(
            listen.wake_timeout_secs.unwrap_or(5),
            listen.wake_phrase_secs.unwrap_or(4),
        );
        let command_window = ListenWindow::from_secs(
            listen.command_timeout_secs.unwrap_or(8),
            listen.command_phrase_secs.unwrap_or(8),
        );

        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY").or(fc.api_keys.openai),
            deepgram: env("DEEPGRAM_API_KEY").or(fc.api_keys.deepgram),
            elevenlabs: env("ELEVENLABS_API_KEY").or(fc.api_keys.elevenlabs),
        };

        let vc = fc.voice;
        let voice_defaults = defaults.voice;
        let stt_provider = env("HEARKEN_STT_PROVIDER")
            .or(vc.stt_provider)
            .map(|s| s.parse::<SttProvider>())
            .transpose()?
            .unwrap_or(voice_defaults.stt_provider);
        let tts_provider = env("HEARKEN_TTS_PROVIDER")
            .or(vc.tts_provider)
            .map(|s| s.parse::<TtsProvider>())
            .transpose()?
            .unwrap_or(voice_defaults.tts_provider);

        let voice = VoiceConfig {
            enabled: !options.text_mode && vc.enabled.unwrap_or(true),
            stt_provider,
            stt_model: vc
                .stt_model
                .unwrap_or_else(|| stt_provider.default_model().to_string()),
            tts_provider,
            tts_model: vc
                .tts_model
                .unwrap_or_else(|| tts_provider.default_model().to_string()),
            tts_voice: env("HEARKEN_TTS_VOICE")
                .or(vc.tts_voice)
                .unwrap_or_else(|| tts_provider.default_voice().to_string()),
            tts_speed: vc.tts_speed.unwrap_or(voice_defaults.tts_speed),
        };

        if options.text_mode {
            tracing::info!("voice disabled, running in text mode");
        }

        let config = Self {
            wake_words,
            notes_file,
            wake_window,
            command_window,
            search_url,
            summary_sentences: fc
                .assistant
                .summary_sentences
                .unwrap_or(defaults.summary_sentences),
            notes_read_limit: fc
                .assistant
                .notes_read_limit
                .unwrap_or(defaults.notes_read_limit),
            jokes_enabled: fc.assistant.jokes.unwrap_or(defaults.jokes_enabled),
            voice,
            api_keys,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the crate relies on
    ///
    /// # Errors
    ///
    /// Returns a config error describing the first violated rule
    pub fn validate(&self) -> Result<()> {
        if self.wake_words.is_empty() {
            return Err(Error::Config("at least one wake word is required".to_string()));
        }
        for (name, window) in [("wake", self.wake_window), ("command", self.command_window)] {
            if window.timeout.is_zero() || window.phrase_limit.is_zero() {
                return Err(Error::Config(format!(
                    "{name} listen window must have non-zero timeout and phrase limit"
                )));
            }
        }
        if self.summary_sentences == 0 {
            return Err(Error::Config("summary_sentences must be at least 1".to_string()));
        }
        if !(1..=NOTES_READ_CAP).contains(&self.notes_read_limit) {
            return Err(Error::Config(format!(
                "notes_read_limit {} is outside 1..={NOTES_READ_CAP}",
                self.notes_read_limit
            )));
        }
        if !(0.25..=4.0).contains(&self.voice.tts_speed) {
            return Err(Error::Config(format!(
                "tts_speed {} is outside 0.25..=4.0",
                self.voice.tts_speed
            )));
        }
        Ok(())
    }
}

/// Lowercase, trim and drop blank or duplicate wake phrases, keeping order
fn normalize_wake_words(words: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for word in words {
        let word = word.trim().to_lowercase();
        if !word.is_empty() && !out.contains(&word) {
            out.push(word);
        }
    }
    out
}
