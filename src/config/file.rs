//! TOML configuration file loading
//!
//! Supports `~/.config/hearken/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct HearkenConfigFile {
    /// Assistant behaviour
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// Listen windows
    #[serde(default)]
    pub listen: ListenFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Assistant behaviour
#[derive(Debug, Default, Deserialize)]
pub struct AssistantFileConfig {
    /// Wake phrases, checked in order
    pub wake_words: Option<Vec<String>>,

    /// Note log path
    pub notes_file: Option<String>,

    /// Search URL prefix; the encoded query is appended
    pub search_url: Option<String>,

    /// Sentences per encyclopedia summary
    pub summary_sentences: Option<usize>,

    /// Characters of the note log read aloud
    pub notes_read_limit: Option<usize>,

    /// Enable the built-in joke book
    pub jokes: Option<bool>,
}

/// Listen window bounds, in seconds
#[derive(Debug, Default, Deserialize)]
pub struct ListenFileConfig {
    pub wake_timeout_secs: Option<u64>,
    pub wake_phrase_secs: Option<u64>,
    pub command_timeout_secs: Option<u64>,
    pub command_phrase_secs: Option<u64>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable microphone and speaker
    pub enabled: Option<bool>,

    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the TOML is malformed or has the wrong shape
pub fn parse_config_file(content: &str) -> Result<HearkenConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load the TOML config file from the standard path
///
/// Returns `HearkenConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> HearkenConfigFile {
    let Some(path) = config_file_path() else {
        return HearkenConfigFile::default();
    };

    if !path.exists() {
        return HearkenConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config_file(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                HearkenConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            HearkenConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/hearken/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("hearken").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let fc = parse_config_file(
            r#"
            [assistant]
            wake_words = ["computer"]

            [listen]
            command_timeout_secs = 12
            "#,
        )
        .unwrap();

        assert_eq!(fc.assistant.wake_words, Some(vec!["computer".to_string()]));
        assert_eq!(fc.assistant.notes_file, None);
        assert_eq!(fc.listen.command_timeout_secs, Some(12));
        assert!(fc.voice.enabled.is_none());
    }

    #[test]
    fn test_parse_empty_file() {
        let fc = parse_config_file("").unwrap();
        assert!(fc.assistant.wake_words.is_none());
        assert!(fc.api_keys.openai.is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(parse_config_file("[listen]\nwake_timeout_secs = \"five\"").is_err());
    }
}
