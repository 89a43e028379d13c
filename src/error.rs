//! Error types for hearken

use thiserror::Error;

/// Result type alias for hearken operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hearken
///
/// None of these ever reach the conversation loop: the action executor turns
/// each one into a spoken sentence.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Browser launch error
    #[error("browser error: {0}")]
    Browser(String),

    /// Media playback error
    #[error("media error: {0}")]
    Media(String),

    /// Knowledge lookup error
    #[error("knowledge error: {0}")]
    Knowledge(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
