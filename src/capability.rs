//! Capability interfaces for the collaborators the assistant drives
//!
//! The dispatch core never touches audio, HTTP or the desktop directly. It
//! talks to these traits, and `main.rs` wires in the concrete adapters from
//! `voice` and `tools` (or the console pair in text mode).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::Result;

/// Bounds for a single listen cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenWindow {
    /// How long to wait for speech to start
    pub timeout: Duration,
    /// Maximum length of a phrase once speech has started
    pub phrase_limit: Duration,
}

impl ListenWindow {
    /// Create a window from whole seconds
    #[must_use]
    pub const fn from_secs(timeout: u64, phrase_limit: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout),
            phrase_limit: Duration::from_secs(phrase_limit),
        }
    }
}

/// Speech capture
///
/// Futures are not `Send`: audio streams are pinned to the thread that opened
/// them, so the conversation loop runs on the main task.
#[async_trait(?Send)]
pub trait Listener {
    /// Wait for one utterance
    ///
    /// Returns a lowercase transcript, or an empty string when nothing was
    /// heard within the window or the audio could not be recognized.
    async fn listen(&mut self, window: ListenWindow) -> String;
}

/// Speech output
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Say `text` and return once it has finished playing
    ///
    /// Best effort: implementations log failures instead of returning them.
    async fn speak(&self, text: &str);
}

/// Web browser
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open `url` without waiting for the browser
    ///
    /// # Errors
    ///
    /// Returns error if no browser could be launched
    async fn open(&self, url: &str) -> Result<()>;
}

/// Result of a playback request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    /// Playback started
    Playing,
    /// Media playback could not be provided for this query
    Unavailable,
}

/// Media playback
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Start playing the best match for `query`
    async fn play(&self, query: &str) -> MediaOutcome;
}

/// Result of a summary lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// A short summary of the topic
    Found(String),
    /// The lookup ran but produced nothing usable
    NotFound,
    /// The knowledge source is not reachable or not configured
    Unavailable,
}

/// Short encyclopedic summaries
#[async_trait]
pub trait Knowledge: Send + Sync {
    /// Summarize `topic` in at most `sentences` sentences
    async fn summarize(&self, topic: &str, sentences: usize) -> SummaryOutcome;
}

/// Joke provider
#[async_trait]
pub trait JokeSource: Send + Sync {
    /// Fetch one joke, `None` when the feature is unavailable
    async fn joke(&self) -> Option<String>;
}

/// Wall clock
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
