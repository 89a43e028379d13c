//! Executes classified intents
//!
//! Every action ends in speech. Collaborator failures, IO errors and bad
//! arguments are turned into a spoken apology here and never reach the
//! conversation loop.

use std::sync::Arc;

use crate::calc::{self, CalcError};
use crate::capability::{
    Browser, Clock, JokeSource, Knowledge, MediaOutcome, MediaPlayer, Speaker, SummaryOutcome,
};
use crate::config::Config;
use crate::intent::Intent;
use crate::notes::{NoteStore, NotesSnapshot, truncate_chars};
use crate::timer::TimerService;

/// Replies spoken by the executor
pub mod replies {
    pub const BROWSER_FAILED: &str = "Sorry, I couldn't open the browser.";
    pub const SUMMARY_NOT_FOUND: &str = "Hmm, I couldn't find anything on that topic.";
    pub const SUMMARY_UNAVAILABLE: &str = "Wikipedia feature is not available.";
    pub const JOKES_UNAVAILABLE: &str = "Sorry, I can't tell jokes right now.";
    pub const TIMER_PARSE_FAILURE: &str = "Please tell me the timer duration in seconds.";
    pub const NOTE_SAVED: &str = "Got it, I saved your note.";
    pub const NOTE_SAVE_FAILED: &str = "Sorry, I couldn't save your note.";
    pub const NO_SAVED_NOTES: &str = "You have no saved notes.";
    pub const NO_NOTES_TO_READ: &str = "You have no notes to read.";
    pub const NOTES_HEADER: &str = "Here are your notes:";
    pub const NOTES_READ_FAILED: &str = "Sorry, I couldn't read your notes.";
    pub const CALC_REJECTED: &str = "I cannot process that expression.";
    pub const CALC_FAILED: &str = "I had trouble calculating that.";
}

/// The external collaborators actions are carried out with
#[derive(Clone)]
pub struct Collaborators {
    /// Speech output
    pub speaker: Arc<dyn Speaker>,
    /// Web browser
    pub browser: Arc<dyn Browser>,
    /// Media playback
    pub media: Arc<dyn MediaPlayer>,
    /// Summaries
    pub knowledge: Arc<dyn Knowledge>,
    /// Jokes
    pub jokes: Arc<dyn JokeSource>,
    /// Wall clock
    pub clock: Arc<dyn Clock>,
}

/// Tunables for the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSettings {
    /// Search URL prefix; the encoded query is appended
    pub search_url: String,
    /// Sentences per summary
    pub summary_sentences: usize,
    /// Characters of the note log read aloud
    pub notes_read_limit: usize,
}

impl ActionSettings {
    /// Executor settings from the loaded configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            search_url: config.search_url.clone(),
            summary_sentences: config.summary_sentences,
            notes_read_limit: config.notes_read_limit,
        }
    }
}

/// Carries out intents and speaks the results
pub struct ActionExecutor {
    collaborators: Collaborators,
    notes: NoteStore,
    timers: TimerService,
    settings: ActionSettings,
}

impl ActionExecutor {
    /// Create an executor; timers announce through the same speaker
    #[must_use]
    pub fn new(collaborators: Collaborators, notes: NoteStore, settings: ActionSettings) -> Self {
        let timers = TimerService::new(Arc::clone(&collaborators.speaker));
        Self {
            collaborators,
            notes,
            timers,
            settings,
        }
    }

    /// The note log this executor writes to
    #[must_use]
    pub const fn notes(&self) -> &NoteStore {
        &self.notes
    }

    /// Perform `intent`
    pub async fn execute(&self, intent: Intent) {
        tracing::debug!(?intent, "executing");

        match intent {
            Intent::ShowTime => self.show_time().await,
            Intent::ShowDate => self.show_date().await,
            Intent::OpenSite(site) => self.open_site(&site).await,
            Intent::WebSearch(query) | Intent::Fallback(query) => self.web_search(&query).await,
            Intent::PlayMedia(query) => self.play_media(&query).await,
            Intent::Summarize(topic) => self.summarize(&topic).await,
            Intent::TellJoke => self.tell_joke().await,
            Intent::StartTimer(seconds) => {
                let id = self.timers.start(seconds).await;
                tracing::info!(%id, seconds, "timer scheduled");
            }
            Intent::TimerParseFailure => self.say(replies::TIMER_PARSE_FAILURE).await,
            Intent::SaveNote(text) => self.save_note(&text).await,
            Intent::ReadNotes => self.read_notes().await,
            Intent::Calculate(expr) => self.calculate(&expr).await,
        }
    }

    async fn say(&self, text: &str) {
        self.collaborators.speaker.speak(text).await;
    }

    async fn show_time(&self) {
        let now = self.collaborators.clock.now();
        self.say(&format!("Right now, it is {}", now.format("%-I:%M %p")))
            .await;
    }

    async fn show_date(&self) {
        let today = self.collaborators.clock.now();
        self.say(&format!("Today is {}", today.format("%A, %d %B %Y")))
            .await;
    }

    async fn open_site(&self, site: &str) {
        let url = site_url(site);
        if url::Url::parse(&url).is_err() {
            tracing::warn!(url, "not a valid URL");
            self.say(replies::BROWSER_FAILED).await;
            return;
        }

        match self.collaborators.browser.open(&url).await {
            Ok(()) => self.say(&format!("Opening {url} for you")).await,
            Err(e) => {
                tracing::warn!(error = %e, url, "failed to open site");
                self.say(replies::BROWSER_FAILED).await;
            }
        }
    }

    async fn web_search(&self, query: &str) {
        let url = search_url(&self.settings.search_url, query);
        match self.collaborators.browser.open(&url).await {
            Ok(()) => self.say(&format!("Here's what I found for {query}")).await,
            Err(e) => {
                tracing::warn!(error = %e, query, "failed to open search");
                self.say(replies::BROWSER_FAILED).await;
            }
        }
    }

    async fn play_media(&self, query: &str) {
        match self.collaborators.media.play(query).await {
            MediaOutcome::Playing => {
                self.say(&format!("Playing {query} on YouTube. Enjoy!")).await;
            }
            MediaOutcome::Unavailable => {
                tracing::info!(query, "media unavailable, searching instead");
                self.web_search(&format!("{query} site:youtube.com")).await;
            }
        }
    }

    async fn summarize(&self, topic: &str) {
        let outcome = self
            .collaborators
            .knowledge
            .summarize(topic, self.settings.summary_sentences)
            .await;

        match outcome {
            SummaryOutcome::Found(summary) => self.say(&summary).await,
            SummaryOutcome::NotFound => self.say(replies::SUMMARY_NOT_FOUND).await,
            SummaryOutcome::Unavailable => self.say(replies::SUMMARY_UNAVAILABLE).await,
        }
    }

    async fn tell_joke(&self) {
        match self.collaborators.jokes.joke().await {
            Some(joke) => self.say(&joke).await,
            None => self.say(replies::JOKES_UNAVAILABLE).await,
        }
    }

    async fn save_note(&self, text: &str) {
        let now = self.collaborators.clock.now();
        match self.notes.append(now, text) {
            Ok(_) => self.say(replies::NOTE_SAVED).await,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.notes.path().display(), "failed to save note");
                self.say(replies::NOTE_SAVE_FAILED).await;
            }
        }
    }

    async fn read_notes(&self) {
        match self.notes.read() {
            Ok(NotesSnapshot::Missing) => self.say(replies::NO_SAVED_NOTES).await,
            Ok(NotesSnapshot::Empty) => self.say(replies::NO_NOTES_TO_READ).await,
            Ok(NotesSnapshot::Text(text)) => {
                self.say(replies::NOTES_HEADER).await;
                self.say(truncate_chars(&text, self.settings.notes_read_limit))
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %self.notes.path().display(), "failed to read notes");
                self.say(replies::NOTES_READ_FAILED).await;
            }
        }
    }

    async fn calculate(&self, expr: &str) {
        match calc::evaluate(expr) {
            Ok(value) => {
                self.say(&format!("The answer is {}", calc::format_number(value)))
                    .await;
            }
            Err(CalcError::DisallowedCharacter(c)) => {
                tracing::info!(expr, character = %c, "expression rejected");
                self.say(replies::CALC_REJECTED).await;
            }
            Err(e) => {
                tracing::info!(expr, error = %e, "calculation failed");
                self.say(replies::CALC_FAILED).await;
            }
        }
    }
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("notes", &self.notes)
            .field("timers", &self.timers)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// URL for a spoken site name, defaulting to HTTPS
#[must_use]
pub fn site_url(site: &str) -> String {
    let site = site.trim();
    if site.starts_with("http") {
        site.to_string()
    } else {
        format!("https://{site}")
    }
}

/// Search URL for `query` under `base`
#[must_use]
pub fn search_url(base: &str, query: &str) -> String {
    format!("{base}{}", urlencoding::encode(query))
}
