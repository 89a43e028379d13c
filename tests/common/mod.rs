//! Shared test utilities: scripted and recording collaborators

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use tokio::time::Instant;

use hearken::capability::{
    Browser, Clock, JokeSource, Knowledge, ListenWindow, Listener, MediaOutcome, MediaPlayer,
    Speaker, SummaryOutcome,
};
use hearken::{ActionExecutor, ActionSettings, Collaborators, Config, Error, NoteStore, Result};

/// Saturday 9 March 2024, 15:07:00 local time
#[must_use]
pub fn fixed_now() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 9, 15, 7, 0)
        .single()
        .expect("unambiguous local time")
}

/// Listener that replays a script, then hears silence
///
/// Silence takes the full window timeout, as a real microphone would.
pub struct ScriptedListener {
    script: VecDeque<String>,
    calls: Arc<Mutex<Vec<(Instant, ListenWindow)>>>,
}

impl ScriptedListener {
    pub fn new(script: &[&str]) -> Self {
        Self {
            script: script.iter().map(ToString::to_string).collect(),
            calls: Arc::default(),
        }
    }

    /// Handle to the log of listen calls, kept after the listener moves
    pub fn calls(&self) -> Arc<Mutex<Vec<(Instant, ListenWindow)>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait(?Send)]
impl Listener for ScriptedListener {
    async fn listen(&mut self, window: ListenWindow) -> String {
        self.calls.lock().unwrap().push((Instant::now(), window));
        match self.script.pop_front() {
            Some(line) => line,
            None => {
                tokio::time::sleep(window.timeout).await;
                String::new()
            }
        }
    }
}

/// Speaker that records what was said and when
#[derive(Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<(Instant, String)>>,
}

impl RecordingSpeaker {
    pub fn lines(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn timed(&self) -> Vec<(Instant, String)> {
        self.spoken.lock().unwrap().clone()
    }

    /// When `text` was first spoken
    pub fn spoken_at(&self, text: &str) -> Option<Instant> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .find(|(_, t)| t == text)
            .map(|(at, _)| *at)
    }

    pub fn clear(&self) {
        self.spoken.lock().unwrap().clear();
    }
}

#[async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&self, text: &str) {
        self.spoken
            .lock()
            .unwrap()
            .push((Instant::now(), text.to_string()));
    }
}

/// Browser that records URLs, optionally failing every open
#[derive(Default)]
pub struct RecordingBrowser {
    opened: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingBrowser {
    pub fn failing() -> Self {
        Self {
            opened: Mutex::default(),
            fail: true,
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl Browser for RecordingBrowser {
    async fn open(&self, url: &str) -> Result<()> {
        if self.fail {
            return Err(Error::Browser("no display".to_string()));
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Media player with a canned outcome
pub struct FakeMedia {
    outcome: MediaOutcome,
    queries: Mutex<Vec<String>>,
}

impl FakeMedia {
    pub fn new(outcome: MediaOutcome) -> Self {
        Self {
            outcome,
            queries: Mutex::default(),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaPlayer for FakeMedia {
    async fn play(&self, query: &str) -> MediaOutcome {
        self.queries.lock().unwrap().push(query.to_string());
        self.outcome.clone()
    }
}

/// Media player that blows up
pub struct PanickingMedia;

#[async_trait]
impl MediaPlayer for PanickingMedia {
    async fn play(&self, _query: &str) -> MediaOutcome {
        panic!("decoder exploded");
    }
}

/// Knowledge source with a canned outcome
pub struct FakeKnowledge {
    outcome: SummaryOutcome,
    requests: Mutex<Vec<(String, usize)>>,
}

impl FakeKnowledge {
    pub fn new(outcome: SummaryOutcome) -> Self {
        Self {
            outcome,
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<(String, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Knowledge for FakeKnowledge {
    async fn summarize(&self, topic: &str, sentences: usize) -> SummaryOutcome {
        self.requests
            .lock()
            .unwrap()
            .push((topic.to_string(), sentences));
        self.outcome.clone()
    }
}

/// Joke source with a canned answer
pub struct FakeJokes(pub Option<String>);

#[async_trait]
impl JokeSource for FakeJokes {
    async fn joke(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Clock stuck at one instant
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Fakes wired into an executor, with a private note directory
pub struct Harness {
    pub speaker: Arc<RecordingSpeaker>,
    pub browser: Arc<RecordingBrowser>,
    pub media: Arc<dyn MediaPlayer>,
    pub knowledge: Arc<FakeKnowledge>,
    pub jokes: Arc<FakeJokes>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            RecordingBrowser::default(),
            Arc::new(FakeMedia::new(MediaOutcome::Playing)),
            SummaryOutcome::Found("Rust is a language.".to_string()),
        )
    }

    pub fn with(
        browser: RecordingBrowser,
        media: Arc<dyn MediaPlayer>,
        summary: SummaryOutcome,
    ) -> Self {
        Self {
            speaker: Arc::new(RecordingSpeaker::default()),
            browser: Arc::new(browser),
            media,
            knowledge: Arc::new(FakeKnowledge::new(summary)),
            jokes: Arc::new(FakeJokes(Some("Knock knock.".to_string()))),
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn notes_path(&self) -> PathBuf {
        self.dir.path().join("notes.txt")
    }

    pub fn config(&self) -> Config {
        Config {
            notes_file: self.notes_path(),
            ..Config::default()
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            speaker: self.speaker.clone(),
            browser: self.browser.clone(),
            media: Arc::clone(&self.media),
            knowledge: self.knowledge.clone(),
            jokes: self.jokes.clone(),
            clock: Arc::new(FixedClock(fixed_now())),
        }
    }

    pub fn executor(&self) -> ActionExecutor {
        let config = self.config();
        ActionExecutor::new(
            self.collaborators(),
            NoteStore::new(&config.notes_file),
            ActionSettings::from_config(&config),
        )
    }
}
