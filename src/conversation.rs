//! The listen, wake, dispatch loop

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::actions::ActionExecutor;
use crate::capability::{ListenWindow, Listener, Speaker};
use crate::config::Config;
use crate::intent::IntentMatcher;

/// Spoken when the loop starts
pub const GREETING: &str = "Hi! I am your assistant. You can call me anytime.";
/// Spoken when a wake phrase is heard
pub const WAKE_ACK: &str = "Yes, I am listening.";
/// Spoken when no command follows the wake phrase
pub const NOT_CAUGHT: &str = "I didn't catch that. Could you repeat?";
/// Spoken on interrupt
pub const FAREWELL: &str = "Goodbye! Talk to you later.";
/// Spoken when an action panics
pub const ACTION_FAILED: &str = "Sorry, something went wrong while doing that.";

/// Where the loop is in the wake/command cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Not started; the greeting has not been spoken
    Idle,
    /// Listening for a wake phrase
    AwaitingWake,
    /// Woken, listening for a command
    AwaitingCommand,
}

/// Configured wake phrases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakePhrases(Vec<String>);

impl WakePhrases {
    /// Wrap lowercase phrases
    #[must_use]
    pub const fn new(phrases: Vec<String>) -> Self {
        Self(phrases)
    }

    /// Whether `utterance` contains any wake phrase
    #[must_use]
    pub fn matches(&self, utterance: &str) -> bool {
        self.0.iter().any(|phrase| utterance.contains(phrase.as_str()))
    }
}

/// Drives one listener through the wake/command cycle until interrupted
pub struct ConversationLoop<L: Listener> {
    listener: L,
    speaker: Arc<dyn Speaker>,
    matcher: IntentMatcher,
    executor: ActionExecutor,
    wake_phrases: WakePhrases,
    wake_window: ListenWindow,
    command_window: ListenWindow,
    state: LoopState,
}

impl<L: Listener> ConversationLoop<L> {
    /// Assemble a loop from its parts
    #[must_use]
    pub fn new(
        config: &Config,
        listener: L,
        speaker: Arc<dyn Speaker>,
        executor: ActionExecutor,
    ) -> Self {
        Self {
            listener,
            speaker,
            matcher: IntentMatcher::new(),
            executor,
            wake_phrases: WakePhrases::new(config.wake_words.clone()),
            wake_window: config.wake_window,
            command_window: config.command_window,
            state: LoopState::Idle,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// The executor actions run on
    #[must_use]
    pub const fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    /// Greet and start waiting for a wake phrase; no-op once started
    pub async fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.speaker.speak(GREETING).await;
            self.state = LoopState::AwaitingWake;
            tracing::info!("waiting for wake phrase");
        }
    }

    /// Run a single listen cycle and return the resulting state
    pub async fn step(&mut self) -> LoopState {
        match self.state {
            LoopState::Idle => self.start().await,
            LoopState::AwaitingWake => self.await_wake().await,
            LoopState::AwaitingCommand => self.await_command().await,
        }
        self.state
    }

    /// Greet, then cycle until `shutdown` resolves, then say goodbye
    ///
    /// A cycle in progress when `shutdown` fires is abandoned, the greeting
    /// included.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown);

        // Shutdown is polled first so a Ctrl-C handler exists before the greeting
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                state = self.step() => {
                    tracing::trace!(?state, "cycle complete");
                }
            }
        }

        self.speaker.speak(FAREWELL).await;
    }

    async fn await_wake(&mut self) {
        let heard = self.listener.listen(self.wake_window).await;
        if heard.is_empty() {
            return;
        }

        if self.wake_phrases.matches(&heard) {
            tracing::info!(heard, "wake phrase detected");
            self.speaker.speak(WAKE_ACK).await;
            self.state = LoopState::AwaitingCommand;
        } else {
            tracing::debug!(heard, "ignored, no wake phrase");
        }
    }

    async fn await_command(&mut self) {
        let heard = self.listener.listen(self.command_window).await;
        if heard.is_empty() {
            self.speaker.speak(NOT_CAUGHT).await;
            self.state = LoopState::AwaitingWake;
            return;
        }

        let Some(intent) = self.matcher.classify(&heard) else {
            // Whitespace only: nothing to do, keep listening for the command
            tracing::debug!("blank command ignored");
            return;
        };

        let command = heard.trim();
        tracing::info!(command, "command received");
        self.speaker
            .speak(&format!("Got it. You said: {command}"))
            .await;

        let outcome = AssertUnwindSafe(self.executor.execute(intent))
            .catch_unwind()
            .await;
        if let Err(panic) = outcome {
            let message = panic_message(panic.as_ref());
            tracing::error!(command, panic = message, "action panicked");
            self.speaker.speak(ACTION_FAILED).await;
        }

        self.state = LoopState::AwaitingWake;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl<L: Listener> std::fmt::Debug for ConversationLoop<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationLoop")
            .field("state", &self.state)
            .field("wake_phrases", &self.wake_phrases)
            .field("wake_window", &self.wake_window)
            .field("command_window", &self.command_window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_phrases_match_anywhere() {
        let phrases = WakePhrases::new(vec!["hey assistant".into(), "hello".into()]);
        assert!(phrases.matches("hey assistant"));
        assert!(phrases.matches("well hello there"));
        assert!(!phrases.matches("hey there"));
        assert!(!phrases.matches(""));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
