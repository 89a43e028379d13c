//! Countdown timers
//!
//! Each timer is a detached tokio task that sleeps and then announces itself.
//! Timers share nothing with each other or with the conversation loop apart
//! from the speaker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::capability::Speaker;

/// Announcement spoken when a timer fires
pub const TIMES_UP: &str = "Time's up!";

/// Identifier assigned to each started timer
///
/// Not used for anything yet; it gives cancellation or status queries
/// something to key on later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Starts fire-once timers
pub struct TimerService {
    speaker: Arc<dyn Speaker>,
    next_id: AtomicU64,
}

impl TimerService {
    /// Create a timer service that announces through `speaker`
    #[must_use]
    pub fn new(speaker: Arc<dyn Speaker>) -> Self {
        Self {
            speaker,
            next_id: AtomicU64::new(1),
        }
    }

    /// Acknowledge and start a timer for `seconds`
    ///
    /// The acknowledgement is spoken before this returns; the countdown runs
    /// in the background and this call never waits for it.
    pub async fn start(&self, seconds: u64) -> TimerId {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.speaker
            .speak(&format!("Sure, I have set a timer for {seconds} seconds."))
            .await;

        let speaker = Arc::clone(&self.speaker);
        tokio::spawn(async move {
            tracing::debug!(%id, seconds, "timer started");
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            tracing::info!(%id, seconds, "timer fired");
            speaker.speak(TIMES_UP).await;
        });

        id
    }
}

impl std::fmt::Debug for TimerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerService")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
