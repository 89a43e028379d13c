//! Text-mode stand-ins for the microphone and speakers

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::capability::{ListenWindow, Listener, Speaker};

/// Reads utterances from stdin, one per line
pub struct ConsoleListener {
    lines: Lines<BufReader<Stdin>>,
    closed: bool,
}

impl ConsoleListener {
    /// Listen on the process's standard input
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            closed: false,
        }
    }
}

impl Default for ConsoleListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Listener for ConsoleListener {
    async fn listen(&mut self, window: ListenWindow) -> String {
        // A closed stdin behaves like a silent room
        if self.closed {
            tokio::time::sleep(window.timeout).await;
            return String::new();
        }

        // Typing takes longer than speaking; the phrase limit extends the wait
        let wait = window.timeout + window.phrase_limit;
        match tokio::time::timeout(wait, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => line.trim().to_lowercase(),
            Ok(Ok(None)) => {
                tracing::debug!("stdin closed");
                self.closed = true;
                String::new()
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read stdin");
                self.closed = true;
                String::new()
            }
            Err(_) => String::new(),
        }
    }
}

/// Prints replies to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSpeaker;

#[async_trait]
impl Speaker for ConsoleSpeaker {
    async fn speak(&self, text: &str) {
        tracing::info!(text, "speaking");
        println!("Assistant: {text}");
    }
}
