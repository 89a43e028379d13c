//! Append-only note log
//!
//! One UTF-8 file, one note per line: `<ISO-8601 timestamp> - <text>`.
//! Notes are never rewritten or deleted.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat};

use crate::Result;

/// A saved note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// When the note was taken
    pub timestamp: DateTime<Local>,
    /// Note text
    pub text: String,
}

impl Note {
    /// The line written to the log, including the trailing newline
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{} - {}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false),
            self.text
        )
    }
}

/// Contents of the log as seen by a reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesSnapshot {
    /// The log file has never been written
    Missing,
    /// The log exists but holds only whitespace
    Empty,
    /// Log text with surrounding whitespace trimmed
    Text(String),
}

/// File-backed note log
#[derive(Debug, Clone)]
pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    /// Create a store for the given file (the file is created on first append)
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a note
    ///
    /// The whole line goes out in a single write on a file opened in append
    /// mode, so records never interleave.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or written
    pub fn append(&self, timestamp: DateTime<Local>, text: &str) -> Result<Note> {
        let note = Note {
            timestamp,
            text: text.to_string(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(note.to_line().as_bytes())?;

        tracing::debug!(path = %self.path.display(), "note appended");
        Ok(note)
    }

    /// Read the whole log
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read
    pub fn read(&self) -> Result<NotesSnapshot> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(NotesSnapshot::Missing),
            Err(e) => return Err(e.into()),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            Ok(NotesSnapshot::Empty)
        } else {
            Ok(NotesSnapshot::Text(trimmed.to_string()))
        }
    }
}

/// First `limit` characters of `text`, never splitting a character
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    text.char_indices()
        .nth(limit)
        .map_or(text, |(idx, _)| &text[..idx])
}
