//! hearken - a spoken-command assistant
//!
//! Listens for a wake phrase, captures the command that follows, classifies
//! it against an ordered rule table and carries it out, answering out loud.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Conversation loop                   │
//! │   listen → wake phrase → listen → classify → act    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Action executor                     │
//! │   Clock  │  Notes  │  Timers  │  Calculator         │
//! └────────────────────┬────────────────────────────────┘
//!                      │ capability traits
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Collaborators                       │
//! │   Mic/STT  │  TTS/Speaker  │  Browser  │  Web APIs  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod actions;
pub mod calc;
pub mod capability;
pub mod config;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod notes;
pub mod timer;
pub mod tools;
pub mod voice;

pub use actions::{ActionExecutor, ActionSettings, Collaborators};
pub use capability::{
    Browser, Clock, JokeSource, Knowledge, ListenWindow, Listener, MediaOutcome, MediaPlayer,
    Speaker, SummaryOutcome, SystemClock,
};
pub use config::{Config, LoadOptions};
pub use conversation::{ConversationLoop, LoopState, WakePhrases};
pub use error::{Error, Result};
pub use intent::{Intent, IntentMatcher};
pub use notes::{Note, NoteStore, NotesSnapshot};
pub use timer::{TimerId, TimerService};
