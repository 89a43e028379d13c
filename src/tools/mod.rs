//! Concrete collaborators behind the capability traits

mod browser;
mod jokes;
mod wikipedia;
mod youtube;

pub use browser::SystemBrowser;
pub use jokes::JokeBook;
pub use wikipedia::{WikipediaKnowledge, first_sentences};
pub use youtube::{YoutubePlayer, first_video_id};
