//! Built-in joke collection

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::capability::JokeSource;

const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are 10 kinds of people in the world: those who understand binary and those who don't.",
    "A SQL query walks into a bar, walks up to two tables and asks, can I join you?",
    "Why did the developer go broke? Because he used up all his cache.",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem.",
    "I would tell you a UDP joke, but you might not get it.",
    "Why do Java developers wear glasses? Because they don't C sharp.",
    "An optimist says the glass is half full. A programmer says the glass is twice as big as it needs to be.",
    "Debugging is like being the detective in a crime movie where you are also the murderer.",
    "Knock knock. Race condition. Who's there?",
    "There are only two hard things in computer science: cache invalidation, naming things, and off-by-one errors.",
    "Why was the function sad after the party? It didn't get a callback.",
];

/// Picks a random joke from a fixed list
#[derive(Debug, Clone, Copy)]
pub struct JokeBook {
    enabled: bool,
}

impl JokeBook {
    /// Create a joke book; a disabled one never has a joke
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for JokeBook {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl JokeSource for JokeBook {
    async fn joke(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        JOKES
            .choose(&mut rand::thread_rng())
            .map(|joke| (*joke).to_string())
    }
}
