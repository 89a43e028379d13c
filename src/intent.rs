//! Command classification
//!
//! A command utterance resolves to exactly one [`Intent`] by walking an
//! ordered rule table. The first rule that fires wins, so the position of a
//! rule in [`RULES`] is its precedence: "a joke about time" is a time query.

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Speak the current time
    ShowTime,
    /// Speak today's date
    ShowDate,
    /// Open a website
    OpenSite(String),
    /// Run a web search
    WebSearch(String),
    /// Play media matching a query
    PlayMedia(String),
    /// Read a short encyclopedia summary
    Summarize(String),
    /// Tell a joke
    TellJoke,
    /// Start a countdown of the given seconds
    StartTimer(u64),
    /// A timer was requested without a usable duration
    TimerParseFailure,
    /// Append a note to the log
    SaveNote(String),
    /// Read the note log back
    ReadNotes,
    /// Evaluate an arithmetic expression
    Calculate(String),
    /// Nothing else matched; search the web for the whole utterance
    Fallback(String),
}

/// A named classification rule
#[derive(Clone, Copy)]
pub struct Rule {
    /// Short identifier, used in logs
    pub name: &'static str,
    /// Returns an intent when the rule applies to the utterance
    pub apply: fn(&str) -> Option<Intent>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

const TIMER_PHRASE: &str = "set timer for";

/// Rules in precedence order
pub const RULES: &[Rule] = &[
    Rule {
        name: "time",
        apply: |cmd| has_word(cmd, "time").then_some(Intent::ShowTime),
    },
    Rule {
        name: "date",
        apply: |cmd| has_word(cmd, "date").then_some(Intent::ShowDate),
    },
    Rule {
        name: "open",
        apply: |cmd| cmd.strip_prefix("open ").map(|s| Intent::OpenSite(s.to_string())),
    },
    Rule {
        name: "search",
        apply: |cmd| {
            cmd.strip_prefix("search for ")
                .map(|q| Intent::WebSearch(q.to_string()))
        },
    },
    Rule {
        name: "play",
        apply: |cmd| cmd.strip_prefix("play ").map(|q| Intent::PlayMedia(q.to_string())),
    },
    Rule {
        name: "wikipedia",
        apply: |cmd| {
            cmd.contains("wikipedia")
                .then(|| Intent::Summarize(cmd.replace("wikipedia", "").trim().to_string()))
        },
    },
    Rule {
        name: "joke",
        apply: |cmd| cmd.contains("joke").then_some(Intent::TellJoke),
    },
    Rule {
        name: "timer",
        apply: |cmd| {
            cmd.find(TIMER_PHRASE).map(|pos| {
                parse_timer_seconds(&cmd[pos + TIMER_PHRASE.len()..])
                    .map_or(Intent::TimerParseFailure, Intent::StartTimer)
            })
        },
    },
    Rule {
        name: "note",
        apply: |cmd| cmd.strip_prefix("note ").map(|t| Intent::SaveNote(t.to_string())),
    },
    Rule {
        name: "read_notes",
        apply: |cmd| cmd.contains("read notes").then_some(Intent::ReadNotes),
    },
    Rule {
        name: "calculate",
        apply: |cmd| {
            cmd.strip_prefix("calculate ")
                .or_else(|| cmd.strip_prefix("what is "))
                .map(|e| Intent::Calculate(e.to_string()))
        },
    },
];

/// Whether `word` appears as a whole word
///
/// "timer" and "update" must not read as time or date queries, otherwise the
/// timer rule further down could never fire.
fn has_word(cmd: &str, word: &str) -> bool {
    cmd.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

/// Seconds from the text following "set timer for"
///
/// Only the first token counts, and it must be a whole non-negative number:
/// "set timer for 3 seconds" is 3, "set timer for three" is nothing.
fn parse_timer_seconds(rest: &str) -> Option<u64> {
    rest.split_whitespace().next()?.parse().ok()
}

/// Maps command utterances to intents
#[derive(Debug, Clone, Copy)]
pub struct IntentMatcher {
    rules: &'static [Rule],
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentMatcher {
    /// Matcher over the standard rule table
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: RULES }
    }

    /// Matcher over a custom rule table, mostly useful to probe precedence
    #[must_use]
    pub const fn with_rules(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// Classify a command utterance
    ///
    /// Returns `None` only for blank input; every other utterance yields
    /// exactly one intent, falling back to a web search.
    #[must_use]
    pub fn classify(&self, utterance: &str) -> Option<Intent> {
        let cmd = utterance.trim();
        if cmd.is_empty() {
            return None;
        }

        let intent = self
            .rules
            .iter()
            .find_map(|rule| {
                (rule.apply)(cmd).inspect(|_| {
                    tracing::debug!(rule = rule.name, command = cmd, "rule matched");
                })
            })
            .unwrap_or_else(|| Intent::Fallback(cmd.to_string()));

        Some(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(cmd: &str) -> Intent {
        IntentMatcher::new().classify(cmd).unwrap()
    }

    #[test]
    fn test_each_rule() {
        assert_eq!(classify("what time is it"), Intent::ShowTime);
        assert_eq!(classify("what's the date today"), Intent::ShowDate);
        assert_eq!(
            classify("open github.com"),
            Intent::OpenSite("github.com".to_string())
        );
        assert_eq!(
            classify("search for rust lifetimes"),
            Intent::WebSearch("rust lifetimes".to_string())
        );
        assert_eq!(
            classify("play lofi beats"),
            Intent::PlayMedia("lofi beats".to_string())
        );
        assert_eq!(
            classify("wikipedia alan turing"),
            Intent::Summarize("alan turing".to_string())
        );
        assert_eq!(classify("tell me a joke"), Intent::TellJoke);
        assert_eq!(
            classify("set timer for 3 seconds"),
            Intent::StartTimer(3)
        );
        assert_eq!(
            classify("note buy milk"),
            Intent::SaveNote("buy milk".to_string())
        );
        assert_eq!(classify("please read notes"), Intent::ReadNotes);
        assert_eq!(
            classify("calculate 2+2"),
            Intent::Calculate("2+2".to_string())
        );
        assert_eq!(
            classify("what is 7 * 6"),
            Intent::Calculate("7 * 6".to_string())
        );
        assert_eq!(
            classify("how tall is everest"),
            Intent::Fallback("how tall is everest".to_string())
        );
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(classify("tell me a joke about time"), Intent::ShowTime);
        assert_eq!(classify("open the date picker"), Intent::ShowDate);
        assert_eq!(classify("what is the time"), Intent::ShowTime);
        assert_eq!(
            classify("play a joke"),
            Intent::PlayMedia("a joke".to_string())
        );
        assert_eq!(classify("read notes please"), Intent::ReadNotes);
    }

    #[test]
    fn test_rule_order_is_load_bearing() {
        const JOKE_FIRST: &[Rule] = &[RULES[6], RULES[0]];
        let reordered = IntentMatcher::with_rules(JOKE_FIRST);

        let cmd = "tell me a joke about time";
        assert_eq!(IntentMatcher::new().classify(cmd), Some(Intent::ShowTime));
        assert_eq!(reordered.classify(cmd), Some(Intent::TellJoke));
    }

    #[test]
    fn test_time_and_date_match_whole_words() {
        assert_eq!(classify("what's the time?"), Intent::ShowTime);
        assert_eq!(classify("set timer for 10"), Intent::StartTimer(10));
        assert_eq!(
            classify("search for software updates"),
            Intent::WebSearch("software updates".to_string())
        );
    }

    #[test]
    fn test_prefix_rules_need_the_prefix() {
        assert_eq!(
            classify("please open github"),
            Intent::Fallback("please open github".to_string())
        );
        assert_eq!(
            classify("open"),
            Intent::Fallback("open".to_string())
        );
    }

    #[test]
    fn test_wikipedia_removes_every_occurrence() {
        assert_eq!(
            classify("search wikipedia for wikipedia"),
            Intent::Summarize("search  for".to_string())
        );
    }

    #[test]
    fn test_timer_parse_failure() {
        assert_eq!(classify("set timer for"), Intent::TimerParseFailure);
        assert_eq!(
            classify("set timer for three seconds"),
            Intent::TimerParseFailure
        );
        assert_eq!(classify("set timer for -5"), Intent::TimerParseFailure);
        assert_eq!(classify("please set timer for 90"), Intent::StartTimer(90));
    }

    #[test]
    fn test_blank_input_is_not_classified() {
        let matcher = IntentMatcher::new();
        assert_eq!(matcher.classify(""), None);
        assert_eq!(matcher.classify("   \t "), None);
    }

    #[test]
    fn test_input_is_trimmed() {
        assert_eq!(
            classify("  open example.com  "),
            Intent::OpenSite("example.com".to_string())
        );
    }
}
