//! Wikipedia summaries via the MediaWiki and REST APIs

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::capability::{Knowledge, SummaryOutcome};
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";

/// MediaWiki search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

/// REST page summary
#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    extract: String,
}

/// Looks up a topic and returns the opening sentences of its article
pub struct WikipediaKnowledge {
    client: reqwest::Client,
    base_url: String,
}

impl WikipediaKnowledge {
    /// Create a client for English Wikipedia
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client for another MediaWiki site
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("hearken/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Best-matching article title for `topic`
    async fn search_title(&self, topic: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", topic),
                ("srlimit", "1"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Knowledge(format!(
                "search returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .query
            .and_then(|q| q.search.into_iter().next())
            .map(|hit| hit.title))
    }

    /// Plain-text extract of the article, `None` for missing or ambiguous pages
    async fn extract(&self, title: &str) -> Result<Option<String>> {
        let slug = title.replace(' ', "_");
        let response = self
            .client
            .get(format!(
                "{}/api/rest_v1/page/summary/{}",
                self.base_url,
                urlencoding::encode(&slug)
            ))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::Knowledge(format!(
                "summary returned {}",
                response.status()
            )));
        }

        let page: PageSummary = response.json().await?;
        if page.kind == "disambiguation" || page.extract.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(page.extract))
    }

    async fn lookup(&self, topic: &str, sentences: usize) -> Result<Option<String>> {
        let Some(title) = self.search_title(topic).await? else {
            return Ok(None);
        };
        tracing::debug!(topic, title, "resolved article");

        Ok(self
            .extract(&title)
            .await?
            .map(|text| first_sentences(&text, sentences))
            .filter(|s| !s.is_empty()))
    }
}

#[async_trait]
impl Knowledge for WikipediaKnowledge {
    async fn summarize(&self, topic: &str, sentences: usize) -> SummaryOutcome {
        if topic.trim().is_empty() {
            return SummaryOutcome::NotFound;
        }

        match self.lookup(topic, sentences).await {
            Ok(Some(summary)) => SummaryOutcome::Found(summary),
            Ok(None) => SummaryOutcome::NotFound,
            // Lookup failures read the same to the user as an empty result
            Err(e) => {
                tracing::warn!(error = %e, topic, "wikipedia lookup failed");
                SummaryOutcome::NotFound
            }
        }
    }
}

/// The first `count` sentences of `text`
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace and then an
/// uppercase letter, digit or quote. Decimal points and initials such as
/// "J. R. R." followed by more initials are a known imprecision.
#[must_use]
pub fn first_sentences(text: &str, count: usize) -> String {
    let text = text.trim();
    if count == 0 {
        return String::new();
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut found = 0;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let end = pos + c.len_utf8();
        let rest = &chars[i + 1..];
        let at_end = rest.is_empty();
        let boundary = at_end
            || (rest[0].1.is_whitespace()
                && rest
                    .iter()
                    .map(|&(_, ch)| ch)
                    .find(|ch| !ch.is_whitespace())
                    .is_some_and(|ch| ch.is_uppercase() || ch.is_ascii_digit() || ch == '"'));

        if boundary {
            found += 1;
            if found == count {
                return text[..end].to_string();
            }
        }
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUST: &str = "Rust is a general-purpose programming language. It emphasizes \
        performance, type safety, and concurrency. Rust enforces memory safety.";

    #[test]
    fn test_first_sentences() {
        assert_eq!(
            first_sentences(RUST, 1),
            "Rust is a general-purpose programming language."
        );
        assert_eq!(
            first_sentences(RUST, 2),
            "Rust is a general-purpose programming language. It emphasizes \
             performance, type safety, and concurrency."
        );
    }

    #[test]
    fn test_first_sentences_short_text() {
        assert_eq!(first_sentences(RUST, 10), RUST);
        assert_eq!(first_sentences("No terminator here", 2), "No terminator here");
        assert_eq!(first_sentences(RUST, 0), "");
    }

    #[test]
    fn test_first_sentences_skips_lowercase_continuation() {
        let text = "Version 1.5 was released e.g. in spring. Then came more.";
        assert_eq!(first_sentences(text, 1), "Version 1.5 was released e.g. in spring.");
    }

    #[test]
    fn test_page_summary_parses() {
        let page: PageSummary =
            serde_json::from_str(r#"{"type":"standard","title":"Rust","extract":"Rust is."}"#)
                .unwrap();
        assert_eq!(page.kind, "standard");
        assert_eq!(page.extract, "Rust is.");
    }

    #[test]
    fn test_search_response_without_hits() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"batchcomplete":"","query":{"search":[]}}"#).unwrap();
        assert!(body.query.unwrap().search.is_empty());
    }

    #[tokio::test]
    async fn test_blank_topic_is_not_found() {
        let wiki = WikipediaKnowledge::new().unwrap();
        assert_eq!(wiki.summarize("   ", 2).await, SummaryOutcome::NotFound);
    }
}
