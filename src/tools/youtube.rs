//! Plays the top YouTube result for a query

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::capability::{Browser, MediaOutcome, MediaPlayer};
use crate::{Error, Result};

const RESULTS_URL: &str = "https://www.youtube.com/results?search_query=";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""videoId":"([\w-]{11})""#).expect("valid regex"));

/// Finds a video on the results page and opens it in the browser
pub struct YoutubePlayer {
    client: reqwest::Client,
    browser: Arc<dyn Browser>,
}

impl YoutubePlayer {
    /// Create a player that opens videos through `browser`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(browser: Arc<dyn Browser>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) hearken")
            .build()
            .map_err(Error::Http)?;

        Ok(Self { client, browser })
    }

    async fn find_video(&self, query: &str) -> Result<Option<String>> {
        let url = format!("{RESULTS_URL}{}", urlencoding::encode(query));
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Media(format!(
                "YouTube search returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        Ok(first_video_id(&body).map(str::to_string))
    }
}

/// First video id embedded in a YouTube results page
#[must_use]
pub fn first_video_id(page: &str) -> Option<&str> {
    VIDEO_ID
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[async_trait]
impl MediaPlayer for YoutubePlayer {
    async fn play(&self, query: &str) -> MediaOutcome {
        let video = match self.find_video(query).await {
            Ok(Some(video)) => video,
            Ok(None) => {
                tracing::info!(query, "no video found");
                return MediaOutcome::Unavailable;
            }
            Err(e) => {
                tracing::warn!(error = %e, query, "video search failed");
                return MediaOutcome::Unavailable;
            }
        };

        let url = format!("{WATCH_URL}{video}");
        match self.browser.open(&url).await {
            Ok(()) => MediaOutcome::Playing,
            Err(e) => {
                tracing::warn!(error = %e, url, "failed to open video");
                MediaOutcome::Unavailable
            }
        }
    }
}
