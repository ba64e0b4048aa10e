use std::time::Duration;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use url::Url;
use log::{debug, error};

use crate::errors::TranscriptError;
use crate::providers::TranscriptSource;
use crate::transcript::{Transcript, TranscriptLine};

// @module: Video URL parsing and timedtext transcript retrieval

// @const: Recognized watch-URL forms
static VIDEO_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com/watch\?v=|youtu\.be/)(?P<id>[\w-]+)(&\S*)?")
        .unwrap()
});

/// Whether the text looks like a supported video watch URL
pub fn is_video_url(text: &str) -> bool {
    VIDEO_URL_REGEX.is_match(text.trim())
}

/// Extract the video identifier from a watch URL.
///
/// Supports `youtube.com/watch?v=` and `youtu.be/` forms, with or
/// without scheme and `www.`; returns None for anything else.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_URL_REGEX
        .captures(url.trim())
        .and_then(|caps| caps.name("id"))
        .map(|m| m.as_str().to_string())
}

/// Default public timedtext endpoint
pub const DEFAULT_TIMEDTEXT_ENDPOINT: &str = "https://www.youtube.com/api/timedtext";

/// Transcript retrieval client for the timedtext service.
///
/// Fetches the requested language track in json3 format. One attempt
/// only; every failure is terminal for the run.
#[derive(Debug)]
pub struct TimedTextClient {
    /// HTTP client for API requests
    client: Client,
    /// Service endpoint URL
    endpoint: String,
}

/// Timedtext json3 document
#[derive(Debug, Deserialize)]
struct TimedTextResponse {
    /// Caption events; formatting-only events carry no segments
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

/// One timedtext event
#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    /// Start offset in milliseconds
    #[serde(rename = "tStartMs")]
    start_ms: Option<u64>,

    /// Duration in milliseconds
    #[serde(rename = "dDurationMs")]
    duration_ms: Option<u64>,

    /// Text segments making up the event
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

/// One text segment within an event
#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    /// Segment text
    #[serde(rename = "utf8", default)]
    text: String,
}

impl TimedTextClient {
    /// Create a new client against the given endpoint
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        TimedTextClient {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    /// Fetch one language track as a transcript
    pub async fn fetch_track(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Transcript, TranscriptError> {
        let request_url = Url::parse_with_params(
            &self.endpoint,
            &[("v", video_id), ("lang", language), ("fmt", "json3")],
        )
        .map_err(|e| TranscriptError::RequestFailed(e.to_string()))?;

        debug!("Fetching {} transcript for video {}", language, video_id);

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| TranscriptError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Timedtext request for {} returned {}", video_id, status);
            return Err(TranscriptError::RequestFailed(format!(
                "timedtext responded with status {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscriptError::RequestFailed(e.to_string()))?;

        // The service answers 200 with an empty body when the requested
        // track does not exist
        if body.trim().is_empty() {
            return Err(TranscriptError::Unavailable {
                video_id: video_id.to_string(),
                language: language.to_string(),
            });
        }

        parse_json3(video_id, language, &body)
    }
}

#[async_trait]
impl TranscriptSource for TimedTextClient {
    async fn fetch(&self, video_id: &str, language: &str) -> Result<Transcript, TranscriptError> {
        self.fetch_track(video_id, language).await
    }
}

/// Parse a timedtext json3 document into a transcript.
///
/// Formatting-only events (no segments, no timing) are skipped; segment
/// texts are joined and newlines inside a line collapse to spaces.
pub fn parse_json3(
    video_id: &str,
    language: &str,
    body: &str,
) -> Result<Transcript, TranscriptError> {
    let response: TimedTextResponse =
        serde_json::from_str(body).map_err(|e| TranscriptError::ParseError(e.to_string()))?;

    let mut transcript = Transcript::new(video_id, language);

    for event in response.events {
        let (Some(start_ms), Some(duration_ms)) = (event.start_ms, event.duration_ms) else {
            continue;
        };

        let text: String = event
            .segs
            .iter()
            .map(|seg| seg.text.as_str())
            .collect::<String>()
            .replace('\n', " ")
            .trim()
            .to_string();

        if text.is_empty() {
            continue;
        }

        let line = TranscriptLine::new_validated(
            text,
            start_ms as f64 / 1000.0,
            duration_ms as f64 / 1000.0,
        )
        .map_err(|e| TranscriptError::ParseError(e.to_string()))?;

        transcript.lines.push(line);
    }

    if transcript.lines.is_empty() {
        return Err(TranscriptError::Unavailable {
            video_id: video_id.to_string(),
            language: language.to_string(),
        });
    }

    Ok(transcript)
}
