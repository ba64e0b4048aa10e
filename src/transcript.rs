use std::fmt;
use anyhow::{Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};

// @module: Time-coded transcript lines and window filtering

// @struct: Single time-coded transcript line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    // @field: Caption text
    pub text: String,

    // @field: Start instant in seconds from the source origin
    pub start: f64,

    // @field: On-screen duration in seconds
    pub duration: f64,
}

impl TranscriptLine {
    /// Creates a new transcript line - used by tests and external consumers
    #[allow(dead_code)]
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        TranscriptLine {
            text: text.into(),
            start,
            duration,
        }
    }

    // @creates: Validated transcript line
    // @validates: Non-negative, finite timing
    pub fn new_validated(text: impl Into<String>, start: f64, duration: f64) -> Result<Self> {
        if !start.is_finite() || start < 0.0 {
            return Err(anyhow!("Invalid line start: {}", start));
        }

        if !duration.is_finite() || duration < 0.0 {
            return Err(anyhow!("Invalid line duration: {}", duration));
        }

        Ok(TranscriptLine {
            text: text.into(),
            start,
            duration,
        })
    }

    /// End instant in seconds, derived from start and duration
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Format a second offset as MM:SS.mmm for display
    pub fn format_seconds(seconds: f64) -> String {
        let total_ms = (seconds * 1000.0).round() as u64;
        let minutes = total_ms / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let millis = total_ms % 1_000;

        format!("{:02}:{:02}.{:03}", minutes, secs, millis)
    }
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} --> {}] {}",
            Self::format_seconds(self.start),
            Self::format_seconds(self.end()),
            self.text
        )
    }
}

// @struct: Requested clip window in source-absolute seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    // @field: Window start in seconds
    pub start: f64,

    // @field: Window end in seconds
    pub end: f64,
}

impl TimeWindow {
    // @creates: Validated window
    // @validates: end >= start >= 0, finite
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(anyhow!("Window bounds must be finite: {}..{}", start, end));
        }

        if start < 0.0 {
            return Err(anyhow!("Window start must be >= 0, got {}", start));
        }

        if end < start {
            return Err(anyhow!(
                "Window end {} is before window start {}",
                end, start
            ));
        }

        Ok(TimeWindow { start, end })
    }

    /// Window length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether a line's start instant falls inside this window.
    /// Inclusive on both edges; the line's end is deliberately ignored.
    pub fn contains_start(&self, line: &TranscriptLine) -> bool {
        self.start <= line.start && line.start <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} --> {}",
            TranscriptLine::format_seconds(self.start),
            TranscriptLine::format_seconds(self.end)
        )
    }
}

/// Full fetched transcript track for one video
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Video identifier the transcript belongs to
    pub video_id: String,

    /// Language code of the track
    pub language: String,

    /// Ordered time-coded lines
    pub lines: Vec<TranscriptLine>,
}

impl Transcript {
    /// Create a new transcript track
    pub fn new(video_id: impl Into<String>, language: impl Into<String>) -> Self {
        Transcript {
            video_id: video_id.into(),
            language: language.into(),
            lines: Vec::new(),
        }
    }

    /// Select the lines whose start instant falls inside the window.
    ///
    /// Input order is preserved as-is; the source is start-ascending in
    /// practice but no re-sort is applied either way. An empty result is
    /// valid and simply yields a clip with no captions.
    pub fn filter_window(&self, window: &TimeWindow) -> FilteredTranscript {
        let lines: Vec<TranscriptLine> = self
            .lines
            .iter()
            .filter(|line| window.contains_start(line))
            .cloned()
            .collect();

        if lines.is_empty() {
            warn!(
                "No transcript lines start inside window {} ({} lines total)",
                window,
                self.lines.len()
            );
        }

        FilteredTranscript { lines }
    }

    /// Concatenated plain text of the whole track, one space between lines
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Transcript for {}", self.video_id)?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Lines: {}", self.lines.len())?;
        Ok(())
    }
}

/// Window-filtered subsequence of a transcript, still in source order
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTranscript {
    /// Lines whose start instant fell inside the requested window
    pub lines: Vec<TranscriptLine>,
}

impl FilteredTranscript {
    /// Number of lines that survived the filter
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no line start fell inside the window
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
