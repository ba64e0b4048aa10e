/*!
 * Error types for the snipcap application.
 *
 * This module contains custom error types for each pipeline stage,
 * using the thiserror crate for ergonomic error definitions. Every
 * stage failure is terminal for the current run: nothing here is
 * retried, the orchestrator reports it and stops.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while acquiring the source video from its hosting URL
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The URL was not recognized as a supported video link
    #[error("Unsupported or malformed video URL: {0}")]
    InvalidUrl(String),

    /// The downloader process could not be started
    #[error("Failed to launch downloader: {0}")]
    LaunchFailed(String),

    /// The downloader ran but did not succeed
    #[error("Video download failed: {0}")]
    DownloadFailed(String),

    /// The downloader reported success but produced no usable file
    #[error("Downloader produced no output file at {}", .0.display())]
    MissingOutput(PathBuf),

    /// The download exceeded the configured timeout
    #[error("Video download timed out after {0} seconds")]
    TimedOut(u64),
}

/// Errors raised while retrieving the time-coded transcript
///
/// Transcript absence is a content property, not a transient fault,
/// so none of these are retried.
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// No transcript exists for the video (or not in the requested language)
    #[error("No {language} transcript available for video {video_id}")]
    Unavailable {
        /// Video identifier the lookup was made for
        video_id: String,
        /// Language track that was requested
        language: String,
    },

    /// The retrieval service could not be reached
    #[error("Transcript request failed: {0}")]
    RequestFailed(String),

    /// The retrieval service answered with something unparseable
    #[error("Failed to parse transcript response: {0}")]
    ParseError(String),
}

/// Errors raised while cutting the clip out of the source video
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The media backend process could not be started
    #[error("Failed to launch media backend: {0}")]
    LaunchFailed(String),

    /// The media backend failed to trim or re-encode the segment
    #[error("Clip extraction failed: {0}")]
    BackendFailed(String),

    /// The trim exceeded the configured timeout
    #[error("Clip extraction timed out after {0} seconds")]
    TimedOut(u64),

    /// The backend reported success but wrote no clip
    #[error("Media backend produced no clip at {}", .0.display())]
    MissingOutput(PathBuf),
}

/// Errors raised while compositing captions onto the clip
#[derive(Error, Debug)]
pub enum CompositionError {
    /// A caption window does not fit inside the clip timeline.
    /// Signals an upstream windowing bug; never clamped or dropped.
    #[error(
        "Caption {index} timing out of range: {rel_start:.3}s..{rel_end:.3}s \
         does not fit clip of {clip_duration:.3}s"
    )]
    InvalidCaptionTiming {
        /// Zero-based position of the offending caption
        index: usize,
        /// Caption start relative to the clip origin
        rel_start: f64,
        /// Caption end relative to the clip origin
        rel_end: f64,
        /// Total duration of the trimmed clip
        clip_duration: f64,
    },

    /// The media backend failed while rendering the composite
    #[error("Render failed: {0}")]
    RenderFailed(String),

    /// The render exceeded the configured timeout
    #[error("Render timed out after {0} seconds")]
    TimedOut(u64),

    /// The rendered file could not be moved to its final path
    #[error("Failed to finalize rendered output: {0}")]
    FinalizeFailed(String),
}

/// Errors that can occur when talking to the text-generation API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },
}

/// Pipeline error type that wraps every stage failure
///
/// The orchestrator is the only layer that turns one of these into a
/// user-facing message; components below it return their own kind.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source video acquisition failed
    #[error("Acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// Transcript retrieval failed
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Clip extraction failed
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Caption composition or render failed
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    /// Text-generation provider failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility conversions for the orchestration layer
impl From<anyhow::Error> for PipelineError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
