/*!
 * # snipcap - captioned clips from transcribed videos
 *
 * A Rust library for cutting captioned clips out of videos that carry a
 * time-coded transcript.
 *
 * ## Features
 *
 * - Retrieve the time-coded transcript for a video
 * - Filter transcript lines to a requested clip window
 * - Reviewer correction pass that replaces text but never touches timing
 * - Trim and re-encode the clip window with ffmpeg
 * - Bake time-aligned caption overlays onto the trimmed clip
 * - One-shot transcript dump and summarization
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `transcript`: Time-coded lines, the clip window, and window filtering
 * - `editor`: Pluggable reviewer correction pass
 * - `media`: Clip extraction and caption composition over the media backend
 * - `providers`: Clients for the external collaborators:
 *   - `providers::ytdlp`: video acquisition
 *   - `providers::youtube`: transcript retrieval
 *   - `providers::openai`: text generation for summaries
 * - `summarizer`: One-shot transcript summarization
 * - `app_controller`: Pipeline orchestration
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod editor;
pub mod errors;
pub mod media;
pub mod providers;
pub mod summarizer;
pub mod transcript;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use editor::{CorrectionSource, EditedTranscript};
pub use media::{ClipArtifact, Compositor, MediaBackend, RenderedArtifact, Resolution};
pub use transcript::{FilteredTranscript, TimeWindow, Transcript, TranscriptLine};
pub use errors::{
    AcquisitionError, CompositionError, ExtractionError, PipelineError, ProviderError,
    TranscriptError,
};
