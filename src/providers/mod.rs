/*!
 * Collaborator implementations for the external service boundaries.
 *
 * This module contains the clients the pipeline depends on:
 * - ytdlp: video acquisition from a hosting URL
 * - youtube: time-coded transcript retrieval (timedtext)
 * - openai: text generation for the one-shot summarizer
 *
 * Each boundary is a trait so the pipeline can be driven with fakes in
 * tests instead of ambient singletons.
 */

use std::fmt::Debug;
use std::path::Path;
use async_trait::async_trait;

use crate::errors::{AcquisitionError, TranscriptError};
use crate::media::VideoHandle;
use crate::transcript::Transcript;

/// Video acquisition boundary
///
/// Given a hosting URL, produces a local media file inside the
/// run-scoped working directory.
#[async_trait]
pub trait VideoAcquirer: Send + Sync + Debug {
    /// Download the source video
    ///
    /// # Arguments
    /// * `url` - The hosting-platform URL
    /// * `workdir` - Run-scoped directory the file must land in
    ///
    /// # Returns
    /// * `Result<VideoHandle, AcquisitionError>` - Handle to the local file
    async fn acquire(&self, url: &str, workdir: &Path) -> Result<VideoHandle, AcquisitionError>;
}

/// Transcript retrieval boundary
///
/// Returns the full ordered sequence of time-coded lines for a video.
/// A single failed attempt is surfaced immediately; transcript absence
/// is a content property, not a transient error.
#[async_trait]
pub trait TranscriptSource: Send + Sync + Debug {
    /// Fetch the transcript track for a video
    ///
    /// # Arguments
    /// * `video_id` - The platform video identifier
    /// * `language` - Language track to select (e.g. "en")
    ///
    /// # Returns
    /// * `Result<Transcript, TranscriptError>` - The ordered track or why not
    async fn fetch(&self, video_id: &str, language: &str) -> Result<Transcript, TranscriptError>;
}

pub mod ytdlp;
pub mod youtube;
pub mod openai;
