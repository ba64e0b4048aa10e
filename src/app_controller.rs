use anyhow::Result;
use log::{info, debug};
use std::path::Path;
use std::sync::Arc;
use indicatif::{ProgressBar, ProgressStyle, MultiProgress};

use crate::app_config::Config;
use crate::editor::{CorrectionSource, edit_with_source};
use crate::errors::{AcquisitionError, PipelineError, TranscriptError};
use crate::media::{Compositor, FfmpegBackend, MediaBackend, RenderedArtifact, extract_clip};
use crate::providers::{TranscriptSource, VideoAcquirer};
use crate::providers::youtube::{self, TimedTextClient};
use crate::providers::ytdlp::YtDlpAcquirer;
use crate::summarizer::SummaryService;
use crate::transcript::{TimeWindow, Transcript};

// @module: Pipeline orchestration

/// Main application controller for clip composition.
///
/// Owns the configuration and the external collaborators; each run is an
/// independent batch job with its own working directory, so multiple
/// controllers (or runs) can execute in parallel without locking.
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Video acquisition collaborator
    acquirer: Arc<dyn VideoAcquirer>,

    // @field: Transcript retrieval collaborator
    transcripts: Arc<dyn TranscriptSource>,

    // @field: Media trim/render collaborator
    backend: Arc<dyn MediaBackend>,
}

impl Controller {
    /// Create a controller with the real collaborators built from config
    pub fn with_config(config: Config) -> Result<Self> {
        let acquirer = Arc::new(YtDlpAcquirer::new(
            config.tools.ytdlp.clone(),
            config.tools.download_timeout_secs,
        ));

        let transcripts = Arc::new(TimedTextClient::new(
            config.transcript.endpoint.clone(),
            config.transcript.timeout_secs,
        ));

        let backend = Arc::new(FfmpegBackend::new(
            config.tools.ffmpeg.clone(),
            config.tools.encode_timeout_secs,
        ));

        Ok(Self::with_collaborators(config, acquirer, transcripts, backend))
    }

    /// Create a controller with injected collaborators (used by tests)
    pub fn with_collaborators(
        config: Config,
        acquirer: Arc<dyn VideoAcquirer>,
        transcripts: Arc<dyn TranscriptSource>,
        backend: Arc<dyn MediaBackend>,
    ) -> Self {
        Controller {
            config,
            acquirer,
            transcripts,
            backend,
        }
    }

    /// Run the full clip-composition pipeline for one video.
    ///
    /// URL in, rendered artifact at `output_path` out. Any stage failure
    /// is terminal: later stages are skipped and the run-scoped working
    /// directory (source download, trimmed clip) is dropped on return.
    pub async fn run_clip(
        &self,
        url: &str,
        window: TimeWindow,
        corrections: &dyn CorrectionSource,
        output_path: &Path,
    ) -> Result<RenderedArtifact, PipelineError> {
        let start_time = std::time::Instant::now();

        let video_id = youtube::extract_video_id(url)
            .ok_or_else(|| AcquisitionError::InvalidUrl(url.to_string()))?;

        let workdir = tempfile::tempdir()?;

        let multi_progress = MultiProgress::new();

        let download_bar = Self::stage_spinner(&multi_progress, "Downloading source video");
        let source = self.acquirer.acquire(url, workdir.path()).await?;
        download_bar.finish_with_message("Source video downloaded");

        let fetch_bar = Self::stage_spinner(&multi_progress, "Fetching transcript");
        let transcript = self
            .transcripts
            .fetch(&video_id, &self.config.transcript.language)
            .await?;
        fetch_bar.finish_with_message(format!("Transcript fetched: {} lines", transcript.lines.len()));

        let filtered = transcript.filter_window(&window);
        debug!(
            "Window {} keeps {} of {} transcript lines",
            window,
            filtered.len(),
            transcript.lines.len()
        );

        // The correction pass and the trim have no data dependency, so
        // they run concurrently; both must finish before composition.
        let edit_future = async {
            edit_with_source(&filtered, corrections)
                .await
                .map_err(PipelineError::from)
        };
        let clip_future = async {
            extract_clip(self.backend.as_ref(), &source, &window, workdir.path())
                .await
                .map_err(PipelineError::from)
        };
        let (edited, clip) = tokio::try_join!(edit_future, clip_future)?;

        let render_bar = Self::stage_spinner(&multi_progress, "Rendering captions");
        let compositor = Compositor::new(self.config.render.settings());
        let artifact = compositor
            .compose(self.backend.as_ref(), &clip, &edited, &window, output_path)
            .await?;
        render_bar.finish_with_message("Render complete");

        info!(
            "Clip complete: {} caption(s), {:?} ({})",
            artifact.caption_count,
            artifact.path,
            Self::format_duration(start_time.elapsed())
        );

        Ok(artifact)
    }

    /// Fetch the transcript for a URL and return its concatenated text
    pub async fn run_transcript(&self, url: &str) -> Result<String, PipelineError> {
        let transcript = self.fetch_for_url(url).await?;
        Ok(transcript.plain_text())
    }

    /// Fetch the transcript for a URL and return a one-shot summary
    pub async fn run_summary(&self, url: &str) -> Result<String, PipelineError> {
        let transcript = self.fetch_for_url(url).await?;

        info!("Generating summary...");
        let service = SummaryService::new(&self.config.summarizer);
        let summary = service.summarize(&transcript.plain_text()).await?;

        Ok(summary)
    }

    /// Resolve a URL to its video id and fetch the configured track
    async fn fetch_for_url(&self, url: &str) -> Result<Transcript, PipelineError> {
        let video_id = youtube::extract_video_id(url).ok_or_else(|| {
            TranscriptError::RequestFailed(format!("Unsupported video URL: {}", url))
        })?;

        info!("Fetching transcript for video {}", video_id);
        let transcript = self
            .transcripts
            .fetch(&video_id, &self.config.transcript.language)
            .await?;

        Ok(transcript)
    }

    /// Spinner for a long-running pipeline stage
    fn stage_spinner(multi_progress: &MultiProgress, message: &'static str) -> ProgressBar {
        let bar = multi_progress.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message);
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        bar
    }

    /// Format a duration as minutes and seconds for the completion log
    fn format_duration(duration: std::time::Duration) -> String {
        let total_secs = duration.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:01}s", seconds, duration.subsec_millis() / 100)
        }
    }
}
