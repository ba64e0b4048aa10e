use std::fmt;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use log::{error, info, debug};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::editor::EditedTranscript;
use crate::errors::{CompositionError, ExtractionError};
use crate::transcript::TimeWindow;

// @module: Clip extraction and caption composition over the media backend

/// Acquired source video on local storage
#[derive(Debug, Clone)]
pub struct VideoHandle {
    /// Path of the downloaded media file
    pub path: PathBuf,
}

/// Trimmed, re-encoded segment of the source video.
///
/// The internal timeline is reset so that time 0 corresponds to the
/// window start in the original source; caption timing relies on this.
#[derive(Debug)]
pub struct ClipArtifact {
    /// Path of the trimmed segment
    pub path: PathBuf,

    /// Total clip duration in seconds (the window length)
    pub duration: f64,
}

/// Final rendered output with captions baked in
#[derive(Debug)]
pub struct RenderedArtifact {
    /// Path the finished file was moved to
    pub path: PathBuf,

    /// Number of caption overlays rendered
    pub caption_count: usize,
}

// @struct: Output canvas size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    // @field: Canvas width in pixels
    pub width: u32,

    // @field: Canvas height in pixels
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution {
            width: 1280,
            height: 720,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encode settings applied to the final render
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Target canvas the clip is scaled and letterboxed into
    pub resolution: Resolution,

    /// Video bitrate passed to the encoder (e.g. "2500k")
    pub video_bitrate: String,

    /// Audio bitrate passed to the encoder (e.g. "192k")
    pub audio_bitrate: String,

    /// Caption font size in points
    pub font_size: u32,
}

/// One caption overlay expressed in clip-relative seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// Caption text after the correction pass
    pub text: String,

    /// Start offset from the clip origin
    pub rel_start: f64,

    /// On-screen duration, unchanged from the transcript line
    pub duration: f64,
}

impl Caption {
    /// End offset from the clip origin
    pub fn rel_end(&self) -> f64 {
        self.rel_start + self.duration
    }
}

/// Re-express transcript lines relative to the clip origin.
///
/// Every line becomes an independent overlay; overlapping windows are
/// allowed and no merging is attempted. A line that does not fit inside
/// the clip timeline is rejected, never clamped: it signals a windowing
/// bug upstream and must halt the render.
pub fn caption_timeline(
    transcript: &EditedTranscript,
    window: &TimeWindow,
    clip_duration: f64,
) -> Result<Vec<Caption>, CompositionError> {
    let mut captions = Vec::with_capacity(transcript.len());

    for (index, line) in transcript.lines.iter().enumerate() {
        let rel_start = line.start - window.start;
        let rel_end = rel_start + line.duration;

        if rel_start < 0.0 || rel_end > clip_duration {
            return Err(CompositionError::InvalidCaptionTiming {
                index,
                rel_start,
                rel_end,
                clip_duration,
            });
        }

        captions.push(Caption {
            text: line.text.clone(),
            rel_start,
            duration: line.duration,
        });
    }

    Ok(captions)
}

/// Escape a value for use inside an ffmpeg filtergraph.
///
/// Filtergraphs treat `:` and `,` as separators and `\` as the escape
/// character, so all three must be escaped along with quotes.
fn escape_filter_value(raw: &str) -> String {
    raw.replace('\\', r"\\")
        .replace(':', r"\:")
        .replace(',', r"\,")
        .replace('\'', r"\'")
}

/// Escape caption text for the drawtext filter.
///
/// drawtext additionally expands `%{...}` expressions; caption text is
/// always literal.
fn escape_drawtext_value(raw: &str) -> String {
    escape_filter_value(raw).replace('%', r"\%")
}

/// Build the complete video filtergraph for a render.
///
/// An aspect-preserving scale plus letterbox pad to the target canvas,
/// followed by one drawtext filter per caption gated on its clip-relative
/// window. Captions are anchored centered.
pub fn build_filtergraph(captions: &[Caption], settings: &RenderSettings) -> String {
    let Resolution { width, height } = settings.resolution;

    let mut filters = vec![
        format!("scale={width}:{height}:force_original_aspect_ratio=decrease"),
        format!("pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color=black"),
    ];

    for caption in captions {
        filters.push(format!(
            "drawtext=text='{}':fontcolor=white:fontsize={}:borderw=2:bordercolor=black:\
             x=(w-text_w)/2:y=(h-text_h)/2:enable='between(t,{:.3},{:.3})'",
            escape_drawtext_value(&caption.text),
            settings.font_size,
            caption.rel_start,
            caption.rel_end(),
        ));
    }

    filters.join(",")
}

/// External media backend: byte-accurate trim and final render.
///
/// Modeled as an injected collaborator so the pipeline can be exercised
/// with a fake backend in tests.
#[async_trait]
pub trait MediaBackend: Send + Sync + Debug {
    /// Cut and re-encode a window of the source into `output`.
    ///
    /// The output timeline must start at zero at `window.start` of the
    /// source.
    async fn trim(
        &self,
        source: &Path,
        window: &TimeWindow,
        output: &Path,
    ) -> Result<(), ExtractionError>;

    /// Render the clip through a filtergraph into `output`
    async fn render(
        &self,
        clip: &Path,
        filtergraph: &str,
        settings: &RenderSettings,
        output: &Path,
    ) -> Result<(), CompositionError>;
}

/// Produce the trimmed media segment for the requested window.
///
/// Terminal on failure; no partial or fallback clip is produced.
pub async fn extract_clip(
    backend: &dyn MediaBackend,
    source: &VideoHandle,
    window: &TimeWindow,
    workdir: &Path,
) -> Result<ClipArtifact, ExtractionError> {
    let output = workdir.join("clip.mp4");

    backend.trim(&source.path, window, &output).await?;

    if !output.exists() {
        return Err(ExtractionError::MissingOutput(output));
    }

    Ok(ClipArtifact {
        path: output,
        duration: window.duration(),
    })
}

/// Caption compositor: overlays the edited transcript onto the clip
#[derive(Debug)]
pub struct Compositor {
    settings: RenderSettings,
}

impl Compositor {
    /// Create a compositor with the given render settings
    pub fn new(settings: RenderSettings) -> Self {
        Compositor { settings }
    }

    /// Compose captions onto the clip and render the final artifact.
    ///
    /// The render is staged next to `final_path` and atomically moved
    /// there on success, so a failed render never leaves a partial file
    /// at the expected location. An empty transcript renders zero
    /// overlays and succeeds.
    pub async fn compose(
        &self,
        backend: &dyn MediaBackend,
        clip: &ClipArtifact,
        transcript: &EditedTranscript,
        window: &TimeWindow,
        final_path: &Path,
    ) -> Result<RenderedArtifact, CompositionError> {
        let captions = caption_timeline(transcript, window, clip.duration)?;
        let filtergraph = build_filtergraph(&captions, &self.settings);

        debug!("Render filtergraph: {}", filtergraph);

        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CompositionError::FinalizeFailed(e.to_string()))?;
            }
        }

        let staging_path = staging_path_for(final_path);

        let render_result = backend
            .render(&clip.path, &filtergraph, &self.settings, &staging_path)
            .await;

        if let Err(e) = render_result {
            // Never leave a partial file behind
            if staging_path.exists() {
                let _ = std::fs::remove_file(&staging_path);
            }
            return Err(e);
        }

        std::fs::rename(&staging_path, final_path).map_err(|e| {
            let _ = std::fs::remove_file(&staging_path);
            CompositionError::FinalizeFailed(e.to_string())
        })?;

        info!(
            "Rendered {} caption overlay(s) at {} to {:?}",
            captions.len(),
            self.settings.resolution,
            final_path
        );

        Ok(RenderedArtifact {
            path: final_path.to_path_buf(),
            caption_count: captions.len(),
        })
    }
}

/// Staging path in the same directory as the final output, so the
/// finalize step is a same-filesystem rename
fn staging_path_for(final_path: &Path) -> PathBuf {
    let file_name = final_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("render.mp4"));

    final_path.with_file_name(format!(".{}.part", file_name))
}

/// Why an external tool invocation never produced an exit status
enum RunFailure {
    Launch(String),
    TimedOut,
}

/// Media backend driving ffmpeg as an external process
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    /// ffmpeg binary to invoke
    binary: String,

    /// Per-invocation timeout in seconds
    timeout_secs: u64,
}

impl FfmpegBackend {
    /// Create a backend with an explicit binary path and timeout
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        FfmpegBackend {
            binary: binary.into(),
            timeout_secs,
        }
    }

    /// Run one ffmpeg invocation with the configured timeout
    async fn run(&self, args: &[String]) -> Result<std::process::Output, RunFailure> {
        let ffmpeg_future = Command::new(&self.binary).args(args).output();

        let timeout = std::time::Duration::from_secs(self.timeout_secs);
        tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| {
                    RunFailure::Launch(format!("Failed to execute {}: {}", self.binary, e))
                })
            },
            _ = tokio::time::sleep(timeout) => {
                Err(RunFailure::TimedOut)
            }
        }
    }

    /// Strip ffmpeg's version banner, build configuration and stream
    /// metadata noise, keeping only meaningful error lines
    fn filter_stderr(stderr: &str) -> String {
        let noise_prefixes = [
            "ffmpeg version",
            "built with",
            "configuration:",
            "lib",
            "Input #",
            "Output #",
            "Metadata:",
            "Duration:",
            "Stream #",
            "Stream mapping:",
            "Press [q]",
            "frame=",
            "size=",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .map(|line| line.trim())
            .filter(|line| {
                !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p))
            })
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn trim(
        &self,
        source: &Path,
        window: &TimeWindow,
        output: &Path,
    ) -> Result<(), ExtractionError> {
        // -ss before -i resets output timestamps to zero, which is the
        // time-shift invariant caption timing depends on
        let args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            format!("{:.3}", window.start),
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-t".to_string(),
            format!("{:.3}", window.duration()),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "veryfast".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            output.to_string_lossy().to_string(),
        ];

        let result = self.run(&args).await.map_err(|failure| match failure {
            RunFailure::Launch(message) => ExtractionError::LaunchFailed(message),
            RunFailure::TimedOut => ExtractionError::TimedOut(self.timeout_secs),
        })?;

        if !result.status.success() {
            let stderr = Self::filter_stderr(&String::from_utf8_lossy(&result.stderr));
            error!("Clip extraction failed: {}", stderr);
            return Err(ExtractionError::BackendFailed(stderr));
        }

        Ok(())
    }

    async fn render(
        &self,
        clip: &Path,
        filtergraph: &str,
        settings: &RenderSettings,
        output: &Path,
    ) -> Result<(), CompositionError> {
        // The staging file has a .part suffix, so the container format
        // must be forced explicitly
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            clip.to_string_lossy().to_string(),
            "-vf".to_string(),
            filtergraph.to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-b:v".to_string(),
            settings.video_bitrate.clone(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            settings.audio_bitrate.clone(),
            "-f".to_string(),
            "mp4".to_string(),
            output.to_string_lossy().to_string(),
        ];

        let result = self.run(&args).await.map_err(|failure| match failure {
            RunFailure::Launch(message) => CompositionError::RenderFailed(message),
            RunFailure::TimedOut => CompositionError::TimedOut(self.timeout_secs),
        })?;

        if !result.status.success() {
            let stderr = Self::filter_stderr(&String::from_utf8_lossy(&result.stderr));
            error!("Render failed: {}", stderr);
            return Err(CompositionError::RenderFailed(stderr));
        }

        Ok(())
    }
}
