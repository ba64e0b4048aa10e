/*!
 * End-to-end pipeline tests driven entirely through mock collaborators
 */

use std::path::PathBuf;
use std::sync::Arc;

use snipcap::app_config::Config;
use snipcap::app_controller::Controller;
use snipcap::editor::{BatchCorrections, NoCorrections};
use snipcap::errors::{CompositionError, PipelineError};
use snipcap::transcript::{TimeWindow, TranscriptLine};

use crate::common;
use crate::common::mock_collaborators::{MockAcquirer, MockMediaBackend, MockTranscriptSource};

const URL: &str = "https://youtu.be/vid123";

fn lines_around_window() -> Vec<TranscriptLine> {
    common::transcript(&[
        ("before the window", 5.0, 2.0),
        ("first caption", 11.5, 2.0),
        ("second caption", 20.0, 1.5),
        ("after the window", 30.0, 2.0),
    ])
    .lines
}

fn controller(
    transcripts: MockTranscriptSource,
    backend: Arc<MockMediaBackend>,
) -> Controller {
    Controller::with_collaborators(
        Config::default(),
        Arc::new(MockAcquirer::default()),
        Arc::new(transcripts),
        backend,
    )
}

fn output_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("out.mp4")
}

#[tokio::test]
async fn test_run_clip_withTranscriptInWindow_shouldRenderCaptionedClip() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::working());

    let controller = controller(
        MockTranscriptSource::with_lines(lines_around_window()),
        backend.clone(),
    );

    let window = TimeWindow::new(10.0, 22.0).unwrap();
    let artifact = controller
        .run_clip(URL, window, &NoCorrections, &out)
        .await
        .unwrap();

    assert!(out.exists());
    assert_eq!(artifact.path, out);
    assert_eq!(artifact.caption_count, 2);

    let filtergraph = backend.last_filtergraph();
    assert_eq!(filtergraph.matches("drawtext=").count(), 2);
    assert!(filtergraph.contains("first caption"));
    assert!(filtergraph.contains("second caption"));
    assert!(!filtergraph.contains("before the window"));
}

#[tokio::test]
async fn test_run_clip_withCorrections_shouldRenderCorrectedText() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::working());

    let controller = controller(
        MockTranscriptSource::with_lines(lines_around_window()),
        backend.clone(),
    );

    let corrections = BatchCorrections::from_entries(vec![
        Some("first caption fixed".to_string()),
        None,
    ]);

    let window = TimeWindow::new(10.0, 22.0).unwrap();
    controller
        .run_clip(URL, window, &corrections, &out)
        .await
        .unwrap();

    let filtergraph = backend.last_filtergraph();
    assert!(filtergraph.contains("first caption fixed"));
    assert!(filtergraph.contains("second caption"));
}

/// An empty filtered transcript is not an error: the clip renders with
/// zero caption overlays
#[tokio::test]
async fn test_run_clip_withNoLineInWindow_shouldRenderWithoutCaptions() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::working());

    let controller = controller(
        MockTranscriptSource::with_lines(lines_around_window()),
        backend.clone(),
    );

    let window = TimeWindow::new(40.0, 50.0).unwrap();
    let artifact = controller
        .run_clip(URL, window, &NoCorrections, &out)
        .await
        .unwrap();

    assert!(out.exists());
    assert_eq!(artifact.caption_count, 0);
    assert!(!backend.last_filtergraph().contains("drawtext"));
}

/// No transcript means no artifact and nothing at the output path
#[tokio::test]
async fn test_run_clip_withUnavailableTranscript_shouldFailWithoutArtifact() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::working());

    let controller = controller(MockTranscriptSource::unavailable(), backend.clone());

    let window = TimeWindow::new(10.0, 22.0).unwrap();
    let err = controller
        .run_clip(URL, window, &NoCorrections, &out)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Transcript(_)));
    assert!(!out.exists());
    assert_eq!(backend.render_count(), 0);
}

#[tokio::test]
async fn test_run_clip_withUnsupportedUrl_shouldFailBeforeAcquisition() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::working());

    let controller = controller(
        MockTranscriptSource::with_lines(lines_around_window()),
        backend.clone(),
    );

    let window = TimeWindow::new(10.0, 22.0).unwrap();
    let err = controller
        .run_clip("https://example.com/watch?v=nope", window, &NoCorrections, &out)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Acquisition(_)));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_run_clip_withTrimFailure_shouldSkipRender() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::failing_trim());

    let controller = controller(
        MockTranscriptSource::with_lines(lines_around_window()),
        backend.clone(),
    );

    let window = TimeWindow::new(10.0, 22.0).unwrap();
    let err = controller
        .run_clip(URL, window, &NoCorrections, &out)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Extraction(_)));
    assert!(!out.exists());
    assert_eq!(backend.render_count(), 0);
}

/// A failed render leaves nothing behind at or next to the final path
#[tokio::test]
async fn test_run_clip_withRenderFailure_shouldLeaveNoPartialFile() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::failing_render());

    let controller = controller(
        MockTranscriptSource::with_lines(lines_around_window()),
        backend.clone(),
    );

    let window = TimeWindow::new(10.0, 22.0).unwrap();
    let err = controller
        .run_clip(URL, window, &NoCorrections, &out)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Composition(CompositionError::RenderFailed(_))
    ));
    assert!(!out.exists());

    let leftovers: Vec<_> = std::fs::read_dir(out_dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "no partial file may remain: {:?}", leftovers);
}

/// A filtered line that runs past the clip end halts the render instead
/// of being clamped
#[tokio::test]
async fn test_run_clip_withLineOverrunningClip_shouldFailWithInvalidTiming() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::working());

    let lines = common::transcript(&[("kept but overruns", 21.0, 5.0)]).lines;
    let controller = controller(MockTranscriptSource::with_lines(lines), backend.clone());

    let window = TimeWindow::new(10.0, 22.0).unwrap();
    let err = controller
        .run_clip(URL, window, &NoCorrections, &out)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Composition(CompositionError::InvalidCaptionTiming { .. })
    ));
    assert!(!out.exists());
    assert_eq!(backend.render_count(), 0);
}

#[tokio::test]
async fn test_run_clip_withFailingAcquirer_shouldSurfaceAcquisitionError() {
    let out_dir = tempfile::tempdir().unwrap();
    let out = output_path(&out_dir);
    let backend = Arc::new(MockMediaBackend::working());

    let controller = Controller::with_collaborators(
        Config::default(),
        Arc::new(MockAcquirer { fail: true }),
        Arc::new(MockTranscriptSource::with_lines(lines_around_window())),
        backend.clone(),
    );

    let window = TimeWindow::new(10.0, 22.0).unwrap();
    let err = controller
        .run_clip(URL, window, &NoCorrections, &out)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Acquisition(_)));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_run_transcript_withLines_shouldJoinPlainText() {
    let backend = Arc::new(MockMediaBackend::working());
    let lines = common::transcript(&[("hello", 0.0, 1.0), ("world", 1.0, 1.0)]).lines;
    let controller = controller(MockTranscriptSource::with_lines(lines), backend);

    let text = controller.run_transcript(URL).await.unwrap();

    assert_eq!(text, "hello world");
}

#[tokio::test]
async fn test_run_transcript_withUnavailableTranscript_shouldFail() {
    let backend = Arc::new(MockMediaBackend::working());
    let controller = controller(MockTranscriptSource::unavailable(), backend);

    let err = controller.run_transcript(URL).await.unwrap_err();

    assert!(matches!(err, PipelineError::Transcript(_)));
}
