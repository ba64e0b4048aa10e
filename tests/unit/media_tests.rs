/*!
 * Tests for caption timeline validation and filtergraph construction
 */

use snipcap::editor::EditedTranscript;
use snipcap::errors::CompositionError;
use snipcap::media::{Caption, RenderSettings, Resolution, build_filtergraph, caption_timeline};
use snipcap::transcript::TimeWindow;
use crate::common;

fn edited(lines: &[(&str, f64, f64)]) -> EditedTranscript {
    let filtered = common::transcript(lines).filter_window(&TimeWindow::new(0.0, 1e9).unwrap());
    EditedTranscript::apply(&filtered, &vec![None; lines.len()]).unwrap()
}

fn settings() -> RenderSettings {
    RenderSettings {
        resolution: Resolution::default(),
        video_bitrate: "2500k".to_string(),
        audio_bitrate: "192k".to_string(),
        font_size: 48,
    }
}

#[test]
fn test_caption_timeline_withLinesInsideClip_shouldShiftToClipOrigin() {
    let transcript = edited(&[("one", 11.5, 2.0), ("two", 20.0, 1.5)]);
    let window = TimeWindow::new(10.0, 22.0).unwrap();

    let captions = caption_timeline(&transcript, &window, window.duration()).unwrap();

    assert_eq!(captions.len(), 2);
    assert_eq!(captions[0].rel_start, 1.5);
    assert_eq!(captions[0].duration, 2.0);
    assert_eq!(captions[0].rel_end(), 3.5);
    assert_eq!(captions[1].rel_start, 10.0);
    assert_eq!(captions[1].rel_end(), 11.5);
}

#[test]
fn test_caption_timeline_withEmptyTranscript_shouldProduceNoCaptions() {
    let transcript = edited(&[]);
    let window = TimeWindow::new(10.0, 22.0).unwrap();

    let captions = caption_timeline(&transcript, &window, window.duration()).unwrap();

    assert!(captions.is_empty());
}

/// A line starting before the window is a windowing bug, not something
/// to clamp
#[test]
fn test_caption_timeline_withStartBeforeWindow_shouldRejectNotClamp() {
    let transcript = edited(&[("early", 9.0, 1.0)]);
    let window = TimeWindow::new(10.0, 22.0).unwrap();

    let err = caption_timeline(&transcript, &window, window.duration()).unwrap_err();

    match err {
        CompositionError::InvalidCaptionTiming { index, rel_start, .. } => {
            assert_eq!(index, 0);
            assert_eq!(rel_start, -1.0);
        }
        other => panic!("expected InvalidCaptionTiming, got {:?}", other),
    }
}

/// A line running past the end of the clip is rejected the same way
#[test]
fn test_caption_timeline_withEndPastClip_shouldRejectNotClamp() {
    let transcript = edited(&[("ok", 11.0, 1.0), ("overruns", 21.0, 5.0)]);
    let window = TimeWindow::new(10.0, 22.0).unwrap();

    let err = caption_timeline(&transcript, &window, window.duration()).unwrap_err();

    match err {
        CompositionError::InvalidCaptionTiming { index, rel_end, clip_duration, .. } => {
            assert_eq!(index, 1);
            assert_eq!(rel_end, 16.0);
            assert_eq!(clip_duration, 12.0);
        }
        other => panic!("expected InvalidCaptionTiming, got {:?}", other),
    }
}

/// A caption that exactly touches the clip end is still valid
#[test]
fn test_caption_timeline_withEndExactlyAtClipEnd_shouldAccept() {
    let transcript = edited(&[("fits exactly", 20.0, 2.0)]);
    let window = TimeWindow::new(10.0, 22.0).unwrap();

    let captions = caption_timeline(&transcript, &window, window.duration()).unwrap();

    assert_eq!(captions.len(), 1);
    assert_eq!(captions[0].rel_end(), window.duration());
}

#[test]
fn test_build_filtergraph_withNoCaptions_shouldOnlyScaleAndPad() {
    let graph = build_filtergraph(&[], &settings());

    assert!(graph.starts_with("scale=1280:720:force_original_aspect_ratio=decrease"));
    assert!(graph.contains("pad=1280:720:(ow-iw)/2:(oh-ih)/2"));
    assert!(!graph.contains("drawtext"));
}

#[test]
fn test_build_filtergraph_withCaptions_shouldEmitOneDrawtextEach() {
    let captions = vec![
        Caption { text: "one".to_string(), rel_start: 0.0, duration: 2.0 },
        Caption { text: "two".to_string(), rel_start: 1.5, duration: 2.0 },
    ];

    let graph = build_filtergraph(&captions, &settings());

    assert_eq!(graph.matches("drawtext=").count(), 2);
    assert!(graph.contains("enable='between(t,0.000,2.000)'"));
    assert!(graph.contains("enable='between(t,1.500,3.500)'"));
    assert!(graph.contains("fontsize=48"));
    assert!(graph.contains("x=(w-text_w)/2"));
}

#[test]
fn test_build_filtergraph_withConfiguredResolution_shouldUseIt() {
    let mut custom = settings();
    custom.resolution = Resolution { width: 1080, height: 1920 };

    let graph = build_filtergraph(&[], &custom);

    assert!(graph.contains("scale=1080:1920"));
    assert!(graph.contains("pad=1080:1920"));
}

/// Filtergraph metacharacters in caption text must come out escaped
#[test]
fn test_build_filtergraph_withSpecialCharacters_shouldEscapeThem() {
    let captions = vec![Caption {
        text: r"50% off: yes, it's real\no".to_string(),
        rel_start: 0.0,
        duration: 1.0,
    }];

    let graph = build_filtergraph(&captions, &settings());

    assert!(graph.contains(r"\%"));
    assert!(graph.contains(r"\:"));
    assert!(graph.contains(r"\,"));
    assert!(graph.contains(r"\'"));
    assert!(graph.contains(r"\\"));
}

#[test]
fn test_resolution_default_shouldBe720p() {
    let resolution = Resolution::default();

    assert_eq!(resolution.width, 1280);
    assert_eq!(resolution.height, 720);
    assert_eq!(format!("{}", resolution), "1280x720");
}
