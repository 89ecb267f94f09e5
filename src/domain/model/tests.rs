// Unit tests for domain models

use super::*;

#[test]
fn test_page_label_display() {
    assert_eq!(PageLabel::screen("Home").to_string(), "Home");
    assert_eq!(
        PageLabel::LowConfidence.to_string(),
        "low confidence detection"
    );
}

#[test]
fn test_page_label_low_confidence() {
    assert!(PageLabel::LowConfidence.is_low_confidence());
    assert!(!PageLabel::screen("Settings").is_low_confidence());
}

#[test]
fn test_low_confidence_sample_has_zero_score() {
    let sample = Sample::low_confidence(1.5);
    assert_eq!(sample.label, PageLabel::LowConfidence);
    assert_eq!(sample.score, 0);
    assert_eq!(sample.timestamp_seconds, 1.5);
}

#[test]
fn test_segment_start() {
    let segment = Segment::new(PageLabel::screen("Settings"), 3.0, 5.0);
    assert_eq!(segment.start_seconds(), 2.0);
}

#[test]
fn test_label_serializes_as_plain_string() {
    let segment = Segment::new(PageLabel::LowConfidence, 1.0, 1.0);
    let json = serde_json::to_string(&segment).unwrap();
    assert!(json.contains("\"label\":\"low confidence detection\""));
}

#[test]
fn test_video_timeline_totals() {
    let timeline = VideoTimeline {
        video_name: "session-1".to_string(),
        sample_count: 12,
        segments: vec![
            Segment::new(PageLabel::screen("Home"), 2.0, 2.0),
            Segment::new(PageLabel::screen("Settings"), 3.0, 5.0),
            Segment::new(PageLabel::screen("Home"), 1.0, 6.0),
        ],
    };

    assert_eq!(timeline.total_seconds(), 6.0);
    assert_eq!(
        timeline.time_per_label(),
        vec![
            (PageLabel::screen("Home"), 3.0),
            (PageLabel::screen("Settings"), 3.0),
        ]
    );
}

#[test]
fn test_empty_video_timeline_total() {
    let timeline = VideoTimeline {
        video_name: "empty".to_string(),
        sample_count: 0,
        segments: vec![],
    };
    assert_eq!(timeline.total_seconds(), 0.0);
}
