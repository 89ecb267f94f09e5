// Unit tests for timeline building and cleaning

use super::*;
use crate::domain::model::{Classification, PageLabel, Sample, Segment};
use crate::error::ScreenTraceError;

fn screen(timestamp: f64, label: &str) -> Sample {
    Sample::new(timestamp, PageLabel::screen(label), 50)
}

fn assert_segments_consistent(raw: &[Sample], segments: &[Segment]) {
    let total: f64 = segments.iter().map(|s| s.duration_seconds).sum();
    let last = raw.last().unwrap().timestamp_seconds;
    assert!((total - last).abs() < 1e-9, "durations {} != {}", total, last);

    let mut start = 0.0;
    for segment in segments {
        assert!(segment.duration_seconds >= 0.0);
        assert!((segment.start_seconds() - start).abs() < 1e-9);
        start = segment.cumulative_seconds;
    }

    for pair in segments.windows(2) {
        assert_ne!(pair[0].label, pair[1].label);
    }
}

#[test]
fn test_single_screen_video() {
    let raw = TimelineBuilder::from_classifications(
        DEFAULT_FEATURE_CUTOFF,
        vec![
            (0.0, Classification::new("Home", 50)),
            (0.5, Classification::new("Home", 50)),
            (1.0, Classification::new("Home", 50)),
        ],
    );

    let segments = clean(&raw).unwrap();
    assert_eq!(segments, vec![Segment::new(PageLabel::screen("Home"), 1.0, 1.0)]);
}

#[test]
fn test_screen_change() {
    let raw: Vec<Sample> = vec![
        screen(0.0, "Home"),
        screen(1.0, "Home"),
        screen(2.0, "Settings"),
        screen(3.0, "Settings"),
        screen(4.0, "Settings"),
        screen(5.0, "Settings"),
    ];

    let segments = clean(&raw).unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::new(PageLabel::screen("Home"), 2.0, 2.0),
            Segment::new(PageLabel::screen("Settings"), 3.0, 5.0),
        ]
    );
    assert_segments_consistent(&raw, &segments);
}

#[test]
fn test_interior_low_confidence_is_dropped() {
    let raw = vec![
        screen(0.0, "Home"),
        Sample::low_confidence(0.5),
        screen(1.0, "Home"),
    ];

    let segments = clean(&raw).unwrap();
    assert_eq!(segments, vec![Segment::new(PageLabel::screen("Home"), 1.0, 1.0)]);
}

#[test]
fn test_all_low_confidence() {
    let raw = TimelineBuilder::from_classifications(
        DEFAULT_FEATURE_CUTOFF,
        vec![
            (0.0, Classification::new("Home", 3)),
            (0.5, Classification::new("Settings", 10)),
            (1.0, Classification::new("Home", 0)),
            (1.5, Classification::new("Home", 7)),
        ],
    );

    let segments = clean(&raw).unwrap();
    assert_eq!(segments, vec![Segment::new(PageLabel::LowConfidence, 1.5, 1.5)]);
}

#[test]
fn test_leading_low_confidence_does_not_seed() {
    let raw = vec![
        Sample::low_confidence(0.0),
        Sample::low_confidence(0.5),
        screen(1.0, "Home"),
        screen(1.5, "Home"),
        screen(2.0, "Login"),
        screen(2.5, "Login"),
    ];

    let segments = clean(&raw).unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::new(PageLabel::screen("Home"), 2.0, 2.0),
            Segment::new(PageLabel::screen("Login"), 0.5, 2.5),
        ]
    );
    assert_segments_consistent(&raw, &segments);
}

#[test]
fn test_trailing_low_confidence_extends_last_segment() {
    let raw = vec![
        screen(0.0, "Home"),
        screen(0.5, "Cart"),
        Sample::low_confidence(1.0),
        Sample::low_confidence(1.5),
    ];

    let segments = clean(&raw).unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::new(PageLabel::screen("Home"), 0.5, 0.5),
            Segment::new(PageLabel::screen("Cart"), 1.0, 1.5),
        ]
    );
}

#[test]
fn test_change_on_final_sample_closes_with_zero_duration() {
    let raw = vec![screen(0.0, "Home"), screen(0.5, "Home"), screen(1.0, "Cart")];

    let segments = clean(&raw).unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::new(PageLabel::screen("Home"), 1.0, 1.0),
            Segment::new(PageLabel::screen("Cart"), 0.0, 1.0),
        ]
    );
    assert_segments_consistent(&raw, &segments);
}

#[test]
fn test_low_confidence_between_different_screens_does_not_split() {
    let raw = vec![
        screen(0.0, "Home"),
        Sample::low_confidence(0.5),
        Sample::low_confidence(1.0),
        screen(1.5, "Search"),
        screen(2.0, "Home"),
    ];

    let segments = clean(&raw).unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0], Segment::new(PageLabel::screen("Home"), 1.5, 1.5));
    assert_segments_consistent(&raw, &segments);
}

#[test]
fn test_empty_input() {
    let result = clean(&[]);
    assert!(matches!(result, Err(ScreenTraceError::EmptyInput)));
}

#[test]
fn test_single_sample() {
    let segments = clean(&[screen(0.0, "Home")]).unwrap();
    assert_eq!(segments, vec![Segment::new(PageLabel::screen("Home"), 0.0, 0.0)]);
}

#[test]
fn test_cleaning_is_deterministic() {
    let labels = ["Home", "Home", "Cart", "Cart", "Home", "Checkout", "Checkout"];
    let raw: Vec<Sample> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            if i == 3 {
                Sample::low_confidence(i as f64 * 0.5)
            } else {
                screen(i as f64 * 0.5, label)
            }
        })
        .collect();

    let first = clean(&raw).unwrap();
    let second = clean(&raw).unwrap();
    assert_eq!(first, second);
    assert_segments_consistent(&raw, &first);
}

#[test]
fn test_incremental_cleaner_matches_batch() {
    let raw = vec![
        screen(0.0, "Home"),
        screen(0.5, "Profile"),
        Sample::low_confidence(1.0),
        screen(1.5, "Profile"),
    ];

    let mut cleaner = TimelineCleaner::new();
    for sample in &raw {
        cleaner.push(sample);
    }
    assert_eq!(cleaner.finish().unwrap(), clean(&raw).unwrap());
}
