//! Destructive and Edge Case Tests for the Highlight Pipeline
//!
//! These tests feed each stage the kind of input an untrusted classifier or a
//! sloppy transcript source produces: reversed and overlapping cues,
//! non-finite timestamps, absurd indices, duplicate windows.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::{PipelineConfig, ToleranceConfig};
use crate::core::selection::{
    parse_indices, ClassificationContext, ClassificationDispatcher, Classifier, Window,
    WindowPlanner, WindowRequest,
};
use crate::core::timeline::{
    build_intervals, CueMerger, IntervalMerger, KeyframeAligner, OverlapCorrector, SilenceSnapper,
};
use crate::core::{CoreError, CoreResult, Cue, Interval};

/// Returns the same raw text for every window
struct ConstantClassifier(&'static str);

#[async_trait]
impl Classifier for ConstantClassifier {
    async fn classify(
        &self,
        _request: &WindowRequest,
        _context: &ClassificationContext,
    ) -> CoreResult<String> {
        Ok(self.0.to_string())
    }
}

fn is_valid_timeline(intervals: &[Interval]) -> bool {
    intervals.iter().all(|i| !i.is_degenerate())
        && intervals.windows(2).all(|w| w[0].end < w[1].start)
}

// -----------------------------------------------------------------------------
// Windowing
// -----------------------------------------------------------------------------

#[test]
fn test_destructive_zero_chunk_size() {
    assert!(matches!(
        WindowPlanner::new(0, 0),
        Err(CoreError::Configuration(_))
    ));
}

#[test]
fn test_destructive_overlap_equal_to_chunk() {
    assert!(matches!(
        WindowPlanner::new(10, 10),
        Err(CoreError::Configuration(_))
    ));
}

#[test]
fn test_destructive_maximal_overlap_still_covers() {
    let planner = WindowPlanner::new(3, 2).unwrap();
    let windows = planner.plan(5);

    assert_eq!(windows.len(), 5);
    for i in 0..5 {
        assert!(windows.iter().any(|w| w.contains(i)));
    }
    assert!(windows.iter().all(|w| w.end <= 5));
}

// -----------------------------------------------------------------------------
// Classifier responses
// -----------------------------------------------------------------------------

#[test]
fn test_destructive_huge_and_negative_indices() {
    let indices = parse_indices(r#"{"result": [-5, 99999999999999999999, 3]}"#).unwrap();
    assert!(indices.contains(&-5));
    assert!(indices.contains(&3));
    assert_eq!(indices.len(), 3);
}

#[test]
fn test_destructive_non_json_response() {
    for raw in ["", "   ", "I think lines 3 and 4", "```json\n```", "[1, 2"] {
        assert!(
            matches!(parse_indices(raw), Err(CoreError::MalformedResponse { .. })),
            "accepted {:?}",
            raw
        );
    }
}

#[tokio::test]
async fn test_destructive_absurd_indices_filtered() {
    let cues: Vec<Cue> = (0..4)
        .map(|i| Cue::new(format!("c{i}"), i as f64, i as f64 + 1.0))
        .collect();
    let windows = WindowPlanner::new(2, 1).unwrap().plan(cues.len());
    let dispatcher = ClassificationDispatcher::new(
        Arc::new(ConstantClassifier(
            r#"{"result": {"indices": [-1, 0, 3, 4, 1000000, 0]}}"#,
        )),
        4,
    );

    let selected = dispatcher
        .dispatch(&cues, &windows, &ClassificationContext::default())
        .await
        .unwrap();
    assert_eq!(selected.as_slice(), &[0, 3]);
}

#[tokio::test]
async fn test_destructive_duplicate_windows() {
    let cues: Vec<Cue> = (0..3)
        .map(|i| Cue::new("x", i as f64, i as f64 + 1.0))
        .collect();
    let window = Window {
        start: 0,
        end: 3,
        ordinal: 1,
    };
    let dispatcher = ClassificationDispatcher::new(Arc::new(ConstantClassifier("[2, 1]")), 2);

    let selected = dispatcher
        .dispatch(&cues, &[window, window, window], &ClassificationContext::default())
        .await
        .unwrap();
    assert_eq!(selected.as_slice(), &[1, 2]);
}

// -----------------------------------------------------------------------------
// Timeline stages
// -----------------------------------------------------------------------------

#[test]
fn test_destructive_reversed_cue_order() {
    let cues = vec![
        Cue::new("third", 4.0, 5.0),
        Cue::new("second", 2.0, 3.0),
        Cue::new("first", 0.0, 1.0),
    ];
    let blocks = CueMerger::default().merge(&cues, &[0, 1, 2]);
    let starts: Vec<f64> = blocks.iter().map(|b| b.start).collect();
    assert_eq!(starts, vec![0.0, 2.0, 4.0]);
}

#[test]
fn test_destructive_identical_blocks_collapse() {
    let blocks = vec![Cue::new("a", 0.0, 1.0); 4];
    let out = OverlapCorrector::default().correct(&blocks);
    assert_eq!(out, vec![Interval::new(0.0, 1.0)]);
}

#[test]
fn test_destructive_nested_blocks_keep_starts_increasing() {
    // The second block ends before the first; dropping it must not pull the
    // running end backwards.
    let blocks = vec![
        Cue::new("", 0.0, 10.0),
        Cue::new("", 1.0, 2.0),
        Cue::new("", 3.0, 12.0),
    ];
    let out = OverlapCorrector::default().correct(&blocks);

    assert_eq!(out.len(), 2);
    assert!((out[1].start - 10.1).abs() < 1e-9);
    assert!(out.windows(2).all(|w| w[0].start < w[1].start));
}

#[test]
fn test_destructive_non_finite_timestamps() {
    let cues = vec![
        Cue::new("nan", f64::NAN, 1.0),
        Cue::new("ok", 2.0, 3.0),
        Cue::new("inf", 4.0, f64::INFINITY),
    ];
    let intervals = build_intervals(&cues, &[0, 1, 2], None, &ToleranceConfig::default());
    assert_eq!(intervals, vec![Interval::new(2.0, 3.0)]);
}

#[test]
fn test_destructive_inverted_cue() {
    let cues = vec![Cue::new("backwards", 5.0, 4.0), Cue::new("ok", 6.0, 7.0)];
    let intervals = build_intervals(&cues, &[0, 1], None, &ToleranceConfig::default());
    assert_eq!(intervals, vec![Interval::new(6.0, 7.0)]);
}

#[test]
fn test_destructive_non_finite_midpoints_ignored() {
    let snapper = SilenceSnapper::new([f64::NAN, 1.5, f64::INFINITY, f64::NEG_INFINITY]);
    assert_eq!(snapper.midpoints(), &[1.5]);
    assert_eq!(
        snapper.snap(&Interval::new(2.0, 3.0)),
        Some(Interval::new(1.5, 3.0))
    );
}

#[test]
fn test_destructive_merger_with_nan_gap() {
    let merger = IntervalMerger::new(f64::NAN);
    assert_eq!(merger.gap_sec(), 0.0);
    let out = merger.merge(&[Interval::new(0.0, 1.0), Interval::new(1.0, 2.0)]);
    assert_eq!(out, vec![Interval::new(0.0, 2.0)]);
}

#[test]
fn test_destructive_empty_keyframes() {
    let aligner = KeyframeAligner::new(Vec::new(), 0.001);
    let cut = aligner.align(&Interval::new(12.0, 15.0)).unwrap();
    assert_eq!(cut.start, 0.0);
    assert_eq!(cut.duration, 15.0);
}

#[test]
fn test_destructive_negative_start_alignment() {
    let aligner = KeyframeAligner::new(vec![-2.0, 0.0, 3.0], 0.001);
    assert_eq!(aligner.adjusted_start(-1.0), 0.0);
}

#[test]
fn test_destructive_dense_random_like_input_stays_valid() {
    // Deterministic pseudo-random cues, heavily overlapping
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % 10_000) as f64 / 100.0
    };
    let cues: Vec<Cue> = (0..300)
        .map(|i| {
            let start = next();
            let len = next() / 20.0;
            Cue::new(format!("c{i}"), start, start + len)
        })
        .collect();
    let all: Vec<usize> = (0..cues.len()).collect();
    let midpoints: Vec<f64> = (0..40).map(|_| next()).collect();

    let plain = build_intervals(&cues, &all, None, &ToleranceConfig::default());
    let snapped = build_intervals(&cues, &all, Some(&midpoints), &ToleranceConfig::default());

    assert!(is_valid_timeline(&plain));
    assert!(is_valid_timeline(&snapped));
}

#[test]
fn test_destructive_invalid_tolerances_rejected() {
    let mut config = PipelineConfig::default();
    config.tolerances.merge_gap_sec = f64::NAN;
    assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));

    let mut config = PipelineConfig::default();
    config.dispatch.max_workers = 0;
    assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));
}
