//! Keyframe Alignment
//!
//! Stream-copy cutting can only start on a keyframe, so every cut's start is
//! pulled back to the nearest keyframe at or before it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::IntervalMerger;
use crate::core::config::ToleranceConfig;
use crate::core::{Interval, Keyframe, TimeSec};

/// A cut ready for copy-based trimming
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframeCut {
    /// Keyframe-aligned start
    pub start: TimeSec,
    /// Requested end
    pub end: TimeSec,
    /// `end - start`
    pub duration: TimeSec,
}

/// Aligns cut starts to preceding keyframes
#[derive(Clone, Debug)]
pub struct KeyframeAligner {
    keyframes: Vec<Keyframe>,
    epsilon_sec: f64,
}

impl KeyframeAligner {
    /// Creates an aligner. Keyframes are sorted and deduplicated; non-finite
    /// timestamps are discarded.
    pub fn new(keyframes: impl IntoIterator<Item = Keyframe>, epsilon_sec: f64) -> Self {
        let mut keyframes: Vec<Keyframe> =
            keyframes.into_iter().filter(|k| k.is_finite()).collect();
        keyframes.sort_by(f64::total_cmp);
        keyframes.dedup();

        if keyframes.is_empty() {
            warn!("No keyframes available, every cut will start at 0.0");
        }

        Self {
            keyframes,
            epsilon_sec,
        }
    }

    pub fn from_config(keyframes: impl IntoIterator<Item = Keyframe>, config: &ToleranceConfig) -> Self {
        Self::new(keyframes, config.keyframe_epsilon_sec)
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Largest keyframe `<= start`, or `0.0` when none qualifies.
    ///
    /// Negative targets are treated as `0.0`. A negative keyframe (streams
    /// with a negative start PTS) is reported as `0.0`, so a cut never seeks
    /// before the start of the media.
    pub fn adjusted_start(&self, start: TimeSec) -> TimeSec {
        let target = start.max(0.0);
        let idx = self.keyframes.partition_point(|&k| k <= target);
        if idx == 0 {
            0.0
        } else {
            self.keyframes[idx - 1].max(0.0)
        }
    }

    /// Aligns one interval, or returns `None` if the aligned cut is shorter
    /// than the epsilon.
    pub fn align(&self, interval: &Interval) -> Option<KeyframeCut> {
        if !interval.start.is_finite() || !interval.end.is_finite() {
            return None;
        }
        let start = self.adjusted_start(interval.start);
        let duration = interval.end - start;
        if duration < self.epsilon_sec {
            return None;
        }
        Some(KeyframeCut {
            start,
            end: interval.end,
            duration,
        })
    }

    /// Aligns every interval, dropping degenerate cuts.
    ///
    /// Separate intervals can pull back to the same keyframe, so aligned cuts
    /// that overlap or touch are merged. The result is sorted with strictly
    /// increasing, non-overlapping cuts, each starting on a keyframe (or 0.0).
    pub fn align_all(&self, intervals: &[Interval]) -> Vec<KeyframeCut> {
        let aligned: Vec<Interval> = intervals
            .iter()
            .filter_map(|i| self.align(i))
            .map(|cut| Interval::new(cut.start, cut.end))
            .collect();

        let cuts: Vec<KeyframeCut> = IntervalMerger::new(0.0)
            .merge(&aligned)
            .into_iter()
            .map(|range| KeyframeCut {
                start: range.start,
                end: range.end,
                duration: range.duration(),
            })
            .collect();

        debug!(
            keyframes = self.keyframes.len(),
            input = intervals.len(),
            merged = aligned.len().saturating_sub(cuts.len()),
            cuts = cuts.len(),
            "Aligned cuts to keyframes"
        );
        cuts
    }
}
