//! Overlap Correction
//!
//! Turns merged blocks into a strictly increasing, non-overlapping interval
//! sequence by pushing colliding starts forward by a fixed nudge.

use tracing::debug;

use crate::core::config::ToleranceConfig;
use crate::core::{Cue, Interval};

/// Forces strictly increasing, non-overlapping starts
#[derive(Clone, Debug)]
pub struct OverlapCorrector {
    nudge_sec: f64,
}

impl Default for OverlapCorrector {
    fn default() -> Self {
        Self::from_config(&ToleranceConfig::default())
    }
}

impl OverlapCorrector {
    pub fn new(nudge_sec: f64) -> Self {
        Self { nudge_sec }
    }

    pub fn from_config(config: &ToleranceConfig) -> Self {
        Self::new(config.overlap_nudge_sec)
    }

    /// Corrects blocks (assumed sorted by start) into intervals.
    ///
    /// A start at or before the previous interval's end moves to
    /// `previous_end + nudge`; ends are never modified. A block whose start
    /// ends up at or past its own end is dropped and does not advance the
    /// previous end.
    pub fn correct(&self, blocks: &[Cue]) -> Vec<Interval> {
        self.correct_intervals(blocks.iter().map(Cue::interval))
    }

    /// Same as [`OverlapCorrector::correct`] over bare intervals
    pub fn correct_intervals(&self, intervals: impl IntoIterator<Item = Interval>) -> Vec<Interval> {
        let mut prev_end = f64::NEG_INFINITY;
        let mut out = Vec::new();
        let mut dropped = 0usize;

        for interval in intervals {
            let start = if interval.start <= prev_end {
                prev_end + self.nudge_sec
            } else {
                interval.start
            };

            let corrected = Interval::new(start, interval.end);
            if corrected.is_degenerate() {
                dropped += 1;
                continue;
            }

            prev_end = corrected.end;
            out.push(corrected);
        }

        if dropped > 0 {
            debug!(dropped, "Dropped intervals collapsed by overlap correction");
        }
        out
    }
}
