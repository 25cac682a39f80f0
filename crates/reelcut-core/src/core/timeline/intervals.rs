//! Interval Merging
//!
//! Collapses overlapping or near-adjacent intervals into the minimal sorted
//! covering sequence.

use tracing::debug;

use crate::core::config::ToleranceConfig;
use crate::core::Interval;

/// Merges intervals that overlap or sit within a gap tolerance
#[derive(Clone, Debug)]
pub struct IntervalMerger {
    gap_sec: f64,
}

impl Default for IntervalMerger {
    fn default() -> Self {
        Self::from_config(&ToleranceConfig::default())
    }
}

impl IntervalMerger {
    /// Creates a merger; a negative or NaN gap behaves like zero
    pub fn new(gap_sec: f64) -> Self {
        Self {
            gap_sec: gap_sec.max(0.0),
        }
    }

    pub fn from_config(config: &ToleranceConfig) -> Self {
        Self::new(config.merge_gap_sec)
    }

    pub fn gap_sec(&self) -> f64 {
        self.gap_sec
    }

    /// Sorts by start and folds left, absorbing every interval whose start is
    /// within `gap` of the running end. Degenerate intervals are discarded.
    pub fn merge(&self, intervals: &[Interval]) -> Vec<Interval> {
        let mut sorted: Vec<Interval> = intervals
            .iter()
            .filter(|i| !i.is_degenerate())
            .copied()
            .collect();
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

        let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
        for next in sorted {
            match merged.last_mut() {
                Some(running) if next.start <= running.end + self.gap_sec => {
                    running.end = running.end.max(next.end);
                }
                _ => merged.push(next),
            }
        }

        debug!(
            input = intervals.len(),
            output = merged.len(),
            gap_sec = self.gap_sec,
            "Merged intervals"
        );
        merged
    }
}
