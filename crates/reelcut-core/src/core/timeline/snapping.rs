//! Silence Snapping
//!
//! Moves interval boundaries onto detected silence midpoints so that cuts do
//! not land in the middle of a word.

use tracing::debug;

use crate::core::{Interval, SilenceMidpoint, TimeSec};

/// Snaps interval boundaries to the nearest enclosing silences
#[derive(Clone, Debug, Default)]
pub struct SilenceSnapper {
    midpoints: Vec<SilenceMidpoint>,
}

impl SilenceSnapper {
    /// Creates a snapper. Midpoints are sorted and deduplicated; non-finite
    /// values are discarded.
    pub fn new(midpoints: impl IntoIterator<Item = SilenceMidpoint>) -> Self {
        let mut midpoints: Vec<SilenceMidpoint> =
            midpoints.into_iter().filter(|m| m.is_finite()).collect();
        midpoints.sort_by(f64::total_cmp);
        midpoints.dedup();
        Self { midpoints }
    }

    pub fn midpoints(&self) -> &[SilenceMidpoint] {
        &self.midpoints
    }

    pub fn is_empty(&self) -> bool {
        self.midpoints.is_empty()
    }

    /// Largest midpoint `<= t`, or `0.0` when none exists
    pub fn prev_cut(&self, t: TimeSec) -> TimeSec {
        let idx = self.midpoints.partition_point(|&m| m <= t);
        if idx == 0 {
            0.0
        } else {
            self.midpoints[idx - 1]
        }
    }

    /// Smallest midpoint `>= t`, or `t` itself when none exists
    pub fn next_cut(&self, t: TimeSec) -> TimeSec {
        let idx = self.midpoints.partition_point(|&m| m < t);
        self.midpoints.get(idx).copied().unwrap_or(t)
    }

    /// Returns `[prev_cut(start), next_cut(end))`, or `None` if that is degenerate
    pub fn snap(&self, interval: &Interval) -> Option<Interval> {
        if !interval.start.is_finite() || !interval.end.is_finite() {
            return None;
        }
        let snapped = Interval::new(self.prev_cut(interval.start), self.next_cut(interval.end));
        (!snapped.is_degenerate()).then_some(snapped)
    }

    /// Snaps each interval independently. Results may overlap; run them
    /// through an interval merger afterwards.
    pub fn snap_all(&self, intervals: &[Interval]) -> Vec<Interval> {
        let snapped: Vec<Interval> = intervals.iter().filter_map(|i| self.snap(i)).collect();
        debug!(
            midpoints = self.midpoints.len(),
            input = intervals.len(),
            output = snapped.len(),
            "Snapped intervals to silences"
        );
        snapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prev_and_next_cut() {
        let snapper = SilenceSnapper::new(vec![1.9, 2.6, 5.0]);

        assert_eq!(snapper.prev_cut(0.0), 0.0);
        assert_eq!(snapper.prev_cut(1.9), 1.9);
        assert_eq!(snapper.prev_cut(2.5), 1.9);
        assert_eq!(snapper.prev_cut(100.0), 5.0);

        assert_eq!(snapper.next_cut(2.0), 2.6);
        assert_eq!(snapper.next_cut(2.6), 2.6);
        assert_eq!(snapper.next_cut(7.0), 7.0);
    }

    #[test]
    fn test_snap_widens_to_surrounding_silences() {
        let snapper = SilenceSnapper::new(vec![1.9, 2.6]);
        let out = snapper.snap_all(&[Interval::new(0.0, 2.0), Interval::new(2.5, 4.0)]);

        assert_eq!(out, vec![Interval::new(0.0, 2.6), Interval::new(1.9, 4.0)]);
    }

    #[test]
    fn test_snap_never_narrows() {
        let snapper = SilenceSnapper::new(vec![0.4, 3.3, 7.7, 12.0]);
        for (start, end) in [(0.5, 1.0), (3.3, 7.7), (8.0, 20.0), (0.0, 0.2)] {
            let snapped = snapper.snap(&Interval::new(start, end)).unwrap();
            assert!(snapped.start <= start);
            assert!(snapped.end >= end);
        }
    }

    #[test]
    fn test_degenerate_result_dropped() {
        let snapper = SilenceSnapper::new(vec![4.0]);
        assert_eq!(snapper.snap(&Interval::new(f64::NAN, 2.0)), None);

        // Reversed interval whose start and end both snap to the same silence.
        assert_eq!(snapper.snap(&Interval::new(5.0, 1.0)), None);
    }

    #[test]
    fn test_midpoints_sorted_and_deduplicated() {
        let snapper = SilenceSnapper::new(vec![3.0, 1.0, f64::NAN, 3.0, 2.0]);
        assert_eq!(snapper.midpoints(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_no_midpoints_extends_start_to_zero() {
        let snapper = SilenceSnapper::default();
        assert!(snapper.is_empty());
        assert_eq!(
            snapper.snap(&Interval::new(4.0, 6.0)),
            Some(Interval::new(0.0, 6.0))
        );
    }
}
