//! ReelCut Core Type Definitions
//!
//! Defines the value types that flow between pipeline stages.

use serde::{Deserialize, Serialize};

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Timestamp of an independently decodable frame
pub type Keyframe = TimeSec;

/// Temporal center of a detected quiet period
pub type SilenceMidpoint = TimeSec;

// =============================================================================
// Cue
// =============================================================================

/// A single timestamped unit of transcript text (word, phrase, or caption line).
///
/// Cues are produced once per run by a cue source and never mutated afterwards.
/// Well-formed cues have `start < end`, but upstream sources are not trusted to
/// honour that, so every stage tolerates violations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Transcript text
    pub text: String,
    /// Start time in seconds
    pub start: TimeSec,
    /// End time in seconds
    pub end: TimeSec,
}

impl Cue {
    /// Creates a new cue
    pub fn new(text: impl Into<String>, start: TimeSec, end: TimeSec) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Returns the cue duration (may be negative for malformed input)
    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }

    /// Returns the cue's time span as an interval
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} - {:.3} : {}", self.start, self.end, self.text)
    }
}

// =============================================================================
// Interval
// =============================================================================

/// A `[start, end)` time range in the final edited timeline.
///
/// This is the unit the downstream trimmer consumes and serializes as
/// `{"start": .., "end": ..}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Start time in seconds
    pub start: TimeSec,
    /// End time in seconds
    pub end: TimeSec,
}

impl Interval {
    /// Creates a new interval. No validation is applied; see [`Interval::is_degenerate`].
    pub fn new(start: TimeSec, end: TimeSec) -> Self {
        Self { start, end }
    }

    /// Duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }

    /// Returns true when the interval has zero or negative length, or is not finite.
    pub fn is_degenerate(&self) -> bool {
        !self.start.is_finite() || !self.end.is_finite() || self.start >= self.end
    }

    /// Returns true if `time` lies inside `[start, end)`
    pub fn contains(&self, time: TimeSec) -> bool {
        time >= self.start && time < self.end
    }
}

/// Total duration covered by a list of intervals (overlaps counted twice).
pub fn total_duration(intervals: &[Interval]) -> TimeSec {
    intervals
        .iter()
        .filter(|i| !i.is_degenerate())
        .map(Interval::duration)
        .sum()
}

// =============================================================================
// Tests
// =============================================================================
