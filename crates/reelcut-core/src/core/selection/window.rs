//! Window Planning
//!
//! Splits the cue sequence into overlapping index windows so that a boundary
//! mistake made by the classifier in one window can be corrected by its
//! neighbour.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::WindowingConfig;
use crate::core::CoreResult;

/// A contiguous half-open slice `[start, end)` over the cue sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    /// First global cue index (inclusive)
    pub start: usize,
    /// Last global cue index (exclusive)
    pub end: usize,
    /// 1-based position among all windows, for diagnostics and prompt ordering
    pub ordinal: usize,
}

impl Window {
    /// Number of cues in the window
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Global index range covered by the window
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Returns true if the global index falls inside this window
    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// Plans overlapping windows over a cue sequence
#[derive(Clone, Debug)]
pub struct WindowPlanner {
    chunk_size: usize,
    overlap: usize,
}

impl WindowPlanner {
    /// Creates a planner, rejecting `overlap >= chunk_size` up front.
    pub fn new(chunk_size: usize, overlap: usize) -> CoreResult<Self> {
        let config = WindowingConfig {
            chunk_size,
            overlap,
        };
        Self::from_config(&config)
    }

    /// Creates a planner from the windowing section of the pipeline config
    pub fn from_config(config: &WindowingConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        })
    }

    /// Distance between consecutive window starts (always >= 1)
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Produces windows starting at `0, step, 2*step, ...` while the start is
    /// below `cue_count`, each clipped to the sequence length.
    pub fn plan(&self, cue_count: usize) -> Vec<Window> {
        let step = self.step();
        let windows: Vec<Window> = (0..cue_count)
            .step_by(step)
            .enumerate()
            .map(|(i, start)| Window {
                start,
                end: (start + self.chunk_size).min(cue_count),
                ordinal: i + 1,
            })
            .collect();

        debug!(
            cue_count,
            chunk_size = self.chunk_size,
            overlap = self.overlap,
            windows = windows.len(),
            "Planned classification windows"
        );

        windows
    }
}
