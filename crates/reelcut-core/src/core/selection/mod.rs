//! Highlight Selection Module
//!
//! Splits a cue sequence into overlapping windows, asks a classifier which
//! cues in each window are worth keeping, and unions the answers into one
//! global index set.

mod dispatcher;
mod response;
mod window;

pub use dispatcher::ClassificationDispatcher;
pub use response::{parse_indices, strip_code_fences};
pub use window::{Window, WindowPlanner};

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{CoreResult, Cue};

// =============================================================================
// Classifier Trait
// =============================================================================

/// External collaborator that picks cues out of a window.
///
/// Implementations return the raw response text; the dispatcher owns parsing
/// so that every classifier gets the same lenient shape handling.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classifies one window and returns the raw response text
    async fn classify(
        &self,
        request: &WindowRequest,
        context: &ClassificationContext,
    ) -> CoreResult<String>;
}

// =============================================================================
// Window Request
// =============================================================================

/// Everything a classifier needs to judge one window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRequest {
    /// The window being classified
    pub window: Window,
    /// Number of windows in this run
    pub total_windows: usize,
    /// The window's cues, in order; `cues[i]` has global index `window.start + i`
    pub cues: Vec<Cue>,
}

impl WindowRequest {
    /// Builds the request for `window`, copying its cues out of the full sequence
    pub fn new(window: Window, total_windows: usize, all_cues: &[Cue]) -> Self {
        let end = window.end.min(all_cues.len());
        let start = window.start.min(end);
        Self {
            window,
            total_windows,
            cues: all_cues[start..end].to_vec(),
        }
    }

    /// Iterates `(global_index, cue)` pairs
    pub fn indexed_cues(&self) -> impl Iterator<Item = (usize, &Cue)> {
        self.cues
            .iter()
            .enumerate()
            .map(move |(i, cue)| (self.window.start + i, cue))
    }
}

// =============================================================================
// Classification Context
// =============================================================================

/// How aggressively the classifier should cut
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionLevel {
    /// Keep roughly a half to a third
    Relaxed,
    /// Keep roughly a quarter to a fifth
    #[default]
    Normal,
    /// Keep roughly an eighth to a tenth
    Hyper,
}

impl ReductionLevel {
    /// Target share of the transcript to keep, as prompt text
    pub fn keep_fraction(&self) -> &'static str {
        match self {
            Self::Relaxed => "1/2 to 1/3rd",
            Self::Normal => "1/4th to 1/5th",
            Self::Hyper => "1/8th to 1/10th",
        }
    }
}

/// Run-wide context shared by every window
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationContext {
    /// Title of the source media
    pub title: String,
    /// Short summary of the full transcript
    pub summary: String,
    /// Target reduction
    #[serde(default)]
    pub reduction: ReductionLevel,
}

impl ClassificationContext {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            reduction: ReductionLevel::default(),
        }
    }

    /// Sets the reduction level
    pub fn with_reduction(mut self, reduction: ReductionLevel) -> Self {
        self.reduction = reduction;
        self
    }
}

// =============================================================================
// Selection Index Set
// =============================================================================

/// Sorted, duplicate-free set of global cue indices
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionIndexSet(Vec<usize>);

impl SelectionIndexSet {
    /// Keeps indices in `[0, len)`, sorted and deduplicated
    pub fn from_raw(indices: impl IntoIterator<Item = i64>, len: usize) -> Self {
        indices
            .into_iter()
            .filter_map(|i| usize::try_from(i).ok())
            .filter(|&i| i < len)
            .collect()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl FromIterator<usize> for SelectionIndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let set: BTreeSet<usize> = iter.into_iter().collect();
        Self(set.into_iter().collect())
    }
}
