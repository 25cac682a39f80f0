//! Cue Merging
//!
//! Maps selected indices back onto the cue sequence and coalesces cues that
//! follow each other without a gap into single blocks.

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::config::ToleranceConfig;
use crate::core::Cue;

/// Coalesces selected cues into contiguous blocks
#[derive(Clone, Debug)]
pub struct CueMerger {
    adjacency_sec: f64,
}

impl Default for CueMerger {
    fn default() -> Self {
        Self::from_config(&ToleranceConfig::default())
    }
}

impl CueMerger {
    /// Creates a merger; cues closer than `adjacency_sec` to the block end join it
    pub fn new(adjacency_sec: f64) -> Self {
        Self { adjacency_sec }
    }

    pub fn from_config(config: &ToleranceConfig) -> Self {
        Self::new(config.cue_adjacency_sec)
    }

    /// Merges the cues named by `indices` into blocks.
    ///
    /// Indices past the end of `cues` are ignored and duplicates collapse.
    /// Selected cues are walked in start-time order, so the order of
    /// `indices` does not matter. A block's text is its cues' text joined by
    /// single spaces (empty texts included) and its end is the last merged
    /// cue's end.
    pub fn merge(&self, cues: &[Cue], indices: &[usize]) -> Vec<Cue> {
        let unique: BTreeSet<usize> = indices.iter().copied().filter(|&i| i < cues.len()).collect();

        let mut selected: Vec<&Cue> = unique.iter().map(|&i| &cues[i]).collect();
        selected.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut blocks: Vec<Cue> = Vec::new();
        for cue in selected {
            match blocks.last_mut() {
                Some(block) if (cue.start - block.end).abs() < self.adjacency_sec => {
                    block.end = cue.end;
                    block.text.push(' ');
                    block.text.push_str(&cue.text);
                }
                _ => blocks.push(cue.clone()),
            }
        }

        debug!(
            selected = unique.len(),
            blocks = blocks.len(),
            "Merged selected cues"
        );
        blocks
    }
}
