//! Timeline Reconstruction Module
//!
//! Pure, deterministic stages that turn a selection of cues into the final
//! interval list:
//!
//! ```text
//! CueMerger -> OverlapCorrector -> [SilenceSnapper ->] IntervalMerger -> [KeyframeAligner]
//! ```

mod cue_merge;
mod intervals;
mod keyframes;
mod overlap;
mod snapping;

pub use cue_merge::CueMerger;
pub use intervals::IntervalMerger;
pub use keyframes::{KeyframeAligner, KeyframeCut};
pub use overlap::OverlapCorrector;
pub use snapping::SilenceSnapper;

use crate::core::config::ToleranceConfig;
use crate::core::{Cue, Interval, SilenceMidpoint};

/// Runs the merge, correct, snap and merge stages with one set of tolerances.
///
/// `midpoints` of `None` skips silence snapping entirely; an empty list still
/// snaps (every start moves to `0.0`).
pub fn build_intervals(
    cues: &[Cue],
    selected: &[usize],
    midpoints: Option<&[SilenceMidpoint]>,
    tolerances: &ToleranceConfig,
) -> Vec<Interval> {
    let blocks = CueMerger::from_config(tolerances).merge(cues, selected);
    let corrected = OverlapCorrector::from_config(tolerances).correct(&blocks);

    let snapped = match midpoints {
        Some(midpoints) => SilenceSnapper::new(midpoints.iter().copied()).snap_all(&corrected),
        None => corrected,
    };

    IntervalMerger::from_config(tolerances).merge(&snapped)
}
