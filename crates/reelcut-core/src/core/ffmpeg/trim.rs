//! Trim Rendering
//!
//! Turns the final timeline into arguments for the external trimming step:
//! a `select`/`aselect` predicate for re-encoding, or per-cut seek arguments
//! for stream copy.

use crate::core::timeline::KeyframeCut;
use crate::core::Interval;

/// Renders intervals as `between(t,a,b)+between(t,c,d)...`.
///
/// The expression is usable as-is in `select='...'` and `aselect='...'`.
/// An empty list renders as `0`, which keeps no frames.
pub fn select_filter_expression(intervals: &[Interval]) -> String {
    if intervals.is_empty() {
        return "0".to_string();
    }
    intervals
        .iter()
        .map(|i| format!("between(t,{},{})", i.start, i.end))
        .collect::<Vec<_>>()
        .join("+")
}

/// Input-side seek arguments for one stream-copy cut: `-ss <start> -t <duration>`
pub fn lossless_trim_args(cut: &KeyframeCut) -> Vec<String> {
    vec![
        "-ss".to_string(),
        format!("{:.3}", cut.start),
        "-t".to_string(),
        format!("{:.3}", cut.duration),
    ]
}
