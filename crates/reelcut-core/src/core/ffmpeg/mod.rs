//! FFmpeg Integration Module
//!
//! Media-side collaborators of the highlight pipeline:
//! - Binary detection (system PATH and common install locations)
//! - Silence detection through the `silencedetect` audio filter
//! - Keyframe probing through `ffprobe`
//! - Rendering intervals and cuts into trim arguments

mod detection;
mod keyframes;
mod silence;
mod trim;

pub use detection::*;
pub use keyframes::{parse_keyframe_times, FFprobeKeyframeProbe, KeyframeProbe};
pub use silence::{parse_silencedetect, FFmpegSilenceDetector, SilenceDetector, SilenceSpan};
pub use trim::{lossless_trim_args, select_filter_expression};
