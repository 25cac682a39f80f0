//! Keyframe Probing

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::FFmpegInfo;
use crate::core::process::media_command;
use crate::core::{CoreError, CoreResult, Keyframe};

/// Source of keyframe timestamps for a media file
#[async_trait]
pub trait KeyframeProbe: Send + Sync {
    /// Returns keyframe presentation times in ascending order
    async fn keyframes(&self, media: &Path) -> CoreResult<Vec<Keyframe>>;
}

/// Parses one `pts_time` per line, as printed by `-of csv=p=0`.
///
/// Lines that are not numbers (`N/A`, blank lines) are skipped. The result is
/// sorted and deduplicated.
pub fn parse_keyframe_times(stdout: &str) -> Vec<Keyframe> {
    let mut times: Vec<Keyframe> = stdout
        .lines()
        .filter_map(|line| line.trim().trim_end_matches(',').parse::<f64>().ok())
        .filter(|t| t.is_finite())
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup();
    times
}

/// [`KeyframeProbe`] backed by the `ffprobe` binary
#[derive(Clone, Debug)]
pub struct FFprobeKeyframeProbe {
    ffprobe_path: PathBuf,
}

impl FFprobeKeyframeProbe {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    pub fn from_info(info: &FFmpegInfo) -> Self {
        Self::new(info.ffprobe_path.clone())
    }
}

#[async_trait]
impl KeyframeProbe for FFprobeKeyframeProbe {
    async fn keyframes(&self, media: &Path) -> CoreResult<Vec<Keyframe>> {
        if !media.exists() {
            return Err(CoreError::FileNotFound(media.display().to_string()));
        }

        let output = media_command(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-skip_frame",
                "nokey",
                "-show_entries",
                "frame=pts_time",
                "-of",
                "csv=p=0",
            ])
            .arg(media)
            .output()
            .await
            .map_err(|e| CoreError::FFprobe(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::FFprobe(format!(
                "Keyframe probe failed: {}",
                stderr.trim()
            )));
        }

        let keyframes = parse_keyframe_times(&String::from_utf8_lossy(&output.stdout));
        info!(media = %media.display(), keyframes = keyframes.len(), "Probed keyframes");
        Ok(keyframes)
    }
}
