//! Silence Detection
//!
//! Runs FFmpeg's `silencedetect` audio filter over the media and reduces every
//! detected silence to its midpoint, the point interval boundaries snap to.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::FFmpegInfo;
use crate::core::config::SilenceConfig;
use crate::core::process::media_command;
use crate::core::{CoreError, CoreResult, SilenceMidpoint, TimeSec};

#[allow(clippy::unwrap_used)]
static SILENCE_EVENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"silence_(start|end):\s*(-?[0-9]+(?:\.[0-9]+)?(?:[eE][-+]?[0-9]+)?)").unwrap()
});

/// One silence reported by `silencedetect`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SilenceSpan {
    pub start: TimeSec,
    pub end: TimeSec,
}

impl SilenceSpan {
    pub fn midpoint(&self) -> SilenceMidpoint {
        (self.start + self.end) / 2.0
    }
}

/// Source of silence midpoints for a media file
#[async_trait]
pub trait SilenceDetector: Send + Sync {
    /// Returns silence midpoints in ascending order
    async fn detect(&self, media: &Path, config: &SilenceConfig)
        -> CoreResult<Vec<SilenceMidpoint>>;
}

/// Parses `silence_start` / `silence_end` pairs out of FFmpeg's stderr.
///
/// A `silence_end` without a preceding start and a trailing start that never
/// ends are both ignored. Spans come back sorted by start.
pub fn parse_silencedetect(stderr: &str) -> Vec<SilenceSpan> {
    let mut spans = Vec::new();
    let mut open: Option<TimeSec> = None;

    for caps in SILENCE_EVENT.captures_iter(stderr) {
        let Ok(value) = caps[2].parse::<f64>() else {
            continue;
        };
        match &caps[1] {
            "start" => open = Some(value.max(0.0)),
            _ => {
                if let Some(start) = open.take() {
                    if value >= start {
                        spans.push(SilenceSpan { start, end: value });
                    }
                }
            }
        }
    }

    if let Some(start) = open {
        debug!(start, "Ignoring unterminated silence");
    }

    spans.sort_by(|a, b| a.start.total_cmp(&b.start));
    spans
}

/// [`SilenceDetector`] backed by the `ffmpeg` binary
#[derive(Clone, Debug)]
pub struct FFmpegSilenceDetector {
    ffmpeg_path: PathBuf,
}

impl FFmpegSilenceDetector {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn from_info(info: &FFmpegInfo) -> Self {
        Self::new(info.ffmpeg_path.clone())
    }

    fn filter_arg(config: &SilenceConfig) -> String {
        format!(
            "silencedetect=noise={}dB:d={}",
            config.noise_db, config.min_duration_sec
        )
    }
}

#[async_trait]
impl SilenceDetector for FFmpegSilenceDetector {
    async fn detect(
        &self,
        media: &Path,
        config: &SilenceConfig,
    ) -> CoreResult<Vec<SilenceMidpoint>> {
        if !media.exists() {
            return Err(CoreError::FileNotFound(media.display().to_string()));
        }

        let output = media_command(&self.ffmpeg_path)
            .args(["-hide_banner", "-nostats", "-i"])
            .arg(media)
            .args(["-vn", "-af"])
            .arg(Self::filter_arg(config))
            .args(["-f", "null", "-"])
            .output()
            .await
            .map_err(|e| CoreError::FFmpeg(format!("Failed to run silencedetect: {}", e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            warn!(media = %media.display(), "silencedetect exited with {}", output.status);
            return Err(CoreError::FFmpeg(format!(
                "silencedetect failed: {}",
                stderr.lines().last().unwrap_or_default()
            )));
        }

        let midpoints: Vec<SilenceMidpoint> = parse_silencedetect(&stderr)
            .iter()
            .map(SilenceSpan::midpoint)
            .collect();

        info!(
            media = %media.display(),
            silences = midpoints.len(),
            "Detected silences"
        );
        Ok(midpoints)
    }
}
