//! FFmpeg Detection
//!
//! Locates system-installed `ffmpeg`/`ffprobe` binaries.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::process::media_command;
use crate::core::{CoreError, CoreResult};

/// Information about a detected FFmpeg installation
#[derive(Debug, Clone, PartialEq)]
pub struct FFmpegInfo {
    /// Path to ffmpeg binary
    pub ffmpeg_path: PathBuf,
    /// Path to ffprobe binary
    pub ffprobe_path: PathBuf,
    /// FFmpeg version string
    pub version: String,
}

impl FFmpegInfo {
    /// Uses binaries at known paths without probing their version
    pub fn from_paths(ffmpeg_path: impl Into<PathBuf>, ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            version: String::new(),
        }
    }
}

/// Detects FFmpeg from common install locations, then the system PATH
pub async fn detect_system_ffmpeg() -> CoreResult<FFmpegInfo> {
    let ffmpeg_path = which_binary("ffmpeg").await?;
    let ffprobe_path = which_binary("ffprobe").await?;
    let version = ffmpeg_version(&ffmpeg_path).await?;

    info!(
        ffmpeg = %ffmpeg_path.display(),
        ffprobe = %ffprobe_path.display(),
        version = %version,
        "Detected FFmpeg"
    );

    Ok(FFmpegInfo {
        ffmpeg_path,
        ffprobe_path,
        version,
    })
}

fn binary_file_name(name: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

async fn which_binary(name: &str) -> CoreResult<PathBuf> {
    let file_name = binary_file_name(name);
    for dir in common_ffmpeg_paths() {
        let candidate = dir.join(&file_name);
        if candidate.exists() {
            debug!(path = %candidate.display(), "Found {} in a common location", name);
            return Ok(candidate);
        }
    }

    let lookup = if cfg!(target_os = "windows") { "where" } else { "which" };
    let not_found = || CoreError::FFmpeg(format!("{} not found on this system", name));

    let output = media_command(lookup)
        .arg(name)
        .output()
        .await
        .map_err(|_| not_found())?;
    if !output.status.success() {
        return Err(not_found());
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
        .ok_or_else(not_found)
}

/// Common FFmpeg installation directories for the current platform
fn common_ffmpeg_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    #[cfg(target_os = "windows")]
    {
        paths.push(PathBuf::from(r"C:\ffmpeg\bin"));
        paths.push(PathBuf::from(r"C:\Program Files\ffmpeg\bin"));
        if let Ok(programdata) = std::env::var("ProgramData") {
            paths.push(PathBuf::from(programdata).join("chocolatey").join("bin"));
        }
        if let Ok(userprofile) = std::env::var("USERPROFILE") {
            paths.push(PathBuf::from(userprofile).join("scoop").join("shims"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/opt/homebrew/bin"));
        paths.push(PathBuf::from("/usr/local/bin"));
        paths.push(PathBuf::from("/opt/local/bin"));
    }

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/bin"));
        paths.push(PathBuf::from("/usr/local/bin"));
        paths.push(PathBuf::from("/snap/bin"));
    }

    paths
}

async fn ffmpeg_version(ffmpeg_path: &Path) -> CoreResult<String> {
    let output = media_command(ffmpeg_path)
        .arg("-version")
        .output()
        .await
        .map_err(|e| CoreError::FFmpeg(format!("Failed to run ffmpeg -version: {}", e)))?;

    if !output.status.success() {
        return Err(CoreError::FFmpeg("ffmpeg -version exited with an error".to_string()));
    }

    parse_version(&String::from_utf8_lossy(&output.stdout))
        .ok_or_else(|| CoreError::FFmpeg("Could not parse FFmpeg version".to_string()))
}

/// Reads the version from `ffmpeg version X.Y.Z ...`, falling back to the
/// whole first line.
fn parse_version(banner: &str) -> Option<String> {
    let first_line = banner.lines().next()?.trim();
    if first_line.is_empty() {
        return None;
    }
    let version = first_line
        .strip_prefix("ffmpeg version ")
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or(first_line);
    Some(version.to_string())
}
