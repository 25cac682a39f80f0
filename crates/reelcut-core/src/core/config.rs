//! Pipeline Configuration
//!
//! Tunable parameters for windowing, dispatch, boundary tolerances and media
//! collaborators. Every field has a default so partial configs deserialize.
//! Loading configuration from disk is left to the embedding application.

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult};

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Transcript windowing
    #[serde(default)]
    pub windowing: WindowingConfig,

    /// Classification dispatch
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Boundary arithmetic tolerances
    #[serde(default)]
    pub tolerances: ToleranceConfig,

    /// Silence detection
    #[serde(default)]
    pub silence: SilenceConfig,

    /// How the downstream trimmer cuts the media
    #[serde(default)]
    pub cut_mode: CutMode,
}

impl PipelineConfig {
    /// Checks every section and reports the first invalid value.
    pub fn validate(&self) -> CoreResult<()> {
        self.windowing.validate()?;
        self.dispatch.validate()?;
        self.tolerances.validate()?;
        self.silence.validate()
    }
}

// =============================================================================
// Windowing
// =============================================================================

/// Sliding window over the cue sequence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowingConfig {
    /// Window length in cues
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Cues shared with the previous window; must be smaller than `chunk_size`
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_chunk_size() -> usize {
    100
}

fn default_overlap() -> usize {
    25
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

impl WindowingConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.overlap >= self.chunk_size {
            return Err(CoreError::Configuration(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Distance between consecutive window starts
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap)
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Concurrency limits for classifier calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    /// Maximum simultaneous in-flight classifier calls
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_max_workers() -> usize {
    20
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_workers == 0 {
            return Err(CoreError::Configuration(
                "max workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tolerances
// =============================================================================

/// Fixed offsets and gaps used by the timeline stages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToleranceConfig {
    /// Two cues are contiguous when `|next.start - block.end|` is below this
    #[serde(default = "default_cue_adjacency")]
    pub cue_adjacency_sec: f64,

    /// Forward nudge applied to a start that collides with the previous end
    #[serde(default = "default_overlap_nudge")]
    pub overlap_nudge_sec: f64,

    /// Intervals closer than this are merged
    #[serde(default = "default_merge_gap")]
    pub merge_gap_sec: f64,

    /// Keyframe-aligned cuts shorter than this are dropped
    #[serde(default = "default_keyframe_epsilon")]
    pub keyframe_epsilon_sec: f64,
}

fn default_cue_adjacency() -> f64 {
    0.01
}

fn default_overlap_nudge() -> f64 {
    0.1
}

fn default_merge_gap() -> f64 {
    0.04
}

fn default_keyframe_epsilon() -> f64 {
    0.001
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            cue_adjacency_sec: default_cue_adjacency(),
            overlap_nudge_sec: default_overlap_nudge(),
            merge_gap_sec: default_merge_gap(),
            keyframe_epsilon_sec: default_keyframe_epsilon(),
        }
    }
}

impl ToleranceConfig {
    pub fn validate(&self) -> CoreResult<()> {
        for (name, value) in [
            ("cue adjacency", self.cue_adjacency_sec),
            ("overlap nudge", self.overlap_nudge_sec),
            ("merge gap", self.merge_gap_sec),
            ("keyframe epsilon", self.keyframe_epsilon_sec),
        ] {
            ensure_non_negative(name, value)?;
        }
        Ok(())
    }
}

// =============================================================================
// Silence Detection
// =============================================================================

/// Parameters handed to the silence detector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SilenceConfig {
    /// Whether interval boundaries are snapped to detected silences
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Noise floor in dB below which audio counts as silence
    #[serde(default = "default_noise_db")]
    pub noise_db: f64,

    /// Minimum silence length in seconds
    #[serde(default = "default_min_silence")]
    pub min_duration_sec: f64,
}

fn default_true() -> bool {
    true
}

fn default_noise_db() -> f64 {
    -30.0
}

fn default_min_silence() -> f64 {
    0.5
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            noise_db: default_noise_db(),
            min_duration_sec: default_min_silence(),
        }
    }
}

impl SilenceConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !self.noise_db.is_finite() {
            return Err(CoreError::Configuration(
                "silence noise floor must be finite".to_string(),
            ));
        }
        ensure_non_negative("minimum silence duration", self.min_duration_sec)
    }
}

// =============================================================================
// Cut Mode
// =============================================================================

/// Trimming strategy of the downstream collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CutMode {
    /// Frame-accurate re-encode driven by per-frame select predicates
    #[default]
    Reencode,
    /// Stream copy from the nearest preceding keyframe
    Lossless,
}

fn ensure_non_negative(name: &str, value: f64) -> CoreResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Configuration(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
