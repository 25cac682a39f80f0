//! ReelCut Error Definitions
//!
//! Defines error types used throughout the pipeline.

use thiserror::Error;

/// Longest slice of raw classifier text echoed back in error messages
const RAW_PREVIEW_CHARS: usize = 200;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // =========================================================================
    // Classification Errors
    // =========================================================================
    #[error(
        "Malformed classifier response{}: {reason} (raw: {})",
        window.map(|w| format!(" for window {}", w)).unwrap_or_default(),
        preview(raw)
    )]
    MalformedResponse {
        /// Ordinal of the window whose response failed, if known
        window: Option<usize>,
        /// What was wrong with the response
        reason: String,
        /// The full raw classifier text, kept for manual inspection
        raw: String,
    },

    #[error("Classification failed for window {window}: {source}")]
    ClassificationFailed {
        window: usize,
        #[source]
        source: Box<CoreError>,
    },

    #[error("No transcript segments were selected")]
    EmptySelection,

    // =========================================================================
    // AI Provider Errors
    // =========================================================================
    #[error("AI request failed: {0}")]
    AIRequestFailed(String),

    // =========================================================================
    // Cue Source Errors
    // =========================================================================
    #[error("Transcript parse error: {0}")]
    TranscriptParse(String),

    // =========================================================================
    // Media Errors
    // =========================================================================
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("FFprobe error: {0}")]
    FFprobe(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Creates a malformed-response error without window context
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedResponse {
            window: None,
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Attaches the window ordinal to an error raised while classifying that window.
    ///
    /// Malformed responses keep their variant and gain the ordinal; every other
    /// error is wrapped as a per-window classification failure.
    pub fn in_window(self, ordinal: usize) -> Self {
        match self {
            Self::MalformedResponse { reason, raw, .. } => Self::MalformedResponse {
                window: Some(ordinal),
                reason,
                raw,
            },
            already @ Self::ClassificationFailed { .. } => already,
            other => Self::ClassificationFailed {
                window: ordinal,
                source: Box::new(other),
            },
        }
    }

    /// Returns the ordinal of the window this error originated from, if any
    pub fn window(&self) -> Option<usize> {
        match self {
            Self::MalformedResponse { window, .. } => *window,
            Self::ClassificationFailed { window, .. } => Some(*window),
            _ => None,
        }
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() <= RAW_PREVIEW_CHARS {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}
