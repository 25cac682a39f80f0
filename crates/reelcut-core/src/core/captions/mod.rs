//! Cue Source Module
//!
//! Produces the ordered cue sequence the pipeline classifies.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Cue Sources                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  formats.rs     - SRT/VTT caption files                         │
//! │  timed_text.rs  - platform json3 documents, transcript entries  │
//! │  regroup.rs     - word -> phrase regrouping                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use reelcut_core::core::captions::{group_by_punctuation, parse_timed_text};
//!
//! let words = parse_timed_text(&std::fs::read_to_string("talk.en.json3")?)?;
//! let phrases = group_by_punctuation(&words, &Default::default());
//! ```

mod formats;
mod regroup;
mod timed_text;

pub use formats::{parse_srt, parse_vtt};
pub use regroup::{group_at_silences, group_by_boundaries, group_by_punctuation, PunctuationGrouping};
pub use timed_text::{entries_to_cues, parse_timed_text, parse_transcript_entries, TranscriptEntry};

use std::path::Path;

use tracing::info;

use crate::core::{CoreError, CoreResult, Cue};

/// Reads a cue file, choosing the parser from its extension.
///
/// `.srt` and `.vtt` are caption files; `.json3` is a timed-text document;
/// `.json` is a timed-text document when it has an `events` key and a list
/// of transcript entries otherwise.
pub fn read_cues(path: &Path) -> CoreResult<Vec<Cue>> {
    if !path.exists() {
        return Err(CoreError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let cues = match extension.as_str() {
        "srt" => parse_srt(&content)?,
        "vtt" => parse_vtt(&content)?,
        "json3" => parse_timed_text(&content)?,
        "json" if content.trim_start().starts_with('{') => parse_timed_text(&content)?,
        "json" => parse_transcript_entries(&content)?,
        other => {
            return Err(CoreError::NotSupported(format!(
                "Unknown cue file extension: {:?}",
                other
            )))
        }
    };

    info!(path = %path.display(), cues = cues.len(), "Loaded cues");
    Ok(cues)
}
