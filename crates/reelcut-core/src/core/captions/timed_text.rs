//! Platform Timed-Text Sources
//!
//! Two JSON transcript shapes served by video platforms:
//!
//! - the `json3` timed-text document, whose events carry word-level
//!   segments with millisecond offsets
//! - a flat list of `{text, start, duration}` entries in seconds

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult, Cue, TimeSec};

/// End padding for the last word of an event that has no duration
const FALLBACK_WORD_SEC: TimeSec = 0.15;

// =============================================================================
// json3 Timed Text
// =============================================================================

#[derive(Debug, Deserialize)]
struct TimedTextDocument {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    t_start_ms: Option<f64>,
    d_duration_ms: Option<f64>,
    segs: Option<Vec<TimedTextSegment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
    t_offset_ms: Option<f64>,
}

/// Parses a `json3` document into word-level cues sorted by start.
///
/// Events without a start or without segments (styling and window events)
/// are skipped, as are blank segments. A word ends where the next segment of
/// its event begins; the last word of an event ends at the event's end, or
/// 0.15s after its start when the event has no duration.
pub fn parse_timed_text(json: &str) -> CoreResult<Vec<Cue>> {
    let document: TimedTextDocument = serde_json::from_str(json)
        .map_err(|e| CoreError::TranscriptParse(format!("Invalid timed-text JSON: {}", e)))?;

    let mut cues = Vec::new();
    for event in &document.events {
        let (Some(event_start), Some(segs)) = (event.t_start_ms, event.segs.as_ref()) else {
            continue;
        };

        for (i, seg) in segs.iter().enumerate() {
            let word = seg.utf8.trim();
            if word.is_empty() {
                continue;
            }

            let offset = seg.t_offset_ms.unwrap_or(0.0);
            let start = (event_start + offset) / 1000.0;
            let end = match (segs.get(i + 1), event.d_duration_ms) {
                (Some(next), _) => (event_start + next.t_offset_ms.unwrap_or(offset)) / 1000.0,
                (None, Some(duration)) => (event_start + duration) / 1000.0,
                (None, None) => start + FALLBACK_WORD_SEC,
            };

            cues.push(Cue::new(word, start, end));
        }
    }

    cues.sort_by(|a, b| a.start.total_cmp(&b.start));
    Ok(cues)
}

// =============================================================================
// Transcript Entries
// =============================================================================

/// One entry of a platform transcript listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub text: String,
    /// Start in seconds
    pub start: TimeSec,
    /// Duration in seconds
    pub duration: TimeSec,
}

impl From<&TranscriptEntry> for Cue {
    fn from(entry: &TranscriptEntry) -> Self {
        Cue::new(entry.text.clone(), entry.start, entry.start + entry.duration)
    }
}

/// Converts entries to cues with `end = start + duration`
pub fn entries_to_cues(entries: &[TranscriptEntry]) -> Vec<Cue> {
    entries.iter().map(Cue::from).collect()
}

/// Parses a JSON list of transcript entries
pub fn parse_transcript_entries(json: &str) -> CoreResult<Vec<Cue>> {
    let entries: Vec<TranscriptEntry> = serde_json::from_str(json)
        .map_err(|e| CoreError::TranscriptParse(format!("Invalid transcript entries: {}", e)))?;
    Ok(entries_to_cues(&entries))
}

// =============================================================================
// Tests
// =============================================================================
