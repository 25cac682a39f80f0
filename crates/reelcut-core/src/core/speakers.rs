//! Speaker Isolation
//!
//! Builds keep-intervals from speaker diarization instead of transcript
//! classification: drop the host of an interview and keep everyone else, or
//! drop an arbitrary set of speakers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::timeline::IntervalMerger;
use crate::core::{CoreError, CoreResult, Interval, TimeSec};

// =============================================================================
// Types
// =============================================================================

/// One diarized stretch of speech
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeakerTurn {
    /// Diarization label, e.g. `SPEAKER_00`
    #[serde(alias = "speaker_id", alias = "label")]
    pub speaker: String,
    #[serde(alias = "start_time")]
    pub start: TimeSec,
    #[serde(alias = "end_time")]
    pub end: TimeSec,
}

impl SpeakerTurn {
    pub fn new(speaker: impl Into<String>, start: TimeSec, end: TimeSec) -> Self {
        Self {
            speaker: speaker.into(),
            start,
            end,
        }
    }
}

/// Speaking-time summary for one speaker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerStats {
    pub id: String,
    pub total_time: TimeSec,
    pub segment_count: usize,
    pub avg_segment_length: TimeSec,
    pub first_appearance: TimeSec,
    pub segments: Vec<Interval>,
}

/// Padding and merge settings for speaker-based intervals
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerIntervalOptions {
    /// Added before and after every kept turn
    #[serde(default = "default_padding")]
    pub padding_sec: TimeSec,
    /// Kept turns closer than this are joined
    #[serde(default = "default_join_gap")]
    pub join_gap_sec: TimeSec,
}

fn default_padding() -> TimeSec {
    0.1
}

fn default_join_gap() -> TimeSec {
    1.0
}

impl Default for SpeakerIntervalOptions {
    fn default() -> Self {
        Self {
            padding_sec: default_padding(),
            join_gap_sec: default_join_gap(),
        }
    }
}

/// Result of guest isolation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestIsolation {
    /// Intervals where anyone but the host speaks
    pub segments: Vec<Interval>,
    /// Per-speaker statistics, most speaking time first
    pub speakers: Vec<SpeakerStats>,
    /// Speaker treated as the host
    pub identified_host: Option<String>,
}

// =============================================================================
// Parsing and Statistics
// =============================================================================

/// Parses a JSON list of diarization turns.
///
/// Accepts `speaker`/`speaker_id`/`label` and `start`/`start_time`,
/// `end`/`end_time` field names.
pub fn parse_diarization(json: &str) -> CoreResult<Vec<SpeakerTurn>> {
    serde_json::from_str(json)
        .map_err(|e| CoreError::TranscriptParse(format!("Invalid diarization output: {}", e)))
}

/// Groups turn intervals by speaker, in order of first appearance in `turns`
pub fn group_turns_by_speaker(turns: &[SpeakerTurn]) -> Vec<(String, Vec<Interval>)> {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Interval>)> = Vec::new();

    for turn in turns {
        let slot = *order.entry(turn.speaker.as_str()).or_insert_with(|| {
            groups.push((turn.speaker.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(Interval::new(turn.start, turn.end));
    }

    groups
}

/// Computes per-speaker statistics, sorted by total speaking time
/// (descending), ties broken by earliest first appearance.
pub fn speaker_stats(turns: &[SpeakerTurn]) -> Vec<SpeakerStats> {
    let mut stats: Vec<SpeakerStats> = group_turns_by_speaker(turns)
        .into_iter()
        .map(|(id, segments)| {
            let total_time: TimeSec = segments.iter().map(Interval::duration).sum();
            let segment_count = segments.len();
            let first_appearance = segments
                .iter()
                .map(|s| s.start)
                .fold(f64::INFINITY, f64::min);
            SpeakerStats {
                id,
                total_time,
                segment_count,
                avg_segment_length: if segment_count > 0 {
                    total_time / segment_count as f64
                } else {
                    0.0
                },
                first_appearance,
                segments,
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total_time
            .total_cmp(&a.total_time)
            .then(a.first_appearance.total_cmp(&b.first_appearance))
    });
    stats
}

/// The host is the speaker with the most total speaking time
pub fn identify_host(stats: &[SpeakerStats]) -> Option<&str> {
    stats
        .iter()
        .min_by(|a, b| {
            b.total_time
                .total_cmp(&a.total_time)
                .then(a.first_appearance.total_cmp(&b.first_appearance))
        })
        .map(|s| s.id.as_str())
}

// =============================================================================
// Interval Construction
// =============================================================================

fn padded_merge<'a>(
    segments: impl Iterator<Item = &'a Interval>,
    options: &SpeakerIntervalOptions,
) -> Vec<Interval> {
    let padded: Vec<Interval> = segments
        .map(|s| {
            Interval::new(
                (s.start - options.padding_sec).max(0.0),
                s.end + options.padding_sec,
            )
        })
        .collect();
    IntervalMerger::new(options.join_gap_sec).merge(&padded)
}

/// Padded, merged intervals for every speaker except `host`
pub fn guest_intervals(
    turns: &[SpeakerTurn],
    host: &str,
    options: &SpeakerIntervalOptions,
) -> Vec<Interval> {
    let kept = turns
        .iter()
        .filter(|t| t.speaker != host)
        .map(|t| Interval::new(t.start, t.end))
        .collect::<Vec<_>>();
    padded_merge(kept.iter(), options)
}

/// Padded, merged intervals for every speaker not in `excluded`
pub fn filter_speakers(
    stats: &[SpeakerStats],
    excluded: &[String],
    options: &SpeakerIntervalOptions,
) -> Vec<Interval> {
    let segments = stats
        .iter()
        .filter(|s| !excluded.contains(&s.id))
        .flat_map(|s| s.segments.iter());
    let merged = padded_merge(segments, options);
    debug!(
        excluded = excluded.len(),
        intervals = merged.len(),
        "Filtered speakers"
    );
    merged
}

/// Identifies the host and keeps everyone else
pub fn isolate_guests(turns: &[SpeakerTurn], options: &SpeakerIntervalOptions) -> GuestIsolation {
    let speakers = speaker_stats(turns);
    let identified_host = identify_host(&speakers).map(str::to_string);

    let segments = match &identified_host {
        Some(host) => guest_intervals(turns, host, options),
        None => Vec::new(),
    };

    info!(
        speakers = speakers.len(),
        host = identified_host.as_deref().unwrap_or("<none>"),
        segments = segments.len(),
        "Isolated guest segments"
    );

    GuestIsolation {
        segments,
        speakers,
        identified_host,
    }
}
