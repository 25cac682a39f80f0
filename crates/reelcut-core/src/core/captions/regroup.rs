//! Word Regrouping
//!
//! Word-level cues are too fine for classification prompts. These functions
//! combine them into phrase-level cues, either at punctuation, at externally
//! chosen phrase ends, or at detected silences.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Cue, SilenceMidpoint, TimeSec};

/// Options for [`group_by_punctuation`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunctuationGrouping {
    /// A word ending in any of these characters closes its group
    #[serde(default = "default_punctuation")]
    pub punctuation: String,

    /// Added to every group's start
    #[serde(default = "default_offset")]
    pub offset_sec: TimeSec,

    /// Groups are closed once they hold this many words
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

fn default_punctuation() -> String {
    ".?!,:;-\u{2014}".to_string()
}

fn default_offset() -> TimeSec {
    0.2
}

fn default_max_words() -> usize {
    10
}

impl Default for PunctuationGrouping {
    fn default() -> Self {
        Self {
            punctuation: default_punctuation(),
            offset_sec: default_offset(),
            max_words: default_max_words(),
        }
    }
}

/// Accumulates words into one output cue
#[derive(Default)]
struct Group {
    words: Vec<String>,
    start: TimeSec,
    end: TimeSec,
}

impl Group {
    fn push(&mut self, cue: &Cue) {
        if self.words.is_empty() {
            self.start = cue.start;
        }
        self.words.push(cue.text.clone());
        self.end = cue.end;
    }

    fn len(&self) -> usize {
        self.words.len()
    }

    /// Emits the group into `out` with the given start shift and resets it
    fn flush_into(&mut self, out: &mut Vec<Cue>, start_shift: TimeSec) {
        if self.words.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.words).join(" ");
        out.push(Cue::new(text, self.start + start_shift, self.end));
    }
}

/// Combines words into phrases, closing a group when a word ends in
/// punctuation or the group reaches `max_words`. A trailing partial group is
/// kept.
pub fn group_by_punctuation(words: &[Cue], options: &PunctuationGrouping) -> Vec<Cue> {
    let mut out = Vec::new();
    let mut group = Group::default();

    for word in words {
        group.push(word);

        let ends_phrase = word
            .text
            .chars()
            .last()
            .is_some_and(|c| options.punctuation.contains(c));
        if ends_phrase || group.len() >= options.max_words {
            group.flush_into(&mut out, options.offset_sec);
        }
    }
    group.flush_into(&mut out, options.offset_sec);

    debug!(words = words.len(), phrases = out.len(), "Grouped words at punctuation");
    out
}

/// Combines words into the spans `[previous end + 1 ..= end]` for each phrase
/// end index.
///
/// Out-of-range and duplicate indices are ignored. Words after the last phrase
/// end are not emitted.
pub fn group_by_boundaries(words: &[Cue], end_indices: &[usize]) -> Vec<Cue> {
    let mut ends: Vec<usize> = end_indices
        .iter()
        .copied()
        .filter(|&i| i < words.len())
        .collect();
    ends.sort_unstable();
    ends.dedup();

    let mut out = Vec::with_capacity(ends.len());
    let mut next_start = 0;
    for end in ends {
        let mut group = Group::default();
        for word in &words[next_start..=end] {
            group.push(word);
        }
        group.flush_into(&mut out, 0.0);
        next_start = end + 1;
    }

    let trailing = words.len().saturating_sub(next_start);
    debug!(
        words = words.len(),
        phrases = out.len(),
        trailing_words = trailing,
        "Grouped words at phrase boundaries"
    );
    out
}

/// Combines words into phrases, closing a group whenever a silence midpoint
/// falls between a word's end and the next word's start (inclusive).
pub fn group_at_silences(words: &[Cue], midpoints: &[SilenceMidpoint]) -> Vec<Cue> {
    let mut silences: Vec<SilenceMidpoint> =
        midpoints.iter().copied().filter(|m| m.is_finite()).collect();
    silences.sort_by(f64::total_cmp);

    let silence_between = |from: TimeSec, to: TimeSec| {
        let idx = silences.partition_point(|&m| m < from);
        silences.get(idx).is_some_and(|&m| m <= to)
    };

    let mut out = Vec::new();
    let mut group = Group::default();
    for (i, word) in words.iter().enumerate() {
        group.push(word);
        if let Some(next) = words.get(i + 1) {
            if silence_between(word.end, next.start) {
                group.flush_into(&mut out, 0.0);
            }
        }
    }
    group.flush_into(&mut out, 0.0);

    debug!(
        words = words.len(),
        silences = silences.len(),
        phrases = out.len(),
        "Grouped words at silences"
    );
    out
}
