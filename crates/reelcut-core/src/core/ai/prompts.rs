//! Prompt Rendering
//!
//! Builds the instructions and per-window user prompts sent to completion
//! providers. Every prompt lists cues as `<global index>. <text>` so that the
//! indices a model echoes back are already global.

use crate::core::selection::{ClassificationContext, ReductionLevel, WindowRequest};
use crate::core::Cue;

/// Instructions for highlight selection at the given reduction level
pub fn highlight_system_prompt(reduction: ReductionLevel) -> String {
    format!(
        "You edit long videos down to their essential points using only the transcript.\n\
         You receive one chunk of transcript lines, each prefixed by its index. The chunk \
         is part of a longer transcript and neighbouring chunks overlap.\n\
         Keep roughly {} of the lines: the ones that carry the main points described by \
         the title and the summary. Drop filler, tangents, repetition, greetings and \
         sponsor segments, while keeping the kept lines coherent when played back to back.\n\
         Answer with a JSON object of the form {{\"result\": [<index>, ...]}} listing \
         the indices to keep. Only use indices that appear in the chunk.",
        reduction.keep_fraction()
    )
}

/// Instructions for phrase-boundary restoration over word-level cues
pub const PHRASE_BOUNDARY_SYSTEM_PROMPT: &str = "\
You restore phrase boundaries in word-level transcripts.
You receive consecutive words, each prefixed by its index. The chunk is part of a \
longer transcript and neighbouring chunks overlap.
Return the indices of the words that end a phrase or sentence, i.e. where a period, \
question mark, exclamation mark or clause-closing comma belongs. Abbreviations do not \
end a phrase, and a phrase should be long enough to stand on its own.
Answer with a JSON object of the form {\"result\": [<index>, ...]}. Return an empty \
list when no phrase ends in the chunk. Only use indices that appear in the chunk.";

/// Instructions for transcript summarization
pub const SUMMARY_SYSTEM_PROMPT: &str = "\
You summarize video transcripts. Reduce the transcript to its main points in a few \
short paragraphs, written so that someone who only reads the summary learns what the \
title promises.";

/// Numbered transcript lines, one per cue
pub fn numbered_lines<'a>(cues: impl IntoIterator<Item = (usize, &'a Cue)>) -> String {
    cues.into_iter()
        .map(|(i, cue)| format!("{}. {}", i, cue.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt for one highlight-selection window
pub fn highlight_prompt(request: &WindowRequest, context: &ClassificationContext) -> String {
    format!(
        "Chunk {} of {} of the transcript.\n\n\
         Transcript lines:\n{}\n\
         ----------------------------------------\n\
         Title:   {}\n\
         Summary: {}\n",
        request.window.ordinal,
        request.total_windows,
        numbered_lines(request.indexed_cues()),
        context.title,
        context.summary,
    )
}

/// User prompt for one phrase-boundary window
pub fn phrase_boundary_prompt(request: &WindowRequest) -> String {
    format!(
        "Chunk {} of {}\n\nWord-level transcript:\n{}\n",
        request.window.ordinal,
        request.total_windows,
        numbered_lines(request.indexed_cues()),
    )
}

/// User prompt for summarizing a whole transcript
pub fn summary_prompt(cues: &[Cue], title: &str) -> String {
    format!(
        "The video is titled: {}\n\nTranscript:\n{}\n",
        title,
        numbered_lines(cues.iter().enumerate().map(|(i, cue)| (i + 1, cue))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selection::Window;

    fn request() -> WindowRequest {
        let cues: Vec<Cue> = ["zero", "one", "two", "three", "four"]
            .iter()
            .enumerate()
            .map(|(i, t)| Cue::new(*t, i as f64, i as f64 + 1.0))
            .collect();
        WindowRequest::new(
            Window {
                start: 2,
                end: 5,
                ordinal: 2,
            },
            3,
            &cues,
        )
    }

    #[test]
    fn test_highlight_prompt_uses_global_indices() {
        let context = ClassificationContext::new("How to cook rice", "Rinse, boil, rest.");
        let prompt = highlight_prompt(&request(), &context);

        assert!(prompt.starts_with("Chunk 2 of 3"));
        assert!(prompt.contains("2. two\n3. three\n4. four"));
        assert!(!prompt.contains("0. zero"));
        assert!(prompt.contains("Title:   How to cook rice"));
        assert!(prompt.contains("Summary: Rinse, boil, rest."));
    }

    #[test]
    fn test_highlight_system_prompt_mentions_reduction() {
        let prompt = highlight_system_prompt(ReductionLevel::Hyper);
        assert!(prompt.contains("1/8th to 1/10th"));
        assert!(prompt.contains("\"result\""));
    }

    #[test]
    fn test_phrase_boundary_prompt() {
        let prompt = phrase_boundary_prompt(&request());
        assert!(prompt.contains("Chunk 2 of 3"));
        assert!(prompt.contains("4. four"));
    }

    #[test]
    fn test_summary_prompt_numbers_from_one() {
        let cues = vec![Cue::new(" hello ", 0.0, 1.0), Cue::new("world", 1.0, 2.0)];
        let prompt = summary_prompt(&cues, "Greeting");
        assert!(prompt.contains("titled: Greeting"));
        assert!(prompt.contains("1. hello\n2. world"));
    }
}
