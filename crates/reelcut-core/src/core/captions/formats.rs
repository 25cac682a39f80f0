//! Caption File Parsers
//!
//! Reads SRT (SubRip) and WebVTT caption files into cues. Multi-line caption
//! text is joined with single spaces since cues are fed to prompts line by
//! line.

use crate::core::{CoreError, CoreResult, Cue, TimeSec};

// =============================================================================
// SRT Format
// =============================================================================

/// Parses SRT (SubRip) content into cues
///
/// # SRT Format
///
/// ```text
/// 1
/// 00:00:01,000 --> 00:00:04,000
/// First caption text
///
/// 2
/// 00:00:05,500 --> 00:00:08,000
/// Second caption text
/// with multiple lines
/// ```
pub fn parse_srt(content: &str) -> CoreResult<Vec<Cue>> {
    let mut cues = Vec::new();

    for block in blocks(content) {
        // The sequence number is optional in practice; find the timing line.
        let Some(timing_at) = block.iter().position(|l| l.contains("-->")) else {
            return Err(parse_error(format!(
                "SRT block without a timing line: {}",
                block.join(" / ")
            )));
        };
        let (start, end) = parse_timing_line(block[timing_at])?;
        cues.push(Cue::new(join_text(&block[timing_at + 1..], false), start, end));
    }

    Ok(cues)
}

// =============================================================================
// VTT Format
// =============================================================================

/// Parses WebVTT content into cues
///
/// # VTT Format
///
/// ```text
/// WEBVTT
///
/// intro
/// 00:00:01.000 --> 00:00:04.000 align:start
/// <v Speaker>First caption text</v>
/// ```
///
/// Cue identifiers, cue settings, `NOTE`/`STYLE`/`REGION` blocks and markup
/// tags are discarded.
pub fn parse_vtt(content: &str) -> CoreResult<Vec<Cue>> {
    let content = content.trim_start_matches('\u{feff}');
    if !content.starts_with("WEBVTT") {
        return Err(parse_error("VTT file must start with WEBVTT"));
    }

    let mut cues = Vec::new();

    // The first block is the header and its metadata.
    for block in blocks(content).into_iter().skip(1) {
        let first = block[0].trim_start();
        if first.starts_with("NOTE") || first.starts_with("STYLE") || first.starts_with("REGION")
        {
            continue;
        }

        let Some(timing_at) = block.iter().position(|l| l.contains("-->")) else {
            return Err(parse_error(format!(
                "VTT cue without a timing line: {}",
                block.join(" / ")
            )));
        };
        let (start, end) = parse_timing_line(block[timing_at])?;
        cues.push(Cue::new(join_text(&block[timing_at + 1..], true), start, end));
    }

    Ok(cues)
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Splits content into blank-line separated blocks of non-empty lines
fn blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end_matches('\r'));
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn join_text(lines: &[&str], strip_tags: bool) -> String {
    lines
        .iter()
        .map(|l| {
            if strip_tags {
                strip_vtt_tags(l)
            } else {
                l.to_string()
            }
        })
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `start --> end [settings]`
fn parse_timing_line(line: &str) -> CoreResult<(TimeSec, TimeSec)> {
    let Some((start, rest)) = line.split_once("-->") else {
        return Err(parse_error(format!(
            "Expected 'start --> end' format: {}",
            line
        )));
    };

    let end = rest.split_whitespace().next().unwrap_or_default();
    Ok((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// Parses `HH:MM:SS,mmm`, `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds
fn parse_timestamp(ts: &str) -> CoreResult<TimeSec> {
    let normalized = ts.replace(',', ".");
    let fields = normalized
        .split(':')
        .map(|p| p.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| parse_error(format!("Invalid timestamp: {}", ts)))?;

    match fields.as_slice() {
        [minutes, seconds] => Ok(minutes * 60.0 + seconds),
        [hours, minutes, seconds] => Ok(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => Err(parse_error(format!("Invalid timestamp: {}", ts))),
    }
}

/// Removes `<...>` markup and decodes the common character references
fn strip_vtt_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn parse_error(message: impl Into<String>) -> CoreError {
    CoreError::TranscriptParse(message.into())
}

// =============================================================================
// Tests
// =============================================================================
