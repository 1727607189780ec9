//! WebVTT cue extraction
//!
//! Pulls timed cues out of a WebVTT file. Parsing is deliberately
//! tolerant: anything that is not a timestamp line or cue text is skipped,
//! and a file without usable cues yields an empty list.

use std::path::Path;

use crate::error::{Result, TitlerError};

/// A single timed caption
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds
    pub start_s: f64,
    /// End time in seconds, always past the start
    pub end_s: f64,
    /// Caption text, whitespace-collapsed, non-empty
    pub text: String,
}

/// Read a VTT file and extract its cues
pub fn load_cues(path: &Path) -> Result<Vec<Cue>> {
    let content = std::fs::read_to_string(path).map_err(|source| TitlerError::VttRead {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_cues(&content))
}

/// Extract cues from VTT text
///
/// Accepts `(HH:)?MM:SS.mmm --> (HH:)?MM:SS.mmm` timing lines; the text
/// lines up to the next blank line are joined with single spaces. Cue
/// identifiers, headers, NOTE blocks and malformed entries are skipped.
pub fn parse_cues(input: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut lines = input.lines().peekable();

    while let Some(line) = lines.next() {
        let Some((start_s, end_s)) = parse_timing_line(line) else {
            continue;
        };

        let mut text_parts = Vec::new();
        while let Some(&next) = lines.peek() {
            if next.trim().is_empty() {
                break;
            }
            text_parts.extend(next.split_whitespace().map(str::to_string));
            lines.next();
        }
        let text = text_parts.join(" ");

        if end_s <= start_s || text.is_empty() {
            tracing::debug!("skipping cue at {}s: empty or non-positive duration", start_s);
            continue;
        }
        cues.push(Cue { start_s, end_s, text });
    }
    cues
}

/// Parse a `start --> end` timing line, ignoring trailing cue settings
fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// Parse a `(HH:)?MM:SS.mmm` timestamp into seconds
fn parse_timestamp(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u64>().ok()?, m, s),
        [m, s] => (0, m, s),
        _ => return None,
    };
    let minutes = minutes.parse::<u64>().ok()?;
    let seconds = seconds.replace(',', ".").parse::<f64>().ok()?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}
