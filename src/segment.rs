//! Display segment generation
//!
//! Converts timed cues into fixed-geometry display segments: at most two
//! lines of at most `line_width` characters each. A cue whose text wraps
//! past the geometry is split into several segments, with the cue duration
//! divided between them in proportion to their character counts.

use crate::config::SegmenterConfig;
use crate::vtt::Cue;

/// One displayable unit derived from a cue
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Start time in seconds
    pub start_s: f64,
    /// End time in seconds
    pub end_s: f64,
    /// Display lines, 1..=max_lines, each at most line_width characters
    pub lines: Vec<String>,
}

/// Converts cue lists into ordered segment lists
pub struct Segmenter {
    line_width: usize,
    max_lines: usize,
}

impl Segmenter {
    pub fn new(config: &SegmenterConfig) -> Self {
        Self {
            line_width: config.line_width,
            max_lines: config.max_lines,
        }
    }

    /// Convert an ordered cue list into an ordered segment list
    pub fn segment_cues(&self, cues: &[Cue]) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(cues.len());
        for cue in cues {
            self.segment_cue(cue, &mut segments);
        }
        segments
    }

    /// Greedy word wrap. Words longer than the line width are hard-truncated
    /// to their leading `line_width` characters.
    fn wrap(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut line_chars = 0;

        for word in text.split_whitespace() {
            let word: String = word.chars().take(self.line_width).collect();
            let word_chars = word.chars().count();

            if line.is_empty() {
                line = word;
                line_chars = word_chars;
            } else if line_chars + 1 + word_chars <= self.line_width {
                line.push(' ');
                line.push_str(&word);
                line_chars += 1 + word_chars;
            } else {
                lines.push(std::mem::take(&mut line));
                line = word;
                line_chars = word_chars;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }

    fn segment_cue(&self, cue: &Cue, out: &mut Vec<Segment>) {
        let lines = self.wrap(&cue.text);
        if lines.is_empty() {
            return;
        }

        let chunks: Vec<&[String]> = lines.chunks(self.max_lines).collect();
        let total_chars: usize = chunks.iter().map(|c| chunk_chars(c)).sum();
        let duration = cue.end_s - cue.start_s;

        let mut start = cue.start_s;
        for (i, chunk) in chunks.iter().enumerate() {
            // The last segment ends exactly at the cue end so the split
            // cannot drift.
            let end = if i + 1 == chunks.len() {
                cue.end_s
            } else {
                start + duration * chunk_chars(chunk) as f64 / total_chars as f64
            };
            out.push(Segment {
                start_s: start,
                end_s: end,
                lines: chunk
                    .iter()
                    .map(|l| l.chars().take(self.line_width).collect())
                    .collect(),
            });
            start = end;
        }
    }
}

fn chunk_chars(chunk: &[String]) -> usize {
    chunk.iter().map(|l| l.chars().count()).sum()
}
