//! Word-level LRC parser
//!
//! Parses lyrics where every word carries its own timestamp:
//! [00:10.50]Hello [00:12.00]World
//!
//! Each input line becomes one display line; empty lines are kept so they can
//! render as visual breaks. Only tagged tokens are modeled — anything in a
//! line that is not a `[mm:ss.xx]word` pair is dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lyrics::marker::Marker;

static WORD_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{2}):(\d{2}\.\d{2})\](\S+)").unwrap());

/// A single timestamped word (or task placeholder token).
#[derive(Debug, Clone, PartialEq)]
pub struct TimedWord {
    /// Token text exactly as written, marker underscores included.
    pub raw: String,
    /// Seconds from the start of the song.
    pub time: f64,
    /// Placeholder classification, resolved once here so consumers never
    /// re-scan the string.
    pub marker: Option<Marker>,
}

/// One display line of timestamped words. An empty line renders as a break.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LyricLine {
    pub words: Vec<TimedWord>,
}

impl LyricLine {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Parsed word timeline for a whole song.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedLyrics {
    pub lines: Vec<LyricLine>,
}

impl ParsedLyrics {
    /// Parse word-timestamped lyrics. Pure and idempotent; malformed
    /// timestamps simply fail to match and their text is dropped.
    pub fn parse(content: &str) -> Self {
        let lines = content
            .split('\n')
            .map(|line| LyricLine {
                words: WORD_TAG
                    .captures_iter(line)
                    .map(|caps| {
                        let minutes: f64 = caps[1].parse().unwrap_or(0.0);
                        let seconds: f64 = caps[2].parse().unwrap_or(0.0);
                        let raw = caps[3].to_string();
                        TimedWord {
                            marker: Marker::detect(&raw),
                            time: minutes * 60.0 + seconds,
                            raw,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_words_and_times() {
        let parsed = ParsedLyrics::parse("[00:10.50]Hello [00:12.00]World");
        assert_eq!(parsed.lines.len(), 1);
        let words = &parsed.lines[0].words;
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].raw, "Hello");
        assert_eq!(words[0].time, 10.5);
        assert_eq!(words[1].raw, "World");
        assert_eq!(words[1].time, 12.0);
    }

    #[test]
    fn test_minutes_carry_into_seconds() {
        let parsed = ParsedLyrics::parse("[01:02.50]ord");
        assert_eq!(parsed.lines[0].words[0].time, 62.5);
    }

    #[test]
    fn test_empty_lines_preserved() {
        let parsed = ParsedLyrics::parse("[00:01.00]a\n\n[00:02.00]b");
        assert_eq!(parsed.lines.len(), 3);
        assert!(parsed.lines[1].is_empty());
    }

    #[test]
    fn test_untagged_text_dropped() {
        let parsed = ParsedLyrics::parse("stray [00:05.00]tagged words");
        let words = &parsed.lines[0].words;
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].raw, "tagged");
    }

    #[test]
    fn test_malformed_timestamps_dropped() {
        // Single-digit minutes and missing fraction don't match the tag shape.
        let parsed = ParsedLyrics::parse("[0:05.00]a [00:05]b [00:05.00]c");
        let words = &parsed.lines[0].words;
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].raw, "c");
    }

    #[test]
    fn test_markers_classified_at_parse_time() {
        let parsed = ParsedLyrics::parse("[00:01.00]___wp0___ [00:02.00]ord\n[00:03.00]__wst0__");
        let first = &parsed.lines[0].words[0];
        assert_eq!(first.marker, Some(Marker::WordBlank { task_id: 0 }));
        assert_eq!(parsed.lines[0].words[1].marker, None);
        assert_eq!(
            parsed.lines[1].words[0].marker,
            Some(Marker::WordChoices { task_id: 0 })
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "[00:10.50]Hello [00:12.00]World\n\n[00:15.00]igen";
        assert_eq!(ParsedLyrics::parse(text), ParsedLyrics::parse(text));
    }
}
