//! Active-word resolution against playback time.
//!
//! Query-only: the session asks which word should be highlighted for the
//! current position; seeking is done through the player capability, never
//! from here.

use crate::lyrics::parser::ParsedLyrics;

/// Highlight window after the last timestamped word of the song (and of any
/// line with no timestamped successor).
pub const END_GRACE_SECS: f64 = 3.0;

impl ParsedLyrics {
    /// True when the word at (`line_idx`, `word_idx`) is the one being sung
    /// at `now`: its own time has passed, the next word in the line has not
    /// started, and the next non-empty line has not taken over.
    ///
    /// With monotonic timestamps exactly one word is active at a time.
    /// Non-monotonic input may satisfy this for zero or several words; that
    /// is accepted as-is.
    pub fn is_active(&self, line_idx: usize, word_idx: usize, now: f64) -> bool {
        let Some(line) = self.lines.get(line_idx) else {
            return false;
        };
        let Some(word) = line.words.get(word_idx) else {
            return false;
        };

        if now < word.time {
            return false;
        }
        if let Some(next) = line.words.get(word_idx + 1)
            && now >= next.time
        {
            return false;
        }

        let boundary = self
            .next_line_start(line_idx)
            .unwrap_or(word.time + END_GRACE_SECS);
        now <= boundary
    }

    /// First word satisfying the active predicate, as (line, word) indices.
    pub fn active_word(&self, now: f64) -> Option<(usize, usize)> {
        self.lines.iter().enumerate().find_map(|(li, line)| {
            (0..line.words.len())
                .find(|&wi| self.is_active(li, wi, now))
                .map(|wi| (li, wi))
        })
    }

    pub fn active_line(&self, now: f64) -> Option<usize> {
        self.active_word(now).map(|(li, _)| li)
    }

    /// Timestamp of the last word in the song, if any word is tagged.
    pub fn end_time(&self) -> Option<f64> {
        self.lines
            .iter()
            .flat_map(|l| l.words.iter().map(|w| w.time))
            .reduce(f64::max)
    }

    /// Start time of the first word of the next non-empty line.
    fn next_line_start(&self, line_idx: usize) -> Option<f64> {
        self.lines
            .get(line_idx + 1..)?
            .iter()
            .find_map(|l| l.words.first().map(|w| w.time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lines() -> ParsedLyrics {
        ParsedLyrics::parse("[00:10.00]ett [00:12.00]två\n[00:15.00]tre")
    }

    #[test]
    fn test_word_active_in_its_window() {
        let parsed = two_lines();
        assert!(parsed.is_active(0, 0, 11.0));
        assert!(!parsed.is_active(0, 1, 11.0));
        assert_eq!(parsed.active_word(11.0), Some((0, 0)));
    }

    #[test]
    fn test_last_word_holds_until_next_line() {
        let parsed = two_lines();
        assert!(parsed.is_active(0, 1, 13.5));
        assert!(!parsed.is_active(0, 0, 13.5));
    }

    #[test]
    fn test_nothing_active_after_handover() {
        let parsed = two_lines();
        assert!(!parsed.is_active(0, 0, 15.5));
        assert!(!parsed.is_active(0, 1, 15.5));
        assert_eq!(parsed.active_word(15.5), Some((1, 0)));
    }

    #[test]
    fn test_nothing_active_before_first_word() {
        let parsed = two_lines();
        assert_eq!(parsed.active_word(5.0), None);
    }

    #[test]
    fn test_empty_line_skipped_for_boundary() {
        let parsed = ParsedLyrics::parse("[00:10.00]ett\n\n[00:20.00]två");
        // The blank line between them doesn't end the first word's window.
        assert!(parsed.is_active(0, 0, 19.0));
        assert!(!parsed.is_active(0, 0, 21.0));
    }

    #[test]
    fn test_grace_window_at_end_of_song() {
        let parsed = ParsedLyrics::parse("[00:10.00]sista");
        assert!(parsed.is_active(0, 0, 12.9));
        assert!(!parsed.is_active(0, 0, 13.1));
    }

    #[test]
    fn test_end_time() {
        assert_eq!(two_lines().end_time(), Some(15.0));
        assert_eq!(ParsedLyrics::parse("").end_time(), None);
    }

    #[test]
    fn test_out_of_range_indices() {
        let parsed = two_lines();
        assert!(!parsed.is_active(9, 0, 11.0));
        assert!(!parsed.is_active(0, 9, 11.0));
    }
}
