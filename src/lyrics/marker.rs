//! Task placeholder grammar embedded in processed lyrics.
//!
//! A processed lyric token can stand in for an exercise instead of a literal
//! word. The producer writes blanks like `__wp3__` (word-selection) and
//! `_____lp0_____` (line-reordering), and widget lines like `__wst3__` and
//! `__lrt0__`. The task index runs from right after the tag up to the next
//! underscore, so the token is self-delimiting.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:wp|lp)\d+").unwrap());

/// What a placeholder token stands for, classified once at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Blank left by a removed word; filled in once the task is done.
    WordBlank { task_id: usize },
    /// Blank left by a removed line; rebuilt word by word.
    LineBlank { task_id: usize },
    /// Slot where the word-selection choices are offered.
    WordChoices { task_id: usize },
    /// Slot where the scrambled line is offered for reordering.
    LineChoices { task_id: usize },
}

impl Marker {
    /// Classify a lyric token. Returns `None` for literal words and for
    /// malformed markers (missing index or unterminated tag).
    pub fn detect(word: &str) -> Option<Marker> {
        if word.contains("__lp") {
            return extract_index(word, "lp").map(|task_id| Marker::LineBlank { task_id });
        }
        if word.contains("__wp") {
            return extract_index(word, "wp").map(|task_id| Marker::WordBlank { task_id });
        }
        if word.contains("__wst") {
            return extract_index(word, "wst").map(|task_id| Marker::WordChoices { task_id });
        }
        if word.contains("__lrt") {
            return extract_index(word, "lrt").map(|task_id| Marker::LineChoices { task_id });
        }
        None
    }

    pub fn task_id(&self) -> usize {
        match *self {
            Marker::WordBlank { task_id }
            | Marker::LineBlank { task_id }
            | Marker::WordChoices { task_id }
            | Marker::LineChoices { task_id } => task_id,
        }
    }

    /// Identifier correlating this placeholder with its response entry.
    /// Choice widgets submit under the same key their blank reads from.
    pub fn response_key(&self) -> String {
        match *self {
            Marker::WordBlank { task_id } | Marker::WordChoices { task_id } => {
                format!("wp{task_id}")
            }
            Marker::LineBlank { task_id } | Marker::LineChoices { task_id } => {
                format!("lp{task_id}")
            }
        }
    }
}

/// Pull the task index out of a marker token: the digits between the first
/// occurrence of `tag` and the next `_`. `None` when the tag is absent, the
/// index is unterminated, or it is not a number.
pub fn extract_index(word: &str, tag: &str) -> Option<usize> {
    let start = word.find(tag)? + tag.len();
    let end = start + word[start..].find('_')?;
    word[start..end].parse().ok()
}

/// Fallback rendering for a blank nobody has answered (or that points at a
/// missing task): drop the tag and turn the underscores into plain spaces.
pub fn strip_marker(word: &str) -> String {
    BLANK_TAG.replace_all(word, "").replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_index() {
        assert_eq!(extract_index("__wp3_", "wp"), Some(3));
        assert_eq!(extract_index("_____lp12_____", "lp"), Some(12));
        assert_eq!(extract_index("__wst0__", "wst"), Some(0));
        assert_eq!(extract_index("plainword", "wp"), None);
        // Tag present but no terminating underscore.
        assert_eq!(extract_index("__wp3", "wp"), None);
        // Tag present but nothing numeric before the underscore.
        assert_eq!(extract_index("__wp_", "wp"), None);
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            Marker::detect("___wp2___"),
            Some(Marker::WordBlank { task_id: 2 })
        );
        assert_eq!(
            Marker::detect("______lp0______"),
            Some(Marker::LineBlank { task_id: 0 })
        );
        assert_eq!(
            Marker::detect("__wst5__"),
            Some(Marker::WordChoices { task_id: 5 })
        );
        assert_eq!(
            Marker::detect("__lrt1__"),
            Some(Marker::LineChoices { task_id: 1 })
        );
        assert_eq!(Marker::detect("hello"), None);
        assert_eq!(Marker::detect("__wp"), None);
    }

    #[test]
    fn test_response_keys() {
        assert_eq!(Marker::WordBlank { task_id: 3 }.response_key(), "wp3");
        assert_eq!(Marker::WordChoices { task_id: 3 }.response_key(), "wp3");
        assert_eq!(Marker::LineBlank { task_id: 0 }.response_key(), "lp0");
        assert_eq!(Marker::LineChoices { task_id: 0 }.response_key(), "lp0");
    }

    #[test]
    fn test_strip_marker() {
        assert_eq!(strip_marker("___wp2___"), "      ");
        assert_eq!(strip_marker("__lp10__"), "    ");
        assert_eq!(strip_marker("no_marker"), "no marker");
    }
}
