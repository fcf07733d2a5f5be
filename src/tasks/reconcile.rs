//! Inline-fill projection: placeholder tokens + live responses → display text.
//!
//! Derived strictly from the current response map and the immutable task
//! definitions, so it can be recomputed on every interaction without
//! accumulating state. A dangling task reference degrades to a stripped
//! blank; nothing here can fail.

use crate::lyrics::marker::{strip_marker, Marker};
use crate::lyrics::parser::{LyricLine, TimedWord};
use crate::song::Song;
use crate::tasks::Responses;

/// What one lyric token renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedWord {
    /// Plain text span; selecting it seeks playback to `seek_to`.
    Text { text: String, seek_to: f64 },
    /// Offer the word-selection alternatives for this task.
    WordChoices { task_id: usize },
    /// Offer the scrambled line for this task.
    LineChoices { task_id: usize },
    /// Widget reference to a task the song does not carry; render nothing.
    Hidden,
}

pub fn render_word(word: &TimedWord, song: &Song, responses: &Responses) -> RenderedWord {
    let text = match word.marker {
        None => word.raw.clone(),

        Some(marker @ Marker::WordBlank { task_id }) => {
            match (
                song.word_selection_task(task_id),
                responses.get(&marker.response_key()),
            ) {
                // Substitution on completion is unconditional: even a wrong
                // choice reveals the target word.
                (Some(task), Some(r)) if r.done => task.target_word.clone(),
                _ => strip_marker(&word.raw),
            }
        }

        Some(marker @ Marker::LineBlank { task_id }) => {
            match (
                song.line_reordering_task(task_id),
                responses.get(&marker.response_key()),
            ) {
                (Some(task), Some(r)) if r.done => task.original_line.clone(),
                (Some(task), Some(r)) => pad_partial_line(&r.response, &task.original_line),
                _ => strip_marker(&word.raw),
            }
        }

        Some(Marker::WordChoices { task_id }) => {
            return if song.word_selection_task(task_id).is_some() {
                RenderedWord::WordChoices { task_id }
            } else {
                RenderedWord::Hidden
            };
        }

        Some(Marker::LineChoices { task_id }) => {
            return if song.line_reordering_task(task_id).is_some() {
                RenderedWord::LineChoices { task_id }
            } else {
                RenderedWord::Hidden
            };
        }
    };

    RenderedWord::Text {
        text,
        seek_to: word.time,
    }
}

/// The inline-fill text of a whole line; widget slots contribute nothing.
pub fn render_line(line: &LyricLine, song: &Song, responses: &Responses) -> String {
    line.words
        .iter()
        .filter_map(|w| match render_word(w, song, responses) {
            RenderedWord::Text { text, .. } => Some(text),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A partially rebuilt line keeps the final line's width so the text does not
/// jump while words are still being picked.
fn pad_partial_line(partial: &str, original_line: &str) -> String {
    let width = original_line.chars().count();
    let used = partial.chars().count();
    format!("{partial}{}", " ".repeat(width.saturating_sub(used)))
}
