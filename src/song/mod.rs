//! Song snapshot and its embedded exercise tasks.
//!
//! A `Song` is an immutable record produced by the content pipeline (see the
//! `processor` module) and consumed by a viewer session. Sessions replace the
//! whole snapshot when a new song is loaded; nothing is merged.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Pick-the-right-word exercise. `target_word` is always one of `alternatives`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSelectionTask {
    pub task_id: usize,
    pub target_word: String,
    pub alternatives: Vec<String>,
}

/// Rebuild-the-line exercise. `scrambled_line` is a permutation of the
/// whitespace-split `original_line`; duplicate words may occur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReorderingTask {
    pub task_id: usize,
    pub original_line: String,
    pub scrambled_line: Vec<String>,
}

impl LineReorderingTask {
    pub fn original_tokens(&self) -> Vec<&str> {
        self.original_line.trim().split(' ').collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    pub spotify_id: String,
    pub youtube_id: String,
    pub language: String,
    /// Raw synced lyrics, without task markup.
    pub lyrics: String,
    /// Lyrics with task placeholders woven in; what a session displays.
    pub processed_lyrics: String,
    pub word_selection_tasks: Vec<WordSelectionTask>,
    pub line_reordering_tasks: Vec<LineReorderingTask>,
}

impl Song {
    /// Lyrics the viewer should render: the processed variant when present.
    pub fn display_lyrics(&self) -> &str {
        if self.processed_lyrics.is_empty() {
            &self.lyrics
        } else {
            &self.processed_lyrics
        }
    }

    /// Look up a word-selection task by id. Ids are assigned by the producer
    /// and referenced from placeholders; a dangling reference yields `None`.
    pub fn word_selection_task(&self, task_id: usize) -> Option<&WordSelectionTask> {
        self.word_selection_tasks
            .iter()
            .find(|t| t.task_id == task_id)
    }

    pub fn line_reordering_task(&self, task_id: usize) -> Option<&LineReorderingTask> {
        self.line_reordering_tasks
            .iter()
            .find(|t| t.task_id == task_id)
    }
}

/// Load a song snapshot from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<Song> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_lookup_by_id() {
        let song = Song {
            word_selection_tasks: vec![WordSelectionTask {
                task_id: 3,
                target_word: "katt".to_string(),
                alternatives: vec!["katt".to_string(), "hatt".to_string()],
            }],
            ..Song::default()
        };
        assert_eq!(song.word_selection_task(3).unwrap().target_word, "katt");
        assert!(song.word_selection_task(0).is_none());
        assert!(song.line_reordering_task(3).is_none());
    }

    #[test]
    fn test_display_lyrics_prefers_processed() {
        let mut song = Song {
            lyrics: "raw".to_string(),
            ..Song::default()
        };
        assert_eq!(song.display_lyrics(), "raw");
        song.processed_lyrics = "masked".to_string();
        assert_eq!(song.display_lyrics(), "masked");
    }
}
