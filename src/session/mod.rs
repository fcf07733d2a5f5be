//! Viewer session: one loaded song, its parsed timeline, and the user's
//! live task state.
//!
//! The session is synchronous and single-owner. Collection-valued state is
//! replaced wholesale on song change, never merged, so a stale response can
//! never leak across songs. All queries derive from current state and are
//! safe to call on every tick.

pub mod actions;

use std::collections::HashMap;

use tracing::debug;

use crate::lyrics::parser::ParsedLyrics;
use crate::player::{PlayerControl, PlayerEvent};
use crate::song::Song;
use crate::tasks::reconcile::{render_line, render_word, RenderedWord};
use crate::tasks::scoring::{LineOrderAttempt, WordChoiceAttempt};
use crate::tasks::Responses;
use actions::Action;

#[derive(Default)]
pub struct Session {
    song: Option<Song>,
    parsed: ParsedLyrics,
    responses: Responses,
    word_attempts: HashMap<usize, WordChoiceAttempt>,
    line_attempts: HashMap<usize, LineOrderAttempt>,

    position: f64,
    duration: f64,
    paused: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            paused: true,
            ..Self::default()
        }
    }

    /// Replace the current song. Everything derived from the previous song
    /// is dropped here; there is no merge path.
    pub fn load_song(&mut self, song: Song) {
        self.parsed = ParsedLyrics::parse(song.display_lyrics());
        self.song = Some(song);
        self.responses = Responses::new();
        self.word_attempts = HashMap::new();
        self.line_attempts = HashMap::new();
        self.position = 0.0;
        self.duration = 0.0;
    }

    pub fn clear_song(&mut self) {
        self.song = None;
        self.parsed = ParsedLyrics::default();
        self.responses = Responses::new();
        self.word_attempts = HashMap::new();
        self.line_attempts = HashMap::new();
        self.position = 0.0;
        self.duration = 0.0;
    }

    /// No song loaded is the welcome state, not an error.
    pub fn has_song(&self) -> bool {
        self.song.is_some()
    }

    pub fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    pub fn parsed(&self) -> &ParsedLyrics {
        &self.parsed
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn apply_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Position { seconds } => self.position = seconds,
            PlayerEvent::Duration { seconds } => self.duration = seconds,
            PlayerEvent::Started => self.paused = false,
            PlayerEvent::Paused | PlayerEvent::Ended => self.paused = true,
        }
    }

    pub fn apply(&mut self, action: Action, player: &mut dyn PlayerControl) {
        match action {
            Action::LoadSong(song) => self.load_song(song),
            Action::ClearSong => self.clear_song(),

            Action::ChooseAlternative {
                task_id,
                alternative,
            } => {
                let Some(task) = self
                    .song
                    .as_ref()
                    .and_then(|s| s.word_selection_task(task_id))
                    .cloned()
                else {
                    debug!(task_id, "choose on unknown word-selection task");
                    return;
                };
                let attempt = self.word_attempts.entry(task_id).or_default();
                if let Some(response) = attempt.choose(&task, alternative) {
                    self.responses.submit(format!("wp{task_id}"), response);
                }
            }

            Action::PickScrambledWord { task_id, position } => {
                let Some(task) = self
                    .song
                    .as_ref()
                    .and_then(|s| s.line_reordering_task(task_id))
                    .cloned()
                else {
                    debug!(task_id, "pick on unknown line-reordering task");
                    return;
                };
                let attempt = self.line_attempts.entry(task_id).or_default();
                if let Some(response) = attempt.pick(&task, position) {
                    self.responses.submit(format!("lp{task_id}"), response);
                }
            }

            Action::SeekToWord { line, word } => {
                if let Some(w) = self
                    .parsed
                    .lines
                    .get(line)
                    .and_then(|l| l.words.get(word))
                {
                    player.seek(w.time);
                }
            }

            Action::TogglePause => {
                if self.paused {
                    player.play();
                } else {
                    player.pause();
                }
            }
        }
    }

    /// Active word for the last observed playback position.
    pub fn active_word(&self) -> Option<(usize, usize)> {
        self.parsed.active_word(self.position)
    }

    /// Reconciled display of one token.
    pub fn rendered_word(&self, line: usize, word: usize) -> Option<RenderedWord> {
        let song = self.song.as_ref()?;
        let w = self.parsed.lines.get(line)?.words.get(word)?;
        Some(render_word(w, song, &self.responses))
    }

    /// Reconciled text of one display line; `None` without a song.
    pub fn rendered_line(&self, line: usize) -> Option<String> {
        let song = self.song.as_ref()?;
        let l = self.parsed.lines.get(line)?;
        Some(render_line(l, song, &self.responses))
    }

    /// Widget feedback passthroughs, for a rendering collaborator.
    pub fn word_feedback(&self, task_id: usize, alternative: usize) -> Option<bool> {
        let task = self.song.as_ref()?.word_selection_task(task_id)?;
        self.word_attempts.get(&task_id)?.feedback(task, alternative)
    }

    pub fn line_validity(&self, task_id: usize) -> Vec<bool> {
        match (
            self.song.as_ref().and_then(|s| s.line_reordering_task(task_id)),
            self.line_attempts.get(&task_id),
        ) {
            (Some(task), Some(attempt)) => attempt.validity(task),
            _ => Vec::new(),
        }
    }

    pub fn line_pick_rank(&self, task_id: usize, position: usize) -> Option<usize> {
        self.line_attempts.get(&task_id)?.pick_rank(position)
    }
}
