use crate::song::Song;

/// User interactions a viewer session can apply.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the whole song snapshot; resets lyrics, responses, attempts.
    LoadSong(Song),
    ClearSong,

    /// Pick an alternative (by index) in a word-selection widget.
    ChooseAlternative { task_id: usize, alternative: usize },
    /// Pick a scrambled-array position in a line-reordering widget.
    PickScrambledWord { task_id: usize, position: usize },

    /// Jump playback to the timestamp of a lyric word.
    SeekToWord { line: usize, word: usize },
    TogglePause,
}
