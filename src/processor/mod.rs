//! Builds task-annotated songs out of plain or word-synced lyrics.
//!
//! The processor is the producer side of the placeholder grammar in
//! `lyrics::marker`: it picks exercise material, rewrites the affected lyric
//! text into `wp`/`lp` blanks, and inserts the `__wst<id>__` / `__lrt<id>__`
//! widget lines a viewer session resolves back into interactive tasks.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use rand::seq::{IndexedRandom, SliceRandom};
use regex::Regex;

use crate::song::{LineReorderingTask, Song, WordSelectionTask};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static LINE_STAMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+:\d+\.\d+\]").unwrap());

/// Strip markup, bracketed sections and punctuation, keeping line structure.
pub fn curate_lyrics(lyrics: &str) -> String {
    let broken = lyrics.replace("<br/>", "\n").replace("<br>", "\n");
    let s = HTML_TAG.replace_all(&broken, " ");
    let s = BRACKETED.replace_all(&s, " ");
    let s = PUNCT.replace_all(&s, " ");
    SPACES.replace_all(&s, " ").into_owned()
}

/// Plain edit distance, used to rank near-miss alternatives.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost)
                .min(prev[j + 1] + 1)
                .min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// How many of the closest wordlist entries alternatives are sampled from.
const ALTERNATIVE_POOL: usize = 25;
/// Shortest word worth blanking out.
const MIN_TARGET_LEN: usize = 5;

pub struct SongProcessor {
    lyrics: String,
    curated: String,
    words: Vec<String>,
    wordlist: Vec<String>,
    known: HashSet<String>,
    keep_lrc: bool,
    processed: Option<String>,
    word_selection_tasks: Vec<WordSelectionTask>,
    line_reordering_tasks: Vec<LineReorderingTask>,
}

impl SongProcessor {
    /// `keep_lrc` keeps the word timestamps in the processed output so the
    /// karaoke view can still sync it; otherwise the curated text is masked.
    pub fn new(lyrics: &str, wordlist: Vec<String>, keep_lrc: bool) -> Self {
        let lyrics = BLANK_LINES
            .replace_all(lyrics.trim(), "\n\n")
            .into_owned();
        let curated = curate_lyrics(&lyrics);
        let words = WHITESPACE
            .replace_all(&curated, " ")
            .split(' ')
            .filter(|w| !w.is_empty() && !w.chars().all(char::is_numeric))
            .map(str::to_string)
            .collect();
        let known = wordlist.iter().map(|w| w.to_lowercase()).collect();

        Self {
            lyrics,
            curated,
            words,
            wordlist,
            known,
            keep_lrc,
            processed: None,
            word_selection_tasks: Vec::new(),
            line_reordering_tasks: Vec::new(),
        }
    }

    pub fn word_selection_tasks(&self) -> &[WordSelectionTask] {
        &self.word_selection_tasks
    }

    pub fn line_reordering_tasks(&self) -> &[LineReorderingTask] {
        &self.line_reordering_tasks
    }

    /// Create one word-selection task. Without `forced_word`, a target is
    /// drawn from the lyric words that are long enough, known to the
    /// wordlist, and not already claimed by another task. Returns `None`
    /// when no candidate is left.
    pub fn create_word_selection_task(
        &mut self,
        forced_word: Option<&str>,
    ) -> Option<&WordSelectionTask> {
        let mut rng = rand::rng();

        let target = match forced_word {
            Some(w) => w.to_string(),
            None => {
                let excluded: HashSet<&str> = self
                    .word_selection_tasks
                    .iter()
                    .map(|t| t.target_word.as_str())
                    .chain(
                        self.line_reordering_tasks
                            .iter()
                            .flat_map(|t| t.scrambled_line.iter().map(String::as_str)),
                    )
                    .collect();
                let candidates: Vec<&String> = self
                    .words
                    .iter()
                    .collect::<HashSet<_>>()
                    .into_iter()
                    .filter(|w| {
                        w.chars().count() >= MIN_TARGET_LEN
                            && !excluded.contains(w.as_str())
                            && self.is_known(w)
                    })
                    .collect();
                (*candidates.choose(&mut rng)?).clone()
            }
        };

        let mut ranked: Vec<&String> = self
            .wordlist
            .iter()
            .filter(|w| w.to_lowercase() != target.to_lowercase())
            .collect();
        ranked.sort_by_key(|w| levenshtein(w, &target));
        ranked.truncate(ALTERNATIVE_POOL);

        let mut alternatives: Vec<String> = ranked
            .choose_multiple(&mut rng, 3)
            .map(|w| (*w).clone())
            .collect();
        alternatives.push(target.clone());
        alternatives.shuffle(&mut rng);

        self.word_selection_tasks.push(WordSelectionTask {
            task_id: self.word_selection_tasks.len(),
            target_word: target,
            alternatives,
        });
        self.word_selection_tasks.last()
    }

    /// Create one line-reordering task. Without `forced_line`, a line that
    /// occurs exactly once in the curated lyrics is drawn (preferring lines
    /// made only of wordlist words) and its words are shuffled.
    pub fn create_line_reordering_task(
        &mut self,
        forced_line: Option<&str>,
    ) -> Option<&LineReorderingTask> {
        let mut rng = rand::rng();

        let (original_line, scrambled_line) = match forced_line {
            Some(line) => (
                line.to_string(),
                line.split(' ').map(str::to_string).collect(),
            ),
            None => {
                let all_lines: Vec<String> = self
                    .curated
                    .lines()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
                let pure: Vec<String> = all_lines
                    .iter()
                    .filter(|l| l.split(' ').all(|w| w.chars().count() < 2 || self.is_known(w)))
                    .cloned()
                    .collect();
                let pool = if pure.is_empty() { all_lines } else { pure };

                let line = select_one_unique(&pool, &mut rng)?;
                let mut words: Vec<String> =
                    line.split(' ').map(str::to_string).collect();
                words.shuffle(&mut rng);
                (line, words)
            }
        };

        self.line_reordering_tasks.push(LineReorderingTask {
            task_id: self.line_reordering_tasks.len(),
            original_line,
            scrambled_line,
        });
        self.line_reordering_tasks.last()
    }

    /// Rewrite the lyrics so every task leaves a blank where its text was
    /// and a widget line right after it.
    pub fn mask_words(&mut self) -> &mut Self {
        let source = if self.keep_lrc {
            self.lyrics.clone()
        } else {
            self.curated.trim().to_string()
        };

        let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
        let original = lines.clone();
        let mut inserted = 0usize;
        let mut word_tasks_handled: HashSet<usize> = HashSet::new();

        for (index, line) in original.iter().enumerate() {
            let mut updated = line.clone();
            let curated_line = curate_lyrics(line).trim().to_string();
            let mut inserted_here = 0usize;

            for task in &self.line_reordering_tasks {
                if task.original_line.trim().to_lowercase() != curated_line.to_lowercase() {
                    continue;
                }
                let pad = "_".repeat(curated_line.chars().count() / 2);
                updated = format!("{pad}lp{}{pad}", task.task_id);
                if self.keep_lrc
                    && line.starts_with('[')
                    && let Some(stamp) = LINE_STAMP.find(line)
                {
                    updated = format!("{}{updated}", stamp.as_str());
                }
                lines.insert(index + inserted + 1, format!("__lrt{}__", task.task_id));
                inserted_here += 1;
            }

            for task in &self.word_selection_tasks {
                if !line.contains(task.target_word.as_str()) {
                    continue;
                }
                let pad = "_".repeat(task.target_word.chars().count() / 2);
                updated = updated.replace(
                    &task.target_word,
                    &format!("{pad}wp{}{pad}", task.task_id),
                );
                if word_tasks_handled.insert(task.task_id) {
                    lines.insert(index + inserted + 1, format!("__wst{}__", task.task_id));
                    inserted_here += 1;
                }
            }

            lines[index + inserted] = updated;
            inserted += inserted_here;
        }

        if self.keep_lrc {
            stamp_task_lines(&mut lines);
        }
        self.processed = Some(lines.join("\n"));
        self
    }

    pub fn into_song(
        self,
        spotify_id: impl Into<String>,
        youtube_id: impl Into<String>,
        language: impl Into<String>,
    ) -> Song {
        Song {
            spotify_id: spotify_id.into(),
            youtube_id: youtube_id.into(),
            language: language.into(),
            lyrics: self.lyrics,
            processed_lyrics: self.processed.unwrap_or_default(),
            word_selection_tasks: self.word_selection_tasks,
            line_reordering_tasks: self.line_reordering_tasks,
        }
    }

    fn is_known(&self, word: &str) -> bool {
        self.known.is_empty() || self.known.contains(&word.to_lowercase())
    }
}

/// Pick one line among those occurring exactly once, spaces squeezed.
fn select_one_unique(pool: &[String], rng: &mut impl rand::Rng) -> Option<String> {
    let unique: Vec<&String> = pool
        .iter()
        .filter(|line| pool.iter().filter(|l| l == line).count() == 1)
        .collect();
    unique
        .choose(rng)
        .map(|line| WHITESPACE.replace_all(line.as_str(), " ").into_owned())
}

/// Widget lines carry no time of their own; give each the timestamp of the
/// next timestamped line so the synced view can place it, falling back to
/// the last timestamp in the song.
fn stamp_task_lines(lines: &mut [String]) {
    for i in 0..lines.len() {
        if !lines[i].starts_with("__") {
            continue;
        }
        let stamp = lines[i + 1..]
            .iter()
            .find_map(|l| LINE_STAMP.find(l).map(|m| m.as_str().to_string()))
            .or_else(|| {
                lines[..i]
                    .iter()
                    .rev()
                    .find_map(|l| LINE_STAMP.find(l).map(|m| m.as_str().to_string()))
            });
        if let Some(stamp) = stamp {
            lines[i] = format!("{stamp}{}", lines[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::{Marker, ParsedLyrics};

    const LRC: &str = "[00:10.00]en [00:11.00]liten [00:12.00]katt\n[00:13.00]som [00:14.00]sjunger [00:15.00]högt";

    fn wordlist() -> Vec<String> {
        ["en", "liten", "katt", "som", "sjunger", "högt", "sjunga", "springer", "hunger"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_curate_lyrics() {
        let curated = curate_lyrics("Hello <b>world</b>!<br>[Chorus] la-la");
        assert_eq!(curated, "Hello world \n la la");
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("katt", "katt"), 0);
        assert_eq!(levenshtein("katt", "hatt"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_word_task_masking_keeps_timestamps() {
        let mut processor = SongProcessor::new(LRC, wordlist(), true);
        let _ = processor.create_word_selection_task(Some("sjunger"));
        processor.mask_words();
        let song = processor.into_song("s", "y", "sv");

        let parsed = ParsedLyrics::parse(&song.processed_lyrics);
        // Line 1 keeps its tags, with the target replaced by a blank.
        let blank = &parsed.lines[1].words[1];
        assert_eq!(blank.marker, Some(Marker::WordBlank { task_id: 0 }));
        assert_eq!(blank.time, 14.0);
        // The widget line was inserted and inherited a timestamp.
        let widget = &parsed.lines[2].words[0];
        assert_eq!(widget.marker, Some(Marker::WordChoices { task_id: 0 }));
        assert_eq!(widget.time, 13.0);
    }

    #[test]
    fn test_line_task_masking() {
        let mut processor = SongProcessor::new(LRC, wordlist(), true);
        let _ = processor.create_line_reordering_task(Some("som sjunger högt"));
        processor.mask_words();
        let song = processor.into_song("s", "y", "sv");

        let parsed = ParsedLyrics::parse(&song.processed_lyrics);
        let blank = &parsed.lines[1].words[0];
        assert_eq!(blank.marker, Some(Marker::LineBlank { task_id: 0 }));
        assert_eq!(blank.time, 13.0);
        assert_eq!(
            parsed.lines[2].words[0].marker,
            Some(Marker::LineChoices { task_id: 0 })
        );
    }

    #[test]
    fn test_widget_line_inserted_once_per_task() {
        let lyrics = "[00:10.00]sjunger\n[00:20.00]sjunger";
        let mut processor = SongProcessor::new(lyrics, wordlist(), true);
        let _ = processor.create_word_selection_task(Some("sjunger"));
        processor.mask_words();
        let song = processor.into_song("s", "y", "sv");

        let widget_lines = song
            .processed_lyrics
            .lines()
            .filter(|l| l.contains("__wst0__"))
            .count();
        assert_eq!(widget_lines, 1);
        // Both occurrences of the target were blanked.
        assert!(!song.processed_lyrics.contains("sjunger"));
    }

    #[test]
    fn test_random_word_task_shape() {
        let mut processor = SongProcessor::new(LRC, wordlist(), true);
        let task = processor
            .create_word_selection_task(None)
            .expect("a candidate exists")
            .clone();

        assert!(task.alternatives.contains(&task.target_word));
        assert!(task.alternatives.len() <= 4);
        assert!(task.target_word.chars().count() >= MIN_TARGET_LEN);
        // Target must come from the lyrics themselves.
        assert!(curate_lyrics(LRC).contains(&task.target_word));
    }

    #[test]
    fn test_random_line_task_is_permutation() {
        let mut processor = SongProcessor::new(LRC, wordlist(), true);
        let task = processor
            .create_line_reordering_task(None)
            .expect("a line exists")
            .clone();

        let mut original: Vec<&str> = task.original_tokens();
        let mut scrambled: Vec<&str> =
            task.scrambled_line.iter().map(String::as_str).collect();
        original.sort_unstable();
        scrambled.sort_unstable();
        assert_eq!(original, scrambled);
    }

    #[test]
    fn test_task_ids_count_up() {
        let mut processor = SongProcessor::new(LRC, wordlist(), true);
        let _ = processor.create_word_selection_task(Some("liten"));
        let _ = processor.create_word_selection_task(Some("sjunger"));
        let ids: Vec<usize> = processor
            .word_selection_tasks()
            .iter()
            .map(|t| t.task_id)
            .collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_blank_line_runs_squeezed() {
        let processor = SongProcessor::new("a\n\n\n\nb", Vec::new(), false);
        assert_eq!(processor.lyrics, "a\n\nb");
    }
}
