//! Correctness rules for the two exercise kinds.
//!
//! Scoring is feedback, not a gate: a wrong pick never blocks the next one,
//! and a line can be completed with a wrong ordering.

use crate::song::{LineReorderingTask, WordSelectionTask};
use crate::tasks::TaskResponse;

/// A word-selection choice is correct iff it is the removed word itself.
pub fn is_correct_choice(task: &WordSelectionTask, choice: &str) -> bool {
    choice == task.target_word
}

/// Single-shot word choice. The first pick is final.
#[derive(Debug, Clone, Default)]
pub struct WordChoiceAttempt {
    selected: Option<usize>,
}

impl WordChoiceAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick an alternative by index. Returns the response to submit, or
    /// `None` when the index is out of range or a pick was already made.
    pub fn choose(&mut self, task: &WordSelectionTask, alternative: usize) -> Option<TaskResponse> {
        if self.selected.is_some() {
            return None;
        }
        let word = task.alternatives.get(alternative)?;
        self.selected = Some(alternative);
        Some(TaskResponse::new(word.clone(), true))
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_correct(&self, task: &WordSelectionTask) -> Option<bool> {
        let word = task.alternatives.get(self.selected?)?;
        Some(is_correct_choice(task, word))
    }

    /// Feedback for one alternative after the pick: the target reads correct,
    /// a wrong pick reads incorrect, everything else stays neutral (`None`).
    pub fn feedback(&self, task: &WordSelectionTask, alternative: usize) -> Option<bool> {
        let selected = self.selected?;
        let word = task.alternatives.get(alternative)?;
        if *word == task.target_word {
            return Some(true);
        }
        if selected == alternative {
            return Some(false);
        }
        None
    }
}

/// Accumulating line-reordering attempt. Picks are scrambled-array positions
/// rather than values, so duplicate words stay distinguishable.
#[derive(Debug, Clone, Default)]
pub struct LineOrderAttempt {
    picks: Vec<usize>,
}

impl LineOrderAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pick. Returns the response to submit; `None` when the
    /// position is out of range, already picked, or the line is complete.
    /// The response becomes `done` once every original token has a pick.
    pub fn pick(&mut self, task: &LineReorderingTask, position: usize) -> Option<TaskResponse> {
        if position >= task.scrambled_line.len() || self.picks.contains(&position) {
            return None;
        }
        let target_len = task.original_tokens().len();
        if self.picks.len() >= target_len {
            return None;
        }

        self.picks.push(position);
        let response = self
            .picks
            .iter()
            .map(|&i| task.scrambled_line[i].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Some(TaskResponse::new(response, self.picks.len() == target_len))
    }

    /// Correctness of each pick so far, in pick order: pick k is right when
    /// the scrambled word at that position matches the k-th original token,
    /// case-insensitively.
    pub fn validity(&self, task: &LineReorderingTask) -> Vec<bool> {
        let target = task.original_tokens();
        self.picks
            .iter()
            .enumerate()
            .map(|(rank, &pos)| {
                match (task.scrambled_line.get(pos), target.get(rank)) {
                    (Some(picked), Some(expected)) => {
                        picked.to_lowercase() == expected.to_lowercase()
                    }
                    _ => false,
                }
            })
            .collect()
    }

    /// Rank of a position among the picks, for widget subscripts.
    pub fn pick_rank(&self, position: usize) -> Option<usize> {
        self.picks.iter().position(|&p| p == position)
    }

    pub fn picks(&self) -> &[usize] {
        &self.picks
    }

    pub fn is_done(&self, task: &LineReorderingTask) -> bool {
        self.picks.len() == task.original_tokens().len()
    }
}
