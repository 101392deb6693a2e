//! High score leaderboard system
//!
//! Persisted through the injected store, tracks top 10 runs plus the best
//! score ever seen (kept under its own key so clearing the table is visible).

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    /// Game seconds the run lasted
    pub time: u32,
    /// Display date supplied by the host
    pub date: String,
}

impl HighScoreEntry {
    /// A run outranks an entry with a higher score, or the same score in less
    /// time.
    fn is_beaten_by(&self, score: u32, time: u32) -> bool {
        score > self.score || (score == self.score && time < self.time)
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    highest: u32,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "snake-game-high-scores";
    const HIGHEST_SCORE_KEY: &'static str = "snake-game-highest-score";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a run qualifies for the leaderboard
    pub fn qualifies(&self, score: u32, time: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // A full table takes the run only if it outranks the lowest entry
        self.entries
            .last()
            .is_none_or(|e| e.is_beaten_by(score, time))
    }

    /// Rank a run would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u32, time: u32) -> Option<usize> {
        if !self.qualifies(score, time) {
            return None;
        }
        let rank = self.entries.iter().position(|e| e.is_beaten_by(score, time));
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a run to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, score: u32, time: u32, date: impl Into<String>) -> Option<usize> {
        let rank = self.potential_rank(score, time)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                time,
                date: date.into(),
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        self.highest = self.highest.max(score);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score ever recorded, including runs since pushed off the table
    pub fn highest_score(&self) -> u32 {
        self.highest
    }

    /// Get the top score on the table (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut entries: Vec<HighScoreEntry> = load_json(store, Self::STORAGE_KEY);
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.time.cmp(&b.time)));
        entries.truncate(MAX_HIGH_SCORES);

        let stored: u32 = load_json(store, Self::HIGHEST_SCORE_KEY);
        let highest = entries.first().map_or(stored, |e| e.score.max(stored));
        log::info!("Loaded {} high scores", entries.len());

        Self { entries, highest }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, &self.entries)?;
        save_json(store, Self::HIGHEST_SCORE_KEY, &self.highest)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Empty the table and forget the highest score
    pub fn clear<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        self.entries.clear();
        self.highest = 0;
        store.remove(Self::STORAGE_KEY)?;
        store.remove(Self::HIGHEST_SCORE_KEY)
    }
}
