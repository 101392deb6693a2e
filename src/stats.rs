//! Lifetime statistics and game-over bookkeeping
//!
//! The game hands a [`GameOverReport`] to [`record_game_over`], which updates
//! every persisted collaborator (statistics, high scores, achievements) in one
//! place.

use serde::{Deserialize, Serialize};

use crate::highscores::HighScores;
use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};
use crate::progression::{self, Achievement, Achievements, Level};
use crate::sim::DeathCause;

/// Result of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverReport {
    pub score: u32,
    pub game_time: u32,
    pub death_cause: DeathCause,
}

/// Death counts by cause
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deaths {
    pub collision: u32,
    pub wall: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statistics {
    pub games_played: u32,
    pub total_score: u64,
    pub highest_score: u32,
    /// Seconds
    pub total_time: u64,
    /// One per point scored
    pub apples_eaten: u64,
    pub deaths: Deaths,
}

impl Statistics {
    const STORAGE_KEY: &'static str = "snake-game-stats";

    pub fn record_game(&mut self, score: u32, time: u32, cause: DeathCause) {
        self.games_played += 1;
        self.total_score += u64::from(score);
        self.highest_score = self.highest_score.max(score);
        self.total_time += u64::from(time);
        self.apples_eaten += u64::from(score);
        match cause {
            DeathCause::Collision => self.deaths.collision += 1,
            DeathCause::Wall => self.deaths.wall += 1,
        }
    }

    /// Mean score per game, rounded
    pub fn average_score(&self) -> u64 {
        Self::rounded_mean(self.total_score, self.games_played)
    }

    /// Mean seconds per game, rounded
    pub fn average_time(&self) -> u64 {
        Self::rounded_mean(self.total_time, self.games_played)
    }

    fn rounded_mean(total: u64, games: u32) -> u64 {
        if games == 0 {
            return 0;
        }
        (total as f64 / f64::from(games)).round() as u64
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        load_json(store, Self::STORAGE_KEY)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)
    }

    /// Forget everything, in memory and in the store
    pub fn reset<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        *self = Self::default();
        store.remove(Self::STORAGE_KEY)
    }
}

/// What changed when a run was recorded
#[derive(Debug, Clone, PartialEq)]
pub struct GameOverRecord {
    pub stats: Statistics,
    /// Leaderboard rank (1-indexed) if the run made the table
    pub rank: Option<usize>,
    pub highest_score: u32,
    pub new_achievements: Vec<Achievement>,
    pub level: &'static Level,
}

/// Persist a finished run across statistics, high scores and achievements
pub fn record_game_over<S: KeyValueStore + ?Sized>(
    store: &mut S,
    report: &GameOverReport,
    date: &str,
) -> Result<GameOverRecord, StorageError> {
    let mut stats = Statistics::load(store);
    stats.record_game(report.score, report.game_time, report.death_cause);
    stats.save(store)?;

    let mut scores = HighScores::load(store);
    let rank = scores.add_score(report.score, report.game_time, date);
    if rank.is_some() {
        scores.save(store)?;
    }

    let mut achievements = Achievements::load(store);
    let new_achievements = achievements.unlock_for(report.score);
    if !new_achievements.is_empty() {
        achievements.save(store)?;
        for a in &new_achievements {
            log::info!("Achievement unlocked: {}", a.name);
        }
    }

    let highest_score = scores.highest_score().max(stats.highest_score);
    log::info!(
        "Recorded game: score {}, {}s, {} (rank {:?})",
        report.score,
        report.game_time,
        report.death_cause.as_str(),
        rank
    );

    Ok(GameOverRecord {
        stats,
        rank,
        highest_score,
        new_achievements,
        level: progression::level_for(highest_score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn report(score: u32, game_time: u32, death_cause: DeathCause) -> GameOverReport {
        GameOverReport {
            score,
            game_time,
            death_cause,
        }
    }

    #[test]
    fn test_record_game() {
        let mut stats = Statistics::default();
        stats.record_game(10, 60, DeathCause::Wall);
        stats.record_game(5, 25, DeathCause::Collision);
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.highest_score, 10);
        assert_eq!(stats.apples_eaten, 15);
        assert_eq!(stats.deaths, Deaths { collision: 1, wall: 1 });
        assert_eq!(stats.average_score(), 8);
        assert_eq!(stats.average_time(), 43);
    }

    #[test]
    fn test_averages_without_games() {
        let stats = Statistics::default();
        assert_eq!(stats.average_score(), 0);
        assert_eq!(stats.average_time(), 0);
    }

    #[test]
    fn test_record_game_over_updates_everything() {
        let mut store = MemoryStore::new();
        let record =
            record_game_over(&mut store, &report(12, 90, DeathCause::Collision), "5/6/26").unwrap();
        assert_eq!(record.rank, Some(1));
        assert_eq!(record.new_achievements.len(), 2);
        assert_eq!(record.level.name, "Apprentice");

        let record =
            record_game_over(&mut store, &report(0, 4, DeathCause::Wall), "5/6/26").unwrap();
        assert_eq!(record.rank, None);
        assert!(record.new_achievements.is_empty());
        assert_eq!(record.highest_score, 12);

        let stats = Statistics::load(&store);
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.deaths.wall, 1);
        assert_eq!(HighScores::load(&store).entries.len(), 1);
    }

    #[test]
    fn test_corrupt_stats_reset_to_default() {
        let mut store = MemoryStore::new();
        store.set("snake-game-stats", "garbage").unwrap();
        assert_eq!(Statistics::load(&store), Statistics::default());

        let mut stats = Statistics::default();
        stats.record_game(3, 3, DeathCause::Wall);
        stats.save(&mut store).unwrap();
        stats.reset(&mut store).unwrap();
        assert_eq!(Statistics::load(&store), Statistics::default());
    }
}
