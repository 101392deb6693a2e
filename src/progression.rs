//! Player level and achievements
//!
//! Levels are derived from the best score ever reached. Achievements unlock
//! once at fixed score milestones and stay unlocked across runs.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};

/// One rung of the level ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub level: u8,
    pub name: &'static str,
    pub required_score: u32,
    pub color: &'static str,
}

pub const LEVELS: [Level; 7] = [
    Level { level: 1, name: "Beginner", required_score: 0, color: "bg-green-500" },
    Level { level: 2, name: "Apprentice", required_score: 5, color: "bg-blue-500" },
    Level { level: 3, name: "Intermediate", required_score: 15, color: "bg-yellow-500" },
    Level { level: 4, name: "Advanced", required_score: 30, color: "bg-orange-500" },
    Level { level: 5, name: "Expert", required_score: 50, color: "bg-red-500" },
    Level { level: 6, name: "Master", required_score: 75, color: "bg-purple-500" },
    Level { level: 7, name: "Legend", required_score: 100, color: "bg-indigo-500" },
];

/// Highest level whose requirement `highest_score` meets
pub fn level_for(highest_score: u32) -> &'static Level {
    LEVELS
        .iter()
        .rev()
        .find(|l| highest_score >= l.required_score)
        .unwrap_or(&LEVELS[0])
}

pub fn next_level(highest_score: u32) -> Option<&'static Level> {
    LEVELS.iter().find(|l| l.required_score > highest_score)
}

/// Percent of the way from the current level to the next (100 at the top)
pub fn progress_percent(highest_score: u32) -> u32 {
    let current = level_for(highest_score);
    let Some(next) = next_level(highest_score) else {
        return 100;
    };
    let range = next.required_score - current.required_score;
    let progress = highest_score - current.required_score;
    (progress * 100 / range).min(100)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
    /// Score needed in a single run
    pub requirement: u32,
}

impl Achievement {
    fn new(id: &str, name: &str, description: &str, icon: &str, requirement: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            unlocked: false,
            requirement,
        }
    }
}

/// The achievement catalog with unlock state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievements {
    pub list: Vec<Achievement>,
}

impl Default for Achievements {
    fn default() -> Self {
        Self {
            list: vec![
                Achievement::new("first-bite", "First Bite", "Eat your first apple", "🍎", 1),
                Achievement::new("hungry", "Hungry", "Reach a score of 10", "🍽️", 10),
                Achievement::new("snake-charmer", "Snake Charmer", "Reach a score of 25", "🐍", 25),
                Achievement::new("python-master", "Python Master", "Reach a score of 50", "🏆", 50),
                Achievement::new("anaconda", "Anaconda", "Reach a score of 75", "🌟", 75),
                Achievement::new("snake-god", "Snake God", "Reach a score of 100", "👑", 100),
            ],
        }
    }
}

impl Achievements {
    const STORAGE_KEY: &'static str = "snake-game-achievements";

    /// Unlock everything `score` qualifies for; returns what was newly unlocked
    pub fn unlock_for(&mut self, score: u32) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        for achievement in &mut self.list {
            if !achievement.unlocked && score >= achievement.requirement {
                achievement.unlocked = true;
                unlocked.push(achievement.clone());
            }
        }
        unlocked
    }

    pub fn unlocked_count(&self) -> usize {
        self.list.iter().filter(|a| a.unlocked).count()
    }

    /// Catalog with the stored unlock flags applied. Unknown ids are dropped.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let stored: Vec<Achievement> = load_json(store, Self::STORAGE_KEY);
        let mut achievements = Self::default();
        for achievement in &mut achievements.list {
            achievement.unlocked = stored.iter().any(|s| s.id == achievement.id && s.unlocked);
        }
        achievements
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, &self.list)
    }
}
