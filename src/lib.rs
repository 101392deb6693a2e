//! Snake Core - grid Snake with timed power-ups and difficulty tiers
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, collisions, power-ups, movement, clock)
//! - `game`: State machine driven by the host (frames, input, pause, visibility)
//! - `controls`: Keyboard mapping onto game commands
//! - `persistence`: Injected key-value storage
//! - `highscores`, `stats`, `progression`, `settings`: Persisted collaborators
//! - `analytics`, `tracking`: Best-effort session reporting and AI insights
//! - `platform`: Browser bindings

pub mod analytics;
pub mod controls;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tracking;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::Settings;
pub use stats::Statistics;

/// Game configuration constants
pub mod consts {
    /// Tick interval never drops below this (ms)
    pub const MIN_TICK_MS: u32 = 50;

    /// Direction changes are accepted at most once per `speed * factor` ms
    pub const DIRECTION_CHANGE_WINDOW: f64 = 0.8;

    /// Active time that makes up one elapsed game second (ms)
    pub const SECOND_MS: f64 = 1000.0;

    /// Maximum move firings per host frame to prevent spiral of death
    pub const MAX_CATCH_UP: u32 = 4;

    /// Head positions kept for analytics
    pub const MOVEMENT_HISTORY_CAP: usize = 1000;

    /// Multipliers applied to the tick interval by speed power-ups
    pub const SPEED_UP_MODIFIER: f32 = 0.5;
    pub const SLOW_DOWN_MODIFIER: f32 = 1.5;
    pub const NEUTRAL_MODIFIER: f32 = 1.0;
}
