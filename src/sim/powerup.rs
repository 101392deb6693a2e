//! Power-up catalog, spawn rule and effect slots
//!
//! At most one power-up sits on the board. Picking it up either fills one of
//! three independent timed slots (double points, invincibility, speed
//! modifier) or shrinks the snake on the spot. Each slot keeps its own expiry
//! in game seconds; activating a kind overwrites its slot, it never stacks.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Position, random_free_position};
use crate::consts::{NEUTRAL_MODIFIER, SLOW_DOWN_MODIFIER, SPEED_UP_MODIFIER};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpKind {
    Speed,
    Slow,
    DoublePoints,
    Invincibility,
    Shrink,
}

/// Static presentation and timing data for a power-up kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PowerUpConfig {
    /// Effect duration in game seconds (0 = instantaneous)
    pub duration: u32,
    pub color: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Speed,
        PowerUpKind::Slow,
        PowerUpKind::DoublePoints,
        PowerUpKind::Invincibility,
        PowerUpKind::Shrink,
    ];

    pub fn config(self) -> PowerUpConfig {
        match self {
            PowerUpKind::Speed => PowerUpConfig {
                duration: 5,
                color: "bg-yellow-400",
                icon: "⚡",
                description: "Speed boost",
            },
            PowerUpKind::Slow => PowerUpConfig {
                duration: 5,
                color: "bg-blue-400",
                icon: "🐢",
                description: "Slow motion",
            },
            PowerUpKind::DoublePoints => PowerUpConfig {
                duration: 10,
                color: "bg-purple-400",
                icon: "✨",
                description: "Double points",
            },
            PowerUpKind::Invincibility => PowerUpConfig {
                duration: 5,
                color: "bg-green-400",
                icon: "🛡️",
                description: "Invincibility",
            },
            PowerUpKind::Shrink => PowerUpConfig {
                duration: 0,
                color: "bg-red-400",
                icon: "✂️",
                description: "Shrink",
            },
        }
    }

    /// Whether the effect occupies a timed slot
    pub fn is_timed(self) -> bool {
        self != PowerUpKind::Shrink
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Speed => "SPEED",
            PowerUpKind::Slow => "SLOW",
            PowerUpKind::DoublePoints => "DOUBLE_POINTS",
            PowerUpKind::Invincibility => "INVINCIBILITY",
            PowerUpKind::Shrink => "SHRINK",
        }
    }
}

/// A power-up waiting on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUp {
    pub position: Position,
    #[serde(rename = "type")]
    pub kind: PowerUpKind,
    /// Effect duration in seconds, copied from the catalog
    pub duration: u32,
    /// Game second at which an effect started at spawn time would lapse.
    /// Informational only: the board power-up itself never times out.
    pub expires_at: u32,
}

/// Named timed slot, reported when it lapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimedEffect {
    DoublePoints,
    Invincibility,
    SpeedModifier,
}

/// Active power-up effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePowerUps {
    pub double_points: bool,
    pub invincibility: bool,
    /// 1 = normal, < 1 = faster, > 1 = slower
    pub speed_modifier: f32,
    pub double_points_until: Option<u32>,
    pub invincibility_until: Option<u32>,
    pub speed_modifier_until: Option<u32>,
}

impl Default for ActivePowerUps {
    fn default() -> Self {
        Self {
            double_points: false,
            invincibility: false,
            speed_modifier: NEUTRAL_MODIFIER,
            double_points_until: None,
            invincibility_until: None,
            speed_modifier_until: None,
        }
    }
}

impl ActivePowerUps {
    /// Points awarded for one apple
    pub fn apple_points(&self) -> u32 {
        if self.double_points { 2 } else { 1 }
    }

    /// Fill the slot for a timed kind, expiring `duration` seconds after
    /// `game_time`. Shrink has no slot and leaves the effects untouched.
    pub fn activate(&mut self, kind: PowerUpKind, game_time: u32) {
        let until = Some(game_time + kind.config().duration);
        match kind {
            PowerUpKind::DoublePoints => {
                self.double_points = true;
                self.double_points_until = until;
            }
            PowerUpKind::Invincibility => {
                self.invincibility = true;
                self.invincibility_until = until;
            }
            PowerUpKind::Speed => {
                self.speed_modifier = SPEED_UP_MODIFIER;
                self.speed_modifier_until = until;
            }
            PowerUpKind::Slow => {
                self.speed_modifier = SLOW_DOWN_MODIFIER;
                self.speed_modifier_until = until;
            }
            PowerUpKind::Shrink => {}
        }
    }

    /// Clear every slot whose expiry has been reached, returning the cleared
    /// slots in a stable order.
    pub fn expire(&mut self, game_time: u32) -> Vec<TimedEffect> {
        let mut expired = Vec::new();

        if self.double_points_until.is_some_and(|t| game_time >= t) {
            self.double_points = false;
            self.double_points_until = None;
            expired.push(TimedEffect::DoublePoints);
        }
        if self.invincibility_until.is_some_and(|t| game_time >= t) {
            self.invincibility = false;
            self.invincibility_until = None;
            expired.push(TimedEffect::Invincibility);
        }
        if self.speed_modifier_until.is_some_and(|t| game_time >= t) {
            self.speed_modifier = NEUTRAL_MODIFIER;
            self.speed_modifier_until = None;
            expired.push(TimedEffect::SpeedModifier);
        }

        expired
    }

    pub fn any_active(&self) -> bool {
        self.double_points || self.invincibility || self.speed_modifier != NEUTRAL_MODIFIER
    }
}

/// Spawn rule, evaluated after each apple: the score is a positive multiple of
/// the difficulty's frequency and the board is empty.
pub fn should_spawn(score: u32, frequency: u32, board_occupied: bool) -> bool {
    score > 0 && frequency > 0 && score % frequency == 0 && !board_occupied
}

/// Pick a random kind and a free cell (not on the snake, not on the apple).
/// Returns `None` when no free cell exists, skipping this spawn.
pub fn spawn<R: Rng>(
    rng: &mut R,
    snake: &[Position],
    apple: Position,
    game_time: u32,
    grid_size: u32,
) -> Option<PowerUp> {
    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    let position = random_free_position(rng, grid_size, |p| p == apple || snake.contains(&p))?;
    let duration = kind.config().duration;

    Some(PowerUp {
        position,
        kind,
        duration,
        expires_at: game_time + duration,
    })
}

/// Length after a shrink pickup: half, rounded down, never below one
pub fn shrunk_len(len: usize) -> usize {
    (len / 2).max(1)
}
