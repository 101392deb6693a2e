//! Game state and core simulation types
//!
//! `GameState` is the snapshot handed to renderers and trackers. The simulation
//! never edits it in place: every transition builds the next snapshot and the
//! owner swaps it in whole.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::DeathCause;
use super::grid::{Direction, Position, random_free_position};
use super::powerup::{ActivePowerUps, PowerUp, PowerUpKind, TimedEffect};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Per-level constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyConfig {
    /// Starting tick interval (ms)
    pub initial_speed: u32,
    /// Interval reduction at each threshold (ms)
    pub speed_increment: u32,
    /// Speed increases whenever the score is a multiple of this
    pub speed_threshold: u32,
    /// Board is `grid_size` x `grid_size` cells
    pub grid_size: u32,
    /// A power-up spawns whenever the score is a multiple of this
    pub power_up_frequency: u32,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    pub fn config(self) -> DifficultyConfig {
        match self {
            DifficultyLevel::Easy => DifficultyConfig {
                initial_speed: 180,
                speed_increment: 5,
                speed_threshold: 7,
                grid_size: 15,
                power_up_frequency: 5,
            },
            DifficultyLevel::Medium => DifficultyConfig {
                initial_speed: 150,
                speed_increment: 10,
                speed_threshold: 5,
                grid_size: 20,
                power_up_frequency: 7,
            },
            DifficultyLevel::Hard => DifficultyConfig {
                initial_speed: 120,
                speed_increment: 15,
                speed_threshold: 3,
                grid_size: 25,
                power_up_frequency: 10,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "EASY",
            DifficultyLevel::Medium => "MEDIUM",
            DifficultyLevel::Hard => "HARD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyLevel::Easy),
            "medium" | "med" => Some(DifficultyLevel::Medium),
            "hard" => Some(DifficultyLevel::Hard),
            _ => None,
        }
    }
}

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Running,
    Paused,
    /// Run ended; only reset or a difficulty change leaves this phase
    GameOver,
}

/// Notifications for sound, narration and tracking collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    DirectionChanged { direction: Direction },
    /// Head entered a new cell
    Moved { head: Position },
    AteApple { score: u32 },
    PowerUpSpawned { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind },
    PowerUpExpired { effect: TimedEffect },
    /// Effective move interval changed (ms)
    SpeedChanged { interval_ms: u32 },
    GameOver { cause: DeathCause },
    Paused,
    Resumed,
}

/// Complete game state (serializable snapshot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Body segments, head first
    pub snake: Vec<Position>,
    pub apple: Position,
    pub power_up: Option<PowerUp>,
    pub active_power_ups: ActivePowerUps,
    pub direction: Direction,
    pub score: u32,
    /// Active (unpaused, foreground) seconds played
    pub game_time: u32,
    pub phase: GamePhase,
    /// Base tick interval in ms, before the speed modifier
    pub speed: u32,
    pub difficulty: DifficultyLevel,
    /// Set once the run ends
    pub death_cause: Option<DeathCause>,
}

impl GameState {
    /// Fresh run: one-segment snake in the centre heading right, apple on a
    /// random free cell.
    pub fn new<R: Rng>(difficulty: DifficultyLevel, seed: u64, rng: &mut R) -> Self {
        let config = difficulty.config();
        let center = (config.grid_size / 2) as i32;
        let snake = vec![Position::new(center, center)];
        let apple = place_apple(rng, &snake, None, config.grid_size).unwrap_or_default();

        Self {
            seed,
            snake,
            apple,
            power_up: None,
            active_power_ups: ActivePowerUps::default(),
            direction: Direction::Right,
            score: 0,
            game_time: 0,
            phase: GamePhase::Running,
            speed: config.initial_speed,
            difficulty,
            death_cause: None,
        }
    }

    pub fn config(&self) -> DifficultyConfig {
        self.difficulty.config()
    }

    pub fn grid_size(&self) -> u32 {
        self.config().grid_size
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Effective move interval: base speed scaled by the active modifier
    pub fn move_interval_ms(&self) -> u32 {
        (self.speed as f32 * self.active_power_ups.speed_modifier).round() as u32
    }
}

/// Random free cell for the apple, avoiding the snake and the board power-up
pub fn place_apple<R: Rng>(
    rng: &mut R,
    snake: &[Position],
    power_up: Option<&PowerUp>,
    grid_size: u32,
) -> Option<Position> {
    random_free_position(rng, grid_size, |p| {
        snake.contains(&p) || power_up.is_some_and(|pu| pu.position == p)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_initial_state() {
        let mut rng = Pcg32::seed_from_u64(1);
        for level in DifficultyLevel::ALL {
            let state = GameState::new(level, 1, &mut rng);
            let config = level.config();
            let center = (config.grid_size / 2) as i32;
            assert_eq!(state.snake, vec![Position::new(center, center)]);
            assert_ne!(state.apple, state.head());
            assert_eq!(state.speed, config.initial_speed);
            assert_eq!(state.score, 0);
            assert_eq!(state.game_time, 0);
            assert_eq!(state.direction, Direction::Right);
            assert!(state.is_running());
            assert!(state.power_up.is_none());
        }
    }

    #[test]
    fn test_difficulty_table() {
        let hard = DifficultyLevel::Hard.config();
        assert_eq!(hard.speed_increment, 15);
        assert_eq!(hard.grid_size, 25);
        assert_eq!(DifficultyLevel::Medium.config().power_up_frequency, 7);
        assert_eq!(DifficultyLevel::Easy.config().initial_speed, 180);
        assert_eq!(DifficultyLevel::from_str("HARD"), Some(DifficultyLevel::Hard));
        assert_eq!(DifficultyLevel::from_str("extreme"), None);
    }

    #[test]
    fn test_move_interval_applies_modifier() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = GameState::new(DifficultyLevel::Medium, 1, &mut rng);
        assert_eq!(state.move_interval_ms(), 150);
        state.active_power_ups.activate(PowerUpKind::Speed, 0);
        assert_eq!(state.move_interval_ms(), 75);
        state.active_power_ups.activate(PowerUpKind::Slow, 0);
        assert_eq!(state.move_interval_ms(), 225);
    }

    #[test]
    fn test_place_apple_avoids_power_up() {
        let mut rng = Pcg32::seed_from_u64(5);
        let snake = vec![Position::new(0, 0)];
        let power_up = PowerUp {
            position: Position::new(1, 0),
            kind: PowerUpKind::Slow,
            duration: 5,
            expires_at: 5,
        };
        for _ in 0..50 {
            let apple = place_apple(&mut rng, &snake, Some(&power_up), 2).unwrap();
            assert!(apple != Position::new(0, 0) && apple != Position::new(1, 0));
        }
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut rng = Pcg32::seed_from_u64(1);
        let state = GameState::new(DifficultyLevel::Easy, 9, &mut rng);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["difficulty"], "EASY");
        assert_eq!(json["gameTime"], 0);
        assert_eq!(json["activePowerUps"]["speedModifier"], 1.0);
        assert!(json["powerUp"].is_null());
    }
}
