//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Discrete move ticks and whole game seconds only
//! - Seeded RNG only
//! - Snapshots are replaced, never edited in place
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod grid;
pub mod powerup;
pub mod state;
pub mod tick;

pub use clock::{IntervalScheduler, Scheduler, SimulationClock, TimerHandle};
pub use collision::{Collision, DeathCause};
pub use grid::{Direction, Position};
pub use powerup::{ActivePowerUps, PowerUp, PowerUpConfig, PowerUpKind, TimedEffect};
pub use state::{DifficultyConfig, DifficultyLevel, GameEvent, GamePhase, GameState};
pub use tick::{StepOutcome, autopilot, elapse_second, step};
