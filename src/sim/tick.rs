//! Movement and growth engine
//!
//! `step` advances the snake one cell, `elapse_second` advances game time and
//! lapses timed effects. Both take the current snapshot by reference and
//! return the next one together with the events it produced.

use rand::Rng;

use super::collision::{Collision, resolve};
use super::grid::Direction;
use super::powerup::{self, PowerUpKind, TimedEffect};
use super::state::{GameEvent, GamePhase, GameState, place_apple};
use crate::consts::MIN_TICK_MS;

/// Next snapshot plus what happened on the way there
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

impl StepOutcome {
    fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }
}

/// Advance the snake by one tick
pub fn step<R: Rng>(state: &GameState, rng: &mut R) -> StepOutcome {
    if state.phase != GamePhase::Running {
        return StepOutcome::unchanged(state);
    }

    let config = state.config();
    let head = state.head().translated(state.direction);

    let collision = resolve(
        head,
        &state.snake,
        config.grid_size,
        state.active_power_ups.invincibility,
    );
    if let Some(cause) = collision.death_cause() {
        let mut next = state.clone();
        next.phase = GamePhase::GameOver;
        next.death_cause = Some(cause);
        log::info!(
            "Game over ({}) score {} after {}s",
            cause.as_str(),
            state.score,
            state.game_time
        );
        return StepOutcome {
            state: next,
            events: vec![GameEvent::GameOver { cause }],
        };
    }
    debug_assert_eq!(collision, Collision::None);

    let mut next = state.clone();
    let mut events = vec![GameEvent::Moved { head }];
    let prev_len = state.snake.len();

    let mut snake = Vec::with_capacity(prev_len + 1);
    snake.push(head);
    snake.extend_from_slice(&state.snake);

    if head == state.apple {
        let score = state.score + state.active_power_ups.apple_points();
        next.score = score;
        events.push(GameEvent::AteApple { score });

        if score % config.speed_threshold == 0 {
            next.speed = state
                .speed
                .saturating_sub(config.speed_increment)
                .max(MIN_TICK_MS);
            if next.speed != state.speed {
                events.push(GameEvent::SpeedChanged {
                    interval_ms: next.move_interval_ms(),
                });
            }
        }

        match place_apple(rng, &snake, state.power_up.as_ref(), config.grid_size) {
            Some(apple) => next.apple = apple,
            None => log::warn!("Board full, apple stays at {:?}", state.apple),
        }

        if powerup::should_spawn(score, config.power_up_frequency, state.power_up.is_some()) {
            next.power_up = powerup::spawn(rng, &snake, next.apple, state.game_time, config.grid_size);
            match next.power_up {
                Some(spawned) => {
                    log::debug!("Spawned {} at {:?}", spawned.kind.as_str(), spawned.position);
                    events.push(GameEvent::PowerUpSpawned { kind: spawned.kind });
                }
                None => log::debug!("No free cell for a power-up, skipping spawn"),
            }
        }
    } else if let Some(picked) = state.power_up.filter(|pu| pu.position == head) {
        // Pickups do not feed the snake
        snake.truncate(prev_len);
        if picked.kind == PowerUpKind::Shrink {
            snake.truncate(powerup::shrunk_len(prev_len));
        }

        let interval_before = state.move_interval_ms();
        next.active_power_ups.activate(picked.kind, state.game_time);
        next.power_up = None;
        log::debug!("Collected {}", picked.kind.as_str());
        events.push(GameEvent::PowerUpCollected { kind: picked.kind });

        let interval_after = next.move_interval_ms();
        if interval_after != interval_before {
            events.push(GameEvent::SpeedChanged {
                interval_ms: interval_after,
            });
        }
    } else {
        snake.pop();
    }

    next.snake = snake;
    StepOutcome {
        state: next,
        events,
    }
}

/// Advance game time by one second and clear lapsed effect slots
pub fn elapse_second(state: &GameState) -> StepOutcome {
    if state.phase != GamePhase::Running {
        return StepOutcome::unchanged(state);
    }

    let mut next = state.clone();
    next.game_time += 1;

    let expired = next.active_power_ups.expire(next.game_time);
    let mut events: Vec<GameEvent> = expired
        .iter()
        .map(|&effect| GameEvent::PowerUpExpired { effect })
        .collect();

    if expired.contains(&TimedEffect::SpeedModifier) {
        events.push(GameEvent::SpeedChanged {
            interval_ms: next.move_interval_ms(),
        });
    }
    for effect in &expired {
        log::debug!("Effect {:?} expired at {}s", effect, next.game_time);
    }

    StepOutcome {
        state: next,
        events,
    }
}

/// Demo/autoplay steering: head for the apple, never into a cell that would
/// end the run when another option exists.
pub fn autopilot(state: &GameState) -> Direction {
    let grid = state.grid_size();
    let target = state.power_up.map(|pu| pu.position).filter(|_| {
        // Only detour for a power-up while nothing is active
        !state.active_power_ups.any_active()
    });
    let target = target.unwrap_or(state.apple);
    let head = state.head();

    let distance = |d: Direction| {
        let p = head.translated(d);
        (p.x - target.x).abs() + (p.y - target.y).abs()
    };
    let safe = |d: Direction| {
        resolve(head.translated(d), &state.snake, grid, false) == Collision::None
    };

    Direction::ALL
        .into_iter()
        .filter(|&d| !d.is_opposite(state.direction))
        .filter(|&d| safe(d))
        .min_by_key(|&d| (distance(d), d != state.direction))
        .unwrap_or(state.direction)
}
