//! Game state machine
//!
//! Owns the current snapshot, the seeded RNG and the simulation clock. Hosts
//! call [`Game::frame`] once per animation frame with a monotonic timestamp
//! and forward player input through [`Game::handle`] or the individual
//! operations. Every accepted transition replaces the snapshot whole.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::DIRECTION_CHANGE_WINDOW;
use crate::controls::Command;
use crate::sim::{
    DifficultyLevel, Direction, GameEvent, GamePhase, GameState, PowerUpConfig, SimulationClock,
    StepOutcome, tick,
};
use crate::stats::GameOverReport;

pub struct Game {
    state: GameState,
    rng: Pcg32,
    clock: SimulationClock,
    /// Instant of the last accepted turn, for rate limiting
    last_direction_change_ms: Option<f64>,
    /// Heading of the last executed move; turns may not fold back onto it
    moved_direction: Direction,
}

impl Game {
    /// Start a running game at `now_ms`
    pub fn new(difficulty: DifficultyLevel, seed: u64, now_ms: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = GameState::new(difficulty, seed, &mut rng);
        let mut clock = SimulationClock::new(state.move_interval_ms());
        clock.start(now_ms, state.move_interval_ms());

        log::info!(
            "Started {} game on a {}x{} grid (seed {})",
            difficulty.as_str(),
            state.grid_size(),
            state.grid_size(),
            seed
        );

        Self {
            moved_direction: state.direction,
            state,
            rng,
            clock,
            last_direction_change_ms: None,
        }
    }

    /// Read-only view for renderers and collaborators
    pub fn snapshot(&self) -> &GameState {
        &self.state
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn grid_size(&self) -> u32 {
        self.state.grid_size()
    }

    /// Catalog entry for the power-up currently on the board
    pub fn board_power_up_config(&self) -> Option<PowerUpConfig> {
        self.state.power_up.map(|pu| pu.kind.config())
    }

    /// Total paused or hidden time since the run started (ms)
    pub fn suspended_ms(&self) -> f64 {
        self.clock.suspended_ms()
    }

    /// Host frame: apply every game second and move tick due by `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();

        for _ in 0..self.clock.advance(now_ms) {
            events.extend(self.elapse_second(now_ms));
        }
        while self.clock.poll_move(now_ms) {
            events.extend(self.step(now_ms));
        }

        events
    }

    /// Apply one move tick immediately
    pub fn step(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let outcome = tick::step(&self.state, &mut self.rng);
        if self.state.is_running() {
            self.moved_direction = self.state.direction;
        }
        self.commit(outcome, now_ms)
    }

    /// Apply one elapsed game second immediately
    pub fn elapse_second(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let outcome = tick::elapse_second(&self.state);
        self.commit(outcome, now_ms)
    }

    /// Request a turn. Ignored unless running; turns opposite to the current
    /// heading or to the last executed move are always rejected, and at most
    /// one turn is accepted per `0.8 * speed` ms.
    pub fn change_direction(&mut self, direction: Direction, now_ms: f64) -> Option<GameEvent> {
        if !self.state.is_running() {
            return None;
        }
        if direction == self.state.direction
            || direction.is_opposite(self.state.direction)
            || direction.is_opposite(self.moved_direction)
        {
            return None;
        }

        let window_ms = self.state.speed as f64 * DIRECTION_CHANGE_WINDOW;
        if self
            .last_direction_change_ms
            .is_some_and(|last| now_ms - last < window_ms)
        {
            log::trace!("Dropped turn to {} inside rate window", direction.as_str());
            return None;
        }

        let mut next = self.state.clone();
        next.direction = direction;
        self.state = next;
        self.last_direction_change_ms = Some(now_ms);
        Some(GameEvent::DirectionChanged { direction })
    }

    /// Running <-> Paused. Ignored once the game is over.
    pub fn toggle_pause(&mut self, now_ms: f64) -> Option<GameEvent> {
        let (phase, event) = match self.state.phase {
            GamePhase::Running => (GamePhase::Paused, GameEvent::Paused),
            GamePhase::Paused => (GamePhase::Running, GameEvent::Resumed),
            GamePhase::GameOver => return None,
        };

        let mut next = self.state.clone();
        next.phase = phase;
        self.state = next;
        self.clock.set_paused(phase == GamePhase::Paused, now_ms);
        log::debug!("{:?} at {}s", phase, self.state.game_time);
        Some(event)
    }

    /// Host page visibility. Hidden time is not played and not counted.
    pub fn set_visible(&mut self, visible: bool, now_ms: f64) {
        self.clock.set_visible(visible, now_ms);
    }

    /// Fresh run on the current difficulty
    pub fn reset(&mut self, now_ms: f64) {
        self.restart(self.state.difficulty, now_ms);
        log::info!("Game reset");
    }

    /// Fresh run with a new difficulty table
    pub fn change_difficulty(&mut self, difficulty: DifficultyLevel, now_ms: f64) {
        self.restart(difficulty, now_ms);
        log::info!(
            "Difficulty changed to {} ({}x{} grid)",
            difficulty.as_str(),
            self.grid_size(),
            self.grid_size()
        );
    }

    /// Apply a player command under the rules of the current phase
    pub fn handle(&mut self, command: Command, now_ms: f64) -> Vec<GameEvent> {
        match command {
            Command::Restart => {
                self.reset(now_ms);
                Vec::new()
            }
            _ if self.state.is_game_over() => Vec::new(),
            Command::TogglePause => self.toggle_pause(now_ms).into_iter().collect(),
            Command::Turn(direction) => self.change_direction(direction, now_ms).into_iter().collect(),
        }
    }

    /// Final result for statistics, once the run has ended
    pub fn game_over_report(&self) -> Option<GameOverReport> {
        let cause = self.state.death_cause?;
        Some(GameOverReport {
            score: self.state.score,
            game_time: self.state.game_time,
            death_cause: cause,
        })
    }

    fn restart(&mut self, difficulty: DifficultyLevel, now_ms: f64) {
        let seed: u64 = self.rng.random();
        self.rng = Pcg32::seed_from_u64(seed);
        self.state = GameState::new(difficulty, seed, &mut self.rng);
        self.last_direction_change_ms = None;
        self.moved_direction = self.state.direction;
        self.clock.start(now_ms, self.state.move_interval_ms());
    }

    fn commit(&mut self, outcome: StepOutcome, now_ms: f64) -> Vec<GameEvent> {
        self.state = outcome.state;
        if self.state.is_game_over() {
            self.clock.stop();
        } else {
            self.clock.set_move_interval(self.state.move_interval_ms(), now_ms);
        }
        outcome.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DeathCause, Position, PowerUp, PowerUpKind};

    fn medium() -> Game {
        Game::new(DifficultyLevel::Medium, 7, 0.0)
    }

    #[test]
    fn test_opposite_turn_rejected() {
        let mut game = medium();
        assert_eq!(game.change_direction(Direction::Left, 0.0), None);
        assert_eq!(game.snapshot().direction, Direction::Right);
    }

    #[test]
    fn test_turns_are_rate_limited() {
        // Medium: 150ms base speed, 120ms window
        let mut game = medium();
        assert_eq!(
            game.change_direction(Direction::Up, 0.0),
            Some(GameEvent::DirectionChanged { direction: Direction::Up })
        );
        assert_eq!(game.change_direction(Direction::Left, 50.0), None);
        assert_eq!(game.snapshot().direction, Direction::Up);

        game.frame(150.0);
        assert!(game.change_direction(Direction::Left, 150.0).is_some());
    }

    #[test]
    fn test_turns_cannot_fold_back_before_moving() {
        // Slow: 225ms moves, 120ms turn window
        let mut game = medium();
        game.state.active_power_ups.activate(PowerUpKind::Slow, 0);
        game.clock.set_move_interval(game.state.move_interval_ms(), 0.0);
        let start = game.snapshot().head();

        assert!(game.change_direction(Direction::Up, 0.0).is_some());
        // Still travelling right on the board
        assert_eq!(game.change_direction(Direction::Left, 130.0), None);
        assert_eq!(game.snapshot().direction, Direction::Up);

        game.frame(225.0);
        assert_eq!(game.snapshot().head(), Position::new(start.x, start.y - 1));
        assert!(game.change_direction(Direction::Left, 225.0).is_some());
        assert!(game.snapshot().is_running());
    }

    #[test]
    fn test_frame_moves_on_interval() {
        let mut game = medium();
        let start = game.snapshot().head();
        game.frame(100.0);
        assert_eq!(game.snapshot().head(), start);
        game.frame(150.0);
        assert_eq!(game.snapshot().head(), Position::new(start.x + 1, start.y));
    }

    #[test]
    fn test_frame_counts_seconds() {
        let mut game = medium();
        let mut t = 0.0;
        while t < 1_000.0 {
            t += 100.0;
            game.frame(t);
        }
        assert_eq!(game.snapshot().game_time, 1);
    }

    #[test]
    fn test_paused_game_does_not_advance() {
        let mut game = medium();
        assert_eq!(game.toggle_pause(10.0), Some(GameEvent::Paused));
        let frozen = game.snapshot().clone();
        assert!(game.frame(5_000.0).is_empty());
        assert_eq!(game.snapshot(), &frozen);
        assert!(game.handle(Command::Turn(Direction::Up), 5_000.0).is_empty());
        assert_eq!(game.toggle_pause(6_000.0), Some(GameEvent::Resumed));
        assert!((game.suspended_ms() - 5_990.0).abs() < 1e-9);
    }

    #[test]
    fn test_game_over_freezes_until_restart() {
        let mut game = medium();
        game.state.snake = vec![Position::new(19, 3)];
        game.state.apple = Position::new(0, 0);

        let events = game.frame(150.0);
        assert_eq!(events, vec![GameEvent::GameOver { cause: DeathCause::Wall }]);
        assert!(game.clock().is_stopped());

        let over = game.snapshot().clone();
        assert!(game.frame(10_000.0).is_empty());
        assert!(game.handle(Command::TogglePause, 10_000.0).is_empty());
        assert!(game.handle(Command::Turn(Direction::Up), 10_000.0).is_empty());
        assert_eq!(game.snapshot(), &over);

        let report = game.game_over_report().unwrap();
        assert_eq!(report.death_cause, DeathCause::Wall);
        assert_eq!(report.score, 0);

        game.handle(Command::Restart, 10_000.0);
        assert!(game.snapshot().is_running());
        assert!(game.game_over_report().is_none());
    }

    #[test]
    fn test_change_difficulty_resets() {
        let mut game = medium();
        game.state.score = 12;
        game.state.game_time = 40;
        game.reset(0.0);
        game.change_difficulty(DifficultyLevel::Hard, 0.0);

        let state = game.snapshot();
        assert_eq!(state.difficulty, DifficultyLevel::Hard);
        assert_eq!(game.grid_size(), 25);
        assert_eq!(state.speed, 120);
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.game_time, 0);
        assert_eq!(game.clock().move_interval_ms(), 120);
    }

    #[test]
    fn test_speed_pickup_rearms_clock() {
        let mut game = medium();
        let head = game.snapshot().head();
        game.state.apple = Position::new(0, 0);
        game.state.power_up = Some(PowerUp {
            position: Position::new(head.x + 1, head.y),
            kind: PowerUpKind::Speed,
            duration: 5,
            expires_at: 5,
        });
        assert_eq!(game.board_power_up_config().map(|c| c.duration), Some(5));

        let events = game.frame(150.0);
        assert!(events.contains(&GameEvent::PowerUpCollected { kind: PowerUpKind::Speed }));
        assert_eq!(game.clock().move_interval_ms(), 75);
        assert!(game.board_power_up_config().is_none());

        // Next move 75ms after the pickup
        game.frame(224.0);
        assert_eq!(game.snapshot().head().x, head.x + 1);
        game.frame(225.0);
        assert_eq!(game.snapshot().head().x, head.x + 2);
    }

    #[test]
    fn test_hidden_page_freezes_play() {
        let mut game = medium();
        game.set_visible(false, 0.0);
        assert!(game.frame(3_000.0).is_empty());
        assert_eq!(game.snapshot().game_time, 0);
        assert!(game.snapshot().is_running());
        game.set_visible(true, 3_000.0);
        game.frame(3_150.0);
        assert_ne!(game.snapshot().head(), Position::new(10, 10));
    }
}
