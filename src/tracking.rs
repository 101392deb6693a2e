//! Per-run tracking for analytics
//!
//! Watches snapshots and events as the host applies them, and reports the run
//! once it ends. Service failures are kept as a message for the UI; the game
//! itself never sees them.

use std::collections::VecDeque;

use crate::analytics::{AiInsights, AnalyticsService, Recommendations, SessionRecord};
use crate::consts::MOVEMENT_HISTORY_CAP;
use crate::sim::{GameEvent, GameState, Position};

pub struct GameTracker<A: AnalyticsService> {
    service: A,
    movement_history: VecDeque<Position>,
    power_ups_collected: u32,
    /// Seed of the run being tracked
    run_seed: Option<u64>,
    /// Current run has ended and was handled
    finished: bool,
    session_id: Option<String>,
    insights: Option<AiInsights>,
    error: Option<String>,
}

impl<A: AnalyticsService> GameTracker<A> {
    pub fn new(service: A) -> Self {
        Self {
            service,
            movement_history: VecDeque::new(),
            power_ups_collected: 0,
            run_seed: None,
            finished: false,
            session_id: None,
            insights: None,
            error: None,
        }
    }

    pub fn service(&self) -> &A {
        &self.service
    }

    pub fn movement_history(&self) -> impl Iterator<Item = &Position> {
        self.movement_history.iter()
    }

    pub fn power_ups_collected(&self) -> u32 {
        self.power_ups_collected
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn insights(&self) -> Option<&AiInsights> {
        self.insights.as_ref()
    }

    /// Last service failure, for display
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Forget the previous run
    pub fn reset(&mut self) {
        self.movement_history.clear();
        self.power_ups_collected = 0;
        self.run_seed = None;
        self.finished = false;
        self.session_id = None;
        self.insights = None;
        self.error = None;
    }

    /// Feed the snapshot after a host frame together with the events it
    /// produced. `timestamp_ms` is wall-clock Unix time for the report.
    ///
    /// A snapshot from another run (new seed after a restart or difficulty
    /// change, or a running game after a finished one) starts a fresh record.
    pub fn observe(&mut self, state: &GameState, events: &[GameEvent], timestamp_ms: f64) {
        let new_run = self.run_seed.is_some_and(|seed| seed != state.seed);
        if new_run || (self.finished && state.is_running()) {
            self.reset();
        }
        self.run_seed = Some(state.seed);

        // Starting cell of a run that has not moved yet
        let moved = events.iter().any(|e| matches!(e, GameEvent::Moved { .. }));
        if self.movement_history.is_empty() && state.is_running() && !moved {
            self.push_head(state.head());
        }
        for event in events {
            match event {
                GameEvent::Moved { head } => self.push_head(*head),
                GameEvent::PowerUpCollected { .. } => self.power_ups_collected += 1,
                _ => {}
            }
        }

        if state.is_game_over() && !self.finished {
            self.finished = true;
            if state.score > 0 {
                let record = self.record(state, timestamp_ms);
                self.report(&record);
            }
        }
    }

    /// Ask the service for advice based on past runs
    pub fn recommendations(&mut self) -> Option<Recommendations> {
        match self.service.fetch_recommendations() {
            Ok(recommendations) => Some(recommendations),
            Err(e) => {
                log::warn!("Could not fetch recommendations: {}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }

    fn push_head(&mut self, head: Position) {
        self.movement_history.push_back(head);
        if self.movement_history.len() > MOVEMENT_HISTORY_CAP {
            self.movement_history.pop_front();
        }
    }

    fn record(&self, state: &GameState, timestamp_ms: f64) -> SessionRecord {
        SessionRecord {
            id: None,
            user_id: None,
            timestamp: timestamp_ms,
            score: state.score,
            game_time: state.game_time,
            difficulty: state.difficulty,
            snake_length: state.snake.len(),
            movement_pattern: self.movement_history.iter().copied().collect(),
            collision_type: state.death_cause,
            power_ups_collected: self.power_ups_collected,
            board_size: state.grid_size(),
        }
    }

    /// Submit the finished run, then fetch insights for it
    fn report(&mut self, record: &SessionRecord) {
        let receipt = match self.service.submit_session(record) {
            Ok(receipt) => receipt,
            Err(e) => {
                log::warn!("Could not submit session: {}", e);
                self.error = Some(e.to_string());
                return;
            }
        };
        self.session_id = Some(receipt.session_id.clone());

        match self.service.fetch_insights(&receipt.session_id) {
            Ok(insights) => self.insights = Some(insights),
            Err(e) => {
                log::warn!("Could not fetch insights for {}: {}", receipt.session_id, e);
                self.error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{AnalyticsError, OfflineAnalytics, SessionReceipt};
    use crate::game::Game;
    use crate::sim::{DeathCause, DifficultyLevel, GamePhase, PowerUpKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct FailingService;

    impl AnalyticsService for FailingService {
        fn submit_session(&mut self, _: &SessionRecord) -> Result<SessionReceipt, AnalyticsError> {
            Err(AnalyticsError::Status {
                status: 503,
                message: "maintenance".into(),
            })
        }

        fn fetch_insights(&self, id: &str) -> Result<AiInsights, AnalyticsError> {
            Err(AnalyticsError::UnknownSession(id.into()))
        }

        fn fetch_recommendations(&self) -> Result<Recommendations, AnalyticsError> {
            Err(AnalyticsError::NoHistory)
        }
    }

    fn state() -> GameState {
        let mut rng = Pcg32::seed_from_u64(3);
        GameState::new(DifficultyLevel::Easy, 3, &mut rng)
    }

    fn end(state: &mut GameState, score: u32) {
        state.score = score;
        state.phase = GamePhase::GameOver;
        state.death_cause = Some(DeathCause::Collision);
    }

    fn moved(i: i32) -> GameEvent {
        GameEvent::Moved {
            head: Position::new(i % 15, i / 15),
        }
    }

    #[test]
    fn test_history_is_capped() {
        let mut tracker = GameTracker::new(OfflineAnalytics::new());
        let s = state();
        tracker.observe(&s, &[], 0.0);
        for i in 0..(MOVEMENT_HISTORY_CAP as i32 + 20) {
            tracker.observe(&s, &[moved(i)], 0.0);
        }
        assert_eq!(tracker.movement_history().count(), MOVEMENT_HISTORY_CAP);
        assert_eq!(tracker.movement_history().next(), Some(&Position::new(20 % 15, 20 / 15)));
    }

    #[test]
    fn test_every_move_in_a_frame_is_recorded() {
        let mut tracker = GameTracker::new(OfflineAnalytics::new());
        let s = state();
        tracker.observe(&s, &[], 0.0);
        let catch_up = [moved(1), GameEvent::AteApple { score: 1 }, moved(2), moved(3)];
        tracker.observe(&s, &catch_up, 0.0);

        let heads: Vec<Position> = tracker.movement_history().copied().collect();
        assert_eq!(heads, vec![s.head(), Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]);
    }

    #[test]
    fn test_restart_mid_run_starts_fresh() {
        let mut game = Game::new(DifficultyLevel::Medium, 4, 0.0);
        let mut tracker = GameTracker::new(OfflineAnalytics::new());
        let mut now = 0.0;
        for _ in 0..5 {
            now += 150.0;
            let events = game.frame(now);
            tracker.observe(game.snapshot(), &events, 0.0);
        }
        tracker.observe(
            game.snapshot(),
            &[GameEvent::PowerUpCollected { kind: PowerUpKind::Speed }],
            0.0,
        );
        assert_eq!(tracker.movement_history().count(), 5);
        assert_eq!(tracker.power_ups_collected(), 1);

        game.reset(now);
        tracker.observe(game.snapshot(), &[], 0.0);
        assert_eq!(tracker.power_ups_collected(), 0);
        assert_eq!(tracker.movement_history().count(), 1);
        assert_eq!(tracker.movement_history().next(), Some(&game.snapshot().head()));

        game.change_difficulty(DifficultyLevel::Hard, now);
        tracker.observe(
            game.snapshot(),
            &[GameEvent::PowerUpCollected { kind: PowerUpKind::Slow }],
            0.0,
        );
        game.change_difficulty(DifficultyLevel::Easy, now);
        tracker.observe(game.snapshot(), &[], 0.0);
        assert_eq!(tracker.power_ups_collected(), 0);
        assert_eq!(tracker.movement_history().count(), 1);
    }

    #[test]
    fn test_counts_collected_power_ups() {
        let mut tracker = GameTracker::new(OfflineAnalytics::new());
        let s = state();
        let events = [
            GameEvent::PowerUpSpawned { kind: PowerUpKind::Slow },
            GameEvent::PowerUpCollected { kind: PowerUpKind::Slow },
        ];
        tracker.observe(&s, &events, 0.0);
        tracker.observe(&s, &[GameEvent::AteApple { score: 1 }], 0.0);
        assert_eq!(tracker.power_ups_collected(), 1);
    }

    #[test]
    fn test_submits_once_on_game_over() {
        let mut tracker = GameTracker::new(OfflineAnalytics::new());
        let mut s = state();
        tracker.observe(&s, &[], 0.0);
        end(&mut s, 6);
        tracker.observe(&s, &[], 42.0);
        tracker.observe(&s, &[], 43.0);

        assert_eq!(tracker.session_id(), Some("session_42"));
        assert_eq!(tracker.service().session_count(), 1);
        assert!(tracker.insights().is_some());
        assert!(tracker.error().is_none());
    }

    #[test]
    fn test_zero_score_is_not_reported() {
        let mut tracker = GameTracker::new(OfflineAnalytics::new());
        let mut s = state();
        end(&mut s, 0);
        tracker.observe(&s, &[], 1.0);
        assert_eq!(tracker.service().session_count(), 0);
        assert!(tracker.session_id().is_none());
    }

    #[test]
    fn test_failures_become_messages() {
        let mut tracker = GameTracker::new(FailingService);
        let mut s = state();
        end(&mut s, 3);
        tracker.observe(&s, &[], 1.0);
        assert_eq!(tracker.error(), Some("Service returned 503: maintenance"));
        assert!(tracker.recommendations().is_none());
        assert_eq!(tracker.error(), Some("No sessions recorded yet"));
    }

    #[test]
    fn test_new_run_starts_fresh() {
        let mut tracker = GameTracker::new(OfflineAnalytics::new());
        let mut s = state();
        tracker.observe(&s, &[GameEvent::PowerUpCollected { kind: PowerUpKind::Shrink }], 0.0);
        end(&mut s, 2);
        tracker.observe(&s, &[], 5.0);
        assert!(tracker.session_id().is_some());

        tracker.observe(&state(), &[], 6.0);
        assert!(tracker.session_id().is_none());
        assert_eq!(tracker.power_ups_collected(), 0);
        assert_eq!(tracker.movement_history().count(), 1);
    }
}
