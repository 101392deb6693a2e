//! Snake Core entry point
//!
//! Native builds run a headless autoplay session: the built-in autopilot
//! steers, frames are simulated at a fixed cadence, and the finished run goes
//! through the same statistics and analytics path as the browser build.
//! The browser build is driven from JavaScript through `WebGame`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use clap::{Parser, ValueEnum};

    use snake_core::Game;
    use snake_core::analytics::{AnalyticsService, HttpAnalytics, OfflineAnalytics};
    use snake_core::persistence::MemoryStore;
    use snake_core::progression;
    use snake_core::sim::{DifficultyLevel, GameEvent, autopilot};
    use snake_core::stats::record_game_over;
    use snake_core::tracking::GameTracker;

    #[derive(Parser)]
    #[command(name = "snake-core")]
    #[command(version, about = "Headless Snake simulation with an autopilot")]
    struct Cli {
        /// Difficulty tier
        #[arg(long, default_value = "medium")]
        difficulty: Level,

        /// RNG seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many simulated seconds
        #[arg(long, default_value = "120")]
        seconds: u32,

        /// Simulated frame length in ms
        #[arg(long, default_value = "16.0")]
        frame_ms: f64,

        /// Analytics service base URL (offline analytics when omitted)
        #[arg(long)]
        analytics_url: Option<String>,
    }

    #[derive(Clone, Copy, ValueEnum)]
    enum Level {
        Easy,
        Medium,
        Hard,
    }

    impl From<Level> for DifficultyLevel {
        fn from(level: Level) -> Self {
            match level {
                Level::Easy => DifficultyLevel::Easy,
                Level::Medium => DifficultyLevel::Medium,
                Level::Hard => DifficultyLevel::Hard,
            }
        }
    }

    fn unix_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let cli = Cli::parse();
        anyhow::ensure!(cli.frame_ms > 0.0, "--frame-ms must be positive");

        let seed = cli.seed.unwrap_or_else(|| unix_ms() as u64);
        let mut game = Game::new(cli.difficulty.into(), seed, 0.0);
        let mut store = MemoryStore::new();

        let service: Box<dyn AnalyticsService> = match &cli.analytics_url {
            Some(url) => Box::new(HttpAnalytics::new(url.as_str())),
            None => Box::new(OfflineAnalytics::new()),
        };
        let mut tracker = GameTracker::new(service);

        let limit_ms = f64::from(cli.seconds) * 1000.0;
        let mut now = 0.0;
        let mut apples = 0;

        while now < limit_ms && !game.snapshot().is_game_over() {
            now += cli.frame_ms;

            let wanted = autopilot(game.snapshot());
            game.change_direction(wanted, now);

            let events = game.frame(now);
            for event in &events {
                match event {
                    GameEvent::AteApple { .. } => apples += 1,
                    GameEvent::GameOver { cause } => {
                        log::info!("Autopilot crashed ({}) at {:.1}s", cause.as_str(), now / 1000.0)
                    }
                    GameEvent::Moved { head } => log::trace!("Head at {:?}", head),
                    other => log::debug!("{:?}", other),
                }
            }
            tracker.observe(game.snapshot(), &events, unix_ms());
        }

        let state = game.snapshot();
        println!(
            "{} run, seed {}: score {}, {} apples, {}s played, length {}",
            state.difficulty.as_str(),
            seed,
            state.score,
            apples,
            state.game_time,
            state.snake.len()
        );

        let Some(report) = game.game_over_report() else {
            println!("Time limit reached with the snake still alive");
            return Ok(());
        };

        let record = record_game_over(&mut store, &report, "today")
            .context("failed to record the finished run")?;
        println!(
            "Died by {}; rank {:?}; level {} ({}% to next)",
            report.death_cause.as_str(),
            record.rank,
            record.level.name,
            progression::progress_percent(record.highest_score)
        );
        for achievement in &record.new_achievements {
            println!("Unlocked: {} {}", achievement.icon, achievement.name);
        }

        if let Some(insights) = tracker.insights() {
            println!("Skill level: {:?}", insights.skill_level);
            for line in insights.strengths.iter().chain(&insights.weaknesses) {
                println!("  - {}", line);
            }
        }
        if let Some(error) = tracker.error() {
            println!("Analytics unavailable: {}", error);
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `platform::web::start`, this is just to satisfy the compiler
}
