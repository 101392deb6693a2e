//! JavaScript-facing game handle
//!
//! The page owns the animation loop and calls `frame` with the
//! `requestAnimationFrame` timestamp, forwards `keydown` keys and
//! `visibilitychange`, and reads snapshots back as JSON for drawing.

use wasm_bindgen::prelude::*;

use crate::analytics::OfflineAnalytics;
use crate::controls::{self, Command};
use crate::game::Game;
use crate::persistence::{KeyValueStore, MemoryStore};
use crate::settings::Settings;
use crate::sim::{DifficultyLevel, GameEvent};
use crate::stats::record_game_over;
use crate::tracking::GameTracker;

use super::LocalStorage;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Snake core loaded");
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    tracker: GameTracker<OfflineAnalytics>,
    store: Box<dyn KeyValueStore>,
    settings: Settings,
}

#[wasm_bindgen]
impl WebGame {
    /// `difficulty` overrides the saved setting when given ("EASY", "MEDIUM", "HARD")
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: Option<String>, now_ms: f64) -> WebGame {
        let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{}; progress will not be saved", e);
                Box::new(MemoryStore::new())
            }
        };

        let mut settings = Settings::load(store.as_ref());
        if let Some(level) = difficulty.as_deref().and_then(DifficultyLevel::from_str) {
            settings.difficulty = level;
        }

        let seed = js_sys::Date::now() as u64;
        WebGame {
            game: Game::new(settings.difficulty, seed, now_ms),
            tracker: GameTracker::new(OfflineAnalytics::new()),
            store,
            settings,
        }
    }

    /// Advance to `now_ms`; returns the events as a JSON array
    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsValue> {
        let events = self.game.frame(now_ms);
        self.after(&events);
        to_json(&events)
    }

    /// Handle a `KeyboardEvent.key`. Returns true when the key was consumed
    /// (the page should then call `preventDefault`).
    pub fn key(&mut self, key: &str, now_ms: f64) -> bool {
        let Some(command) = controls::map_key(key) else {
            return false;
        };
        let events = self.game.handle(command, now_ms);
        if command == Command::Restart {
            log::info!("Restarted from keyboard");
        }
        self.after(&events);
        controls::prevents_default(key) || !events.is_empty()
    }

    pub fn set_visible(&mut self, visible: bool, now_ms: f64) {
        self.game.set_visible(visible, now_ms);
    }

    /// Start over on another difficulty and remember the choice
    pub fn change_difficulty(&mut self, difficulty: &str, now_ms: f64) -> bool {
        let Some(level) = DifficultyLevel::from_str(difficulty) else {
            return false;
        };
        self.game.change_difficulty(level, now_ms);
        self.after(&[]);
        self.settings.difficulty = level;
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            log::warn!("Could not save settings: {}", e);
        }
        true
    }

    pub fn grid_size(&self) -> u32 {
        self.game.grid_size()
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        to_json(self.game.snapshot())
    }

    /// Insights for the last reported run, or `null`
    pub fn insights_json(&self) -> Result<String, JsValue> {
        to_json(&self.tracker.insights())
    }

    pub fn tracking_error(&self) -> Option<String> {
        self.tracker.error().map(str::to_string)
    }

    fn after(&mut self, events: &[GameEvent]) {
        self.tracker
            .observe(self.game.snapshot(), events, js_sys::Date::now());

        if !events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
            return;
        }
        let Some(report) = self.game.game_over_report() else {
            return;
        };
        let date: String = js_sys::Date::new_0()
            .to_locale_date_string("en-US", &JsValue::UNDEFINED)
            .into();
        if let Err(e) = record_game_over(self.store.as_mut(), &report, &date) {
            log::warn!("Could not record game: {}", e);
        }
    }
}
