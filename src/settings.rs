//! Game settings and preferences
//!
//! Persisted as one document in the injected store, separate from scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};
use crate::sim::DifficultyLevel;

/// Board color themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Neon,
    Retro,
    Pastel,
}

/// Colors a renderer needs for the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub snake_head: &'static str,
    pub snake_body: &'static str,
    pub apple: &'static str,
    pub board_bg: &'static str,
    pub board_border: &'static str,
}

const HIGH_CONTRAST: Palette = Palette {
    snake_head: "#000000",
    snake_body: "#000000",
    apple: "#ff0000",
    board_bg: "#ffffff",
    board_border: "#000000",
};

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Default,
        Theme::Dark,
        Theme::Neon,
        Theme::Retro,
        Theme::Pastel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Neon => "neon",
            Theme::Retro => "retro",
            Theme::Pastel => "pastel",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Default => Palette {
                snake_head: "#0d9488",
                snake_body: "#10b981",
                apple: "#ef4444",
                board_bg: "#f3f4f6",
                board_border: "#e5e7eb",
            },
            Theme::Dark => Palette {
                snake_head: "#4f46e5",
                snake_body: "#2563eb",
                apple: "#a855f7",
                board_bg: "#1f2937",
                board_border: "#374151",
            },
            Theme::Neon => Palette {
                snake_head: "#d946ef",
                snake_body: "#8b5cf6",
                apple: "#facc15",
                board_bg: "#18181b",
                board_border: "#27272a",
            },
            Theme::Retro => Palette {
                snake_head: "#d97706",
                snake_body: "#ea580c",
                apple: "#dc2626",
                board_bg: "#fef3c7",
                board_border: "#fde68a",
            },
            Theme::Pastel => Palette {
                snake_head: "#c084fc",
                snake_body: "#f472b6",
                apple: "#60a5fa",
                board_bg: "#f5f3ff",
                board_border: "#ede9fe",
            },
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Difficulty used for the next run
    pub difficulty: DifficultyLevel,

    // === Audio ===
    pub sound_enabled: bool,
    /// Spoken descriptions of game events
    pub audio_descriptive: bool,

    // === Visuals ===
    pub theme: Theme,
    /// Overrides the theme palette
    pub high_contrast: bool,

    pub tutorial_seen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyLevel::Medium,
            sound_enabled: true,
            audio_descriptive: false,
            theme: Theme::Default,
            high_contrast: false,
            tutorial_seen: false,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "snake-game-settings";

    /// Palette after accessibility overrides
    pub fn effective_palette(&self) -> Palette {
        if self.high_contrast {
            HIGH_CONTRAST
        } else {
            self.theme.palette()
        }
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let settings: Self = load_json(store, Self::STORAGE_KEY);
        log::info!(
            "Settings: {} difficulty, {} theme",
            settings.difficulty.as_str(),
            settings.theme.as_str()
        );
        settings
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
