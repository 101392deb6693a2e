//! Session analytics and AI insights
//!
//! Finished runs are reported to an analytics service, which answers with a
//! session id and, on request, generated insights and recommendations. Every
//! call is best effort: failures come back as [`AnalyticsError`] and never
//! reach the simulation.

#[cfg(not(target_arch = "wasm32"))]
pub mod http;
pub mod offline;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{DeathCause, DifficultyLevel, Position};

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpAnalytics;
pub use offline::OfflineAnalytics;

/// Errors from an analytics backend
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response carried no session id")]
    MissingSessionId,

    #[error("Unknown session '{0}'")]
    UnknownSession(String),

    #[error("No sessions recorded yet")]
    NoHistory,
}

/// One finished run as sent to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Unix time (ms)
    pub timestamp: f64,
    pub score: u32,
    pub game_time: u32,
    pub difficulty: DifficultyLevel,
    pub snake_length: usize,
    /// Head positions, oldest first
    pub movement_pattern: Vec<Position>,
    pub collision_type: Option<DeathCause>,
    pub power_ups_collected: u32,
    pub board_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReceipt {
    pub success: bool,
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatCell {
    pub x: i32,
    pub y: i32,
    /// Visits relative to the most visited cell (0..=1)
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Heatmap {
    pub positions: Vec<HeatCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPattern {
    pub name: String,
    pub description: String,
    pub frequency: f64,
}

/// Percent above (positive) or below the player's average
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Comparison {
    pub score: f64,
    pub time: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_session_id: Option<String>,
    pub timestamp: f64,
    pub skill_level: SkillLevel,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub heatmap: Option<Heatmap>,
    #[serde(default)]
    pub patterns: Option<Vec<MovementPattern>>,
    #[serde(default)]
    pub comparison_to_average: Option<Comparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    #[serde(default)]
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    pub practice_areas: Vec<String>,
    #[serde(default)]
    pub suggested_techniques: Vec<String>,
}

/// Remote (or simulated) analytics backend
pub trait AnalyticsService {
    fn submit_session(&mut self, record: &SessionRecord) -> Result<SessionReceipt, AnalyticsError>;
    fn fetch_insights(&self, session_id: &str) -> Result<AiInsights, AnalyticsError>;
    fn fetch_recommendations(&self) -> Result<Recommendations, AnalyticsError>;
}

impl<T: AnalyticsService + ?Sized> AnalyticsService for Box<T> {
    fn submit_session(&mut self, record: &SessionRecord) -> Result<SessionReceipt, AnalyticsError> {
        (**self).submit_session(record)
    }

    fn fetch_insights(&self, session_id: &str) -> Result<AiInsights, AnalyticsError> {
        (**self).fetch_insights(session_id)
    }

    fn fetch_recommendations(&self) -> Result<Recommendations, AnalyticsError> {
        (**self).fetch_recommendations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_record_wire_format() {
        let record = SessionRecord {
            id: None,
            user_id: None,
            timestamp: 1_700_000_000_000.0,
            score: 8,
            game_time: 41,
            difficulty: DifficultyLevel::Hard,
            snake_length: 9,
            movement_pattern: vec![Position::new(1, 2)],
            collision_type: Some(DeathCause::Wall),
            power_ups_collected: 1,
            board_size: 25,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["gameTime"], 41);
        assert_eq!(json["difficulty"], "HARD");
        assert_eq!(json["collisionType"], "wall");
        assert_eq!(json["movementPattern"][0]["x"], 1);
        assert_eq!(json["boardSize"], 25);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_insights_accept_minimal_payload() {
        let insights: AiInsights = serde_json::from_str(
            r#"{"timestamp": 1.0, "skillLevel": "advanced", "strengths": ["fast"]}"#,
        )
        .unwrap();
        assert_eq!(insights.skill_level, SkillLevel::Advanced);
        assert!(insights.heatmap.is_none());
        assert!(insights.weaknesses.is_empty());
    }
}
