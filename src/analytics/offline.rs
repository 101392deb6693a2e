//! Local analytics stand-in
//!
//! Keeps submitted sessions in memory and derives insights from them, so the
//! tracking flow works without a backend (development builds, the browser
//! build, tests).

use std::collections::HashMap;

use super::{
    AiInsights, AnalyticsError, AnalyticsService, Comparison, HeatCell, Heatmap, MovementPattern,
    Recommendations, SessionReceipt, SessionRecord, SkillLevel,
};
use crate::sim::{DeathCause, DifficultyLevel, Position};

/// Cells kept in a generated heatmap
const HEATMAP_CELLS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct OfflineAnalytics {
    sessions: Vec<(String, SessionRecord)>,
}

impl OfflineAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn find(&self, session_id: &str) -> Option<(usize, &SessionRecord)> {
        self.sessions
            .iter()
            .enumerate()
            .find(|(_, (id, _))| id == session_id)
            .map(|(i, (_, record))| (i, record))
    }
}

impl AnalyticsService for OfflineAnalytics {
    fn submit_session(&mut self, record: &SessionRecord) -> Result<SessionReceipt, AnalyticsError> {
        let mut session_id = format!("session_{}", record.timestamp as u64);
        if self.find(&session_id).is_some() {
            session_id = format!("{}_{}", session_id, self.sessions.len());
        }
        log::debug!(
            "Recorded {} offline ({} moves)",
            session_id,
            record.movement_pattern.len()
        );
        self.sessions.push((session_id.clone(), record.clone()));

        Ok(SessionReceipt {
            success: true,
            session_id,
        })
    }

    fn fetch_insights(&self, session_id: &str) -> Result<AiInsights, AnalyticsError> {
        let (index, record) = self
            .find(session_id)
            .ok_or_else(|| AnalyticsError::UnknownSession(session_id.to_string()))?;
        let earlier: Vec<&SessionRecord> = self.sessions[..index].iter().map(|(_, r)| r).collect();

        let edge_share = edge_share(&record.movement_pattern, record.board_size);
        let (strengths, weaknesses, recommendations) = assess(record, edge_share);

        Ok(AiInsights {
            id: None,
            game_session_id: Some(session_id.to_string()),
            timestamp: record.timestamp,
            skill_level: skill_level(record.score),
            strengths,
            weaknesses,
            recommendations,
            heatmap: Some(heatmap(&record.movement_pattern)),
            patterns: Some(vec![
                MovementPattern {
                    name: "Edge".into(),
                    description: "Moves along the board border".into(),
                    frequency: edge_share,
                },
                MovementPattern {
                    name: "Center".into(),
                    description: "Moves through the open middle of the board".into(),
                    frequency: 1.0 - edge_share,
                },
            ]),
            comparison_to_average: Some(compare(record, &earlier)),
        })
    }

    fn fetch_recommendations(&self) -> Result<Recommendations, AnalyticsError> {
        let (_, last) = self.sessions.last().ok_or(AnalyticsError::NoHistory)?;

        let difficulty = match (last.difficulty, last.score) {
            (DifficultyLevel::Easy, s) if s >= 25 => DifficultyLevel::Medium,
            (DifficultyLevel::Medium, s) if s >= 25 => DifficultyLevel::Hard,
            (DifficultyLevel::Hard, s) if s < 5 => DifficultyLevel::Medium,
            (DifficultyLevel::Medium, s) if s < 5 => DifficultyLevel::Easy,
            (level, _) => level,
        };

        let mut practice_areas = vec!["Planning efficient routes to the apple".to_string()];
        match last.collision_type {
            Some(DeathCause::Wall) => {
                practice_areas.push("Turning early near the walls".to_string())
            }
            Some(DeathCause::Collision) => {
                practice_areas.push("Leaving an exit when the body is long".to_string())
            }
            None => {}
        }

        Ok(Recommendations {
            difficulty: Some(difficulty),
            practice_areas,
            suggested_techniques: vec![
                "Spiral: keep the body coiled around the centre".to_string(),
                "Edge run: follow the border and cut in for apples".to_string(),
                "Zigzag: alternate horizontal sweeps row by row".to_string(),
            ],
        })
    }
}

fn skill_level(score: u32) -> SkillLevel {
    match score {
        0..10 => SkillLevel::Beginner,
        10..25 => SkillLevel::Intermediate,
        25..50 => SkillLevel::Advanced,
        _ => SkillLevel::Expert,
    }
}

/// Visit counts normalised to the busiest cell, busiest first
fn heatmap(pattern: &[Position]) -> Heatmap {
    let mut counts: HashMap<Position, u32> = HashMap::new();
    for &p in pattern {
        *counts.entry(p).or_insert(0) += 1;
    }
    let max = counts.values().copied().max().unwrap_or(1) as f64;

    let mut cells: Vec<(Position, u32)> = counts.into_iter().collect();
    cells.sort_by(|(pa, a), (pb, b)| b.cmp(a).then(pa.y.cmp(&pb.y)).then(pa.x.cmp(&pb.x)));
    cells.truncate(HEATMAP_CELLS);

    Heatmap {
        positions: cells
            .into_iter()
            .map(|(p, n)| HeatCell {
                x: p.x,
                y: p.y,
                frequency: n as f64 / max,
            })
            .collect(),
    }
}

/// Share of moves made on the outermost ring of cells
fn edge_share(pattern: &[Position], board_size: u32) -> f64 {
    if pattern.is_empty() {
        return 0.0;
    }
    let last = board_size as i32 - 1;
    let on_edge = pattern
        .iter()
        .filter(|p| p.x == 0 || p.y == 0 || p.x == last || p.y == last)
        .count();
    on_edge as f64 / pattern.len() as f64
}

fn assess(record: &SessionRecord, edge_share: f64) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    let per_minute = record.score as f64 * 60.0 / record.game_time.max(1) as f64;
    if per_minute >= 10.0 {
        strengths.push("Efficient apple collection".to_string());
    } else {
        weaknesses.push("Long detours between apples".to_string());
        recommendations.push("Head for the apple along the shortest path".to_string());
    }
    if record.power_ups_collected > 0 {
        strengths.push("Makes use of power-ups".to_string());
    } else {
        recommendations.push("Grab power-ups when the route is safe".to_string());
    }
    if edge_share > 0.4 {
        weaknesses.push("Tends to get trapped along the edges".to_string());
        recommendations.push("Keep to the middle of the board when you can".to_string());
    } else {
        strengths.push("Good use of the board space".to_string());
    }
    match record.collision_type {
        Some(DeathCause::Collision) => {
            weaknesses.push("Runs into its own body".to_string());
            recommendations.push("Plan three or four moves ahead".to_string());
        }
        Some(DeathCause::Wall) => {
            weaknesses.push("Misjudges the walls".to_string());
            recommendations.push("Practice on MEDIUM to sharpen reactions".to_string());
        }
        None => {}
    }

    (strengths, weaknesses, recommendations)
}

/// Percent difference from the mean of earlier sessions (zero without history)
fn compare(record: &SessionRecord, earlier: &[&SessionRecord]) -> Comparison {
    if earlier.is_empty() {
        return Comparison::default();
    }
    let n = earlier.len() as f64;
    let efficiency = |r: &SessionRecord| r.score as f64 / r.game_time.max(1) as f64;
    let avg_score = earlier.iter().map(|r| r.score as f64).sum::<f64>() / n;
    let avg_time = earlier.iter().map(|r| r.game_time as f64).sum::<f64>() / n;
    let avg_eff = earlier.iter().map(|r| efficiency(*r)).sum::<f64>() / n;

    let percent = |value: f64, avg: f64| {
        if avg > 0.0 { (value - avg) / avg * 100.0 } else { 0.0 }
    };

    Comparison {
        score: percent(record.score as f64, avg_score),
        time: percent(record.game_time as f64, avg_time),
        efficiency: percent(efficiency(record), avg_eff),
    }
}
