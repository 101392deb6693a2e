//! Collision resolution for the snake's next head cell
//!
//! Pure function of the candidate head, the pre-move body, the board size and
//! the invincibility flag. Wall checks run before self checks.

use serde::{Deserialize, Serialize};

use super::grid::{Position, is_within_bounds};

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Head lands on a free or collectible cell
    None,
    /// Head leaves the board
    Wall,
    /// Head lands on its own body
    SelfHit,
}

impl Collision {
    /// Cause reported to collaborators, if this collision ends the game
    pub fn death_cause(self) -> Option<DeathCause> {
        match self {
            Collision::None => None,
            Collision::Wall => Some(DeathCause::Wall),
            Collision::SelfHit => Some(DeathCause::Collision),
        }
    }
}

/// Why a run ended, as persisted in statistics and analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathCause {
    Wall,
    Collision,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Wall => "wall",
            DeathCause::Collision => "collision",
        }
    }
}

/// Classify the candidate head against the board and the current body.
///
/// `body` is the snake before this tick's move; its head (index 0) is about to
/// be replaced and is never checked.
pub fn resolve(head: Position, body: &[Position], grid_size: u32, invincible: bool) -> Collision {
    if invincible {
        return Collision::None;
    }

    if !is_within_bounds(head, grid_size) {
        return Collision::Wall;
    }

    if body.iter().skip(1).any(|&segment| segment == head) {
        return Collision::SelfHit;
    }

    Collision::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body() -> Vec<Position> {
        vec![
            Position::new(5, 5),
            Position::new(4, 5),
            Position::new(4, 6),
            Position::new(5, 6),
        ]
    }

    #[test]
    fn test_resolve_table() {
        let cases = [
            (Position::new(6, 5), false, Collision::None),
            (Position::new(-1, 5), false, Collision::Wall),
            (Position::new(5, 20), false, Collision::Wall),
            (Position::new(5, 6), false, Collision::SelfHit),
            (Position::new(4, 6), false, Collision::SelfHit),
            (Position::new(5, 6), true, Collision::None),
            (Position::new(-1, -1), true, Collision::None),
        ];

        for (head, invincible, expected) in cases {
            assert_eq!(
                resolve(head, &body(), 20, invincible),
                expected,
                "head {head:?}, invincible {invincible}"
            );
        }
    }

    #[test]
    fn test_current_head_is_not_an_obstacle() {
        assert_eq!(resolve(Position::new(5, 5), &body(), 20, false), Collision::None);
    }

    #[test]
    fn test_death_cause_mapping() {
        assert_eq!(Collision::None.death_cause(), None);
        assert_eq!(Collision::Wall.death_cause(), Some(DeathCause::Wall));
        assert_eq!(Collision::SelfHit.death_cause(), Some(DeathCause::Collision));
        assert_eq!(serde_json::to_string(&DeathCause::Collision).unwrap(), "\"collision\"");
    }

    proptest! {
        #[test]
        fn invincibility_always_passes(x in -50i32..50, y in -50i32..50, size in 1u32..30) {
            prop_assert_eq!(resolve(Position::new(x, y), &body(), size, true), Collision::None);
        }

        #[test]
        fn outside_board_is_wall(x in -50i32..50, y in -50i32..50, size in 1u32..30) {
            let head = Position::new(x, y);
            let result = resolve(head, &body(), size, false);
            if !is_within_bounds(head, size) {
                prop_assert_eq!(result, Collision::Wall);
            } else {
                prop_assert_ne!(result, Collision::Wall);
            }
        }
    }
}
