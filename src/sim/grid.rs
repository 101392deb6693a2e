//! Grid coordinates, directions and board bounds

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A cell on the board, zero-indexed from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step along `direction`
    pub fn translated(self, direction: Direction) -> Self {
        (IVec2::from(self) + direction.delta()).into()
    }
}

impl From<IVec2> for Position {
    fn from(v: IVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Position> for IVec2 {
    fn from(p: Position) -> Self {
        IVec2::new(p.x, p.y)
    }
}

/// Heading of the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Unit step in screen coordinates (y grows downwards)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

/// Check if a position lies on a `grid_size` x `grid_size` board
#[inline]
pub fn is_within_bounds(pos: Position, grid_size: u32) -> bool {
    let size = grid_size as i32;
    (0..size).contains(&pos.x) && (0..size).contains(&pos.y)
}

/// Uniformly random cell on the board
pub fn random_position<R: Rng>(rng: &mut R, grid_size: u32) -> Position {
    let size = grid_size as i32;
    Position::new(rng.random_range(0..size), rng.random_range(0..size))
}

/// Uniformly random cell for which `blocked` is false, or `None` when every
/// cell is blocked
pub fn random_free_position<R, F>(rng: &mut R, grid_size: u32, blocked: F) -> Option<Position>
where
    R: Rng,
    F: Fn(Position) -> bool,
{
    let size = grid_size as i32;
    let free: Vec<Position> = (0..size)
        .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
        .filter(|&p| !blocked(p))
        .collect();

    if free.is_empty() {
        return None;
    }
    Some(free[rng.random_range(0..free.len())])
}
