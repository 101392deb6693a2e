//! Keyboard controls
//!
//! Maps `KeyboardEvent.key` strings onto game commands. The game decides
//! whether a command is legal in its current phase; see [`crate::Game::handle`].

use crate::sim::Direction;

/// Discrete player request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    Restart,
}

/// Translate a key name into a command
pub fn map_key(key: &str) -> Option<Command> {
    let command = match key {
        "ArrowUp" | "w" | "W" => Command::Turn(Direction::Up),
        "ArrowDown" | "s" | "S" => Command::Turn(Direction::Down),
        "ArrowLeft" | "a" | "A" => Command::Turn(Direction::Left),
        "ArrowRight" | "d" | "D" => Command::Turn(Direction::Right),
        "p" | "P" | " " | "Space" | "Spacebar" => Command::TogglePause,
        "r" | "R" => Command::Restart,
        _ => return None,
    };
    Some(command)
}

/// Keys whose default browser action (scrolling) should be suppressed
pub fn prevents_default(key: &str) -> bool {
    matches!(
        key,
        "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | " " | "Space"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_and_wasd() {
        assert_eq!(map_key("ArrowUp"), Some(Command::Turn(Direction::Up)));
        assert_eq!(map_key("a"), Some(Command::Turn(Direction::Left)));
        assert_eq!(map_key("D"), Some(Command::Turn(Direction::Right)));
        assert_eq!(map_key("s"), Some(Command::Turn(Direction::Down)));
    }

    #[test]
    fn test_pause_and_restart() {
        assert_eq!(map_key(" "), Some(Command::TogglePause));
        assert_eq!(map_key("P"), Some(Command::TogglePause));
        assert_eq!(map_key("r"), Some(Command::Restart));
        assert_eq!(map_key("Escape"), None);
        assert_eq!(map_key("x"), None);
    }

    #[test]
    fn test_scroll_keys() {
        assert!(prevents_default("ArrowLeft"));
        assert!(prevents_default(" "));
        assert!(!prevents_default("w"));
    }
}
