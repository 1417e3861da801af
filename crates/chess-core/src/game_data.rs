use serde::{Deserialize, Serialize};

/// Side a player had in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

#[derive(Debug, Clone)]
pub struct GameMetadata {
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
}

impl GameMetadata {
    /// Which side `username` played, compared case-insensitively.
    pub fn color_of(&self, username: &str) -> Option<PlayerColor> {
        if self.white.eq_ignore_ascii_case(username) {
            Some(PlayerColor::White)
        } else if self.black.eq_ignore_ascii_case(username) {
            Some(PlayerColor::Black)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameData {
    pub metadata: GameMetadata,
    pub moves: Vec<String>, // SAN notation
}
