use crate::error::SetupError;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

/// How a game is created: who plays, in turn order, and how the cards are shuffled.
///
/// Two games created from equal configurations, and fed the same decisions, always end up in
/// the same state.
///
/// # JSON
/// Missing fields take their default value.
/// ```
/// use ticket_to_ride_engine::config::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{"seed": 42}"#).unwrap();
/// assert_eq!(config.seed, 42);
/// assert_eq!(config.players, GameConfig::default().players);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// Names of the players. Their index is their handle, and the first one starts.
    pub players: Vec<String>,
    /// Seeds every shuffle and random draw of the game.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: (1..=MIN_PLAYERS)
                .map(|player| format!("Player {}", player))
                .collect(),
            seed: 0,
        }
    }
}

impl GameConfig {
    pub fn new<S: Into<String>>(players: impl IntoIterator<Item = S>, seed: u64) -> Self {
        Self {
            players: players.into_iter().map(Into::into).collect(),
            seed,
        }
    }

    /// Checks that the game can be played with these players.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players.len()) {
            return Err(SetupError::PlayerCount(self.players.len()));
        }

        let mut names = HashSet::with_capacity(self.players.len());
        for name in &self.players {
            if !names.insert(name.as_str()) {
                return Err(SetupError::DuplicateName(name.clone()));
            }
        }

        Ok(())
    }
}
