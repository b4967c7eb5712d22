//! Player identity and name validation

use crate::leaderboard::LeaderboardBackend;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key under which front ends persist the player name
pub const PLAYER_NAME_KEY: &str = "playerName";

/// A validated display name: trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    name: String,
}

/// Rejected player names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("please enter a name")]
    Empty,
    #[error("the name \"{0}\" is already taken")]
    Taken(String),
}

impl Player {
    pub fn new(raw: &str) -> Result<Self, NameError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validate a name for registration.
///
/// Uniqueness is checked against the leaderboard without regard to case. If
/// the leaderboard cannot be reached the name is accepted.
pub fn validate_name(raw: &str, backend: &dyn LeaderboardBackend) -> Result<Player, NameError> {
    let player = Player::new(raw)?;
    match backend.name_exists(player.name()) {
        Ok(true) => Err(NameError::Taken(player.name)),
        Ok(false) => Ok(player),
        Err(err) => {
            log::warn!(
                "could not check name against {} leaderboard: {}",
                backend.backend_name(),
                err
            );
            Ok(player)
        }
    }
}
