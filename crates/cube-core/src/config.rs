//! Tunable game parameters

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest grid the planner will ever produce (cells per side)
pub const MIN_GRID_SIZE: u32 = 2;
/// Largest grid the planner will ever produce (cells per side)
pub const MAX_GRID_SIZE: u32 = 8;

/// Score and color curve shared by the planner and the color generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCurve {
    /// Grid size for a fresh game
    pub min_grid: u32,
    /// Grid size ceiling
    pub max_grid: u32,
    /// Points needed to grow the grid by one cell per side
    pub scores_per_grid_step: u32,
    /// Channel delta at difficulty 0
    pub max_lighten: u8,
    /// Channel delta floor; must stay above zero
    pub min_lighten: u8,
    /// Delta removed per difficulty level
    pub lighten_step: u8,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            min_grid: MIN_GRID_SIZE,
            max_grid: MAX_GRID_SIZE,
            scores_per_grid_step: 3,
            max_lighten: 80,
            min_lighten: 8,
            lighten_step: 4,
        }
    }
}

/// Configuration for a play session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds on the clock when a session starts
    pub initial_time_secs: u32,
    /// Points awarded for each odd cell found
    pub points_per_round: u32,
    /// Seconds on the clock for the chase variant
    pub chase_time_secs: u32,
    /// Difficulty curve
    pub curve: DifficultyCurve,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_time_secs: 60,
            points_per_round: 1,
            chase_time_secs: 30,
            curve: DifficultyCurve::default(),
        }
    }
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid bounds {min}..={max} must lie within {}..={}", MIN_GRID_SIZE, MAX_GRID_SIZE)]
    GridBounds { min: u32, max: u32 },
    #[error("scores_per_grid_step must be at least 1")]
    ZeroGridStep,
    #[error("lighten range {min}..={max} must be non-empty and start above zero")]
    LightenRange { min: u8, max: u8 },
    #[error("{0} must be at least one second")]
    ZeroTime(&'static str),
    #[error("points_per_round must be at least 1")]
    ZeroPoints,
}

impl GameConfig {
    /// Check that the configuration can produce solvable rounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let curve = &self.curve;
        if curve.min_grid < MIN_GRID_SIZE
            || curve.max_grid > MAX_GRID_SIZE
            || curve.min_grid > curve.max_grid
        {
            return Err(ConfigError::GridBounds {
                min: curve.min_grid,
                max: curve.max_grid,
            });
        }
        if curve.scores_per_grid_step == 0 {
            return Err(ConfigError::ZeroGridStep);
        }
        if curve.min_lighten == 0 || curve.min_lighten > curve.max_lighten {
            return Err(ConfigError::LightenRange {
                min: curve.min_lighten,
                max: curve.max_lighten,
            });
        }
        if self.initial_time_secs == 0 {
            return Err(ConfigError::ZeroTime("initial_time_secs"));
        }
        if self.chase_time_secs == 0 {
            return Err(ConfigError::ZeroTime("chase_time_secs"));
        }
        if self.points_per_round == 0 {
            return Err(ConfigError::ZeroPoints);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_min_lighten() {
        let mut config = GameConfig::default();
        config.curve.min_lighten = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LightenRange { min: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let mut config = GameConfig::default();
        config.curve.max_grid = 12;
        assert!(matches!(config.validate(), Err(ConfigError::GridBounds { .. })));
    }

    #[test]
    fn test_rejects_zero_time_budget() {
        let config = GameConfig {
            initial_time_secs: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTime("initial_time_secs"))
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"initial_time_secs": 45}"#).unwrap();
        assert_eq!(config.initial_time_secs, 45);
        assert_eq!(config.curve, DifficultyCurve::default());
        assert_eq!(config.points_per_round, 1);
    }
}
