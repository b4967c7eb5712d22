//! Command line, config file and persisted player name

use clap::{Parser, ValueEnum};
use cube_core::{ConfigError, GameConfig, PLAYER_NAME_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Spot the odd-colored square before the clock runs out
#[derive(Debug, Parser)]
#[command(name = "cube", version, about)]
pub struct Args {
    /// Player name (skips the name prompt)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Seconds on the clock
    #[arg(short, long)]
    pub time: Option<u32>,

    /// Game mode to open with
    #[arg(short, long, value_enum, default_value_t = Mode::Grid)]
    pub mode: Mode,

    /// Color theme
    #[arg(long, value_enum, default_value_t = ThemeName::Dark)]
    pub theme: ThemeName,

    /// JSON config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log file (defaults to the platform data directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Find the odd square
    Grid,
    /// Click the jumping cube
    Chase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeName {
    Dark,
    Light,
}

/// Errors while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cube-game").join("config.json"))
}

pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cube_game.log")
}

/// Load the game config: file (if any), then command line overrides
pub fn load_config(args: &Args) -> Result<GameConfig, SettingsError> {
    let mut config = match args.config.clone().or_else(default_config_path) {
        Some(path) if path.exists() => read_config(&path)?,
        Some(path) if args.config.is_some() => {
            return Err(SettingsError::Read {
                path,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
        _ => GameConfig::default(),
    };

    if let Some(time) = args.time {
        config.initial_time_secs = time;
    }
    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<GameConfig, SettingsError> {
    let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

// ==================== Player name ====================

/// Flat key-value file holding the player name
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredValues(BTreeMap<String, String>);

/// Persists the player name between runs
#[derive(Debug, Clone)]
pub struct PlayerStore {
    path: PathBuf,
}

impl PlayerStore {
    pub fn new() -> Self {
        let path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cube_game_player.json");
        Self::with_path(path)
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Saved name, if any
    pub fn load(&self) -> Option<String> {
        let json = fs::read_to_string(&self.path).ok()?;
        let values: StoredValues = serde_json::from_str(&json)
            .map_err(|e| log::warn!("ignoring unreadable {}: {}", self.path.display(), e))
            .ok()?;
        values
            .0
            .get(PLAYER_NAME_KEY)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    pub fn save(&self, name: &str) -> std::io::Result<()> {
        let mut values = StoredValues::default();
        values.0.insert(PLAYER_NAME_KEY.to_string(), name.to_string());
        let json = serde_json::to_string_pretty(&values)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)
    }
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self::new()
    }
}
