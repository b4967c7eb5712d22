//! Core engine for the odd-color cube game
//!
//! Every round shows a square grid of cells in one base color except for a
//! single "odd" cell that is slightly lighter. Finding it scores a point and
//! produces a bigger, subtler grid; clicking anything else or running out of
//! time ends the session.
//!
//! This crate owns the puzzle generation, the difficulty curve and the game
//! state machine. Drawing, input and leaderboard transport are left to the
//! front ends, which talk to the core through [`Presenter`], [`TickSource`]
//! and [`ScoreSink`].

pub mod chase;
pub mod color;
pub mod config;
pub mod countdown;
pub mod leaderboard;
pub mod machine;
pub mod planner;
pub mod player;
pub mod present;
mod rng;

pub use chase::{ChaseGame, ChaseState, CUBE_SIZE, PLAY_AREA};
pub use color::{different_color, generate_base_color, lighten_amount, Rgb};
pub use config::{ConfigError, DifficultyCurve, GameConfig};
pub use countdown::{Clock, Countdown, ManualClock, TickSource, TICK_PERIOD_MS};
pub use leaderboard::{
    rank_entries, same_name, LeaderboardBackend, LeaderboardEntry, LeaderboardError, LeaderboardResult,
    MemoryLeaderboard, TOP_ENTRIES,
};
pub use machine::{
    ClickOutcome, GameMachine, GameOverReason, GameState, Phase, ScoreSink, SessionResult,
    TickOutcome,
};
pub use planner::{RoundDescriptor, RoundPlanner};
pub use player::{validate_name, NameError, Player, PLAYER_NAME_KEY};
pub use present::{ClickLatch, Presenter};
pub use rng::GameRng;
