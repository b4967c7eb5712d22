//! Game state machine
//!
//! Owns the authoritative [`GameState`] and applies the three transitions of a
//! session: a correct click advances to a new round, a wrong click or the
//! clock reaching zero ends the game. Calls arriving after the game has ended
//! are ignored, so a late timer tick or a double click can never change the
//! result or submit it twice.

use crate::color::Rgb;
use crate::config::GameConfig;
use crate::countdown::TickSource;
use crate::planner::{RoundDescriptor, RoundPlanner};
use crate::player::Player;
use serde::{Deserialize, Serialize};

/// Lifecycle of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    Playing,
    GameOver,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// A cell other than the odd one was clicked
    WrongCell { clicked: u32 },
    /// The clock reached zero
    TimeUp,
}

/// Snapshot of a session in progress (or just finished)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub round: RoundDescriptor,
    pub score: u32,
    pub time_left: u32,
    pub is_playing: bool,
}

impl GameState {
    pub fn grid_size(&self) -> u32 {
        self.round.grid_size
    }

    pub fn odd_index(&self) -> u32 {
        self.round.odd_index
    }

    pub fn base_color(&self) -> Rgb {
        self.round.base_color
    }

    pub fn diff_color(&self) -> Rgb {
        self.round.diff_color
    }
}

/// Final result of a session, handed to the [`ScoreSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub name: String,
    pub score: u32,
    /// Seconds played
    pub time_secs: u32,
    pub reason: GameOverReason,
}

/// Receiver of finished sessions.
///
/// Called once per session from inside the game-over transition. Implementors
/// must not block: hand the result off and log failures.
pub trait ScoreSink {
    fn submit(&self, result: &SessionResult);
}

impl<F: Fn(&SessionResult)> ScoreSink for F {
    fn submit(&self, result: &SessionResult) {
        self(result)
    }
}

/// Result of [`GameMachine::report_click`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// No game in progress
    Ignored,
    /// Odd cell found, next round ready
    Advanced(RoundDescriptor),
    GameOver(SessionResult),
}

/// Result of [`GameMachine::tick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No game in progress
    Ignored,
    Ticked { time_left: u32 },
    GameOver(SessionResult),
}

/// The game state machine
pub struct GameMachine<T: TickSource> {
    config: GameConfig,
    planner: RoundPlanner,
    timer: T,
    sink: Option<Box<dyn ScoreSink>>,
    player: Option<Player>,
    /// `None` until the first start
    state: Option<GameState>,
    result: Option<SessionResult>,
}

impl<T: TickSource> std::fmt::Debug for GameMachine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameMachine")
            .field("phase", &self.phase())
            .field("state", &self.state)
            .field("player", &self.player)
            .field("timer_active", &self.timer.is_active())
            .finish()
    }
}

impl<T: TickSource> GameMachine<T> {
    /// Create a machine for `config`, which should pass
    /// [`GameConfig::validate`]. An invalid config is logged and used as is;
    /// the odd cell still gets a color distinct from the base.
    pub fn new(config: GameConfig, timer: T) -> Self {
        let planner = RoundPlanner::new(config.curve);
        Self::with_planner(config, planner, timer)
    }

    /// Create a machine with an explicit planner (e.g. a seeded one)
    pub fn with_planner(config: GameConfig, planner: RoundPlanner, timer: T) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("game config failed validation: {}", e);
        }
        Self {
            config,
            planner,
            timer,
            sink: None,
            player: None,
            state: None,
            result: None,
        }
    }

    /// Attach the receiver of finished sessions
    pub fn with_sink(mut self, sink: impl ScoreSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn set_sink(&mut self, sink: Box<dyn ScoreSink>) {
        self.sink = Some(sink);
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            None => Phase::NotStarted,
            Some(state) if state.is_playing => Phase::Playing,
            Some(_) => Phase::GameOver,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == Phase::Playing
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Current round, if a session has been started
    pub fn round(&self) -> Option<&RoundDescriptor> {
        self.state.as_ref().map(|s| &s.round)
    }

    /// Result of the last finished session
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Begin a fresh session. Allowed from any phase; a session still in
    /// progress is dropped without being submitted.
    pub fn start(&mut self, player: Player) -> RoundDescriptor {
        self.timer.stop();
        if self.is_playing() {
            log::info!("abandoning session in progress for a restart");
        }

        let round = self.planner.plan_round(0, 1);
        self.state = Some(GameState {
            round,
            score: 0,
            time_left: self.config.initial_time_secs,
            is_playing: true,
        });
        self.result = None;
        log::info!(
            "session started for {} with {}s on the clock",
            player.name(),
            self.config.initial_time_secs
        );
        self.player = Some(player);
        self.timer.start();
        round
    }

    /// Report a click on cell `index` of the current round
    pub fn report_click(&mut self, index: u32) -> ClickOutcome {
        let Some(state) = self.state.filter(|s| s.is_playing) else {
            log::trace!("click on cell {} ignored, no game in progress", index);
            return ClickOutcome::Ignored;
        };

        if index != state.round.odd_index {
            return ClickOutcome::GameOver(self.finish(GameOverReason::WrongCell { clicked: index }));
        }

        let score = state.score.saturating_add(self.config.points_per_round);
        let round = self.planner.plan_round(score, state.round.round + 1);
        log::debug!(
            "round {} cleared, score {} -> grid {}x{}",
            state.round.round,
            score,
            round.grid_size,
            round.grid_size
        );
        self.state = Some(GameState {
            round,
            score,
            time_left: state.time_left,
            is_playing: true,
        });
        ClickOutcome::Advanced(round)
    }

    /// One second of the session clock
    pub fn tick(&mut self) -> TickOutcome {
        let Some(state) = self.state.as_mut().filter(|s| s.is_playing) else {
            return TickOutcome::Ignored;
        };

        state.time_left = state.time_left.saturating_sub(1);
        let time_left = state.time_left;
        if time_left == 0 {
            TickOutcome::GameOver(self.finish(GameOverReason::TimeUp))
        } else {
            TickOutcome::Ticked { time_left }
        }
    }

    /// Apply every tick the timer has accumulated since the last call
    pub fn advance_clock(&mut self) -> TickOutcome {
        let due = self.timer.take_due();
        let mut outcome = TickOutcome::Ignored;
        for _ in 0..due {
            outcome = self.tick();
            if matches!(outcome, TickOutcome::GameOver(_) | TickOutcome::Ignored) {
                break;
            }
        }
        outcome
    }

    fn finish(&mut self, reason: GameOverReason) -> SessionResult {
        self.timer.stop();

        let (score, time_left) = match self.state.as_mut() {
            Some(state) => {
                state.is_playing = false;
                (state.score, state.time_left)
            }
            None => (0, self.config.initial_time_secs),
        };
        let result = SessionResult {
            name: self
                .player
                .as_ref()
                .map(|p| p.name().to_string())
                .unwrap_or_default(),
            score,
            time_secs: self.config.initial_time_secs.saturating_sub(time_left),
            reason,
        };
        log::info!(
            "game over ({:?}): {} scored {} in {}s",
            reason,
            result.name,
            result.score,
            result.time_secs
        );

        if let Some(sink) = &self.sink {
            sink.submit(&result);
        }
        self.result = Some(result.clone());
        result
    }
}
