//! Browser-side game state, independent of the canvas

use cube_core::{
    same_name, validate_name, ChaseGame, ChaseState, ClickLatch, ClickOutcome, Clock, Countdown,
    GameConfig, GameMachine, GameState, LeaderboardBackend, LeaderboardEntry, MemoryLeaderboard,
    NameError, Player, RoundDescriptor, SessionResult, TickOutcome, CUBE_SIZE, PLAY_AREA,
    TOP_ENTRIES,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Which view the canvas shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    /// Waiting for `start`
    Idle,
    Playing,
    GameOver,
    Chase,
}

/// Pixel placement of the square board on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub x: f64,
    pub y: f64,
    /// Side of the whole board
    pub size: f64,
    /// Space between cells
    pub gap: f64,
}

impl BoardLayout {
    pub fn cell_size(&self, grid_size: u32) -> f64 {
        let n = grid_size.max(1) as f64;
        (self.size - self.gap * (n - 1.0)) / n
    }

    /// Top-left corner of a cell
    pub fn cell_origin(&self, index: u32, grid_size: u32) -> (f64, f64) {
        let stride = self.cell_size(grid_size) + self.gap;
        let row = (index / grid_size) as f64;
        let col = (index % grid_size) as f64;
        (self.x + col * stride, self.y + row * stride)
    }

    /// Cell under a canvas point; gaps between cells miss
    pub fn cell_at(&self, px: f64, py: f64, grid_size: u32) -> Option<u32> {
        let dx = px - self.x;
        let dy = py - self.y;
        if dx < 0.0 || dy < 0.0 || dx >= self.size || dy >= self.size {
            return None;
        }
        let cell = self.cell_size(grid_size);
        let stride = cell + self.gap;
        if dx % stride >= cell || dy % stride >= cell {
            return None;
        }
        let col = (dx / stride) as u32;
        let row = (dy / stride) as u32;
        (col < grid_size && row < grid_size).then(|| row * grid_size + col)
    }
}

/// Everything `state_json` exposes to the page
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub screen: Screen,
    pub player: Option<&'a str>,
    pub state: Option<&'a GameState>,
    pub result: Option<&'a SessionResult>,
    pub chase: &'a ChaseState,
    pub leaderboard: Vec<LeaderboardEntry>,
}

pub struct WebGame<C: Clock> {
    machine: GameMachine<Countdown<C>>,
    chase: ChaseGame<Countdown<C>>,
    latch: ClickLatch,
    screen: Screen,
    /// Sessions finished but not yet handed to the page
    finished: Rc<RefCell<Vec<SessionResult>>>,
    /// Local copy of the remote top list
    leaderboard: MemoryLeaderboard,
    pub board: BoardLayout,
    /// Canvas position of the chase play area
    pub chase_origin: (f64, f64),
}

impl<C: Clock + Clone + 'static> WebGame<C> {
    pub fn new(config: GameConfig, clock: C) -> Self {
        let finished = Rc::new(RefCell::new(Vec::new()));
        let queue = Rc::clone(&finished);
        let chase = ChaseGame::new(config.chase_time_secs, Countdown::new(clock.clone()));
        let machine = GameMachine::new(config, Countdown::new(clock))
            .with_sink(move |result: &SessionResult| queue.borrow_mut().push(result.clone()));

        Self {
            machine,
            chase,
            latch: ClickLatch::new(),
            screen: Screen::Idle,
            finished,
            leaderboard: MemoryLeaderboard::new(),
            board: BoardLayout {
                x: 30.0,
                y: 60.0,
                size: 460.0,
                gap: 4.0,
            },
            chase_origin: (30.0, 40.0),
        }
    }
}

impl<C: Clock> WebGame<C> {
    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn machine(&self) -> &GameMachine<Countdown<C>> {
        &self.machine
    }

    pub fn chase(&self) -> &ChaseState {
        self.chase.state()
    }

    pub fn is_interactive(&self) -> bool {
        self.latch.is_interactive()
    }

    /// Validate the name and start a session.
    ///
    /// `saved` is the name remembered from an earlier visit; it is already on
    /// the leaderboard, so it skips the uniqueness check.
    pub fn start(&mut self, raw_name: &str, saved: Option<&str>) -> Result<RoundDescriptor, NameError> {
        let player = match saved {
            Some(saved) if same_name(saved, raw_name) => Player::new(raw_name)?,
            _ => validate_name(raw_name, &self.leaderboard)?,
        };
        Ok(self.start_player(player))
    }

    /// Start again with the current player
    pub fn restart(&mut self) -> Option<RoundDescriptor> {
        let player = self.machine.player()?.clone();
        Some(self.start_player(player))
    }

    fn start_player(&mut self, player: Player) -> RoundDescriptor {
        self.chase.reset();
        let round = self.machine.start(player);
        self.latch.arm(&round);
        self.screen = Screen::Playing;
        round
    }

    /// Switch to the chase variant. Refused while a grid session is running,
    /// since that session can only end through its own game over.
    pub fn open_chase(&mut self) -> bool {
        if self.screen == Screen::Playing {
            log::debug!("chase not opened, a session is in progress");
            return false;
        }
        self.chase.reset();
        self.latch.disarm();
        self.screen = Screen::Chase;
        true
    }

    pub fn restart_chase(&mut self) {
        if self.screen == Screen::Chase {
            self.chase.restart();
        }
    }

    /// A click at canvas coordinates. Returns true if anything changed.
    pub fn click(&mut self, px: f64, py: f64) -> bool {
        match self.screen {
            Screen::Playing => {
                let Some(grid_size) = self.machine.round().map(|r| r.grid_size) else {
                    return false;
                };
                let Some(index) = self
                    .board
                    .cell_at(px, py, grid_size)
                    .and_then(|i| self.latch.activate(i))
                else {
                    return false;
                };
                self.cell_activated(index);
                true
            }
            Screen::Chase => {
                let (ox, oy) = self.chase_origin;
                let (dx, dy) = (px - ox, py - oy);
                let extent = (PLAY_AREA + CUBE_SIZE) as f64;
                if dx < 0.0 || dy < 0.0 || dx >= extent || dy >= extent {
                    return false;
                }
                self.chase.click_at(dx as u32, dy as u32)
            }
            Screen::Idle | Screen::GameOver => false,
        }
    }

    fn cell_activated(&mut self, index: u32) {
        match self.machine.report_click(index) {
            ClickOutcome::Advanced(round) => self.latch.arm(&round),
            ClickOutcome::GameOver(_) => self.game_over(),
            ClickOutcome::Ignored => {}
        }
    }

    fn game_over(&mut self) {
        self.latch.disarm();
        self.screen = Screen::GameOver;
    }

    /// Apply elapsed clock time
    pub fn tick(&mut self) {
        match self.screen {
            Screen::Playing => {
                if let TickOutcome::GameOver(_) = self.machine.advance_clock() {
                    self.game_over();
                }
            }
            Screen::Chase => self.chase.advance_clock(),
            Screen::Idle | Screen::GameOver => {}
        }
    }

    /// Sessions finished since the last call. They are also recorded in the
    /// local top list so the game over screen can show them immediately.
    pub fn take_finished(&mut self) -> Vec<SessionResult> {
        let finished: Vec<SessionResult> = self.finished.borrow_mut().drain(..).collect();
        for result in &finished {
            if let Err(e) = self.leaderboard.submit(LeaderboardEntry::from(result)) {
                log::warn!("could not record score locally: {}", e);
            }
        }
        finished
    }

    /// Replace the local top list with one fetched by the page
    pub fn set_leaderboard(&mut self, entries: Vec<LeaderboardEntry>) {
        log::debug!("leaderboard updated with {} entries", entries.len());
        self.leaderboard.set_entries(entries);
    }

    pub fn top_entries(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard.fetch_top(TOP_ENTRIES).unwrap_or_else(|e| {
            log::warn!("failed to read leaderboard: {}", e);
            Vec::new()
        })
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            screen: self.screen,
            player: self.machine.player().map(|p| p.name()),
            state: self.machine.state(),
            result: self.machine.result(),
            chase: self.chase.state(),
            leaderboard: self.top_entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_core::{GameOverReason, ManualClock, Phase, TickSource};

    fn game() -> (ManualClock, WebGame<ManualClock>) {
        let clock = ManualClock::new();
        let game = WebGame::new(GameConfig::default(), clock.clone());
        (clock, game)
    }

    fn center_of(game: &WebGame<ManualClock>, index: u32) -> (f64, f64) {
        let grid_size = game.machine().round().unwrap().grid_size;
        let (x, y) = game.board.cell_origin(index, grid_size);
        let half = game.board.cell_size(grid_size) / 2.0;
        (x + half, y + half)
    }

    fn entry(name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            score,
            time: 60,
            rank: None,
        }
    }

    #[test]
    fn test_board_hit_testing() {
        let board = BoardLayout {
            x: 10.0,
            y: 10.0,
            size: 100.0,
            gap: 4.0,
        };
        // 2x2: cells of 48 with a 4px gap
        assert_eq!(board.cell_size(2), 48.0);
        assert_eq!(board.cell_at(10.0, 10.0, 2), Some(0));
        assert_eq!(board.cell_at(59.0, 20.0, 2), None);
        assert_eq!(board.cell_at(63.0, 20.0, 2), Some(1));
        assert_eq!(board.cell_at(63.0, 70.0, 2), Some(3));
        assert_eq!(board.cell_at(110.0, 20.0, 2), None);
        assert_eq!(board.cell_at(5.0, 20.0, 2), None);
    }

    #[test]
    fn test_click_before_start_is_ignored() {
        let (_, mut game) = game();
        assert_eq!(game.screen(), Screen::Idle);
        assert!(!game.click(100.0, 100.0));
        assert_eq!(game.machine().phase(), Phase::NotStarted);
    }

    #[test]
    fn test_taken_name_rejected_unless_saved() {
        let (_, mut game) = game();
        game.set_leaderboard(vec![entry("Nino", 12)]);

        assert_eq!(
            game.start("nino", None).unwrap_err(),
            NameError::Taken("nino".to_string())
        );
        assert_eq!(game.start("   ", None).unwrap_err(), NameError::Empty);
        assert!(game.start("Nino", Some("NINO")).is_ok());
        assert_eq!(game.screen(), Screen::Playing);
    }

    #[test]
    fn test_clicking_odd_cell_advances() {
        let (_, mut game) = game();
        game.start("Dato", None).unwrap();
        let odd = game.machine().state().unwrap().odd_index();
        let (x, y) = center_of(&game, odd);

        assert!(game.click(x, y));
        assert_eq!(game.machine().state().unwrap().score, 1);
        assert!(game.is_interactive());
        assert!(game.take_finished().is_empty());
    }

    #[test]
    fn test_wrong_click_hands_off_result_once() {
        let (clock, mut game) = game();
        game.start("Dato", None).unwrap();
        clock.advance(4_000);
        game.tick();

        let state = *game.machine().state().unwrap();
        let wrong = (state.odd_index() + 1) % state.round.cell_count();
        let (x, y) = center_of(&game, wrong);
        assert!(game.click(x, y));
        assert_eq!(game.screen(), Screen::GameOver);
        assert!(!game.click(x, y));

        let finished = game.take_finished();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].time_secs, 4);
        assert_eq!(finished[0].reason, GameOverReason::WrongCell { clicked: wrong });
        assert!(game.take_finished().is_empty());

        let top = game.top_entries();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Dato");
    }

    #[test]
    fn test_clock_runs_out() {
        let (clock, mut game) = game();
        game.start("Keti", None).unwrap();
        clock.advance(61_000);
        game.tick();
        assert_eq!(game.screen(), Screen::GameOver);
        assert_eq!(game.machine().state().unwrap().time_left, 0);
        assert_eq!(game.take_finished()[0].reason, GameOverReason::TimeUp);

        game.restart().unwrap();
        assert_eq!(game.screen(), Screen::Playing);
        assert_eq!(game.machine().state().unwrap().time_left, 60);
    }

    #[test]
    fn test_chase_click_hits_cube() {
        let (_, mut game) = game();
        assert!(game.open_chase());
        let chase = *game.chase();
        let (ox, oy) = game.chase_origin;

        assert!(!game.click(ox - 1.0, oy));
        assert!(game.click(ox + chase.x as f64 + 1.0, oy + chase.y as f64 + 1.0));
        assert_eq!(game.chase().score, 1);
        assert!(game.chase().started);
    }

    #[test]
    fn test_chase_refused_while_session_runs() {
        let (clock, mut game) = game();
        game.start("Dato", None).unwrap();

        assert!(!game.open_chase());
        assert_eq!(game.screen(), Screen::Playing);

        clock.advance(120_000);
        game.tick();
        assert_eq!(game.screen(), Screen::GameOver);
        assert!(!game.machine().is_playing());
        assert!(!game.machine().timer().is_active());
        assert_eq!(game.take_finished().len(), 1);

        assert!(game.open_chase());
        assert_eq!(game.screen(), Screen::Chase);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (_, mut game) = game();
        game.start("Tamar", None).unwrap();
        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(json["screen"], "Playing");
        assert_eq!(json["player"], "Tamar");
        assert_eq!(json["state"]["score"], 0);
        assert_eq!(json["state"]["time_left"], 60);
    }
}
