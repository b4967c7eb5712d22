use crate::leaderboard::{BackgroundSubmitter, LeaderboardManager};
use crate::settings::{Mode, PlayerStore};
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use cube_core::{
    same_name, validate_name, ChaseGame, ClickLatch, ClickOutcome, Clock, Countdown, GameConfig,
    GameMachine, LeaderboardBackend, LeaderboardEntry, Player, RoundDescriptor, SessionResult,
    TickOutcome, PLAY_AREA, TOP_ENTRIES,
};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of handling an input event
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Asking for the player name
    NameEntry,
    /// Normal gameplay
    Playing,
    /// Result of the last session
    GameOver,
    /// Top scores
    Leaderboard,
    /// Click-the-cube variant
    Chase,
}

/// Wall clock for the countdown
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Where the renderer last drew the grid, for mapping mouse clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub x: u16,
    pub y: u16,
    pub cell_width: u16,
    pub cell_height: u16,
    /// Blank columns between cells
    pub gap: u16,
    pub grid_size: u32,
}

impl GridLayout {
    /// Cell index under a terminal position; gaps between cells miss
    pub fn cell_at(&self, column: u16, row: u16) -> Option<u32> {
        if column < self.x || row < self.y {
            return None;
        }
        let stride = self.cell_width + self.gap;
        let dx = column - self.x;
        let dy = row - self.y;
        if dx % stride >= self.cell_width {
            return None;
        }
        let col = (dx / stride) as u32;
        let row = (dy / self.cell_height) as u32;
        (col < self.grid_size && row < self.grid_size).then(|| row * self.grid_size + col)
    }
}

/// Terminal columns and rows per play-area unit in the chase view
pub const CHASE_UNITS_PER_COLUMN: u32 = 10;
pub const CHASE_UNITS_PER_ROW: u32 = 20;

/// Where the renderer last drew the chase area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaseLayout {
    pub x: u16,
    pub y: u16,
}

impl ChaseLayout {
    pub const fn columns() -> u16 {
        ((PLAY_AREA + cube_core::CUBE_SIZE) / CHASE_UNITS_PER_COLUMN) as u16
    }

    pub const fn rows() -> u16 {
        ((PLAY_AREA + cube_core::CUBE_SIZE) / CHASE_UNITS_PER_ROW) as u16
    }

    /// Play-area point at the center of a terminal cell
    pub fn to_play_area(&self, column: u16, row: u16) -> Option<(u32, u32)> {
        if column < self.x || row < self.y {
            return None;
        }
        let col = (column - self.x) as u32;
        let row = (row - self.y) as u32;
        if col >= Self::columns() as u32 || row >= Self::rows() as u32 {
            return None;
        }
        Some((
            col * CHASE_UNITS_PER_COLUMN + CHASE_UNITS_PER_COLUMN / 2,
            row * CHASE_UNITS_PER_ROW + CHASE_UNITS_PER_ROW / 2,
        ))
    }
}

pub type TuiCountdown = Countdown<InstantClock>;

/// Options the app is started with
pub struct AppSettings {
    pub config: GameConfig,
    pub theme: Theme,
    pub mode: Mode,
    /// Name from the command line
    pub name: Option<String>,
    pub leaderboard: Arc<LeaderboardManager>,
    pub player_store: PlayerStore,
}

/// The main application state
pub struct App {
    pub machine: GameMachine<TuiCountdown>,
    pub chase: ChaseGame<TuiCountdown>,
    /// One activation per rendered round
    latch: ClickLatch,
    /// Keyboard-selected cell
    pub cursor: u32,
    pub screen_state: ScreenState,
    /// Screen to return to from the leaderboard
    previous_screen: ScreenState,
    pub theme: Theme,
    /// Name being typed
    pub name_input: String,
    /// Validation problem shown under the name prompt
    pub name_error: Option<String>,
    /// Name saved from an earlier run, already registered
    saved_name: Option<String>,
    player_store: PlayerStore,
    /// Message to display
    pub message: Option<String>,
    message_timer: u32,
    pub leaderboard: Arc<LeaderboardManager>,
    /// Latest top list
    pub top_entries: Vec<LeaderboardEntry>,
    refreshed: Receiver<Vec<LeaderboardEntry>>,
    /// Filled in by the renderer
    pub grid_layout: Option<GridLayout>,
    pub chase_layout: Option<ChaseLayout>,
    start_mode: Mode,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        let sink = BackgroundSubmitter::new(Arc::clone(&settings.leaderboard), tx);
        let machine = GameMachine::new(settings.config.clone(), Countdown::new(InstantClock::new()))
            .with_sink(sink);
        let chase = ChaseGame::new(
            settings.config.chase_time_secs,
            Countdown::new(InstantClock::new()),
        );

        let saved_name = settings.player_store.load();
        let name_input = settings
            .name
            .clone()
            .or_else(|| saved_name.clone())
            .unwrap_or_default();

        let mut app = Self {
            machine,
            chase,
            latch: ClickLatch::new(),
            cursor: 0,
            screen_state: ScreenState::NameEntry,
            previous_screen: ScreenState::NameEntry,
            theme: settings.theme,
            name_input,
            name_error: None,
            saved_name,
            player_store: settings.player_store,
            message: None,
            message_timer: 0,
            leaderboard: settings.leaderboard,
            top_entries: Vec::new(),
            refreshed: rx,
            grid_layout: None,
            chase_layout: None,
            start_mode: settings.mode,
        };

        if settings.name.is_some() {
            app.submit_name();
        }
        app
    }

    /// Get the tick rate based on current screen
    pub fn get_tick_rate(&self) -> Duration {
        match self.screen_state {
            ScreenState::Playing | ScreenState::Chase => Duration::from_millis(50),
            _ => Duration::from_millis(100),
        }
    }

    /// Update timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        while let Ok(top) = self.refreshed.try_recv() {
            self.top_entries = top;
        }

        match self.screen_state {
            ScreenState::Playing => {
                if let TickOutcome::GameOver(result) = self.machine.advance_clock() {
                    self.on_game_over(result);
                }
            }
            ScreenState::Chase => self.chase.advance_clock(),
            _ => {}
        }
    }

    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 30;
    }

    /// Validate the typed name and start playing
    pub fn submit_name(&mut self) {
        let already_registered = self
            .saved_name
            .as_deref()
            .is_some_and(|saved| same_name(saved, &self.name_input));

        let player = if already_registered {
            Player::new(&self.name_input)
        } else {
            validate_name(&self.name_input, &*self.leaderboard)
        };

        match player {
            Ok(player) => {
                self.name_error = None;
                if !already_registered {
                    if let Err(e) = self.player_store.save(player.name()) {
                        log::warn!("could not save player name: {}", e);
                    }
                    self.saved_name = Some(player.name().to_string());
                }
                self.name_input = player.name().to_string();
                match self.start_mode {
                    Mode::Grid => self.start_game(player),
                    Mode::Chase => self.open_chase(),
                }
            }
            Err(e) => self.name_error = Some(e.to_string()),
        }
    }

    fn start_game(&mut self, player: Player) {
        self.chase.reset();
        let round = self.machine.start(player);
        self.arm_round(&round);
        self.screen_state = ScreenState::Playing;
    }

    fn restart_game(&mut self) {
        match Player::new(&self.name_input) {
            Ok(player) => self.start_game(player),
            Err(_) => self.screen_state = ScreenState::NameEntry,
        }
    }

    fn arm_round(&mut self, round: &RoundDescriptor) {
        self.latch.arm(round);
        self.cursor = self.cursor.min(round.cell_count() - 1);
    }

    /// Activate a cell of the current round
    pub fn select_cell(&mut self, index: u32) {
        let Some(index) = self.latch.activate(index) else {
            return;
        };
        match self.machine.report_click(index) {
            ClickOutcome::Advanced(round) => self.arm_round(&round),
            ClickOutcome::GameOver(result) => self.on_game_over(result),
            ClickOutcome::Ignored => {}
        }
    }

    fn on_game_over(&mut self, result: SessionResult) {
        self.latch.disarm();
        self.screen_state = ScreenState::GameOver;
        let msg = format!("Your score is {}", result.score);
        self.show_message(&msg);
    }

    fn open_chase(&mut self) {
        self.chase.reset();
        self.screen_state = ScreenState::Chase;
    }

    fn open_leaderboard(&mut self) {
        self.previous_screen = self.screen_state;
        self.screen_state = ScreenState::Leaderboard;
        match self.leaderboard.fetch_top(TOP_ENTRIES) {
            Ok(top) => self.top_entries = top,
            Err(e) => {
                log::warn!("failed to load leaderboard: {}", e);
                self.show_message("Leaderboard unavailable");
            }
        }
    }

    fn move_cursor(&mut self, d_row: i32, d_col: i32) {
        let Some(round) = self.machine.round() else {
            return;
        };
        let size = round.grid_size as i32;
        let (row, col) = round.position(self.cursor);
        let row = (row as i32 + d_row).clamp(0, size - 1);
        let col = (col as i32 + d_col).clamp(0, size - 1);
        self.cursor = (row * size + col) as u32;
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::NameEntry => self.handle_name_key(key),
            ScreenState::Playing => self.handle_playing_key(key),
            ScreenState::GameOver => self.handle_game_over_key(key),
            ScreenState::Leaderboard => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('l') | KeyCode::Enter) {
                    self.screen_state = self.previous_screen;
                } else if key.code == KeyCode::Char('q') {
                    return AppAction::Quit;
                }
                AppAction::Continue
            }
            ScreenState::Chase => self.handle_chase_key(key),
        }
    }

    fn handle_name_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc => return AppAction::Quit,
            KeyCode::Enter => self.submit_name(),
            KeyCode::Backspace => {
                self.name_input.pop();
                self.name_error = None;
            }
            KeyCode::Char(c) if self.name_input.chars().count() < 24 => {
                self.name_input.push(c);
                self.name_error = None;
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_playing_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_cell(self.cursor),
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_game_over_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char(' ') => self.restart_game(),
            KeyCode::Char('l') => self.open_leaderboard(),
            KeyCode::Char('c') => self.open_chase(),
            KeyCode::Char('p') => {
                self.screen_state = ScreenState::NameEntry;
                self.name_error = None;
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_chase_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Char('r') if self.chase.state().finished => self.chase.restart(),
            KeyCode::Char('g') | KeyCode::Esc => self.restart_game(),
            KeyCode::Char('l') => self.open_leaderboard(),
            _ => {}
        }
        AppAction::Continue
    }

    /// Handle a mouse event
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        match self.screen_state {
            ScreenState::Playing => {
                if let Some(index) = self.grid_layout.and_then(|l| l.cell_at(event.column, event.row)) {
                    self.cursor = index;
                    self.select_cell(index);
                }
            }
            ScreenState::Chase => {
                if let Some((px, py)) = self
                    .chase_layout
                    .and_then(|l| l.to_play_area(event.column, event.row))
                {
                    self.chase.click_at(px, py);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ThemeName;
    use cube_core::{MemoryLeaderboard, Phase};
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn temp_store(tag: &str) -> PlayerStore {
        let path = std::env::temp_dir().join(format!(
            "cube_game_app_{}_{}.json",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        PlayerStore::with_path(path)
    }

    fn app_with(tag: &str, name: Option<&str>, board: Arc<MemoryLeaderboard>) -> App {
        App::new(AppSettings {
            config: GameConfig::default(),
            theme: Theme::from_name(ThemeName::Dark),
            mode: Mode::Grid,
            name: name.map(str::to_string),
            leaderboard: Arc::new(LeaderboardManager::new(board)),
            player_store: temp_store(tag),
        })
    }

    #[test]
    fn test_name_prompt_without_name() {
        let app = app_with("prompt", None, Arc::new(MemoryLeaderboard::new()));
        assert_eq!(app.screen_state, ScreenState::NameEntry);
        assert_eq!(app.machine.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_blank_name_shows_error() {
        let mut app = app_with("blank", None, Arc::new(MemoryLeaderboard::new()));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.screen_state, ScreenState::NameEntry);
        assert!(app.name_error.is_some());
    }

    #[test]
    fn test_taken_name_shows_error() {
        let board = Arc::new(MemoryLeaderboard::new());
        board
            .submit(LeaderboardEntry {
                name: "Ana".into(),
                score: 36,
                time: 60,
                rank: None,
            })
            .unwrap();
        let app = app_with("taken", Some("ana"), board);
        assert_eq!(app.screen_state, ScreenState::NameEntry);
        assert!(app.name_error.as_deref().unwrap().contains("taken"));
    }

    #[test]
    fn test_odd_cell_click_advances() {
        let mut app = app_with("advance", Some("Mari"), Arc::new(MemoryLeaderboard::new()));
        assert_eq!(app.screen_state, ScreenState::Playing);

        let odd = app.machine.state().unwrap().odd_index();
        app.select_cell(odd);
        assert_eq!(app.machine.state().unwrap().score, 1);
        assert_eq!(app.screen_state, ScreenState::Playing);
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_repeated_click_on_wrong_cell_submits_once() {
        let board = Arc::new(MemoryLeaderboard::new());
        let mut app = app_with("double", Some("Luka"), Arc::clone(&board));
        let state = *app.machine.state().unwrap();
        let grid_size = state.round.grid_size;
        app.grid_layout = Some(GridLayout {
            x: 2,
            y: 3,
            cell_width: 4,
            cell_height: 2,
            gap: 1,
            grid_size,
        });
        let wrong = (state.odd_index() + 1) % state.round.cell_count();
        let column = 2 + (wrong % grid_size) as u16 * 5 + 1;
        let row = 3 + (wrong / grid_size) as u16 * 2;

        let release = MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            ..left_click(column, row)
        };
        app.handle_mouse(release);
        assert!(app.machine.is_playing());

        app.handle_mouse(left_click(column, row));
        assert_eq!(app.screen_state, ScreenState::GameOver);
        let result = app.machine.result().cloned().unwrap();
        assert_eq!(app.cursor, wrong);

        app.handle_mouse(left_click(column, row));
        assert_eq!(app.screen_state, ScreenState::GameOver);
        assert_eq!(app.machine.result(), Some(&result));

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.top_entries.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            app.tick();
        }
        std::thread::sleep(Duration::from_millis(50));
        app.tick();
        assert_eq!(board.count(), 1);
        assert_eq!(app.top_entries.len(), 1);
    }

    #[test]
    fn test_wrong_cell_ends_game_and_submits() {
        let board = Arc::new(MemoryLeaderboard::new());
        let mut app = app_with("wrong", Some("Giorgi"), Arc::clone(&board));
        let state = *app.machine.state().unwrap();
        let wrong = (state.odd_index() + 1) % state.round.cell_count();

        app.select_cell(wrong);
        assert_eq!(app.screen_state, ScreenState::GameOver);
        assert_eq!(app.machine.phase(), Phase::GameOver);

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.top_entries.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            app.tick();
        }
        assert_eq!(app.top_entries.len(), 1);
        assert_eq!(app.top_entries[0].name, "Giorgi");
        assert_eq!(board.count(), 1);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.screen_state, ScreenState::Playing);
        assert_eq!(app.machine.state().unwrap().score, 0);
    }

    #[test]
    fn test_cursor_stays_in_grid() {
        let mut app = app_with("cursor", Some("Irakli"), Arc::new(MemoryLeaderboard::new()));
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Right));
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.cursor, 3);
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Up));
        }
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_grid_layout_hit_testing() {
        let layout = GridLayout {
            x: 10,
            y: 5,
            cell_width: 4,
            cell_height: 2,
            gap: 1,
            grid_size: 3,
        };
        assert_eq!(layout.cell_at(10, 5), Some(0));
        assert_eq!(layout.cell_at(13, 6), Some(0));
        assert_eq!(layout.cell_at(14, 5), None);
        assert_eq!(layout.cell_at(15, 7), Some(4));
        assert_eq!(layout.cell_at(20, 9), Some(8));
        assert_eq!(layout.cell_at(25, 5), None);
        assert_eq!(layout.cell_at(9, 5), None);
    }

    #[test]
    fn test_chase_layout_maps_into_play_area() {
        let layout = ChaseLayout { x: 2, y: 1 };
        assert_eq!(layout.to_play_area(2, 1), Some((5, 10)));
        assert_eq!(layout.to_play_area(1, 1), None);
        let last_col = 2 + ChaseLayout::columns() - 1;
        let last_row = 1 + ChaseLayout::rows() - 1;
        assert!(layout.to_play_area(last_col, last_row).is_some());
        assert_eq!(layout.to_play_area(last_col + 1, last_row), None);
    }
}
