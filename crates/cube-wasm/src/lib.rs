//! WebAssembly build of the odd-color cube game
//!
//! Draws on a `<canvas>` and leaves everything networked to the page: finished
//! sessions go to a JS score callback, and the page pushes the current top
//! list back in with `set_leaderboard_json`.

use cube_core::{Clock, GameConfig, LeaderboardEntry, PLAYER_NAME_KEY};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, Performance, Storage};

mod game;
mod logger;
mod render;
mod theme;


pub use game::{Screen, WebGame};
pub use theme::Theme;

// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}

/// Clock backed by `performance.now()`
#[derive(Clone)]
pub struct PerformanceClock {
    performance: Performance,
}

impl PerformanceClock {
    pub fn new() -> Result<Self, JsValue> {
        let performance = web_sys::window()
            .ok_or("No window")?
            .performance()
            .ok_or("No performance timer")?;
        Ok(Self { performance })
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> u64 {
        self.performance.now() as u64
    }
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// The main WASM game controller
#[wasm_bindgen]
pub struct CubeGame {
    game: WebGame<PerformanceClock>,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    theme: Theme,
    score_callback: Option<js_sys::Function>,
    font_size: f64,
    width: u32,
    height: u32,
    dpr: f64,
}

#[wasm_bindgen]
impl CubeGame {
    /// Create a new game attached to a canvas element
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<CubeGame, JsValue> {
        let document = web_sys::window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?;

        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("Canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let ctx = canvas
            .get_context("2d")?
            .ok_or("Failed to get 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let mut game = CubeGame {
            game: WebGame::new(GameConfig::default(), PerformanceClock::new()?),
            canvas,
            ctx,
            theme: Theme::dark(),
            score_callback: None,
            font_size: 24.0,
            width: 820,
            height: 580,
            dpr: 1.0,
        };
        game.resize(game.width, game.height);
        log::info!("cube game attached to #{}", canvas_id);
        Ok(game)
    }

    /// Start a session for `name`. Rejected names come back as an error
    /// message for the page to show next to the name field.
    #[wasm_bindgen]
    pub fn start(&mut self, name: &str) -> Result<(), JsValue> {
        let saved = self.saved_player_name();
        let result = self.game.start(name, saved.as_deref());
        self.render();
        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(JsValue::from_str(&e.to_string())),
        }
    }

    /// Play again with the same player
    #[wasm_bindgen]
    pub fn restart(&mut self) -> bool {
        let restarted = self.game.restart().is_some();
        self.render();
        restarted
    }

    /// Handle a click at canvas (CSS pixel) coordinates
    #[wasm_bindgen]
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        let changed = self.game.click(x, y);
        if changed {
            self.flush_results();
            self.render();
        }
        changed
    }

    /// Update game state (call from requestAnimationFrame)
    #[wasm_bindgen]
    pub fn tick(&mut self) {
        self.game.tick();
        self.flush_results();
        self.render();
    }

    /// Switch to the click-the-cube variant. Returns false while a grid
    /// session is still running.
    #[wasm_bindgen]
    pub fn open_chase(&mut self) -> bool {
        let opened = self.game.open_chase();
        self.render();
        opened
    }

    #[wasm_bindgen]
    pub fn restart_chase(&mut self) {
        self.game.restart_chase();
        self.render();
    }

    /// Called with `{ name, score, time }` whenever a session ends. A returned
    /// promise is not awaited.
    #[wasm_bindgen]
    pub fn set_score_callback(&mut self, callback: js_sys::Function) {
        self.score_callback = Some(callback);
    }

    /// Replace the top list with `[{ name, score, time }, ...]` from the server
    #[wasm_bindgen]
    pub fn set_leaderboard_json(&mut self, json: &str) -> Result<(), JsValue> {
        let entries: Vec<LeaderboardEntry> =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.game.set_leaderboard(entries);
        self.render();
        Ok(())
    }

    /// Current top list as a JS array
    #[wasm_bindgen]
    pub fn leaderboard(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.game.top_entries()).map_err(JsValue::from)
    }

    /// Name remembered from an earlier visit
    #[wasm_bindgen]
    pub fn saved_player_name(&self) -> Option<String> {
        local_storage()?
            .get_item(PLAYER_NAME_KEY)
            .ok()
            .flatten()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    #[wasm_bindgen]
    pub fn save_player_name(&self, name: &str) -> Result<(), JsValue> {
        let storage = local_storage().ok_or("localStorage unavailable")?;
        storage.set_item(PLAYER_NAME_KEY, name.trim())
    }

    /// Get current game state as JSON
    #[wasm_bindgen]
    pub fn state_json(&self) -> String {
        serde_json::to_string(&self.game.snapshot()).unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn is_playing(&self) -> bool {
        self.game.screen() == Screen::Playing
    }

    /// Set the color theme
    #[wasm_bindgen]
    pub fn set_theme(&mut self, theme_name: &str) {
        self.theme = Theme::from_name(theme_name);
        self.render();
    }

    /// Resize the game canvas
    #[wasm_bindgen]
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(820);
        self.height = height.max(580);

        // Update dpr in case it changed (e.g., moving to different monitor)
        self.dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);

        self.canvas.set_width((self.width as f64 * self.dpr) as u32);
        self.canvas.set_height((self.height as f64 * self.dpr) as u32);

        let html_element: &HtmlElement = self.canvas.as_ref();
        let style = html_element.style();
        let _ = style.set_property("width", &format!("{}px", self.width));
        let _ = style.set_property("height", &format!("{}px", self.height));

        let _ = self.ctx.reset_transform();
        let _ = self.ctx.scale(self.dpr, self.dpr);

        self.render();
    }

    /// Hand finished sessions to the page
    fn flush_results(&mut self) {
        for result in self.game.take_finished() {
            let Some(callback) = &self.score_callback else {
                log::warn!("no score callback set, dropping score {} for {}", result.score, result.name);
                continue;
            };
            let entry = LeaderboardEntry::from(&result);
            let value = match serde_wasm_bindgen::to_value(&entry) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("failed to encode score: {}", e);
                    continue;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                log::warn!("failed to add score to leaderboard: {:?}", e);
            }
        }
    }

    /// Render the game to canvas
    fn render(&self) {
        render::render_game(&self.ctx, &self.game, &self.theme, self.width, self.height, self.font_size);
    }
}
