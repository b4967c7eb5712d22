//! Click-the-cube variant
//!
//! A single cube jumps to a random spot with new colors every time it is
//! clicked. The clock starts on the first click and the score is whatever was
//! collected when it hits zero.

use crate::color::{generate_base_color, Rgb};
use crate::countdown::TickSource;
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

/// Range of the cube's top-left offset on each axis
pub const PLAY_AREA: u32 = 440;
/// Side of the cube
pub const CUBE_SIZE: u32 = 60;

/// Snapshot of the chase board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaseState {
    pub x: u32,
    pub y: u32,
    pub cube_color: Rgb,
    pub background: Rgb,
    pub score: u32,
    pub time_left: u32,
    /// Clock has been started by a first click
    pub started: bool,
    pub finished: bool,
}

impl ChaseState {
    /// Whether a point in play-area coordinates lands on the cube
    pub fn hit(&self, px: u32, py: u32) -> bool {
        (self.x..self.x + CUBE_SIZE).contains(&px) && (self.y..self.y + CUBE_SIZE).contains(&py)
    }
}

pub struct ChaseGame<T: TickSource> {
    state: ChaseState,
    time_budget: u32,
    timer: T,
    rng: GameRng,
}

impl<T: TickSource> ChaseGame<T> {
    pub fn new(time_budget: u32, timer: T) -> Self {
        Self::with_rng(time_budget, timer, GameRng::new())
    }

    pub fn with_seed(time_budget: u32, timer: T, seed: u64) -> Self {
        Self::with_rng(time_budget, timer, GameRng::with_seed(seed))
    }

    fn with_rng(time_budget: u32, timer: T, rng: GameRng) -> Self {
        Self {
            state: ChaseState {
                x: 0,
                y: 0,
                cube_color: Rgb::new(0xe7, 0x4c, 0x3c),
                background: Rgb::new(0x10, 0x99, 0xbb),
                score: 0,
                time_left: time_budget,
                started: false,
                finished: false,
            },
            time_budget,
            timer,
            rng,
        }
    }

    pub fn state(&self) -> &ChaseState {
        &self.state
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Register a click on the cube. Returns false once the clock has run out.
    pub fn click(&mut self) -> bool {
        if self.state.finished {
            return false;
        }

        self.state.x = self.rng.below(PLAY_AREA);
        self.state.y = self.rng.below(PLAY_AREA);
        self.state.cube_color = generate_base_color(&mut self.rng);
        self.state.background = generate_base_color(&mut self.rng);
        self.state.score += 1;

        if !self.state.started {
            self.state.started = true;
            self.timer.start();
            log::debug!("chase clock started with {}s", self.state.time_left);
        }
        true
    }

    /// Click at a point; only hits on the cube count
    pub fn click_at(&mut self, px: u32, py: u32) -> bool {
        self.state.hit(px, py) && self.click()
    }

    pub fn tick(&mut self) {
        if !self.state.started || self.state.finished {
            return;
        }
        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left == 0 {
            self.state.finished = true;
            self.timer.stop();
            log::info!("chase finished with score {}", self.state.score);
        }
    }

    pub fn advance_clock(&mut self) {
        for _ in 0..self.timer.take_due() {
            self.tick();
            if self.state.finished {
                break;
            }
        }
    }

    /// Reset score and clock and start counting down again straight away
    pub fn restart(&mut self) {
        self.state.score = 0;
        self.state.time_left = self.time_budget;
        self.state.started = true;
        self.state.finished = false;
        self.timer.start();
    }

    /// Back to the untouched board; the clock waits for the next first click
    pub fn reset(&mut self) {
        self.timer.stop();
        self.state.score = 0;
        self.state.time_left = self.time_budget;
        self.state.started = false;
        self.state.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::{Countdown, ManualClock};

    fn game() -> (ManualClock, ChaseGame<Countdown<ManualClock>>) {
        let clock = ManualClock::new();
        let game = ChaseGame::with_seed(30, Countdown::new(clock.clone()), 12);
        (clock, game)
    }

    #[test]
    fn test_clock_waits_for_first_click() {
        let (clock, mut game) = game();
        clock.advance(10_000);
        game.advance_clock();
        game.tick();
        assert_eq!(game.state().time_left, 30);
        assert!(!game.timer().is_active());

        assert!(game.click());
        assert!(game.state().started);
        assert_eq!(game.state().score, 1);
        clock.advance(2_000);
        game.advance_clock();
        assert_eq!(game.state().time_left, 28);
    }

    #[test]
    fn test_cube_moves_inside_play_area() {
        let (_, mut game) = game();
        for _ in 0..50 {
            game.click();
            assert!(game.state().x < PLAY_AREA);
            assert!(game.state().y < PLAY_AREA);
        }
        assert_eq!(game.state().score, 50);
    }

    #[test]
    fn test_click_at_requires_hit() {
        let (_, mut game) = game();
        let state = *game.state();
        assert!(!game.click_at(state.x + CUBE_SIZE, state.y));
        assert!(game.click_at(state.x + 1, state.y + CUBE_SIZE - 1));
        assert_eq!(game.state().score, 1);
    }

    #[test]
    fn test_finishes_at_zero_and_restarts() {
        let (clock, mut game) = game();
        game.click();
        game.click();
        clock.advance(45_000);
        game.advance_clock();

        assert!(game.state().finished);
        assert_eq!(game.state().time_left, 0);
        assert!(!game.click());
        assert_eq!(game.state().score, 2);
        assert!(!game.timer().is_active());

        game.restart();
        assert_eq!(game.state().score, 0);
        assert_eq!(game.state().time_left, 30);
        assert!(game.timer().is_active());
        clock.advance(1_000);
        game.advance_clock();
        assert_eq!(game.state().time_left, 29);
    }

    #[test]
    fn test_reset_waits_for_click_again() {
        let (clock, mut game) = game();
        game.click();
        clock.advance(3_000);
        game.advance_clock();

        game.reset();
        assert!(!game.state().started);
        assert!(!game.timer().is_active());
        assert_eq!(game.state().score, 0);
        clock.advance(5_000);
        game.advance_clock();
        assert_eq!(game.state().time_left, 30);
    }
}
