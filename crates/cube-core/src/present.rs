//! Presentation contract

use crate::machine::SessionResult;
use crate::planner::RoundDescriptor;

/// A surface that can draw rounds
pub trait Presenter {
    /// Draw every cell of `round`
    fn render(&mut self, round: &RoundDescriptor);

    /// Show the end-of-game screen
    fn render_game_over(&mut self, _result: &SessionResult) {}
}

/// Accepts at most one cell activation per rendered round.
///
/// Arm it with each new round; the first in-range activation is reported and
/// every later one is swallowed until the next round is armed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickLatch {
    armed: Option<ArmedRound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArmedRound {
    round: u32,
    cell_count: u32,
}

impl ClickLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one activation for `round`
    pub fn arm(&mut self, round: &RoundDescriptor) {
        self.armed = Some(ArmedRound {
            round: round.round,
            cell_count: round.cell_count(),
        });
    }

    /// Stop accepting activations
    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn is_interactive(&self) -> bool {
        self.armed.is_some()
    }

    /// Round currently accepting a click
    pub fn armed_round(&self) -> Option<u32> {
        self.armed.map(|a| a.round)
    }

    /// Turn a raw activation into `on_cell_activated(index)`, at most once
    pub fn activate(&mut self, index: u32) -> Option<u32> {
        let armed = self.armed?;
        if index >= armed.cell_count {
            return None;
        }
        self.armed = None;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn round(number: u32, grid_size: u32) -> RoundDescriptor {
        RoundDescriptor {
            round: number,
            grid_size,
            base_color: Rgb::new(10, 20, 30),
            diff_color: Rgb::new(90, 100, 110),
            odd_index: 0,
        }
    }

    #[test]
    fn test_single_activation_per_round() {
        let mut latch = ClickLatch::new();
        assert_eq!(latch.activate(0), None);

        latch.arm(&round(1, 2));
        assert!(latch.is_interactive());
        assert_eq!(latch.activate(3), Some(3));
        assert_eq!(latch.activate(3), None);
        assert_eq!(latch.activate(0), None);
        assert!(!latch.is_interactive());

        latch.arm(&round(2, 2));
        assert_eq!(latch.armed_round(), Some(2));
        assert_eq!(latch.activate(1), Some(1));
    }

    #[test]
    fn test_out_of_range_keeps_latch_armed() {
        let mut latch = ClickLatch::new();
        latch.arm(&round(1, 2));
        assert_eq!(latch.activate(4), None);
        assert!(latch.is_interactive());
        latch.disarm();
        assert_eq!(latch.activate(0), None);
    }

    #[derive(Default)]
    struct Recorder {
        drawn: Vec<u32>,
    }

    impl Presenter for Recorder {
        fn render(&mut self, round: &RoundDescriptor) {
            self.drawn.push(round.round);
        }
    }

    #[test]
    fn test_presenter_default_game_over_is_noop() {
        let mut recorder = Recorder::default();
        recorder.render(&round(1, 2));
        recorder.render_game_over(&SessionResult {
            name: "Ana".into(),
            score: 0,
            time_secs: 1,
            reason: crate::machine::GameOverReason::TimeUp,
        });
        assert_eq!(recorder.drawn, vec![1]);
    }
}
