//! Round planning: grid size, colors and the odd cell

use crate::color::{generate_base_color, Rgb};
use crate::config::DifficultyCurve;
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

/// Everything a presenter needs to draw one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundDescriptor {
    /// 1-based round number within the session
    pub round: u32,
    /// Cells per side
    pub grid_size: u32,
    pub base_color: Rgb,
    pub diff_color: Rgb,
    /// Index of the odd cell, row-major in `0..grid_size²`
    pub odd_index: u32,
}

impl RoundDescriptor {
    /// Total number of cells in the grid
    pub fn cell_count(&self) -> u32 {
        self.grid_size * self.grid_size
    }

    /// Color of a single cell
    pub fn cell_color(&self, index: u32) -> Rgb {
        if index == self.odd_index {
            self.diff_color
        } else {
            self.base_color
        }
    }

    /// Row-major iterator over `(index, color)`
    pub fn cells(&self) -> impl Iterator<Item = (u32, Rgb)> + '_ {
        (0..self.cell_count()).map(move |i| (i, self.cell_color(i)))
    }

    /// `(row, col)` of a cell index
    pub fn position(&self, index: u32) -> (u32, u32) {
        (index / self.grid_size, index % self.grid_size)
    }

    /// Cell index at `(row, col)`, if inside the grid
    pub fn index_at(&self, row: u32, col: u32) -> Option<u32> {
        (row < self.grid_size && col < self.grid_size).then(|| row * self.grid_size + col)
    }
}

/// Derives each round from the current score
#[derive(Debug, Clone)]
pub struct RoundPlanner {
    curve: DifficultyCurve,
    rng: GameRng,
}

impl Default for RoundPlanner {
    fn default() -> Self {
        Self::new(DifficultyCurve::default())
    }
}

impl RoundPlanner {
    pub fn new(curve: DifficultyCurve) -> Self {
        Self {
            curve,
            rng: GameRng::new(),
        }
    }

    /// Create a planner with a fixed seed for reproducible rounds
    pub fn with_seed(curve: DifficultyCurve, seed: u64) -> Self {
        Self {
            curve,
            rng: GameRng::with_seed(seed),
        }
    }

    pub fn curve(&self) -> &DifficultyCurve {
        &self.curve
    }

    /// Difficulty level fed to the color generator
    pub fn difficulty_for_score(&self, score: u32) -> u32 {
        self.curve.difficulty_for_score(score)
    }

    /// Cells per side for a score
    pub fn grid_size_for_score(&self, score: u32) -> u32 {
        self.curve.grid_size_for_score(score)
    }

    /// Plan the round that follows `previous_score`
    pub fn plan_round(&mut self, previous_score: u32, round: u32) -> RoundDescriptor {
        let grid_size = self.grid_size_for_score(previous_score);
        let base_color = generate_base_color(&mut self.rng);
        let diff_color = self
            .curve
            .different_color(base_color, self.difficulty_for_score(previous_score));
        let odd_index = self.rng.below(grid_size * grid_size);

        RoundDescriptor {
            round,
            grid_size,
            base_color,
            diff_color,
            odd_index,
        }
    }
}

impl DifficultyCurve {
    /// Difficulty grows one level per point
    pub fn difficulty_for_score(&self, score: u32) -> u32 {
        score
    }

    /// `min_grid + score / scores_per_grid_step`, capped at `max_grid`
    pub fn grid_size_for_score(&self, score: u32) -> u32 {
        let steps = score / self.scores_per_grid_step.max(1);
        self.min_grid.saturating_add(steps).min(self.max_grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size_curve() {
        let planner = RoundPlanner::default();
        assert_eq!(planner.grid_size_for_score(0), 2);
        assert_eq!(planner.grid_size_for_score(2), 2);
        assert_eq!(planner.grid_size_for_score(3), 3);
        assert_eq!(planner.grid_size_for_score(17), 7);
        assert_eq!(planner.grid_size_for_score(18), 8);
        assert_eq!(planner.grid_size_for_score(u32::MAX), 8);
    }

    #[test]
    fn test_first_round_is_two_by_two() {
        let mut planner = RoundPlanner::with_seed(DifficultyCurve::default(), 1);
        let round = planner.plan_round(0, 1);
        assert_eq!(round.round, 1);
        assert_eq!(round.grid_size, 2);
        assert!(round.odd_index < 4);
        assert_ne!(round.base_color, round.diff_color);
    }

    #[test]
    fn test_exactly_one_odd_cell() {
        let mut planner = RoundPlanner::with_seed(DifficultyCurve::default(), 9);
        for score in 0..30 {
            let round = planner.plan_round(score, score + 1);
            let odd: Vec<u32> = round
                .cells()
                .filter(|&(_, color)| color == round.diff_color)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(odd, vec![round.odd_index]);
            assert_eq!(round.cells().count() as u32, round.cell_count());
        }
    }

    #[test]
    fn test_same_seed_same_rounds() {
        let mut a = RoundPlanner::with_seed(DifficultyCurve::default(), 77);
        let mut b = RoundPlanner::with_seed(DifficultyCurve::default(), 77);
        for score in 0..10 {
            assert_eq!(a.plan_round(score, 1), b.plan_round(score, 1));
        }
    }

    #[test]
    fn test_position_and_index_agree() {
        let mut planner = RoundPlanner::with_seed(DifficultyCurve::default(), 5);
        let round = planner.plan_round(9, 4);
        assert_eq!(round.grid_size, 5);
        let (row, col) = round.position(round.odd_index);
        assert_eq!(round.index_at(row, col), Some(round.odd_index));
        assert_eq!(round.index_at(5, 0), None);
    }

    #[test]
    fn test_odd_index_not_stuck() {
        let mut planner = RoundPlanner::with_seed(DifficultyCurve::default(), 11);
        let indices: std::collections::HashSet<u32> =
            (0..64).map(|_| planner.plan_round(0, 1).odd_index).collect();
        assert!(indices.len() > 1);
    }
}
