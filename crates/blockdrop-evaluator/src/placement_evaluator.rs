//! Scoring of candidate boards.
//!
//! A [`PlacementEvaluator`] looks at the board produced by a hypothetical
//! placement (completed rows still in place) and returns a score where higher
//! is better. The search in [`crate::placement_search`] only depends on this
//! trait, so other evaluators can be plugged in next to [`HeuristicEvaluator`].

use std::fmt;

use blockdrop_engine::Board;

use crate::{board_metrics::BoardMetrics, weights::HeuristicWeights};

/// Evaluates candidate boards by assigning scores.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Scores a board after a placement and before its line clear (higher is better).
    fn evaluate_board(&self, board: &Board) -> f32;
}

/// Linear evaluator over aggregate height, completed lines, holes and bumpiness.
///
/// ```text
/// score = w_height·height + w_lines·lines + w_holes·holes + w_bumpiness·bumpiness
/// ```
///
/// # Example
///
/// ```
/// use blockdrop_engine::Board;
/// use blockdrop_evaluator::{
///     placement_evaluator::{HeuristicEvaluator, PlacementEvaluator as _},
///     weights::HeuristicWeights,
/// };
///
/// let evaluator = HeuristicEvaluator::new(HeuristicWeights::RECOMMENDED);
/// assert_eq!(evaluator.evaluate_board(&Board::new(20, 10)), 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeuristicEvaluator {
    weights: HeuristicWeights,
}

impl HeuristicEvaluator {
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }
}

impl PlacementEvaluator for HeuristicEvaluator {
    #[inline]
    fn evaluate_board(&self, board: &Board) -> f32 {
        self.weights.apply(&BoardMetrics::from_board(board))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filling_a_row_beats_leaving_it_open() {
        let evaluator = HeuristicEvaluator::default();
        let open = Board::from_ascii(
            r"
            ....
            ....
            ....
            ###.
            ",
        )
        .unwrap();
        let mut filled = open.clone();
        filled.set_cell(3, 3, blockdrop_engine::Block::Filled);
        assert!(evaluator.evaluate_board(&filled) > evaluator.evaluate_board(&open));
    }

    #[test]
    fn test_holes_are_penalized() {
        let evaluator = HeuristicEvaluator::default();
        let flat = Board::from_ascii(
            r"
            ....
            ....
            ##..
            ##..
            ",
        )
        .unwrap();
        let covered = Board::from_ascii(
            r"
            ....
            ....
            ##..
            #...
            ",
        )
        .unwrap();
        // Same heights and bumpiness; only the hole differs.
        assert_eq!(BoardMetrics::from_board(&covered).holes, 1);
        assert!(evaluator.evaluate_board(&covered) < evaluator.evaluate_board(&flat));
    }
}
