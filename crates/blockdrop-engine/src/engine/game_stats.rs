use serde::Serialize;

use crate::LineClear;

/// Game statistics tracking score, lines cleared, and piece count.
///
/// - **Score**: sum of [`line_clear_score`](crate::line_clear_score) over all clears
/// - **Completed pieces**: total number of pieces locked
/// - **Line clear distribution**: count of drops clearing 0, 1, 2, 3 and 4 lines
///
/// Scoring has no combo, back-to-back or level multipliers.
///
/// # Example
///
/// ```
/// use blockdrop_engine::{GameStats, LineClear};
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(LineClear { count: 4, score: 800 });
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: u64,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of drops by number of lines cleared.
    ///
    /// Index `n` counts drops that cleared exactly `n` lines. Clears of more
    /// than 4 lines (only possible on hand-built boards) are not counted here.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a piece is locked.
    pub const fn complete_piece_drop(&mut self, clear: LineClear) {
        self.completed_pieces += 1;
        self.total_cleared_lines += clear.count;
        if clear.count < self.line_cleared_counter.len() {
            self.line_cleared_counter[clear.count] += 1;
        }
        self.score += clear.score;
    }
}
