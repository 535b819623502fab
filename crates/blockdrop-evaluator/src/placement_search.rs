//! Placement search: choosing where the current piece should land.
//!
//! # How It Works
//!
//! 1. **Enumerate Candidates** - every distinct rotation (ascending) and every
//!    column where the rotated piece fits (ascending)
//! 2. **Simulate** - drop the piece onto a clone of the board; illegal
//!    candidates are skipped
//! 3. **Score** - evaluate the resulting board with a [`PlacementEvaluator`]
//! 4. **Select** - keep the highest score; ties go to the candidate enumerated first
//!
//! # Lookahead
//!
//! With [`SearchConfig::lookahead`] enabled and the next piece known, each
//! candidate board has its completed rows removed and the next piece is
//! searched on it. The candidate's score becomes its own score plus the best
//! score of the next piece, or negative infinity when the next piece has no
//! legal placement.
//!
//! Lookahead multiplies the number of simulations: every current candidate is
//! simulated, then every next candidate on each of their boards. When
//! `candidates(current) + candidates(current) × candidates(next)` exceeds
//! [`SearchConfig::max_candidates`], the search falls back to a single level.
//!
//! # Parallelism
//!
//! With the `parallel` feature and [`SearchConfig::parallel`] set, candidates
//! are scored on the rayon thread pool. Scores are collected in enumeration
//! order before selection, so the result is the same as a serial search.
//!
//! # Usage
//!
//! ```
//! use blockdrop_engine::{Board, PieceKind};
//! use blockdrop_evaluator::{
//!     placement_evaluator::HeuristicEvaluator,
//!     placement_search::{PlacementSearch, SearchConfig},
//! };
//!
//! let search = PlacementSearch::new(Box::new(HeuristicEvaluator::default()), SearchConfig::default());
//! let board = Board::new(20, 10);
//! let placement = search.best_placement(&board, PieceKind::T, Some(PieceKind::I)).unwrap();
//! assert_eq!(placement.kind, PieceKind::T);
//! assert!(placement.row < board.rows());
//! ```

use blockdrop_engine::{
    Board, PieceKind, PieceRotation,
    simulator::{self, PlacementCandidate, SimulatedPlacement},
};
use serde::{Deserialize, Serialize};

use crate::placement_evaluator::PlacementEvaluator;

/// Returned when no candidate of the piece fits on the board.
///
/// This is the game-over signal for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("no legal placement for {kind:?} piece")]
pub struct NoLegalPlacementError {
    pub kind: PieceKind,
}

/// Search options.
///
/// Missing fields deserialize to their [`Default`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Also search the next piece on each candidate board.
    pub lookahead: bool,
    /// Score candidates on the rayon thread pool (requires the `parallel` feature).
    pub parallel: bool,
    /// Upper bound on simulated candidates for a lookahead search, counting
    /// both levels.
    pub max_candidates: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            lookahead: false,
            parallel: true,
            max_candidates: Self::DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl SearchConfig {
    /// Large enough for a full lookahead on the 20×10 board (at most 34 + 34 × 34 candidates).
    pub const DEFAULT_MAX_CANDIDATES: usize = 4096;
}

/// The chosen placement of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: PieceKind,
    pub rotation: PieceRotation,
    /// Board column of the leftmost occupied cell.
    pub column: usize,
    /// Board row of the topmost occupied cell at rest.
    pub row: usize,
    /// Evaluator score, including the lookahead term when it was used.
    ///
    /// Non-finite scores serialize as the strings `"-inf"`, `"inf"` and `"nan"`.
    #[serde(with = "score_format")]
    pub score: f32,
}

mod score_format {
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f32),
        Text(String),
    }

    #[expect(clippy::trivially_copy_pass_by_ref)]
    pub(super) fn serialize<S>(score: &f32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *score {
            score if score.is_finite() => serializer.serialize_f32(score),
            score if score.is_nan() => serializer.serialize_str("nan"),
            score if score > 0.0 => serializer.serialize_str("inf"),
            _ => serializer.serialize_str("-inf"),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<f32, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(score) => Ok(score),
            Repr::Text(text) => match text.as_str() {
                "-inf" => Ok(f32::NEG_INFINITY),
                "inf" => Ok(f32::INFINITY),
                "nan" => Ok(f32::NAN),
                _ => Err(de::Error::invalid_value(
                    de::Unexpected::Str(&text),
                    &"a number, \"inf\", \"-inf\" or \"nan\"",
                )),
            },
        }
    }
}

impl Placement {
    #[must_use]
    pub fn candidate(&self) -> PlacementCandidate {
        PlacementCandidate {
            rotation: self.rotation,
            column: self.column,
        }
    }
}

/// Finds the best placement of a piece on a board.
#[derive(Debug)]
pub struct PlacementSearch<'a> {
    evaluator: Box<dyn PlacementEvaluator + 'a>,
    config: SearchConfig,
}

impl<'a> PlacementSearch<'a> {
    #[must_use]
    pub fn new(evaluator: Box<dyn PlacementEvaluator + 'a>, config: SearchConfig) -> Self {
        Self { evaluator, config }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the highest-scoring legal placement of `kind` on `board`.
    ///
    /// `next` is used only when lookahead is enabled and within the candidate
    /// budget. The board is never modified.
    pub fn best_placement(
        &self,
        board: &Board,
        kind: PieceKind,
        next: Option<PieceKind>,
    ) -> Result<Placement, NoLegalPlacementError> {
        let next = next
            .filter(|_| self.config.lookahead)
            .filter(|&next| self.lookahead_within_budget(kind, next, board.columns()));

        let best = match next {
            Some(next) => self.search(board, kind, |placed| self.score_with_lookahead(placed, next)),
            None => self.search(board, kind, |placed| {
                self.evaluator.evaluate_board(placed.board())
            }),
        };

        let Some(best) = best else {
            log::debug!("no legal placement for {kind:?}");
            return Err(NoLegalPlacementError { kind });
        };
        log::debug!(
            "{kind:?}: rotation {} column {} row {} score {:.3}{}",
            best.rotation.index(),
            best.column,
            best.row,
            best.score,
            if next.is_some() { " (lookahead)" } else { "" },
        );
        Ok(best)
    }

    fn lookahead_within_budget(&self, kind: PieceKind, next: PieceKind, columns: usize) -> bool {
        let depth1 = simulator::candidate_count(kind, columns);
        let depth2 = simulator::candidate_count(next, columns);
        let total = depth1.saturating_add(depth1.saturating_mul(depth2));
        if total > self.config.max_candidates {
            log::trace!(
                "lookahead needs {total} candidates (limit {}), searching one level",
                self.config.max_candidates
            );
            return false;
        }
        true
    }

    fn score_with_lookahead(&self, placed: &SimulatedPlacement, next: PieceKind) -> f32 {
        let score = self.evaluator.evaluate_board(placed.board());
        let mut board = placed.board().clone();
        board.clear_completed_rows();
        let follow_up = self
            .search(&board, next, |placed| {
                self.evaluator.evaluate_board(placed.board())
            })
            .map_or(f32::NEG_INFINITY, |best| best.score);
        score + follow_up
    }

    fn search<F>(&self, board: &Board, kind: PieceKind, score: F) -> Option<Placement>
    where
        F: Fn(&SimulatedPlacement) -> f32 + Sync,
    {
        let evaluate = |candidate: PlacementCandidate| {
            let placed = simulator::simulate(board, kind, candidate.rotation, candidate.column)?;
            Some(Placement {
                kind,
                rotation: candidate.rotation,
                column: candidate.column,
                row: placed.resting_row(),
                score: score(&placed),
            })
        };

        #[cfg(feature = "parallel")]
        if self.config.parallel {
            use rayon::prelude::*;

            let candidates: Vec<_> = simulator::candidates(kind, board.columns()).collect();
            let scored: Vec<_> = candidates.into_par_iter().map(evaluate).collect();
            return select_best(scored.into_iter().flatten());
        }

        select_best(simulator::candidates(kind, board.columns()).filter_map(evaluate))
    }
}

/// Picks the maximum score, keeping the earliest placement on ties.
fn select_best<I>(placements: I) -> Option<Placement>
where
    I: IntoIterator<Item = Placement>,
{
    let mut best: Option<Placement> = None;
    for placement in placements {
        if best.is_none_or(|best| placement.score > best.score) {
            best = Some(placement);
        }
    }
    best
}
