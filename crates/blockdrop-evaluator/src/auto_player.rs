use blockdrop_engine::{GameField, GameStats, LineClear};

use crate::placement_search::{NoLegalPlacementError, Placement, PlacementSearch};

/// Outcome of one automated turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
    pub placement: Placement,
    pub clear: LineClear,
}

/// Why an automated turn placed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TurnError {
    #[display("game is already over")]
    GameOver,
    /// The falling piece has no legal placement. The field is topped out.
    #[display("{_0}")]
    NoLegalPlacement(#[error(source)] NoLegalPlacementError),
}

/// Plays a [`GameField`] with a [`PlacementSearch`] choosing every placement.
///
/// Each turn searches the falling piece with the next piece as lookahead,
/// moves the falling piece to the chosen placement and hard-drops it.
///
/// # Example
///
/// ```
/// use blockdrop_engine::{GameField, PieceGenerator, PieceRule, PieceSeed};
/// use blockdrop_evaluator::{
///     auto_player::AutoPlayer,
///     placement_evaluator::HeuristicEvaluator,
///     placement_search::{PlacementSearch, SearchConfig},
/// };
///
/// let search = PlacementSearch::new(Box::new(HeuristicEvaluator::default()), SearchConfig::default());
/// let player = AutoPlayer::new(search);
/// let generator = PieceGenerator::with_seed(PieceRule::Bag7, PieceSeed::from_bytes([1; 16]));
/// let mut field = GameField::new(20, 10, generator);
/// let stats = player.play(&mut field, Some(10));
/// assert_eq!(stats.completed_pieces(), 10);
/// ```
#[derive(Debug)]
pub struct AutoPlayer<'a> {
    search: PlacementSearch<'a>,
}

impl<'a> AutoPlayer<'a> {
    #[must_use]
    pub fn new(search: PlacementSearch<'a>) -> Self {
        Self { search }
    }

    #[must_use]
    pub fn search(&self) -> &PlacementSearch<'a> {
        &self.search
    }

    /// Places the falling piece.
    ///
    /// Fails without placing anything when the game is already over or the
    /// piece has no legal placement; the latter tops out the field. A returned
    /// turn may still end the game if the following piece collides at spawn,
    /// so check [`GameField::is_game_over`].
    pub fn play_turn(&self, field: &mut GameField) -> Result<Turn, TurnError> {
        if field.is_game_over() {
            return Err(TurnError::GameOver);
        }
        let kind = field.falling_piece().kind();
        let placement = self
            .search
            .best_placement(field.board(), kind, Some(field.next_piece()))
            .and_then(|placement| {
                field
                    .place(placement.candidate())
                    .map(|()| placement)
                    .map_err(|_| NoLegalPlacementError { kind })
            });
        let placement = match placement {
            Ok(placement) => placement,
            Err(e) => {
                field.top_out();
                return Err(TurnError::NoLegalPlacement(e));
            }
        };
        let (clear, result) = field.hard_drop();
        if let Err(e) = result {
            log::debug!("game ended: {e}");
        }
        Ok(Turn { placement, clear })
    }

    /// Plays until the game ends or `max_pieces` pieces have been placed.
    ///
    /// Returns the statistics of the field afterwards.
    pub fn play(&self, field: &mut GameField, max_pieces: Option<usize>) -> GameStats {
        let mut placed = 0;
        while max_pieces.is_none_or(|max| placed < max) {
            if let Err(e) = self.play_turn(field) {
                log::debug!("no turn played: {e}");
                break;
            }
            placed += 1;
            if field.is_game_over() {
                break;
            }
        }
        log::info!(
            "placed {} pieces, cleared {} lines, score {}",
            field.stats().completed_pieces(),
            field.stats().total_cleared_lines(),
            field.stats().score()
        );
        field.stats().clone()
    }
}

#[cfg(test)]
mod tests {
    use blockdrop_engine::{Board, PieceGenerator, PieceRule, PieceSeed, simulator};

    use super::*;
    use crate::{placement_evaluator::HeuristicEvaluator, placement_search::SearchConfig};

    fn player(config: SearchConfig) -> AutoPlayer<'static> {
        AutoPlayer::new(PlacementSearch::new(
            Box::new(HeuristicEvaluator::default()),
            config,
        ))
    }

    fn field(rule: PieceRule) -> GameField {
        let seed = PieceSeed::from_bytes([0x5A; 16]);
        GameField::new(20, 10, PieceGenerator::with_seed(rule, seed))
    }

    #[test]
    fn test_turn_applies_searched_placement() {
        let player = player(SearchConfig::default());
        let mut field = field(PieceRule::Uniform);
        let kind = field.falling_piece().kind();
        let best = player
            .search()
            .best_placement(field.board(), kind, None)
            .unwrap();
        let expected = simulator::simulate(field.board(), kind, best.rotation, best.column)
            .unwrap()
            .into_board();

        let turn = player.play_turn(&mut field).unwrap();
        assert_eq!(turn.placement, best);
        assert_eq!(turn.clear, LineClear::default());
        assert_eq!(field.board(), &expected);
        assert_eq!(field.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_play_respects_piece_limit() {
        let player = player(SearchConfig::default());
        let mut field = field(PieceRule::Uniform);
        let stats = player.play(&mut field, Some(25));
        assert_eq!(stats.completed_pieces(), 25);
        assert_eq!(&stats, field.stats());
    }

    #[test]
    fn test_blocked_spawn_reports_game_over() {
        let mut rows = vec!["...#...#..", "..........", "#########.", ".........#"];
        rows.resize(20, "..........");
        let board = Board::from_ascii(&rows.join("\n")).unwrap();
        let player = player(SearchConfig::default());

        let field_for = |byte: u8| {
            let seed = PieceSeed::from_bytes([byte; 16]);
            GameField::with_board(board.clone(), PieceGenerator::with_seed(PieceRule::Uniform, seed))
        };

        for byte in 0..16 {
            let mut field = field_for(byte);
            let kind = field.falling_piece().kind();
            let turn = player.play_turn(&mut field);
            if field.is_game_over() && field.stats().completed_pieces() == 0 {
                assert_eq!(turn, Err(TurnError::GameOver), "{kind:?}");
            } else {
                assert!(turn.is_ok(), "{kind:?}");
            }

            // Stopping before the limit always means the game is over.
            let mut field = field_for(byte);
            let stats = player.play(&mut field, Some(5));
            if stats.completed_pieces() < 5 {
                assert!(field.is_game_over(), "seed byte {byte}");
            }
        }
    }

    #[test]
    fn test_turn_after_game_over_fails() {
        let player = player(SearchConfig::default());
        let mut field = field(PieceRule::Uniform);
        field.top_out();
        assert_eq!(player.play_turn(&mut field), Err(TurnError::GameOver));
        let stats = player.play(&mut field, Some(3));
        assert_eq!(stats.completed_pieces(), 0);
    }

    #[test]
    fn test_long_game_clears_lines() {
        for lookahead in [false, true] {
            let player = player(SearchConfig {
                lookahead,
                ..SearchConfig::default()
            });
            let mut field = field(PieceRule::Bag7);
            let stats = player.play(&mut field, Some(200));
            // 200 pieces are 800 cells, far more than a 20×10 board holds.
            assert_eq!(stats.completed_pieces(), 200, "lookahead: {lookahead}");
            assert!(stats.total_cleared_lines() >= 60, "lookahead: {lookahead}");
            assert!(!field.is_game_over());
        }
    }
}
