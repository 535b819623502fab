use crate::{
    CompletePieceDropError, PieceCollisionError,
    core::{
        board::{Board, LineClear},
        piece::{ActivePiece, PieceKind},
        simulator::{self, PlacementCandidate},
    },
};

use super::{game_stats::GameStats, piece_generator::PieceGenerator};

/// Live game state: the board, the falling piece, the piece supply and statistics.
///
/// This is the owner of the live [`Board`]. Searches receive `&Board` through
/// [`Self::board`] and work on their own clones.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    falling_piece: ActivePiece,
    generator: PieceGenerator,
    stats: GameStats,
    game_over: bool,
}

impl GameField {
    /// Creates a field with an empty `rows × columns` board and spawns the first piece.
    #[must_use]
    pub fn new(rows: usize, columns: usize, generator: PieceGenerator) -> Self {
        Self::with_board(Board::new(rows, columns), generator)
    }

    /// Creates a field on an existing board and spawns the first piece.
    ///
    /// The game starts over if the first piece collides at spawn.
    #[must_use]
    pub fn with_board(board: Board, mut generator: PieceGenerator) -> Self {
        let falling_piece = ActivePiece::spawn(generator.pop_next(), board.columns());
        let game_over = board.is_colliding(&falling_piece);
        Self {
            board,
            falling_piece,
            generator,
            stats: GameStats::new(),
            game_over,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> ActivePiece {
        self.falling_piece
    }

    /// The kind that will spawn after the falling piece locks.
    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.generator.peek_next()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn set_falling_piece(&mut self, piece: ActivePiece) -> Result<(), PieceCollisionError> {
        if self.board.is_colliding(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        self.falling_piece
            .move_left(&self.board)
            .then_some(())
            .ok_or(PieceCollisionError)
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        self.falling_piece
            .move_right(&self.board)
            .then_some(())
            .ok_or(PieceCollisionError)
    }

    pub fn try_move_down(&mut self) -> Result<(), PieceCollisionError> {
        self.falling_piece
            .move_down(&self.board)
            .then_some(())
            .ok_or(PieceCollisionError)
    }

    pub fn try_rotate(&mut self) -> Result<(), PieceCollisionError> {
        self.falling_piece
            .rotate_clockwise(&self.board)
            .then_some(())
            .ok_or(PieceCollisionError)
    }

    /// Moves the falling piece to the top of the board at the candidate's rotation and column.
    ///
    /// The kind of the falling piece is kept. Fails if the candidate is illegal
    /// on the current board.
    pub fn place(&mut self, candidate: PlacementCandidate) -> Result<(), PieceCollisionError> {
        let piece = simulator::spawn_piece(
            &self.board,
            self.falling_piece.kind(),
            candidate.rotation,
            candidate.column,
        )
        .ok_or(PieceCollisionError)?;
        self.falling_piece = piece;
        Ok(())
    }

    /// Ends the game without locking the falling piece.
    ///
    /// Used when the falling piece has no legal placement left.
    pub fn top_out(&mut self) {
        if !self.game_over {
            log::debug!("top-out after {} pieces", self.stats.completed_pieces());
        }
        self.game_over = true;
    }

    /// Drops the falling piece to its resting row and completes the drop.
    pub fn hard_drop(&mut self) -> (LineClear, Result<(), CompletePieceDropError>) {
        self.falling_piece = self.falling_piece.dropped(&self.board);
        self.complete_piece_drop()
    }

    /// Locks the falling piece, clears completed rows and spawns the next piece.
    ///
    /// Returns the line clear and an error if the next piece collides at spawn,
    /// which ends the game.
    pub fn complete_piece_drop(&mut self) -> (LineClear, Result<(), CompletePieceDropError>) {
        if self.game_over {
            return (LineClear::default(), Err(CompletePieceDropError::GameOver));
        }
        self.board.fill_piece(&self.falling_piece);
        let clear = self.board.clear_completed_rows();
        self.stats.complete_piece_drop(clear);

        self.falling_piece = ActivePiece::spawn(self.generator.pop_next(), self.board.columns());
        if self.board.is_colliding(&self.falling_piece) {
            self.game_over = true;
            log::debug!(
                "top-out after {} pieces, score {}",
                self.stats.completed_pieces(),
                self.stats.score()
            );
            return (clear, Err(CompletePieceDropError::NewPieceCollision));
        }

        (clear, Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Block, PieceRotation, PieceRule, PieceSeed};

    fn field(rows: usize, columns: usize) -> GameField {
        let seed = PieceSeed::from_bytes([7; 16]);
        GameField::new(rows, columns, PieceGenerator::with_seed(PieceRule::Uniform, seed))
    }

    #[test]
    fn test_next_piece_becomes_falling_piece() {
        let mut field = field(20, 10);
        let next = field.next_piece();
        let (_, result) = field.hard_drop();
        assert!(result.is_ok());
        assert_eq!(field.falling_piece().kind(), next);
        assert_eq!(field.falling_piece().top_row(), 0);
    }

    #[test]
    fn test_place_then_hard_drop_matches_simulation() {
        let mut field = field(20, 10);
        let kind = field.falling_piece().kind();
        let candidate = PlacementCandidate {
            rotation: PieceRotation::new(1),
            column: 0,
        };
        let expected = simulator::simulate(field.board(), kind, candidate.rotation, candidate.column)
            .unwrap()
            .into_board();
        field.place(candidate).unwrap();
        let (clear, result) = field.hard_drop();
        assert_eq!(clear.count, 0);
        assert!(result.is_ok());
        assert_eq!(field.board(), &expected);
    }

    #[test]
    fn test_place_rejects_out_of_bounds_column() {
        let mut field = field(20, 10);
        let before = field.falling_piece();
        let candidate = PlacementCandidate {
            rotation: PieceRotation::default(),
            column: 10,
        };
        assert!(field.place(candidate).is_err());
        assert_eq!(field.falling_piece(), before);
    }

    #[test]
    fn test_line_clear_updates_stats() {
        let mut field = field(4, 4);
        let kind = field.falling_piece().kind();
        // Leave exactly the cells the falling piece covers on the floor empty.
        let piece = field.falling_piece().dropped(field.board());
        let cells: Vec<_> = piece.occupied_cells().collect();
        for column in 0..4 {
            let row = 3;
            if !cells.contains(&(3, column)) {
                field.board.set_cell(row, usize::try_from(column).unwrap(), Block::Filled);
            }
        }
        let (clear, result) = field.hard_drop();
        assert!(result.is_ok(), "{kind:?}");
        assert_eq!(clear.count, 1);
        assert_eq!(field.stats().score(), 100);
        assert_eq!(field.stats().total_cleared_lines(), 1);
    }

    #[test]
    fn test_top_out_ends_game() {
        let mut field = field(4, 4);
        for row in 2..4 {
            for column in 0..3 {
                field.board.set_cell(row, column, Block::Filled);
            }
        }
        field
            .set_falling_piece(ActivePiece::spawn(PieceKind::O, 4))
            .unwrap();
        // The O lands on rows 0-1, where every kind spawns on a 4-wide board.
        let (clear, result) = field.hard_drop();
        assert_eq!(clear.count, 0);
        assert!(result.is_err_and(|e| e.is_new_piece_collision()));
        assert!(field.is_game_over());

        let (_, result) = field.hard_drop();
        assert!(result.is_err_and(|e| e.is_game_over()));
    }

    #[test]
    fn test_blocked_first_spawn_starts_over() {
        let board = Board::from_ascii(
            r"
            ######
            ......
            ......
            ",
        )
        .unwrap();
        let seed = PieceSeed::from_bytes([7; 16]);
        let mut field =
            GameField::with_board(board, PieceGenerator::with_seed(PieceRule::Uniform, seed));
        assert!(field.is_game_over());
        let (_, result) = field.hard_drop();
        assert!(result.is_err_and(|e| e.is_game_over()));
    }

    #[test]
    fn test_top_out_keeps_board() {
        let mut field = field(20, 10);
        let before = field.board().clone();
        field.top_out();
        assert!(field.is_game_over());
        assert_eq!(field.board(), &before);
        assert_eq!(field.stats().completed_pieces(), 0);
    }
}
