//! Side-effect-free placement simulation.
//!
//! A placement is addressed by a [`PlacementCandidate`]: a rotation plus the
//! board column of the piece's leftmost occupied cell. The simulator spawns the
//! piece with its topmost occupied cell on row 0, lets it fall one row at a
//! time exactly like live gravity, and writes it into a clone of the board.
//! The input board is never modified.
//!
//! ```
//! use blockdrop_engine::{Board, PieceKind, PieceRotation, simulator};
//!
//! let board = Board::new(6, 4);
//! let placed = simulator::simulate(&board, PieceKind::O, PieceRotation::default(), 2).unwrap();
//! assert_eq!(placed.resting_row(), 4);
//! assert_eq!(placed.board().column_heights(), [0, 0, 2, 2]);
//! assert!(board.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    piece::{ActivePiece, PieceKind, PieceRotation},
};

/// One hypothetical `(rotation, column)` placement of a piece.
///
/// `column` is the board column of the leftmost occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementCandidate {
    pub rotation: PieceRotation,
    pub column: usize,
}

/// Enumerates every candidate whose horizontal extent fits in `columns`.
///
/// Only rotations with distinct shapes are produced. Order is rotation
/// ascending, then column ascending.
pub fn candidates(kind: PieceKind, columns: usize) -> impl Iterator<Item = PlacementCandidate> {
    kind.distinct_rotations()
        .into_iter()
        .flat_map(move |rotation| {
            let width = kind.shape(rotation).bounds().width;
            (0..=columns.saturating_sub(width))
                .filter(move |&column| column + width <= columns)
                .map(move |column| PlacementCandidate { rotation, column })
        })
}

/// Upper bound on the number of candidates [`candidates`] yields.
#[must_use]
pub fn candidate_count(kind: PieceKind, columns: usize) -> usize {
    candidates(kind, columns).count()
}

/// Places the piece at the top of the board with its leftmost occupied cell at `column`.
///
/// Returns `None` when the piece does not fit horizontally or collides at that position.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn spawn_piece(
    board: &Board,
    kind: PieceKind,
    rotation: PieceRotation,
    column: usize,
) -> Option<ActivePiece> {
    let bounds = kind.shape(rotation).bounds();
    if column + bounds.width > board.columns() {
        return None;
    }
    let piece = ActivePiece::new(
        kind,
        rotation,
        -(bounds.top as i32),
        column as i32 - bounds.left as i32,
    );
    (!board.is_colliding(&piece)).then_some(piece)
}

/// Returns the board row of the piece's topmost occupied cell after a hard drop.
///
/// The piece advances one row at a time while it can move down, so overhangs
/// are respected. Returns `None` for an illegal candidate (see [`spawn_piece`]).
#[must_use]
pub fn hard_drop_row(
    board: &Board,
    kind: PieceKind,
    rotation: PieceRotation,
    column: usize,
) -> Option<usize> {
    let piece = spawn_piece(board, kind, rotation, column)?.dropped(board);
    usize::try_from(piece.top_row()).ok()
}

/// A board after a hypothetical placement, before any line clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedPlacement {
    piece: ActivePiece,
    board: Board,
}

impl SimulatedPlacement {
    /// The piece at its resting position.
    #[must_use]
    pub fn piece(&self) -> &ActivePiece {
        &self.piece
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn into_board(self) -> Board {
        self.board
    }

    /// Board row of the resting piece's topmost occupied cell.
    #[must_use]
    pub fn resting_row(&self) -> usize {
        usize::try_from(self.piece.top_row()).unwrap_or_default()
    }
}

/// Drops the piece at the given rotation and column onto a clone of `board`.
///
/// Returns `None` for an illegal candidate: the piece does not fit horizontally
/// or already collides at the top of the board.
#[must_use]
pub fn simulate(
    board: &Board,
    kind: PieceKind,
    rotation: PieceRotation,
    column: usize,
) -> Option<SimulatedPlacement> {
    let piece = spawn_piece(board, kind, rotation, column)?.dropped(board);
    let mut board = board.clone();
    board.fill_piece(&piece);
    Some(SimulatedPlacement { piece, board })
}
