use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::board::Board;

/// A falling piece with kind, rotation, and anchor position.
///
/// The anchor is the board coordinate of the top-left corner of the piece's
/// shape matrix. Shape matrices carry empty padding (e.g. the J-piece lives in
/// a 3×3 matrix whose bottom row is empty at spawn), so the anchor may point
/// outside the board while every occupied cell is still inside it. Coordinates
/// are therefore signed.
///
/// Translation and rotation helpers ([`Self::left`], [`Self::rotated_right`], ...)
/// return new pieces without checking the board. The `move_*` and
/// [`Self::rotate_clockwise`] methods check collisions and leave the piece
/// unchanged when blocked.
///
/// # Example
///
/// ```
/// use blockdrop_engine::{ActivePiece, Board, PieceKind};
///
/// let board = Board::new(20, 10);
/// let mut piece = ActivePiece::spawn(PieceKind::T, board.columns());
/// assert!(piece.move_left(&board));
/// assert!(piece.rotate_clockwise(&board));
/// assert!(piece.can_move_down(&board));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    kind: PieceKind,
    rotation: PieceRotation,
    row: i32,
    column: i32,
}

impl ActivePiece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, row: i32, column: i32) -> Self {
        Self {
            kind,
            rotation,
            row,
            column,
        }
    }

    /// Creates a piece at the top of a board with `columns` columns, centered horizontally.
    ///
    /// The shape matrix is centered and its topmost occupied cell is placed on
    /// row 0, the same position [`simulator::spawn_piece`] uses for rotation 0.
    ///
    /// [`simulator::spawn_piece`]: crate::simulator::spawn_piece
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn spawn(kind: PieceKind, columns: usize) -> Self {
        let rotation = PieceRotation::default();
        let column = columns.saturating_sub(kind.matrix_size()) / 2;
        let row = -(kind.shape(rotation).bounds().top as i32);
        Self::new(kind, rotation, row, column as i32)
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Board row of the shape matrix's top edge.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Board column of the shape matrix's left edge.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    #[must_use]
    pub fn shape(&self) -> ShapeMatrix {
        self.kind.shape(self.rotation)
    }

    /// Board row of the topmost occupied cell.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn top_row(&self) -> i32 {
        self.row + self.shape().bounds().top as i32
    }

    /// Board column of the leftmost occupied cell.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn left_column(&self) -> i32 {
        self.column + self.shape().bounds().left as i32
    }

    /// Returns `(row, column)` board coordinates of every occupied cell.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (row, column) = (self.row, self.column);
        self.shape()
            .occupied_offsets()
            .map(move |(dr, dc)| (row + dr as i32, column + dc as i32))
    }

    #[must_use]
    pub const fn left(&self) -> Self {
        Self::new(self.kind, self.rotation, self.row, self.column - 1)
    }

    #[must_use]
    pub const fn right(&self) -> Self {
        Self::new(self.kind, self.rotation, self.row, self.column + 1)
    }

    #[must_use]
    pub const fn up(&self) -> Self {
        Self::new(self.kind, self.rotation, self.row - 1, self.column)
    }

    #[must_use]
    pub const fn down(&self) -> Self {
        Self::new(self.kind, self.rotation, self.row + 1, self.column)
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self::new(
            self.kind,
            self.rotation.rotated_right(),
            self.row,
            self.column,
        )
    }

    /// Checks whether the piece can fall one row without leaving the board or
    /// overlapping an occupied cell.
    #[must_use]
    pub fn can_move_down(&self, board: &Board) -> bool {
        !board.is_colliding(&self.down())
    }

    pub fn move_left(&mut self, board: &Board) -> bool {
        self.try_replace(board, self.left())
    }

    pub fn move_right(&mut self, board: &Board) -> bool {
        self.try_replace(board, self.right())
    }

    pub fn move_down(&mut self, board: &Board) -> bool {
        self.try_replace(board, self.down())
    }

    /// Rotates the piece 90° clockwise.
    ///
    /// If the rotated piece collides, the simple kicks up, right, down, and left
    /// are tried in order. The piece is unchanged when all of them fail.
    pub fn rotate_clockwise(&mut self, board: &Board) -> bool {
        let rotated = self.rotated_right();
        let kicks = [
            rotated,
            rotated.up(),
            rotated.right(),
            rotated.down(),
            rotated.left(),
        ];
        for candidate in kicks {
            if self.try_replace(board, candidate) {
                return true;
            }
        }
        false
    }

    /// Returns the position the piece reaches by falling one row at a time
    /// until [`Self::can_move_down`] fails.
    #[must_use]
    pub fn dropped(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while dropped.can_move_down(board) {
            dropped = dropped.down();
        }
        dropped
    }

    fn try_replace(&mut self, board: &Board, candidate: Self) -> bool {
        if board.is_colliding(&candidate) {
            return false;
        }
        *self = candidate;
        true
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceRotation(u8);

impl Serialize for PieceRotation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for PieceRotation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let index = u8::deserialize(deserializer)?;
        if index > 3 {
            return Err(serde::de::Error::custom(format!(
                "rotation must be 0-3, got {index}"
            )));
        }
        Ok(Self(index))
    }
}

impl PieceRotation {
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    /// Creates a rotation from any index, reduced modulo 4.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_left(self) -> Self {
        Self((self.0 + 3) % 4)
    }
}

/// Kind of piece.
///
/// Discriminants follow the conventional index order O, J, L, Z, S, T, I.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// O-piece.
    O = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// Z-piece.
    Z = 3,
    /// S-piece.
    S = 4,
    /// T-piece.
    T = 5,
    /// I-piece.
    I = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::O,
        PieceKind::J,
        PieceKind::L,
        PieceKind::Z,
        PieceKind::S,
        PieceKind::T,
        PieceKind::I,
    ];

    /// Returns the kind with the given index, or `None` if `index >= 7`.
    ///
    /// ```
    /// use blockdrop_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_index(0), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_index(6), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_index(7), None);
    /// ```
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::LEN {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the shape matrix for the given rotation.
    #[must_use]
    pub const fn shape(self, rotation: PieceRotation) -> ShapeMatrix {
        PIECE_SHAPES[self as usize][rotation.index()]
    }

    /// Side length of this kind's square shape matrix.
    #[must_use]
    pub const fn matrix_size(self) -> usize {
        PIECE_SHAPES[self as usize][0].size()
    }

    /// Rotations that produce distinct occupied shapes, in ascending order.
    ///
    /// Padding is ignored, so the O-piece has one, the S-, Z- and I-pieces two,
    /// and the rest four.
    #[must_use]
    pub fn distinct_rotations(self) -> ArrayVec<PieceRotation, 4> {
        let mut seen: ArrayVec<ShapeMatrix, 4> = ArrayVec::new();
        let mut rotations = ArrayVec::new();
        for rotation in PieceRotation::ALL {
            let normalized = self.shape(rotation).normalized();
            if !seen.contains(&normalized) {
                seen.push(normalized);
                rotations.push(rotation);
            }
        }
        rotations
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::O => 'O',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::Z => 'Z',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::I => 'I',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// ```
    /// use blockdrop_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'O' => Some(PieceKind::O),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'Z' => Some(PieceKind::Z),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'I' => Some(PieceKind::I),
            _ => None,
        }
    }
}

/// Occupied region of a shape matrix, in matrix coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeBounds {
    pub top: usize,
    pub left: usize,
    pub height: usize,
    pub width: usize,
}

/// Square occupancy matrix of a piece in one rotation.
///
/// Matrices are stored in a fixed 4×4 array; only the top-left `size × size`
/// region is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMatrix {
    size: usize,
    cells: [[bool; 4]; 4],
}

impl ShapeMatrix {
    const fn from_rows(size: usize, cells: [[bool; 4]; 4]) -> Self {
        Self { size, cells }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_occupied(&self, row: usize, column: usize) -> bool {
        row < self.size && column < self.size && self.cells[row][column]
    }

    /// Iterates the `(row, column)` offsets of occupied cells, row-major.
    pub fn occupied_offsets(self) -> impl Iterator<Item = (usize, usize)> {
        let size = self.size;
        (0..size).flat_map(move |row| {
            (0..size).filter_map(move |column| self.cells[row][column].then_some((row, column)))
        })
    }

    /// Returns the rows of the matrix as booleans, top row first.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells[..self.size].iter().map(|row| &row[..self.size])
    }

    #[must_use]
    pub fn bounds(&self) -> ShapeBounds {
        let mut top = self.size;
        let mut bottom = 0;
        let mut left = self.size;
        let mut right = 0;
        for (row, column) in self.occupied_offsets() {
            top = top.min(row);
            bottom = bottom.max(row);
            left = left.min(column);
            right = right.max(column);
        }
        ShapeBounds {
            top,
            left,
            height: bottom + 1 - top,
            width: right + 1 - left,
        }
    }

    /// Returns the matrix rotated 90° clockwise.
    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        let mut cells = [[false; 4]; 4];
        let mut y = 0;
        while y < self.size {
            let mut x = 0;
            while x < self.size {
                cells[y][x] = self.cells[self.size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        Self::from_rows(self.size, cells)
    }

    /// Shifts the occupied cells to the top-left corner.
    fn normalized(self) -> Self {
        let bounds = self.bounds();
        let mut cells = [[false; 4]; 4];
        for (row, column) in self.occupied_offsets() {
            cells[row - bounds.top][column - bounds.left] = true;
        }
        Self::from_rows(self.size, cells)
    }
}

/// Generates all 4 rotation states by repeated 90° clockwise rotation.
const fn shape_rotations(shape: ShapeMatrix) -> [ShapeMatrix; 4] {
    let mut rotates = [shape; 4];
    let mut i = 1;
    while i < 4 {
        rotates[i] = rotates[i - 1].rotated_right();
        i += 1;
    }
    rotates
}

const PIECE_SHAPES: [[ShapeMatrix; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    const fn m(size: usize, cells: [[bool; 4]; 4]) -> [ShapeMatrix; 4] {
        shape_rotations(ShapeMatrix::from_rows(size, cells))
    }

    [
        // O-piece
        m(2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
        // J-piece
        m(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // L-piece
        m(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // Z-piece
        m(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
        // S-piece
        m(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // T-piece
        m(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
        // I-piece
        m(4, [EEEE, [C, C, C, C], EEEE, EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    fn render(shape: ShapeMatrix) -> Vec<String> {
        shape
            .rows()
            .map(|row| row.iter().map(|&c| if c { '#' } else { '.' }).collect())
            .collect()
    }

    #[test]
    fn test_four_rotations_return_original_shape() {
        for kind in PieceKind::ALL {
            let original = kind.shape(PieceRotation::default());
            let mut shape = original;
            for _ in 0..4 {
                shape = shape.rotated_right();
            }
            assert_eq!(shape, original, "{kind:?}");
            assert_eq!(
                kind.shape(PieceRotation::new(4)),
                original,
                "rotation index wraps for {kind:?}"
            );
        }
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceKind::ALL {
            for rotation in PieceRotation::ALL {
                assert_eq!(kind.shape(rotation).occupied_offsets().count(), 4);
            }
        }
    }

    #[test]
    fn test_rotation_is_clockwise() {
        assert_eq!(
            render(PieceKind::J.shape(PieceRotation::new(1))),
            [".##", ".#.", ".#."]
        );
        assert_eq!(
            render(PieceKind::T.shape(PieceRotation::new(1))),
            [".#.", ".##", ".#."]
        );
        assert_eq!(
            render(PieceKind::I.shape(PieceRotation::new(1))),
            ["..#.", "..#.", "..#.", "..#."]
        );
    }

    #[test]
    fn test_distinct_rotations() {
        let count = |kind: PieceKind| kind.distinct_rotations().len();
        assert_eq!(count(PieceKind::O), 1);
        assert_eq!(count(PieceKind::I), 2);
        assert_eq!(count(PieceKind::S), 2);
        assert_eq!(count(PieceKind::Z), 2);
        assert_eq!(count(PieceKind::J), 4);
        assert_eq!(count(PieceKind::L), 4);
        assert_eq!(count(PieceKind::T), 4);
        assert_eq!(
            PieceKind::S.distinct_rotations().as_slice(),
            &[PieceRotation::new(0), PieceRotation::new(1)]
        );
    }

    #[test]
    fn test_bounds() {
        let bounds = PieceKind::I.shape(PieceRotation::default()).bounds();
        assert_eq!(
            bounds,
            ShapeBounds {
                top: 1,
                left: 0,
                height: 1,
                width: 4
            }
        );
        let bounds = PieceKind::L.shape(PieceRotation::new(3)).bounds();
        assert_eq!((bounds.height, bounds.width), (3, 2));
    }

    #[test]
    fn test_spawn_is_centered() {
        let piece = ActivePiece::spawn(PieceKind::O, 10);
        assert_eq!((piece.row(), piece.column()), (0, 4));
        // The I-piece's occupied row is the second row of its matrix.
        let piece = ActivePiece::spawn(PieceKind::I, 10);
        assert_eq!((piece.row(), piece.column()), (-1, 3));
        let piece = ActivePiece::spawn(PieceKind::T, 10);
        assert_eq!((piece.row(), piece.column()), (0, 3));
    }

    #[test]
    fn test_spawn_top_cell_is_on_first_row() {
        for kind in PieceKind::ALL {
            let piece = ActivePiece::spawn(kind, 10);
            assert_eq!(piece.top_row(), 0, "{kind:?}");
            assert_eq!(piece.rotation(), PieceRotation::default());
            assert!(piece.occupied_cells().all(|(row, _)| row >= 0));
        }
    }

    #[test]
    fn test_moves_stop_at_walls() {
        let board = Board::new(6, 4);
        let mut piece = ActivePiece::spawn(PieceKind::O, board.columns());
        assert!(piece.move_left(&board));
        assert!(!piece.move_left(&board));
        assert_eq!(piece.left_column(), 0);
        assert!(piece.move_right(&board));
        assert!(piece.move_right(&board));
        assert!(!piece.move_right(&board));
        assert_eq!(piece.left_column(), 2);
    }

    #[test]
    fn test_move_down_stops_on_floor() {
        let board = Board::new(6, 4);
        let mut piece = ActivePiece::spawn(PieceKind::O, board.columns());
        let mut steps = 0;
        while piece.move_down(&board) {
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert!(!piece.can_move_down(&board));
        assert_eq!(piece, ActivePiece::spawn(PieceKind::O, 4).dropped(&board));
    }

    #[test]
    fn test_blocked_rotation_leaves_piece_unchanged() {
        // A vertical I in a one-column shaft cannot turn horizontal.
        let board = Board::from_ascii(
            r"
            #.##
            #.##
            #.##
            #.##
            ",
        )
        .unwrap();
        let mut piece = ActivePiece::new(PieceKind::I, PieceRotation::new(1), 0, -1);
        assert!(!board.is_colliding(&piece));
        let before = piece;
        assert!(!piece.rotate_clockwise(&board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_rotation_kicks_off_wall() {
        let board = Board::new(10, 6);
        // Vertical I hugging the left wall; rotating in place would stick out.
        let mut piece = ActivePiece::new(PieceKind::I, PieceRotation::new(1), 2, -1);
        assert_eq!(piece.left_column(), 1);
        assert!(piece.rotate_clockwise(&board));
        assert_eq!(piece.rotation(), PieceRotation::new(2));
        assert!(!board.is_colliding(&piece));
    }

    #[test]
    fn test_piece_kind_conversions() {
        for (index, kind) in PieceKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), index);
            assert_eq!(PieceKind::from_index(index), Some(kind));
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_index(PieceKind::LEN), None);
        assert_eq!(PieceKind::from_char('x'), None);
    }

    #[test]
    fn test_rotation_serialization() {
        let json = serde_json::to_string(&PieceRotation::new(3)).unwrap();
        assert_eq!(json, "3");
        assert_eq!(
            serde_json::from_str::<PieceRotation>("2").unwrap(),
            PieceRotation::new(2)
        );
        assert!(serde_json::from_str::<PieceRotation>("4").is_err());
    }
}
