use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::piece::{ActivePiece, PieceKind};

/// Score values for line clears of 0 to 4 lines.
const SCORE_TABLE: [u64; 5] = [0, 100, 300, 500, 800];

/// Points per line for clears larger than any single piece can produce.
const SCORE_PER_LINE_BEYOND_TABLE: u64 = 200;

/// Returns the score awarded for clearing `lines` rows at once.
///
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
/// - 5 or more: 200 points per line
///
/// A single piece spans at most four rows, so more than four lines can only be
/// cleared on boards assembled cell-by-cell.
///
/// ```
/// use blockdrop_engine::line_clear_score;
///
/// assert_eq!(line_clear_score(0), 0);
/// assert_eq!(line_clear_score(4), 800);
/// assert_eq!(line_clear_score(6), 1200);
/// ```
#[must_use]
pub fn line_clear_score(lines: usize) -> u64 {
    SCORE_TABLE
        .get(lines)
        .copied()
        .unwrap_or(lines as u64 * SCORE_PER_LINE_BEYOND_TABLE)
}

/// Result of removing completed rows from a board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineClear {
    /// Number of rows removed.
    pub count: usize,
    /// Points awarded, see [`line_clear_score`].
    pub score: u64,
}

/// Content of a single board cell.
///
/// Only occupancy matters to the engine; the piece kind is kept for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Occupied cell with no piece identity (fixtures, garbage).
    Filled,
    /// Cell locked by a piece of the given kind.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    /// Character used by [`Board::from_ascii`] and board serialization.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Filled => '#',
            Block::Piece(kind) => kind.as_char(),
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Block::Empty),
            '#' => Some(Block::Filled),
            c => PieceKind::from_char(c).map(Block::Piece),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("board must have at least one row")]
    Empty,
    #[display("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("invalid cell character {found:?} at row {row}, column {column}")]
    InvalidCell {
        row: usize,
        column: usize,
        found: char,
    },
}

/// Fixed-size occupancy grid of locked cells.
///
/// Row 0 is the top of the board and column 0 its left edge. Dimensions are
/// chosen at construction and never change; clearing rows inserts empty rows
/// at the top to keep the row count.
///
/// Indexing outside `[0, rows) × [0, columns)` through [`Self::is_occupied`],
/// [`Self::block`] or [`Self::set_cell`] is a programming error and panics.
/// [`Self::get`] is the checked counterpart.
///
/// # Example
///
/// ```
/// use blockdrop_engine::{Block, Board};
///
/// let mut board = Board::new(4, 3);
/// for column in 0..3 {
///     board.set_cell(3, column, Block::Filled);
/// }
/// assert!(board.is_row_complete(3));
///
/// let clear = board.clear_completed_rows();
/// assert_eq!(clear.count, 1);
/// assert_eq!(clear.score, 100);
/// assert!(board.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Block>,
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: ["....", ".##.", "TTT#"] (one string per row, top first)
        self.to_ascii_rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Self::from_rows(rows.iter().map(String::as_str)).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.iter_rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for block in row {
                write!(f, "{}", block.as_char())?;
            }
        }
        Ok(())
    }
}

impl Board {
    pub const DEFAULT_ROWS: usize = 20;
    pub const DEFAULT_COLUMNS: usize = 10;

    /// Creates an empty board.
    ///
    /// # Panics
    ///
    /// Panics if `rows` or `columns` is zero.
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(rows > 0 && columns > 0, "board must not be empty");
        Self {
            rows,
            columns,
            cells: vec![Block::Empty; rows * columns],
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, row: usize, column: usize) -> usize {
        assert!(
            row < self.rows && column < self.columns,
            "cell ({row}, {column}) out of bounds for {}x{} board",
            self.rows,
            self.columns
        );
        row * self.columns + column
    }

    /// Returns the block at the given cell, or `None` if it is off the board.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<Block> {
        (row < self.rows && column < self.columns).then(|| self.cells[row * self.columns + column])
    }

    #[must_use]
    pub fn block(&self, row: usize, column: usize) -> Block {
        self.cells[self.index(row, column)]
    }

    #[must_use]
    pub fn is_occupied(&self, row: usize, column: usize) -> bool {
        self.block(row, column).is_occupied()
    }

    pub fn set_cell(&mut self, row: usize, column: usize, block: Block) {
        let index = self.index(row, column);
        self.cells[index] = block;
    }

    /// Returns the cells of one row, left to right.
    #[must_use]
    pub fn row(&self, row: usize) -> &[Block] {
        assert!(row < self.rows, "row {row} out of bounds");
        &self.cells[row * self.columns..][..self.columns]
    }

    /// Iterates rows from top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Block]> + '_ {
        self.cells.chunks_exact(self.columns)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|b| b.is_empty())
    }

    #[must_use]
    pub fn is_row_complete(&self, row: usize) -> bool {
        self.row(row).iter().all(|b| b.is_occupied())
    }

    #[must_use]
    pub fn count_complete_rows(&self) -> usize {
        self.iter_rows()
            .filter(|row| row.iter().all(|b| b.is_occupied()))
            .count()
    }

    /// Height of a column: `rows - index of its topmost occupied cell`, or 0 when empty.
    #[must_use]
    pub fn column_height(&self, column: usize) -> usize {
        (0..self.rows)
            .find(|&row| self.is_occupied(row, column))
            .map_or(0, |top| self.rows - top)
    }

    #[must_use]
    pub fn column_heights(&self) -> Vec<usize> {
        (0..self.columns).map(|x| self.column_height(x)).collect()
    }

    /// Removes every complete row, shifting the rows above it down.
    ///
    /// Empty rows are inserted at the top so the row count stays the same.
    pub fn clear_completed_rows(&mut self) -> LineClear {
        let columns = self.columns;
        let mut count = 0;
        for y in (0..self.rows).rev() {
            if self.is_row_complete(y) {
                count += 1;
                continue;
            }
            if count > 0 {
                let src = y * columns;
                self.cells
                    .copy_within(src..src + columns, (y + count) * columns);
            }
        }
        self.cells[..count * columns].fill(Block::Empty);
        LineClear {
            count,
            score: line_clear_score(count),
        }
    }

    /// Checks whether any occupied cell of the piece is off the board or on an
    /// occupied cell.
    #[must_use]
    pub fn is_colliding(&self, piece: &ActivePiece) -> bool {
        piece.occupied_cells().any(|(row, column)| {
            match (usize::try_from(row), usize::try_from(column)) {
                (Ok(row), Ok(column)) => self.get(row, column).is_none_or(Block::is_occupied),
                _ => true,
            }
        })
    }

    /// Locks a piece onto the board, tagging its cells with the piece kind.
    ///
    /// # Panics
    ///
    /// Panics if any cell of the piece is off the board.
    pub fn fill_piece(&mut self, piece: &ActivePiece) {
        debug_assert!(!self.is_colliding(piece), "filling a colliding piece");
        let block = Block::Piece(piece.kind());
        for (row, column) in piece.occupied_cells() {
            let row = usize::try_from(row).expect("piece row must be on the board");
            let column = usize::try_from(column).expect("piece column must be on the board");
            self.set_cell(row, column, block);
        }
    }

    /// Creates a board from an ASCII art representation.
    ///
    /// `.` is an empty cell, `#` an anonymous occupied cell and a piece letter
    /// (`O`, `J`, `L`, `Z`, `S`, `T`, `I`) a cell locked by that piece. Blank
    /// lines and surrounding whitespace are ignored; rows are top to bottom.
    pub fn from_ascii(art: &str) -> Result<Self, BoardParseError> {
        Self::from_rows(
            art.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    fn from_rows<'a, I>(rows: I) -> Result<Self, BoardParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut cells = vec![];
        let mut columns = None;
        let mut row_count = 0;
        for (y, line) in rows.into_iter().enumerate() {
            let len = line.chars().count();
            let expected = *columns.get_or_insert(len);
            if len != expected || len == 0 {
                return Err(BoardParseError::RaggedRow {
                    row: y,
                    expected,
                    actual: len,
                });
            }
            for (x, c) in line.chars().enumerate() {
                let block = Block::from_char(c).ok_or(BoardParseError::InvalidCell {
                    row: y,
                    column: x,
                    found: c,
                })?;
                cells.push(block);
            }
            row_count += 1;
        }
        let Some(columns) = columns else {
            return Err(BoardParseError::Empty);
        };
        Ok(Self {
            rows: row_count,
            columns,
            cells,
        })
    }

    /// Returns one string per row, top first, in the [`Self::from_ascii`] alphabet.
    #[must_use]
    pub fn to_ascii_rows(&self) -> Vec<String> {
        self.iter_rows()
            .map(|row| row.iter().map(|b| b.as_char()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceRotation;

    fn fill_row(board: &mut Board, row: usize) {
        for x in 0..board.columns() {
            board.set_cell(row, x, Block::Filled);
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(Board::DEFAULT_ROWS, Board::DEFAULT_COLUMNS);
        assert_eq!(board.rows(), 20);
        assert_eq!(board.columns(), 10);
        assert!(board.is_empty());
        assert_eq!(board.iter_rows().count(), 20);
        assert!(board.iter_rows().all(|row| row.len() == 10));
    }

    #[test]
    fn test_set_and_check_cell() {
        let mut board = Board::new(5, 4);
        assert!(!board.is_occupied(2, 3));
        board.set_cell(2, 3, Block::Piece(PieceKind::T));
        assert!(board.is_occupied(2, 3));
        assert_eq!(board.block(2, 3), Block::Piece(PieceKind::T));
        board.set_cell(2, 3, Block::Empty);
        assert!(!board.is_occupied(2, 3));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_is_occupied_out_of_bounds_panics() {
        let board = Board::new(5, 4);
        let _ = board.is_occupied(5, 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_set_cell_out_of_bounds_panics() {
        let mut board = Board::new(5, 4);
        board.set_cell(0, 4, Block::Filled);
    }

    #[test]
    fn test_get_is_checked() {
        let board = Board::new(5, 4);
        assert_eq!(board.get(4, 3), Some(Block::Empty));
        assert_eq!(board.get(5, 0), None);
        assert_eq!(board.get(0, 4), None);
    }

    #[test]
    fn test_clear_without_complete_rows_is_noop() {
        let mut board = Board::from_ascii(
            r"
            ....
            .#..
            ###.
            ",
        )
        .unwrap();
        let before = board.clone();
        assert_eq!(board.clear_completed_rows(), LineClear::default());
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_single_line_shifts_rows_down() {
        let mut board = Board::from_ascii(
            r"
            ....
            .#..
            ####
            #..#
            ",
        )
        .unwrap();
        let clear = board.clear_completed_rows();
        assert_eq!(
            clear,
            LineClear {
                count: 1,
                score: 100
            }
        );
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                ....
                ....
                .#..
                #..#
                ",
            )
            .unwrap()
        );
    }

    #[test]
    fn test_clear_non_adjacent_lines() {
        let mut board = Board::from_ascii(
            r"
            ..#.
            ####
            .#..
            ####
            #...
            ",
        )
        .unwrap();
        let clear = board.clear_completed_rows();
        assert_eq!(clear.count, 2);
        assert_eq!(clear.score, 300);
        assert_eq!(
            board.to_ascii_rows(),
            ["....", "....", "..#.", ".#..", "#..."]
        );
    }

    #[test]
    fn test_clear_all_rows() {
        let mut board = Board::new(6, 3);
        for y in 0..6 {
            fill_row(&mut board, y);
        }
        let clear = board.clear_completed_rows();
        assert_eq!(clear.count, 6);
        assert_eq!(clear.score, 1200);
        assert!(board.is_empty());
        assert_eq!(board.rows(), 6);
    }

    #[test]
    fn test_line_clear_score_table() {
        assert_eq!(line_clear_score(0), 0);
        assert_eq!(line_clear_score(1), 100);
        assert_eq!(line_clear_score(2), 300);
        assert_eq!(line_clear_score(3), 500);
        assert_eq!(line_clear_score(4), 800);
        assert_eq!(line_clear_score(5), 1000);
    }

    #[test]
    fn test_column_heights() {
        let board = Board::from_ascii(
            r"
            ....
            .#..
            .#..
            ##.#
            ",
        )
        .unwrap();
        assert_eq!(board.column_heights(), [1, 3, 0, 1]);
    }

    #[test]
    fn test_is_colliding() {
        let board = Board::from_ascii(
            r"
            ....
            ....
            ..#.
            ",
        )
        .unwrap();
        let o = |row, column| ActivePiece::new(PieceKind::O, PieceRotation::default(), row, column);
        assert!(!board.is_colliding(&o(0, 0)));
        assert!(!board.is_colliding(&o(1, 0)));
        assert!(board.is_colliding(&o(1, 1)));
        assert!(board.is_colliding(&o(2, 0)), "below the floor");
        assert!(board.is_colliding(&o(0, 3)), "past the right wall");
        assert!(board.is_colliding(&o(0, -1)), "past the left wall");
        assert!(board.is_colliding(&o(-1, 0)), "above the top");
    }

    #[test]
    fn test_fill_piece_tags_kind() {
        let mut board = Board::new(4, 4);
        let piece = ActivePiece::new(PieceKind::T, PieceRotation::default(), 2, 0);
        board.fill_piece(&piece);
        assert_eq!(board.to_ascii_rows(), ["....", "....", ".T..", "TTT."]);
    }

    #[test]
    fn test_from_ascii_errors() {
        assert_eq!(Board::from_ascii(""), Err(BoardParseError::Empty));
        assert_eq!(
            Board::from_ascii("...\n.."),
            Err(BoardParseError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            Board::from_ascii("..x"),
            Err(BoardParseError::InvalidCell {
                row: 0,
                column: 2,
                found: 'x'
            })
        );
    }

    #[test]
    fn test_board_serialization() {
        let board = Board::from_ascii(
            r"
            ....
            .L..
            #LLZ
            ",
        )
        .unwrap();
        let serialized = serde_json::to_string(&board).unwrap();
        assert_eq!(serialized, r##"["....",".L..","#LLZ"]"##);
        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);
        assert!(serde_json::from_str::<Board>(r#"["..", "..."]"#).is_err());
    }

    #[test]
    fn test_display() {
        let board = Board::from_ascii("..\n#.").unwrap();
        assert_eq!(board.to_string(), "..\n#.");
    }
}
