use std::iter;

use blockdrop_engine::Board;

/// Surface and structure measurements of a board.
///
/// All values are taken as the board stands, before any completed rows are
/// removed, so a placement that fills rows is credited with them here.
///
/// - `aggregate_height`: sum of column heights, where a column's height is
///   `rows - topmost occupied row` and an empty column counts 0
/// - `complete_lines`: rows with every cell occupied
/// - `holes`: empty cells with at least one occupied cell above them in the same column
/// - `bumpiness`: sum of absolute height differences between adjacent columns
///
/// # Example
///
/// ```
/// use blockdrop_engine::Board;
/// use blockdrop_evaluator::board_metrics::BoardMetrics;
///
/// let rows = ["....", ".#..", "....", "##.#"];
/// let board = Board::from_ascii(&rows.join("\n")).unwrap();
/// let metrics = BoardMetrics::from_board(&board);
/// assert_eq!(metrics.aggregate_height, 1 + 3 + 0 + 1);
/// assert_eq!(metrics.holes, 1);
/// assert_eq!(metrics.bumpiness, 2 + 3 + 1);
/// assert_eq!(metrics.complete_lines, 0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoardMetrics {
    pub aggregate_height: usize,
    pub complete_lines: usize,
    pub holes: usize,
    pub bumpiness: usize,
}

impl BoardMetrics {
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        let heights = board.column_heights();
        let occupied = column_occupied_cells(board);

        let aggregate_height = heights.iter().sum();
        // Every cell below the column top is either occupied or a hole.
        let holes = iter::zip(&heights, &occupied)
            .map(|(height, occupied)| height - occupied)
            .sum();
        let bumpiness = heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum();

        Self {
            aggregate_height,
            complete_lines: board.count_complete_rows(),
            holes,
            bumpiness,
        }
    }
}

fn column_occupied_cells(board: &Board) -> Vec<usize> {
    let mut occupied = vec![0; board.columns()];
    for row in board.iter_rows() {
        for (count, block) in iter::zip(&mut occupied, row) {
            if block.is_occupied() {
                *count += 1;
            }
        }
    }
    occupied
}
