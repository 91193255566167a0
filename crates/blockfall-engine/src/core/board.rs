use serde::{Deserialize, Serialize};

use super::{BOARD_WIDTH, BUFFER_HEIGHT, PieceKind, TOTAL_HEIGHT, VISIBLE_HEIGHT, piece::Piece};

/// A single board cell: empty, or filled by a locked piece of some kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// `.` for an empty cell, the piece letter otherwise.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Filled(kind) => kind.as_char(),
        }
    }
}

type Row = [Cell; BOARD_WIDTH];

const EMPTY_ROW: Row = [Cell::Empty; BOARD_WIDTH];

fn is_row_filled(row: &Row) -> bool {
    row.iter().all(|cell| !cell.is_empty())
}

/// Fixed-size grid of locked cells.
///
/// The board is [`BOARD_WIDTH`] columns by [`TOTAL_HEIGHT`] rows. The top
/// [`BUFFER_HEIGHT`] rows are a hidden spawn buffer; the remaining
/// [`VISIBLE_HEIGHT`] rows are shown to the player. Row 0 is the top of the
/// buffer. Dimensions never change after creation.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::EMPTY;
/// let piece = Piece::spawn(PieceKind::O);
/// let landed = piece.drop_position(&board);
/// board.fill_piece(landed);
/// assert_eq!(board.clear_lines(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [Row; TOTAL_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const VISIBLE_HEIGHT: usize = VISIBLE_HEIGHT;
    pub const BUFFER_HEIGHT: usize = BUFFER_HEIGHT;
    pub const TOTAL_HEIGHT: usize = TOTAL_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [EMPTY_ROW; TOTAL_HEIGHT],
    };

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows[y][x]
    }

    #[cfg(test)]
    pub(crate) fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y][x] = cell;
    }

    /// Returns every row, hidden buffer first.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows.iter()
    }

    /// Returns the rows shown to the player, top to bottom.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows[BUFFER_HEIGHT..].iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|cell| cell.is_empty())
    }

    fn is_cell_free(&self, x: i32, y: i32) -> bool {
        let Ok(col) = usize::try_from(x) else {
            return false;
        };
        if col >= BOARD_WIDTH {
            return false;
        }
        // Cells above the buffer are never checked against occupancy.
        let Ok(row) = usize::try_from(y) else {
            return true;
        };
        row < TOTAL_HEIGHT && self.rows[row][col].is_empty()
    }

    /// Checks whether every occupied cell of `piece` lies inside the walls,
    /// above the floor, and on an empty cell.
    #[must_use]
    pub fn is_valid(&self, piece: &Piece) -> bool {
        piece
            .occupied_positions()
            .all(|(x, y)| self.is_cell_free(x, y))
    }

    /// Writes the piece's cells into the board.
    ///
    /// Cells outside the board are skipped; callers only lock pieces that
    /// passed [`Self::is_valid`].
    pub fn fill_piece(&mut self, piece: Piece) {
        let cell = Cell::Filled(piece.kind());
        for (x, y) in piece.occupied_positions() {
            if let (Ok(col), Ok(row)) = (usize::try_from(x), usize::try_from(y))
                && col < BOARD_WIDTH
                && row < TOTAL_HEIGHT
            {
                self.rows[row][col] = cell;
            }
        }
    }

    /// Returns a copy of this board with `piece` written into it.
    #[must_use]
    pub fn merged(&self, piece: Piece) -> Self {
        let mut board = self.clone();
        board.fill_piece(piece);
        board
    }

    /// Removes every completely filled row and returns how many were removed.
    ///
    /// Rows above a removed row shift down and empty rows are inserted at the
    /// top, so the total height is unchanged.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;
        for y in (0..TOTAL_HEIGHT).rev() {
            if is_row_filled(&self.rows[y]) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(EMPTY_ROW);
        count
    }

    /// Creates a board from ASCII art for testing.
    ///
    /// `.` is an empty cell and a piece letter (`I`, `O`, `S`, `Z`, `J`, `L`,
    /// `T`) is a filled cell. Each row must have exactly [`BOARD_WIDTH`] cells.
    /// Rows are aligned to the bottom of the board, so the last line of `art`
    /// is the floor row.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::EMPTY;
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(
            lines.len() <= TOTAL_HEIGHT,
            "At most {TOTAL_HEIGHT} rows are allowed, got {}",
            lines.len()
        );

        let top = TOTAL_HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<Cell> = line
                .chars()
                .map(|ch| match ch {
                    '.' => Cell::Empty,
                    _ => Cell::Filled(
                        PieceKind::from_char(ch)
                            .unwrap_or_else(|| panic!("Unknown cell character {ch:?}")),
                    ),
                })
                .collect();
            assert_eq!(
                cells.len(),
                BOARD_WIDTH,
                "Each row must have exactly {BOARD_WIDTH} cells, got {} at line {i}",
                cells.len(),
            );
            board.rows[top + i].copy_from_slice(&cells);
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::core::piece::{PiecePosition, PieceRotation};

    fn filled_count(board: &Board) -> usize {
        board.rows().flatten().filter(|c| !c.is_empty()).count()
    }

    #[test]
    fn test_empty_board() {
        let board = Board::EMPTY;
        assert!(board.is_empty());
        assert_eq!(board.rows().count(), TOTAL_HEIGHT);
        assert_eq!(board.visible_rows().count(), VISIBLE_HEIGHT);
    }

    #[test]
    fn test_is_valid_walls_and_floor() {
        let board = Board::EMPTY;
        // Horizontal I on the floor row.
        let on_floor = Piece::new(PieceKind::I, PieceRotation::SPAWN, PiecePosition::new(0, 20));
        assert!(board.is_valid(&on_floor));
        assert!(!board.is_valid(&on_floor.translated(0, 1)));
        assert!(!board.is_valid(&on_floor.translated(-1, 0)));
        assert!(board.is_valid(&on_floor.translated(6, 0)));
        assert!(!board.is_valid(&on_floor.translated(7, 0)));
    }

    #[test]
    fn test_cells_above_buffer_are_not_checked() {
        let board = Board::from_ascii(&"OOOOOOOOO.\n".repeat(TOTAL_HEIGHT));
        // Vertical I in the open column, hanging above row 0.
        let piece = Piece::new(PieceKind::I, PieceRotation::ALL[1], PiecePosition::new(7, -3));
        assert!(board.is_valid(&piece));
        assert!(!board.is_valid(&piece.translated(-1, 0)));
    }

    #[test]
    fn test_fill_piece_and_merged() {
        let board = Board::EMPTY;
        let piece = Piece::spawn(PieceKind::T).drop_position(&board);
        let merged = board.merged(piece);
        assert!(board.is_empty());
        assert_eq!(filled_count(&merged), 4);
        for (x, y) in piece.occupied_positions() {
            let (x, y) = (usize::try_from(x).unwrap(), usize::try_from(y).unwrap());
            assert_eq!(merged.cell(x, y), Cell::Filled(PieceKind::T));
        }
    }

    #[test]
    fn test_fill_piece_skips_cells_above_board() {
        let mut board = Board::EMPTY;
        let piece = Piece::new(PieceKind::I, PieceRotation::ALL[1], PiecePosition::new(0, -2));
        board.fill_piece(piece);
        assert_eq!(filled_count(&board), 2);
    }

    #[test]
    fn test_clear_lines_single_line() {
        let mut board = Board::from_ascii(
            r"
            ....T.....
            IIIIJJJJLL
            ",
        );
        assert_eq!(board.clear_lines(), 1);
        assert_eq!(board.cell(4, 21), Cell::Filled(PieceKind::T));
        assert_eq!(filled_count(&board), 1);
        assert_eq!(board.rows().count(), TOTAL_HEIGHT);
    }

    #[test]
    fn test_clear_lines_non_adjacent_rows() {
        let mut board = Board::from_ascii(
            r"
            ZZZZZZZZZZ
            .S........
            ZZZZZZZZZZ
            ..J.......
            ",
        );
        assert_eq!(board.clear_lines(), 2);
        let expected = Board::from_ascii(
            r"
            .S........
            ..J.......
            ",
        );
        assert_eq!(board, expected);
    }

    #[test]
    fn test_clear_lines_all_filled() {
        let mut board = Board::from_ascii(&"LLLLLLLLLL\n".repeat(TOTAL_HEIGHT));
        assert_eq!(board.clear_lines(), TOTAL_HEIGHT);
        assert!(board.is_empty());
    }

    #[test]
    fn test_from_ascii_bottom_aligned() {
        let board = Board::from_ascii("O.........");
        assert_eq!(board.cell(0, TOTAL_HEIGHT - 1), Cell::Filled(PieceKind::O));
        assert_eq!(board.cell(0, TOTAL_HEIGHT - 2), Cell::Empty);
    }

    fn arb_board() -> impl Strategy<Value = Board> {
        // Dense rows make full lines likely.
        proptest::collection::vec(proptest::bool::weighted(0.85), BOARD_WIDTH * TOTAL_HEIGHT)
            .prop_map(|cells| {
                let mut board = Board::EMPTY;
                for (i, filled) in cells.into_iter().enumerate() {
                    if filled {
                        board.set_cell(i % BOARD_WIDTH, i / BOARD_WIDTH, Cell::Filled(PieceKind::J));
                    }
                }
                board
            })
    }

    proptest! {
        #[test]
        fn prop_clear_without_full_rows_is_identity(board in arb_board()) {
            let has_full_row = board.rows().any(is_row_filled);
            let mut cleared = board.clone();
            let count = cleared.clear_lines();
            if has_full_row {
                prop_assert!(count > 0);
            } else {
                prop_assert_eq!(count, 0);
                prop_assert_eq!(cleared, board);
            }
        }

        #[test]
        fn prop_clear_preserves_unfilled_rows_in_order(board in arb_board()) {
            let kept: Vec<_> = board.rows().filter(|row| !is_row_filled(row)).copied().collect();
            let mut cleared = board.clone();
            let count = cleared.clear_lines();
            let rows: Vec<_> = cleared.rows().copied().collect();
            prop_assert!(rows[..count].iter().all(|row| *row == EMPTY_ROW));
            prop_assert_eq!(&rows[count..], kept.as_slice());
        }

        #[test]
        fn prop_valid_merge_sets_exactly_piece_cells(
            board in arb_board(),
            kind in 0..PieceKind::LEN,
            rotation in 0..4u8,
            x in -2..10i8,
            y in -2..22i8,
        ) {
            let piece = Piece::new(
                PieceKind::ALL[kind],
                PieceRotation::from_u8(rotation).unwrap(),
                PiecePosition::new(x, y),
            );
            prop_assume!(Board::EMPTY.is_valid(&piece));

            // Open up the piece's footprint so every in-bounds placement is valid.
            let mut board = board;
            for (x, y) in piece.occupied_positions() {
                if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
                    board.set_cell(x, y, Cell::Empty);
                }
            }
            prop_assert!(board.is_valid(&piece));
            let merged = board.merged(piece);
            let cells: Vec<_> = piece.occupied_positions().collect();
            for y in 0..TOTAL_HEIGHT {
                for x in 0..BOARD_WIDTH {
                    let pos = (i32::try_from(x).unwrap(), i32::try_from(y).unwrap());
                    let covered = cells.contains(&pos);
                    if covered {
                        prop_assert_eq!(merged.cell(x, y), Cell::Filled(piece.kind()));
                    } else {
                        prop_assert_eq!(merged.cell(x, y), board.cell(x, y));
                    }
                }
            }
        }
    }
}
