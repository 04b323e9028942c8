use crate::config::{COLS, ROWS};
use crate::tetromino::{Tetromino, TetrominoType};

pub type Cell = Option<TetrominoType>;
pub type Row = [Cell; COLS];

/// The playfield. Always `ROWS` rows of `COLS` cells; row 0 is the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: Vec<Row>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            rows: vec![[None; COLS]; ROWS],
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Cell contents, or `None` when `(row, col)` lies off the board.
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
    }

    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        matches!(self.get(row, col), Some(Some(_)))
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.rows[row][col] = cell;
    }

    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| c.is_some()).count())
            .sum()
    }

    /// Writes the piece into the grid. Cells above the top edge are dropped.
    pub fn merge(&mut self, piece: &Tetromino) {
        for (row, col) in piece.cells() {
            if row >= 0 && (row as usize) < ROWS && col >= 0 && (col as usize) < COLS {
                self.rows[row as usize][col as usize] = Some(piece.t_type);
            }
        }
    }

    /// Indices of every completely filled row, top to bottom.
    pub fn full_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|cell| cell.is_some()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Drops the listed rows and refills the top with empty rows.
    pub fn remove_rows(&mut self, indices: &[usize]) {
        let mut kept: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, row)| *row)
            .collect();
        let missing = ROWS - kept.len();
        let mut rows = vec![[None; COLS]; missing];
        rows.append(&mut kept);
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, row: usize) {
        for col in 0..COLS {
            board.set(row, col, Some(TetrominoType::Z));
        }
    }

    #[test]
    fn new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.rows().len(), ROWS);
        assert_eq!(board.occupied_count(), 0);
        assert!(board.full_rows().is_empty());
    }

    #[test]
    fn get_outside_is_none() {
        let board = Board::new();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, COLS as i32), None);
        assert_eq!(board.get(ROWS as i32, 0), None);
        assert_eq!(board.get(0, 0), Some(None));
    }

    #[test]
    fn merge_skips_cells_above_the_top() {
        let mut board = Board::new();
        let mut piece = Tetromino::new(TetrominoType::O);
        piece.y = -1;
        board.merge(&piece);
        assert_eq!(board.occupied_count(), 2);
        assert!(board.is_occupied(0, piece.x));
        assert!(board.is_occupied(0, piece.x + 1));
    }

    #[test]
    fn full_rows_are_listed_top_to_bottom() {
        let mut board = Board::new();
        fill_row(&mut board, 17);
        fill_row(&mut board, 5);
        board.set(10, 3, Some(TetrominoType::T));
        assert_eq!(board.full_rows(), vec![5, 17]);
    }

    #[test]
    fn remove_rows_compacts_and_keeps_order() {
        let mut board = Board::new();
        board.set(15, 0, Some(TetrominoType::I));
        fill_row(&mut board, 16);
        board.set(17, 1, Some(TetrominoType::J));
        fill_row(&mut board, 18);
        board.set(19, 2, Some(TetrominoType::L));

        let before = board.occupied_count();
        let full = board.full_rows();
        board.remove_rows(&full);

        assert_eq!(board.rows().len(), ROWS);
        assert_eq!(board.occupied_count(), before - COLS * full.len());
        assert_eq!(board.get(17, 0), Some(Some(TetrominoType::I)));
        assert_eq!(board.get(18, 1), Some(Some(TetrominoType::J)));
        assert_eq!(board.get(19, 2), Some(Some(TetrominoType::L)));
        assert!(board.rows()[0].iter().all(|c| c.is_none()));
    }
}
