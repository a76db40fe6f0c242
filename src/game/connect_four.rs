use std::fmt;

use super::board::{Cell, Grid, StateKey};
use super::state::BoardState;
use super::Mark;
use crate::error::IllegalMoveError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
const WIN_LENGTH: usize = 4;

/// 6×7 Connect Four board. Pieces drop to the lowest empty row of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectFour {
    grid: Grid<ROWS, COLS>,
    heights: [usize; COLS],
    current: Mark,
    first_move: bool,
}

impl ConnectFour {
    pub fn new() -> Self {
        ConnectFour {
            grid: Grid::new(),
            heights: [0; COLS],
            current: Mark::X,
            first_move: true,
        }
    }

    /// Get the cell at a specific position.
    /// Row 0 is the top, row 5 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.grid.get(row, col)
    }

    /// Row a piece dropped into `col` would land in, if the column has room.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= COLS || self.heights[col] >= ROWS {
            return None;
        }
        Some(ROWS - 1 - self.heights[col])
    }

    /// Check if a column is full (out-of-range columns count as full)
    pub fn is_column_full(&self, col: usize) -> bool {
        self.landing_row(col).is_none()
    }
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState for ConnectFour {
    type Move = usize;

    const NAME: &'static str = "connect4";
    const ACTIONS: usize = COLS;

    fn legal_moves(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    fn is_legal(&self, col: usize) -> bool {
        !self.is_column_full(col)
    }

    fn apply(&mut self, col: usize, mark: Mark) -> Result<(), IllegalMoveError> {
        if col >= COLS {
            return Err(IllegalMoveError::InvalidColumn(col));
        }
        let row = self
            .landing_row(col)
            .ok_or(IllegalMoveError::ColumnFull(col))?;
        self.grid.set(row, col, mark.to_cell());
        self.heights[col] += 1;
        Ok(())
    }

    fn undo(&mut self, col: usize) {
        if col >= COLS || self.heights[col] == 0 {
            return;
        }
        self.heights[col] -= 1;
        let row = ROWS - 1 - self.heights[col];
        self.grid.set(row, col, Cell::Empty);
    }

    fn has_won(&self, mark: Mark) -> bool {
        self.grid.has_line(mark.to_cell(), WIN_LENGTH)
    }

    fn is_full(&self) -> bool {
        self.heights.iter().all(|&h| h == ROWS)
    }

    fn current_mark(&self) -> Mark {
        self.current
    }

    fn switch_turn(&mut self) {
        self.current = self.current.other();
    }

    fn is_first_move(&self) -> bool {
        self.first_move
    }

    fn clear_first_move(&mut self) {
        self.first_move = false;
    }

    fn state_key(&self) -> StateKey {
        self.grid.state_key()
    }

    fn action_index(col: usize) -> usize {
        col
    }
}

impl fmt::Display for ConnectFour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)?;
        let labels: Vec<String> = (0..COLS).map(|c| c.to_string()).collect();
        writeln!(f, "{}", labels.join(" "))
    }
}
