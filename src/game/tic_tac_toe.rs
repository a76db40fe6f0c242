use std::fmt;

use super::board::{Cell, Grid, StateKey};
use super::state::BoardState;
use super::Mark;
use crate::error::IllegalMoveError;

pub const SIZE: usize = 3;
const WIN_LENGTH: usize = 3;

/// A `(row, col)` cell address.
pub type Square = (usize, usize);

/// 3×3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicTacToe {
    grid: Grid<SIZE, SIZE>,
    current: Mark,
    first_move: bool,
}

impl TicTacToe {
    pub fn new() -> Self {
        TicTacToe {
            grid: Grid::new(),
            current: Mark::X,
            first_move: true,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.grid.get(row, col)
    }

    /// Build a position from three row strings of `X`, `O` and `.`.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: [&str; SIZE], to_move: Mark) -> Self {
        let mut board = TicTacToe::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    'X' => Cell::X,
                    'O' => Cell::O,
                    _ => Cell::Empty,
                };
                board.grid.set(row, col, cell);
            }
        }
        board.current = to_move;
        board.first_move = board.grid.count(Cell::Empty) == SIZE * SIZE;
        board
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState for TicTacToe {
    type Move = Square;

    const NAME: &'static str = "tictactoe";
    const ACTIONS: usize = SIZE * SIZE;

    fn legal_moves(&self) -> Vec<Square> {
        (0..SIZE)
            .flat_map(|row| (0..SIZE).map(move |col| (row, col)))
            .filter(|&(row, col)| self.grid.get(row, col) == Cell::Empty)
            .collect()
    }

    fn is_legal(&self, (row, col): Square) -> bool {
        Grid::<SIZE, SIZE>::in_bounds(row, col) && self.grid.get(row, col) == Cell::Empty
    }

    fn apply(&mut self, (row, col): Square, mark: Mark) -> Result<(), IllegalMoveError> {
        if !Grid::<SIZE, SIZE>::in_bounds(row, col) {
            return Err(IllegalMoveError::OutOfBounds { row, col });
        }
        if self.grid.get(row, col) != Cell::Empty {
            return Err(IllegalMoveError::Occupied { row, col });
        }
        self.grid.set(row, col, mark.to_cell());
        Ok(())
    }

    fn undo(&mut self, (row, col): Square) {
        if Grid::<SIZE, SIZE>::in_bounds(row, col) {
            self.grid.set(row, col, Cell::Empty);
        }
    }

    fn has_won(&self, mark: Mark) -> bool {
        self.grid.has_line(mark.to_cell(), WIN_LENGTH)
    }

    fn is_full(&self) -> bool {
        self.grid.is_full()
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

    fn action_index((row, col): Square) -> usize {
        row * SIZE + col
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)
    }
}
