use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }
}

/// Canonical, hashable encoding of a board's contents: one character per
/// cell in row-major order (`X`, `O` or `.`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(String);

impl StateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StateKey {
    fn from(s: String) -> Self {
        StateKey(s)
    }
}

impl From<&str> for StateKey {
    fn from(s: &str) -> Self {
        StateKey(s.to_string())
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> Self {
        key.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line directions scanned for wins: right, down, down-right, down-left.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Fixed-size grid of cells. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid<const ROWS: usize, const COLS: usize> {
    cells: [[Cell; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> Grid<ROWS, COLS> {
    /// Create a new empty grid
    pub fn new() -> Self {
        Grid {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    pub fn in_bounds(row: usize, col: usize) -> bool {
        row < ROWS && col < COLS
    }

    /// Check if every cell is filled
    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|&c| c != Cell::Empty))
    }

    /// Number of cells holding `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == cell)
            .count()
    }

    /// True if `cell` occupies `length` consecutive cells along any row,
    /// column or diagonal. Scans every start cell.
    pub fn has_line(&self, cell: Cell, length: usize) -> bool {
        if cell == Cell::Empty || length == 0 {
            return false;
        }
        (0..ROWS).any(|row| {
            (0..COLS).any(|col| {
                DIRECTIONS
                    .iter()
                    .any(|&(dr, dc)| self.line_from(row, col, dr, dc, cell, length))
            })
        })
    }

    fn line_from(
        &self,
        row: usize,
        col: usize,
        dr: isize,
        dc: isize,
        cell: Cell,
        length: usize,
    ) -> bool {
        (0..length as isize).all(|i| {
            let r = row as isize + i * dr;
            let c = col as isize + i * dc;
            r >= 0
                && c >= 0
                && (r as usize) < ROWS
                && (c as usize) < COLS
                && self.cells[r as usize][c as usize] == cell
        })
    }

    /// Row-major encoding of the grid contents.
    pub fn state_key(&self) -> StateKey {
        self.cells
            .iter()
            .flat_map(|row| row.iter().map(|c| c.symbol()))
            .collect::<String>()
            .into()
    }
}

impl<const ROWS: usize, const COLS: usize> Default for Grid<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROWS: usize, const COLS: usize> fmt::Display for Grid<ROWS, COLS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}
