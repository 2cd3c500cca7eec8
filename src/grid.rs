//! Board storage: N×N token matrix, cells, and initial board generation.

use crate::refill::TokenSource;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Token value: 0 is empty, 1..=K are candy variants.
pub type Token = u8;

/// Empty cell marker.
pub const EMPTY: Token = 0;

/// Number of candy variants colours exist for.
pub const MAX_VARIANTS: u8 = 6;

/// A board position. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance exactly 1 (4-neighbour). A cell is not adjacent to itself.
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {size}x{size} board")]
    InvalidCoordinate { row: usize, col: usize, size: usize },
    #[error("token {token} at {cell} is outside 0..={variants}")]
    InvalidToken {
        cell: Cell,
        token: Token,
        variants: u8,
    },
    #[error("board is not square: row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
}

/// How the starting board is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialBoard {
    /// No run of three on the starting board.
    #[default]
    Clean,
    /// Plain random board; any runs are resolved before the first move, unscored.
    Settle,
}

/// Square token matrix, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Token>,
}

impl Grid {
    /// All-empty board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![EMPTY; size * size],
        }
    }

    /// Build from explicit rows, checking shape and token range.
    pub fn from_rows(rows: &[Vec<Token>], variants: u8) -> Result<Self, GridError> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: values.len(),
                    size,
                });
            }
            for (col, &token) in values.iter().enumerate() {
                if token > variants {
                    return Err(GridError::InvalidToken {
                        cell: Cell::new(row, col),
                        token,
                        variants,
                    });
                }
            }
            cells.extend_from_slice(values);
        }
        Ok(Self { size, cells })
    }

    /// Random starting board holding only tokens in 1..=variants.
    ///
    /// With [`InitialBoard::Clean`] each cell avoids the token that would
    /// complete a run with the two cells to its left or the two above it.
    /// At most two tokens are excluded per cell, so three variants always
    /// leave a choice. Below that a run may be unavoidable.
    pub fn random<S: TokenSource + ?Sized>(
        size: usize,
        variants: u8,
        source: &mut S,
        policy: InitialBoard,
    ) -> Self {
        let mut grid = Self::new(size);
        for row in 0..size {
            for col in 0..size {
                let mut banned = [EMPTY; 2];
                if policy == InitialBoard::Clean {
                    if col >= 2 {
                        let left = grid.cells[grid.index(row, col - 1)];
                        if left == grid.cells[grid.index(row, col - 2)] {
                            banned[0] = left;
                        }
                    }
                    if row >= 2 {
                        let up = grid.cells[grid.index(row - 1, col)];
                        if up == grid.cells[grid.index(row - 2, col)] {
                            banned[1] = up;
                        }
                    }
                }
                let allowed: Vec<Token> = (1..=variants).filter(|t| !banned.contains(t)).collect();
                let token = if allowed.is_empty() || allowed.len() == usize::from(variants) {
                    source.next_token(variants)
                } else {
                    // Pick uniformly among allowed tokens by drawing an index.
                    let pick = source.next_token(allowed.len() as u8);
                    allowed[usize::from(pick.saturating_sub(1)) % allowed.len()]
                };
                let idx = grid.index(row, col);
                grid.cells[idx] = token;
            }
        }
        grid
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.size && cell.col < self.size
    }

    fn check(&self, cell: Cell) -> Result<usize, GridError> {
        if self.in_bounds(cell) {
            Ok(self.index(cell.row, cell.col))
        } else {
            Err(GridError::InvalidCoordinate {
                row: cell.row,
                col: cell.col,
                size: self.size,
            })
        }
    }

    pub fn get(&self, cell: Cell) -> Result<Token, GridError> {
        self.check(cell).map(|i| self.cells[i])
    }

    /// Unchecked-range write: the token value is trusted.
    pub fn set(&mut self, cell: Cell, token: Token) -> Result<(), GridError> {
        let i = self.check(cell)?;
        self.cells[i] = token;
        Ok(())
    }

    /// Exchange two cells. Neither is touched if either is out of bounds.
    pub fn swap(&mut self, a: Cell, b: Cell) -> Result<(), GridError> {
        let ia = self.check(a)?;
        let ib = self.check(b)?;
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// Write a cell already known to be on the board.
    pub(crate) fn put(&mut self, cell: Cell, token: Token) {
        debug_assert!(self.in_bounds(cell), "write outside board at {cell}");
        let i = self.index(cell.row, cell.col);
        self.cells[i] = token;
    }

    /// Swap two cells already known to be on the board.
    pub(crate) fn exchange(&mut self, a: Cell, b: Cell) {
        debug_assert!(self.in_bounds(a) && self.in_bounds(b));
        let (ia, ib) = (self.index(a.row, a.col), self.index(b.row, b.col));
        self.cells.swap(ia, ib);
    }

    pub fn is_empty(&self, cell: Cell) -> Result<bool, GridError> {
        self.get(cell).map(|t| t == EMPTY)
    }

    /// Zero every listed cell that lies on the board.
    pub fn clear(&mut self, cells: &BTreeSet<Cell>) {
        for &cell in cells {
            if let Ok(i) = self.check(cell) {
                self.cells[i] = EMPTY;
            }
        }
    }

    /// Token at (row, col); callers iterate within `0..size`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Token {
        self.cells[self.index(row, col)]
    }

    /// Column values top to bottom.
    pub fn column(&self, col: usize) -> Vec<Token> {
        (0..self.size).map(|row| self.at(row, col)).collect()
    }

    /// Overwrite a column top to bottom. `values` must hold `size` tokens.
    pub fn set_column(&mut self, col: usize, values: &[Token]) {
        debug_assert_eq!(values.len(), self.size);
        for (row, &token) in values.iter().enumerate() {
            let i = self.index(row, col);
            self.cells[i] = token;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Token]> {
        self.cells.chunks(self.size.max(1))
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&t| t == EMPTY).count()
    }

    /// Number of empty cells in one column.
    pub fn column_empty_count(&self, col: usize) -> usize {
        (0..self.size).filter(|&row| self.at(row, col) == EMPTY).count()
    }

    /// True if every token is in 1..=variants (no empties, nothing out of range).
    pub fn is_full(&self, variants: u8) -> bool {
        self.cells.iter().all(|&t| (1..=variants).contains(&t))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: Vec<String> = row.iter().map(Token::to_string).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
