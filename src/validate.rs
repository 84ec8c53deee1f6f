use crate::error::ValidationError;
use crate::store::{PuzzleKind, RECORD_LENGTH};
use log::debug;

/// Fewest givens a uniquely solvable Sudoku can have.
pub const MIN_GIVENS: usize = 17;

/// A parsed 9x9 puzzle; `0` marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[u8; 9]; 9],
}

impl Grid {
    pub fn parse(payload: &[u8]) -> Result<Self, ValidationError> {
        if payload.len() != RECORD_LENGTH {
            return Err(ValidationError::Length(payload.len()));
        }

        let mut cells = [[0u8; 9]; 9];
        for (position, &byte) in payload.iter().enumerate() {
            let value = match byte {
                b'.' => 0,
                b'0'..=b'9' => byte - b'0',
                _ => return Err(ValidationError::Cell { position, byte }),
            };
            cells[position / 9][position % 9] = value;
        }
        Ok(Grid { cells })
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn givens(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// First repeated given, scanning rows, columns and boxes, then the two
    /// diagonals for X-Sudoku.
    pub fn conflict(&self, kind: PuzzleKind) -> Option<ValidationError> {
        for i in 0..9 {
            let row = (0..9).map(|j| (i, j));
            if let Some(digit) = self.duplicate(row) {
                return Some(conflict(digit, format!("row {}", i + 1)));
            }

            let col = (0..9).map(|j| (j, i));
            if let Some(digit) = self.duplicate(col) {
                return Some(conflict(digit, format!("column {}", i + 1)));
            }

            let boxed = (0..9).map(|j| (3 * (i / 3) + j / 3, 3 * (i % 3) + j % 3));
            if let Some(digit) = self.duplicate(boxed) {
                return Some(conflict(digit, format!("box {}", i + 1)));
            }
        }

        if kind == PuzzleKind::Variant {
            if let Some(digit) = self.duplicate((0..9).map(|i| (i, i))) {
                return Some(conflict(digit, "main diagonal".to_string()));
            }
            if let Some(digit) = self.duplicate((0..9).map(|i| (i, 8 - i))) {
                return Some(conflict(digit, "anti-diagonal".to_string()));
            }
        }
        None
    }

    fn duplicate(&self, unit: impl Iterator<Item = (usize, usize)>) -> Option<u8> {
        let mut seen = [false; 9];
        for (row, col) in unit {
            let value = self.cells[row][col];
            if value == 0 {
                continue;
            }
            let slot = &mut seen[(value - 1) as usize];
            if *slot {
                debug!("duplicate {} at ({}, {})", value, row, col);
                return Some(value);
            }
            *slot = true;
        }
        None
    }
}

fn conflict(digit: u8, unit: String) -> ValidationError {
    ValidationError::Conflict { digit, unit }
}

/// Checks that `payload` is a well-formed puzzle of the given kind.
pub fn validate_puzzle(kind: PuzzleKind, payload: &[u8]) -> Result<Grid, ValidationError> {
    let grid = Grid::parse(payload)?;
    if let Some(err) = grid.conflict(kind) {
        return Err(err);
    }
    let givens = grid.givens();
    if givens < MIN_GIVENS {
        return Err(ValidationError::TooFewGivens(givens));
    }
    Ok(grid)
}
