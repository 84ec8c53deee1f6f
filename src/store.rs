use crate::error::SelectError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Payload bytes per record.
pub const RECORD_LENGTH: usize = 81;
/// Payload plus the `\r\n` terminator.
pub const RECORD_STRIDE: u64 = 83;
pub const RECORD_TERMINATOR: &[u8; 2] = b"\r\n";

pub const NORMAL_STORE_FILE: &str = "NormalSudokus.sudoku";
pub const VARIANT_STORE_FILE: &str = "XSudokus.sudoku";

pub type Record = [u8; RECORD_LENGTH];

/// Puzzle type, selected on the wire by a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PuzzleKind {
    /// Classic 9x9 Sudoku, selector `9`.
    Normal,
    /// X-Sudoku (diagonals must also be unique), selector `X`.
    Variant,
}

impl PuzzleKind {
    pub fn from_selector(body: &[u8]) -> Option<Self> {
        match body {
            [b'9'] => Some(PuzzleKind::Normal),
            [b'X'] => Some(PuzzleKind::Variant),
            _ => None,
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            PuzzleKind::Normal => b'9',
            PuzzleKind::Variant => b'X',
        }
    }

    pub fn store_file_name(self) -> &'static str {
        match self {
            PuzzleKind::Normal => NORMAL_STORE_FILE,
            PuzzleKind::Variant => VARIANT_STORE_FILE,
        }
    }

    pub fn store_path(self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.store_file_name())
    }
}

impl fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleKind::Normal => write!(f, "normal"),
            PuzzleKind::Variant => write!(f, "x"),
        }
    }
}

/// Records available for selection. The trailing slot is always excluded.
pub fn usable_records(file_size: u64) -> u64 {
    (file_size / RECORD_STRIDE).saturating_sub(1)
}

/// Stats the store and returns its usable record count, which is at least 1.
pub fn checked_usable_records(store_path: &Path) -> Result<u64, SelectError> {
    let file_size = match fs::metadata(store_path) {
        Ok(meta) => meta.len(),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            return Err(SelectError::NotFound(store_path.to_path_buf()))
        }
        Err(source) => return Err(SelectError::Read { index: None, source }),
    };

    let usable = usable_records(file_size);
    if usable < 1 {
        return Err(SelectError::InsufficientData { usable });
    }
    Ok(usable)
}
