use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the daily/random record selectors.
#[derive(Error, Debug)]
pub enum SelectError {
    #[error("puzzle store not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("puzzle store has too few records ({usable} usable)")]
    InsufficientData { usable: u64 },

    /// `index` is `None` when the store could not be stat'ed.
    #[error("failed to read puzzle store: {source}")]
    Read {
        index: Option<u64>,
        #[source]
        source: io::Error,
    },
}

impl SelectError {
    /// Short message for clients; never includes filesystem paths.
    pub fn public_message(&self) -> &'static str {
        match self {
            SelectError::NotFound(_) => "puzzle store not found",
            SelectError::InsufficientData { .. } => "not enough puzzles in store",
            SelectError::Read { .. } => "could not read puzzle",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("puzzle must be 81 cells, got {0}")]
    Length(usize),

    #[error("invalid cell {byte:#04x} at position {position}")]
    Cell { position: usize, byte: u8 },

    #[error("digit {digit} repeated in {unit}")]
    Conflict { digit: u8, unit: String },

    #[error("puzzle has {0} givens, at least 17 required")]
    TooFewGivens(usize),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("upload contains no puzzles")]
    Empty,

    #[error("upload contains {count} puzzles, limit is {limit}")]
    TooMany { count: usize, limit: usize },

    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: ValidationError,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Notification error: {0}")]
    Notify(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Top-level error, used by the binary and the HTTP layer.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid puzzle type selector")]
    BadSelector,

    #[error("background task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
