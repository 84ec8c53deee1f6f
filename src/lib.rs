//! Daily and random Sudoku puzzles served from fixed-width record files,
//! plus validated puzzle uploads.

pub mod config;
pub mod error;
pub mod ingest;
pub mod selector;
pub mod server;
pub mod store;
pub mod validate;

pub use config::Config;
pub use error::{Result, SelectError, ServerError};
pub use ingest::{Ingestor, LogNotifier, Notifier, UploadReceipt};
pub use selector::{read_record, select_daily_record, select_random_record};
pub use store::{PuzzleKind, Record, RECORD_LENGTH, RECORD_STRIDE};
