use crate::error::IngestError;
use crate::store::{PuzzleKind, RECORD_STRIDE, RECORD_TERMINATOR};
use crate::validate::validate_puzzle;
use chrono::NaiveDateTime;
use log::{info, warn};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Summary of an accepted upload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: Uuid,
    pub kind: PuzzleKind,
    pub path: PathBuf,
    pub puzzles: usize,
}

/// Told about every accepted upload.
pub trait Notifier: Send + Sync {
    fn notify(&self, receipt: &UploadReceipt) -> Result<(), IngestError>;
}

/// Notifier that writes the notification to the log.
pub struct LogNotifier {
    recipient: String,
}

impl LogNotifier {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, receipt: &UploadReceipt) -> Result<(), IngestError> {
        info!(
            "Notify {}: {} {} puzzle(s) uploaded as {} ({})",
            self.recipient,
            receipt.puzzles,
            receipt.kind,
            receipt.path.display(),
            receipt.id
        );
        Ok(())
    }
}

/// Validates uploads and writes each one to its own file.
pub struct Ingestor {
    upload_dir: PathBuf,
    max_puzzles: usize,
    notifier: Arc<dyn Notifier>,
}

impl Ingestor {
    pub fn new(upload_dir: PathBuf, max_puzzles: usize, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            upload_dir,
            max_puzzles,
            notifier,
        }
    }

    #[cfg(test)]
    pub fn upload_dir(&self) -> &std::path::Path {
        &self.upload_dir
    }

    pub fn ingest(
        &self,
        kind: PuzzleKind,
        body: &[u8],
        now: NaiveDateTime,
    ) -> Result<UploadReceipt, IngestError> {
        let puzzles = split_puzzles(body);
        if puzzles.is_empty() {
            return Err(IngestError::Empty);
        }
        if puzzles.len() > self.max_puzzles {
            return Err(IngestError::TooMany {
                count: puzzles.len(),
                limit: self.max_puzzles,
            });
        }

        for (line, puzzle) in &puzzles {
            validate_puzzle(kind, puzzle).map_err(|source| IngestError::Invalid {
                line: *line,
                source,
            })?;
        }

        let id = Uuid::new_v4();
        let path = self.write_upload(kind, id, now, &puzzles)?;
        let receipt = UploadReceipt {
            id,
            kind,
            path,
            puzzles: puzzles.len(),
        };
        info!(
            "Stored upload {}: {} {} puzzle(s)",
            receipt.id, receipt.puzzles, receipt.kind
        );

        // The upload is already on disk; a failed notification only warns.
        if let Err(err) = self.notifier.notify(&receipt) {
            warn!("Upload {} notification failed: {}", receipt.id, err);
        }
        Ok(receipt)
    }

    fn write_upload(
        &self,
        kind: PuzzleKind,
        id: Uuid,
        now: NaiveDateTime,
        puzzles: &[(usize, &[u8])],
    ) -> Result<PathBuf, IngestError> {
        fs::create_dir_all(&self.upload_dir)?;

        let name = format!("{}-{}-{}.sudoku", kind, now.format("%Y%m%d-%H%M%S"), id);
        let path = self.upload_dir.join(name);

        let mut data = Vec::with_capacity(puzzles.len() * RECORD_STRIDE as usize);
        for (_, puzzle) in puzzles {
            data.extend_from_slice(puzzle);
            data.extend_from_slice(RECORD_TERMINATOR);
        }

        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        Ok(path)
    }
}

/// Non-blank lines of the body with their 1-based line numbers.
fn split_puzzles(body: &[u8]) -> Vec<(usize, &[u8])> {
    body.split(|&b| b == b'\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix(b"\r").unwrap_or(line)))
        .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
        .collect()
}
