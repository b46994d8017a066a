//! CSV file result store
//!
//! Rows are appended to a single CSV file that doubles as the resume ledger.
//! Every append is flushed and synced before it is reported as written, so a
//! crash can lose at most the row being written at that moment.

use crate::storage::ledger::scan_rows;
use crate::storage::traits::{ResultStore, StorageResult};
use crate::storage::EntityResult;
use csv::{Writer, WriterBuilder};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Column names, in file order
pub const HEADERS: [&str; 6] = [
    "Index",
    "Charity Name",
    "Website Status",
    "Website URL",
    "Contact Email Status",
    "Contact Email",
];

/// Append-only result store backed by a CSV file
pub struct CsvResultStore {
    path: PathBuf,
    writer: Writer<File>,
    known_indices: HashSet<usize>,
}

impl CsvResultStore {
    /// Opens or creates the result file at the given path
    ///
    /// Existing rows are scanned so duplicate indices can be refused. The
    /// header is written only when the file is new or empty. If the previous
    /// run was cut off mid-row, the partial row is truncated away so the next
    /// row starts on its own line and the fragment can never be read back as
    /// a result.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut existing = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        if !existing.is_empty() && !existing.ends_with(b"\n") {
            let keep = existing
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(0, |last_newline| last_newline + 1);
            tracing::warn!(
                "Result file {} ends with a partial row; discarding {} bytes",
                path.display(),
                existing.len() - keep
            );
            OpenOptions::new()
                .write(true)
                .open(&path)?
                .set_len(keep as u64)?;
            existing.truncate(keep);
        }

        let known_indices: HashSet<usize> =
            scan_rows(&existing).iter().map(|r| r.index).collect();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if existing.is_empty() {
            writer.write_record(HEADERS)?;
            writer.flush()?;
            writer.get_ref().sync_data()?;
        }

        tracing::debug!(
            "Opened result store {} with {} existing rows",
            path.display(),
            known_indices.len()
        );

        Ok(Self {
            path,
            writer,
            known_indices,
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct rows persisted so far
    pub fn len(&self) -> usize {
        self.known_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_indices.is_empty()
    }
}

impl ResultStore for CsvResultStore {
    fn append(&mut self, result: &EntityResult) -> StorageResult<bool> {
        if self.known_indices.contains(&result.index) {
            tracing::warn!(
                "Row {} already persisted in {}; not appending again",
                result.index,
                self.path.display()
            );
            return Ok(false);
        }

        self.writer.serialize(result)?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;

        self.known_indices.insert(result.index);
        Ok(true)
    }

    fn load_results(&self) -> StorageResult<Vec<EntityResult>> {
        let content = fs::read(&self.path)?;
        Ok(scan_rows(&content))
    }
}
