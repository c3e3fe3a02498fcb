//! Atomic snapshot persistence.
//!
//! Saving writes the full serialized content to a temporary sibling file and
//! renames it over the destination, so the destination is always either the
//! previous snapshot or the new one, never a partial write. Loading skips
//! malformed records with a diagnostic and only fails when a file cannot be
//! opened at all.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Borrower, Item};

use super::codec;

/// Persists the catalog's collections as two snapshot files, one for items
/// and one for borrowers.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    items_path: PathBuf,
    borrowers_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(items_path: impl Into<PathBuf>, borrowers_path: impl Into<PathBuf>) -> Self {
        Self {
            items_path: items_path.into(),
            borrowers_path: borrowers_path.into(),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(&storage.items_file, &storage.borrowers_file)
    }

    pub fn items_path(&self) -> &Path {
        &self.items_path
    }

    pub fn borrowers_path(&self) -> &Path {
        &self.borrowers_path
    }

    /// Save all item records, atomically replacing the items file.
    pub fn save_items(&self, items: &[Item]) -> AppResult<()> {
        let mut content = String::new();
        for item in items {
            content.push_str(&codec::encode_item(item));
            content.push('\n');
        }
        write_file_safely(&self.items_path, &content)?;
        tracing::info!(path = %self.items_path.display(), count = items.len(), "items saved");
        Ok(())
    }

    /// Load all item records. Malformed lines are skipped.
    pub fn load_items(&self) -> AppResult<Vec<Item>> {
        let items = read_records(&self.items_path, codec::decode_item)?;
        tracing::info!(path = %self.items_path.display(), count = items.len(), "items loaded");
        Ok(items)
    }

    /// Save all borrower records, atomically replacing the borrowers file.
    pub fn save_borrowers(&self, borrowers: &[Borrower]) -> AppResult<()> {
        let mut content = String::new();
        for borrower in borrowers {
            content.push_str(&codec::encode_borrower(borrower));
            content.push('\n');
        }
        write_file_safely(&self.borrowers_path, &content)?;
        tracing::info!(
            path = %self.borrowers_path.display(),
            count = borrowers.len(),
            "borrowers saved"
        );
        Ok(())
    }

    /// Load all borrower records. Malformed lines are skipped.
    pub fn load_borrowers(&self) -> AppResult<Vec<Borrower>> {
        let borrowers = read_records(&self.borrowers_path, codec::decode_borrower)?;
        tracing::info!(
            path = %self.borrowers_path.display(),
            count = borrowers.len(),
            "borrowers loaded"
        );
        Ok(borrowers)
    }

    /// Save both collections. Both writes are attempted even when the first
    /// one fails, and each file is replaced atomically on its own.
    pub fn save_snapshot(&self, catalog: &Catalog) -> AppResult<()> {
        let items = self.save_items(catalog.items());
        let borrowers = self.save_borrowers(catalog.borrowers());
        match (items, borrowers) {
            (Ok(()), Ok(())) => {
                tracing::info!(
                    items = %self.items_path.display(),
                    borrowers = %self.borrowers_path.display(),
                    "catalog snapshot saved"
                );
                Ok(())
            }
            (items, borrowers) => {
                let detail = failure_detail(items.err(), borrowers.err());
                tracing::error!(%detail, "saving catalog snapshot failed");
                Err(AppError::Snapshot(format!("snapshot save failed: {detail}")))
            }
        }
    }

    /// Load both collections and commit them into the catalog only when both
    /// loads succeed; otherwise the catalog is left unchanged.
    pub fn load_snapshot(&self, catalog: &mut Catalog) -> AppResult<()> {
        let items = self.load_items();
        let borrowers = self.load_borrowers();
        match (items, borrowers) {
            (Ok(items), Ok(borrowers)) => {
                catalog.set_items(items);
                catalog.set_borrowers(borrowers);
                tracing::info!(
                    items = %self.items_path.display(),
                    borrowers = %self.borrowers_path.display(),
                    "catalog snapshot loaded"
                );
                Ok(())
            }
            (items, borrowers) => {
                let detail = failure_detail(items.err(), borrowers.err());
                tracing::error!(%detail, "loading catalog snapshot failed");
                Err(AppError::Snapshot(format!("snapshot load failed: {detail}")))
            }
        }
    }
}

fn failure_detail(items: Option<AppError>, borrowers: Option<AppError>) -> String {
    let mut parts = Vec::new();
    if let Some(e) = items {
        parts.push(format!("items: {e}"));
    }
    if let Some(e) = borrowers {
        parts.push(format!("borrowers: {e}"));
    }
    parts.join("; ")
}

/// Write `content` to `path` through a temporary sibling and an atomic
/// rename. On failure the temporary file is removed and the previous
/// destination is left untouched.
fn write_file_safely(path: &Path, content: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    let write_result = File::create(&temp_path)
        .and_then(|mut file| file.write_all(content.as_bytes()).and_then(|_| file.flush()));
    if let Err(e) = write_result {
        tracing::error!(path = %temp_path.display(), error = %e, "temporary snapshot write failed");
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    // Best-effort pre-removal; the rename is what must succeed.
    let _ = fs::remove_file(path);
    if let Err(e) = fs::rename(&temp_path, path) {
        tracing::error!(path = %path.display(), error = %e, "snapshot rename failed");
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Read one record per line, discarding blank lines and skipping records the
/// decoder rejects.
fn read_records<T>(path: &Path, decode: impl Fn(&str) -> Option<T>) -> AppResult<Vec<T>> {
    let file = File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "cannot open snapshot file");
        AppError::Io(e)
    })?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        match decode(&line) {
            Some(record) => records.push(record),
            None => tracing::warn!(line = %line, "record skipped"),
        }
    }
    Ok(records)
}
