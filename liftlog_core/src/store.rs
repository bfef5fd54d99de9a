//! Entry store: fetch-all / insert / update-by-id / delete-by-id.
//!
//! Entries live in a JSONL (JSON Lines) file. Every writer holds an
//! exclusive lock on a sidecar `<log>.lock` file, so an append can never
//! slip in between an edit's read and its rename. Edits and deletes
//! rewrite the whole file through a temp file that is synced and then
//! renamed over the original, so a failed write never leaves a
//! half-written log behind.

use crate::{EntryPatch, Error, LogEntry, NewEntry, Result};
use chrono::Utc;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Data-access boundary consumed by the history view and the CLI
pub trait EntryStore {
    /// All entries, newest first
    fn fetch_all(&self) -> Result<Vec<LogEntry>>;
    fn insert(&mut self, entry: NewEntry) -> Result<LogEntry>;
    fn update(&mut self, id: Uuid, patch: &EntryPatch) -> Result<LogEntry>;
    fn delete(&mut self, id: Uuid) -> Result<()>;
}

/// JSONL-backed entry store with file locking
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Create a new store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sidecar file writers lock
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Take the writer lock; released when the returned file is dropped
    fn write_lock(&self) -> Result<File> {
        self.ensure_parent_dir()?;
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Replace the log contents atomically; caller holds the writer lock
    fn rewrite(&self, entries: &[LogEntry]) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "entry log path missing parent")
        })?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            for entry in entries {
                serde_json::to_writer(&mut writer, entry)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl EntryStore for JsonlStore {
    fn fetch_all(&self) -> Result<Vec<LogEntry>> {
        let mut entries = read_entries(&self.path)?;
        entries.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));
        Ok(entries)
    }

    fn insert(&mut self, entry: NewEntry) -> Result<LogEntry> {
        entry.validate()?;
        let entry = entry.into_entry(Utc::now());

        let _guard = self.write_lock()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(&entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended entry {} ({}) to log", entry.id, entry.exercise);
        Ok(entry)
    }

    fn update(&mut self, id: Uuid, patch: &EntryPatch) -> Result<LogEntry> {
        patch.validate()?;

        let _guard = self.write_lock()?;
        let mut entries = read_entries(&self.path)?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(Error::EntryNotFound(id))?;
        patch.apply(entry);
        let updated = entry.clone();

        self.rewrite(&entries)?;
        tracing::debug!("Updated entry {}", id);
        Ok(updated)
    }

    fn delete(&mut self, id: Uuid) -> Result<()> {
        let _guard = self.write_lock()?;
        let mut entries = read_entries(&self.path)?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(Error::EntryNotFound(id));
        }

        self.rewrite(&entries)?;
        tracing::debug!("Deleted entry {}", id);
        Ok(())
    }
}

/// Read all entries from a log file in file order
///
/// Lines that fail to parse are logged and skipped.
pub fn read_entries(path: &Path) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse entry at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} entries from {:?}", entries.len(), path);
    Ok(entries)
}
