//! Mutex-guarded shared writer for temp download files.
//!
//! A single `Mutex<File>` belongs to the file handle; every piece write goes
//! through the explicit `acquire → seek → write → flush → release`
//! sequence the Segment Worker contract requires. This supersedes the
//! teacher's original lock-free `pwrite`-per-task design: still one handle
//! shared across tasks, but serialized, since the contract also needs a
//! consistent seek position for the optional streaming-read short-circuit
//! on resume, which concurrent unsynchronized pwrites cannot offer.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Writer for a temp download file. Safe to clone and use from multiple
/// tasks; each `write_piece` call acquires the shared lock, seeks, writes,
/// flushes, and releases before returning.
#[derive(Clone)]
pub struct SharedWriter {
    file: Arc<Mutex<File>>,
    temp_path: std::path::PathBuf,
}

impl SharedWriter {
    /// Create from an open file and path (used by `StorageWriterBuilder`).
    pub(crate) fn from_file_and_path(file: File, temp_path: std::path::PathBuf) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
            temp_path,
        }
    }

    /// Open an existing temp file for resume (read+write, no truncation).
    /// Use this when resuming a job; the file must already exist and have
    /// been preallocated.
    pub fn open_existing(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .open(temp_path)
            .with_context(|| {
                format!("failed to open existing temp file: {}", temp_path.display())
            })?;
        Ok(SharedWriter {
            file: Arc::new(Mutex::new(file)),
            temp_path: temp_path.to_path_buf(),
        })
    }

    /// Writes `data` at `offset`: acquire the lock, seek, write, flush,
    /// release. The only point of contention between concurrent Segment
    /// Workers is this call; the network fetch and digest check happen
    /// entirely before it.
    pub fn write_piece(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("shared writer mutex poisoned"))?;
        guard
            .seek(SeekFrom::Start(offset))
            .context("storage seek failed")?;
        guard.write_all(data).context("storage write failed")?;
        guard.flush().context("storage flush failed")?;
        Ok(())
    }

    /// Reads back `len` bytes at `offset`, for the Segment Worker's
    /// already-on-disk digest short-circuit check on resume.
    pub fn read_piece(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("shared writer mutex poisoned"))?;
        guard
            .seek(SeekFrom::Start(offset))
            .context("storage seek failed")?;
        let mut buf = vec![0u8; len as usize];
        guard.read_exact(&mut buf).context("storage read failed")?;
        Ok(buf)
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> Result<()> {
        let guard = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("shared writer mutex poisoned"))?;
        guard.sync_all().context("storage sync failed")?;
        Ok(())
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Atomically rename the temp file to the final path. Consumes the
    /// writer and closes the file. Call `sync` before this if durability is
    /// needed. Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> Result<()> {
        let temp_path = self.temp_path.clone();
        drop(self.file);

        std::fs::rename(&temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(())
    }
}
