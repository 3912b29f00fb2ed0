//! `(piece_size, completed_piece_indices)`, persisted as a single line of
//! text at `<output_path>.temp`: `"<piece_size>:<idx1>,<idx2>,…"`.
//!
//! Grounded in pymetalink's `FileResume._read`/`_write`/`set_block_size`/
//! `update_block_size`: a missing or malformed file is treated as an empty
//! record rather than an error, and changing the piece size re-expresses
//! existing progress in the new size rather than discarding it outright.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Appends `.temp` to an output path to get its resume sidecar path.
pub fn resume_path_for(output_path: &Path) -> PathBuf {
    let mut s = output_path.as_os_str().to_os_string();
    s.push(".temp");
    PathBuf::from(s)
}

/// The persisted resume record for one file download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeRecord {
    piece_size: u64,
    completed: BTreeSet<u64>,
}

impl ResumeRecord {
    /// An empty record at the given piece size.
    pub fn new(piece_size: u64) -> Self {
        ResumeRecord {
            piece_size,
            completed: BTreeSet::new(),
        }
    }

    pub fn piece_size(&self) -> u64 {
        self.piece_size
    }

    pub fn completed_indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.completed.iter().copied()
    }

    pub fn is_completed(&self, index: u64) -> bool {
        self.completed.contains(&index)
    }

    pub fn mark(&mut self, index: u64) {
        self.completed.insert(index);
    }

    pub fn unmark(&mut self, index: u64) {
        self.completed.remove(&index);
    }

    pub fn extend(&mut self, indices: impl IntoIterator<Item = u64>) {
        self.completed.extend(indices);
    }

    pub fn clear(&mut self) {
        self.completed.clear();
    }

    /// The first piece index below `total_pieces` not yet completed.
    pub fn first_gap(&self, total_pieces: u64) -> Option<u64> {
        (0..total_pieces).find(|i| !self.completed.contains(i))
    }

    /// Whether every piece index below `total_pieces` is completed.
    pub fn complete(&self, total_pieces: u64) -> bool {
        (0..total_pieces).all(|i| self.completed.contains(&i))
    }

    /// Loads a record from `path`. A missing file, an unreadable file, or
    /// one that doesn't parse as `"<piece_size>:<idx,idx,...>"` all yield
    /// an empty record with `piece_size == 0`, matching the original's
    /// tolerant handling of a corrupt or absent resume sidecar.
    pub fn load(path: &Path) -> ResumeRecord {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(_) => return ResumeRecord::default(),
        };
        Self::parse(text.trim()).unwrap_or_default()
    }

    fn parse(line: &str) -> Option<ResumeRecord> {
        let (size_str, rest) = line.split_once(':')?;
        let piece_size: u64 = size_str.parse().ok()?;
        let mut completed = BTreeSet::new();
        if !rest.is_empty() {
            for tok in rest.split(',') {
                completed.insert(tok.parse::<u64>().ok()?);
            }
        }
        Some(ResumeRecord {
            piece_size,
            completed,
        })
    }

    fn render(&self) -> String {
        let indices = self
            .completed
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}:{}", self.piece_size, indices)
    }

    /// Persists the record atomically: written to a sibling temp file, then
    /// renamed over `path` so a crash mid-write never leaves a truncated or
    /// torn resume file behind.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let tmp_path = path.with_extension("temp.new");
        fs::write(&tmp_path, self.render())?;
        fs::rename(&tmp_path, path)
    }

    /// Deletes the resume sidecar, e.g. after the whole file has verified.
    pub fn delete(path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Re-expresses completed piece indices under a new piece size.
    ///
    /// No-op if `new_size == piece_size`. Otherwise completed indices are
    /// grouped into maximal runs of consecutive old-piece indices; each run
    /// `(start_idx, count)` covers byte range
    /// `[start_idx * piece_size, (start_idx + count) * piece_size)`, which
    /// is re-expressed as new indices
    /// `[floor(start_idx * old / new), floor(start_idx * old / new) + floor(count * old / new))`.
    /// A run too short to cover even one full new-size piece is discarded —
    /// rescaling can only lose progress information, never invent it.
    pub fn update_piece_size(&mut self, new_size: u64) {
        if new_size == self.piece_size || new_size == 0 {
            return;
        }
        let old_size = self.piece_size;
        let mut new_completed = BTreeSet::new();

        for (start_idx, count) in consecutive_runs(&self.completed) {
            let old = old_size as u128;
            let new = new_size as u128;
            let new_start = (start_idx as u128 * old) / new;
            let new_count = (count as u128 * old) / new;
            if new_count == 0 {
                continue;
            }
            for idx in new_start..(new_start + new_count) {
                new_completed.insert(idx as u64);
            }
        }

        self.piece_size = new_size;
        self.completed = new_completed;
    }
}

/// Splits a sorted set of indices into maximal runs of consecutive values,
/// returned as `(start_index, run_length)` pairs.
fn consecutive_runs(set: &BTreeSet<u64>) -> Vec<(u64, u64)> {
    let mut runs = Vec::new();
    let mut iter = set.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut len = 1u64;
        let mut prev = start;
        while let Some(&next) = iter.peek() {
            if next == prev + 1 {
                len += 1;
                prev = next;
                iter.next();
            } else {
                break;
            }
        }
        runs.push((start, len));
    }
    runs
}
