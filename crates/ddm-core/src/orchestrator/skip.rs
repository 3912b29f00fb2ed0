//! Skip-if-present decision, per spec.md §4.8.
//!
//! Grounded in the teacher's `scheduler::execute::execute_download_phase`
//! force-restart handling (the `needs_metadata && temp_path.exists()` check),
//! generalized to the three-way already-complete/resuming/fresh decision a
//! `FileSpec` needs before the Orchestrator touches the network.

use crate::digest::verify_file;
use crate::resolver::FileSpec;
use crate::storage::temp_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDecision {
    /// The output file already exists and is verified (or size-matches);
    /// the Orchestrator should report 100% progress and return immediately.
    AlreadyComplete,
    /// A `.temp` file exists; the Orchestrator should proceed to the
    /// Segment Manager, which will pick up the partial download.
    Resuming,
    /// No prior state; proceed as a fresh download.
    Fresh,
}

/// Decides whether `spec.output_path` can be skipped without any network
/// call. Only consults the filesystem and (if whole-file digests are
/// present) re-hashes the existing output.
pub fn skip_check(spec: &FileSpec) -> SkipDecision {
    if !spec.output_path.exists() {
        return fresh_or_resuming(spec);
    }

    if !spec.whole_file_digests.is_empty() {
        if let Ok(true) = verify_file(&spec.output_path, &spec.whole_file_digests, None) {
            return SkipDecision::AlreadyComplete;
        }
    } else if let Some(expected) = spec.expected_size {
        if let Ok(meta) = std::fs::metadata(&spec.output_path) {
            if meta.len() == expected {
                return SkipDecision::AlreadyComplete;
            }
        }
    }

    fresh_or_resuming(spec)
}

fn fresh_or_resuming(spec: &FileSpec) -> SkipDecision {
    if temp_path(&spec.output_path).exists() {
        tracing::info!(path = %spec.output_path.display(), "resuming");
        SkipDecision::Resuming
    } else {
        SkipDecision::Fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn spec_for(path: PathBuf) -> FileSpec {
        FileSpec::new(path, vec![])
    }

    #[test]
    fn fresh_when_nothing_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec_for(dir.path().join("missing.iso"));
        assert_eq!(skip_check(&spec), SkipDecision::Fresh);
    }

    #[test]
    fn resuming_when_temp_present() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("partial.iso");
        std::fs::write(temp_path(&out), b"partial").unwrap();
        let spec = spec_for(out);
        assert_eq!(skip_check(&spec), SkipDecision::Resuming);
    }

    #[test]
    fn already_complete_when_size_matches() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("done.iso");
        std::fs::write(&out, b"0123456789").unwrap();
        let mut spec = spec_for(out);
        spec.expected_size = Some(10);
        assert_eq!(skip_check(&spec), SkipDecision::AlreadyComplete);
    }

    #[test]
    fn not_complete_when_size_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("short.iso");
        std::fs::write(&out, b"123").unwrap();
        let mut spec = spec_for(out);
        spec.expected_size = Some(10);
        assert_eq!(skip_check(&spec), SkipDecision::Fresh);
    }

    #[test]
    fn already_complete_when_digest_matches() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("verified.bin");
        std::fs::write(&out, b"hello world").unwrap();
        let mut digests = HashMap::new();
        // md5("hello world")
        digests.insert("md5".to_string(), "5eb63bbbe01eeed093cb22bb8f5acdc3".to_string());
        let mut spec = spec_for(out);
        spec.whole_file_digests = digests;
        assert_eq!(skip_check(&spec), SkipDecision::AlreadyComplete);
    }
}
