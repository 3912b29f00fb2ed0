//! Segment Worker: owns one `(Mirror, Piece)` assignment and runs it to
//! completion or to error.
//!
//! Grounded in the teacher's `downloader/segment.rs` `download_one_segment`
//! for the curl-driven fetch-then-write shape, adapted to the explicit
//! `acquire → seek → write → flush → release` discipline of
//! [`crate::storage::SharedWriter`] and to per-piece digest verification.

mod error;

use std::collections::HashMap;

pub use error::SegmentError;

use crate::digest::{parse_digest_header, verify_chunk};
use crate::storage::SharedWriter;
use crate::transport::HttpHost;

/// Lifecycle state of a single worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    New,
    Running,
    Done,
    Error(String),
}

/// Observable result of running one worker to completion: how many bytes
/// of the piece are now durably written (0 or the full piece length), any
/// error, and a redirect location if the mirror issued one.
#[derive(Debug, Clone, Default)]
pub struct WorkerOutcome {
    pub bytes: u64,
    pub redirect_to: Option<String>,
}

/// Runs one piece fetch against one mirror URL.
///
/// If `piece_digests` has an entry for this piece and the bytes already on
/// disk in `[byte_start, byte_end)` verify against it, the fetch is skipped
/// entirely (the resume short-circuit named in the worker contract).
pub fn run_segment(
    host: &HttpHost,
    writer: &SharedWriter,
    url: &str,
    byte_start: u64,
    byte_end: u64,
    expected_total: Option<u64>,
    piece_digest: Option<&HashMap<String, String>>,
) -> Result<WorkerOutcome, SegmentError> {
    let piece_len = byte_end.saturating_sub(byte_start);

    if let Some(digests) = piece_digest {
        if let Ok(existing) = writer.read_piece(byte_start, piece_len) {
            if verify_chunk(&existing, digests).unwrap_or(false) {
                return Ok(WorkerOutcome {
                    bytes: piece_len,
                    redirect_to: None,
                });
            }
        }
    }

    let outcome = match host.fetch_range(url, byte_start, byte_end, expected_total) {
        Ok(o) => o,
        Err(SegmentError::Redirect(location)) => {
            return Ok(WorkerOutcome {
                bytes: 0,
                redirect_to: Some(location),
            });
        }
        Err(e) => return Err(e),
    };

    if (outcome.bytes.len() as u64) < piece_len {
        return Err(SegmentError::IncompleteRead {
            expected: piece_len,
            received: outcome.bytes.len() as u64,
        });
    }

    if let Some(digests) = piece_digest {
        if !verify_chunk(&outcome.bytes, digests).unwrap_or(true) {
            return Err(SegmentError::ChunkChecksum);
        }
    }

    // Opportunistic check against a `Digest` response header for any
    // algorithm the caller declared an expectation for, independent of the
    // Metalink-declared piece digest above. Per spec.md §4.3, a mismatch
    // silently discards the piece rather than failing the mirror.
    if digest_header_mismatches(outcome.digest_header.as_deref(), piece_digest) {
        return Err(SegmentError::ChunkChecksum);
    }

    writer
        .write_piece(byte_start, &outcome.bytes)
        .map_err(|e| {
            SegmentError::Storage(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })?;

    Ok(WorkerOutcome {
        bytes: piece_len,
        redirect_to: None,
    })
}

/// True when `header` (a raw `Digest` response header value) declares a
/// digest for an algorithm `expected` also has an entry for, and the two
/// disagree. Grounded on `download.py`'s `checksums[hashtype] !=
/// digest_sums[hashtype]` check: algorithms present in only one side are
/// ignored, not treated as a mismatch.
fn digest_header_mismatches(header: Option<&str>, expected: Option<&HashMap<String, String>>) -> bool {
    let (Some(header), Some(expected)) = (header, expected) else {
        return false;
    };
    let observed = parse_digest_header(header);
    observed
        .iter()
        .any(|(algo, hex)| expected.get(algo).is_some_and(|e| !e.eq_ignore_ascii_case(hex)))
}
