//! Per-piece error taxonomy for the Segment Worker state machine.
//!
//! Grounded in the teacher's `retry::error::SegmentError` (curl/HTTP/
//! partial-transfer/storage), extended with the FTP and checksum variants
//! the piece-fetch contract names: `Redirect`, `BadSize`, `FtpPerm`,
//! `FtpTemp`. The teacher's duplicate `retry::classify::SegmentError` is
//! not carried forward — `classify_curl_error`/`classify_http_status` stay
//! generic and this enum maps onto them at the call site instead.

use std::fmt;

/// Outcome of one Segment Worker's attempt at its assigned `(Mirror, Piece)`.
/// All variants except `Redirect`/`BadSize`/`FtpPerm` are transient and
/// eligible for reassignment by the Segment Manager; `Redirect` carries the
/// new location for the Manager to inject as a fresh mirror.
#[derive(Debug)]
pub enum SegmentError {
    /// Server responded 301/302; carries the `Location` target.
    Redirect(String),
    /// `Content-Range` total didn't match the FileSpec's expected size.
    /// Permanent: the Manager drops the mirror.
    BadSize,
    /// Curl reported a low-level socket error (not a timeout).
    BadSocket(curl::Error),
    /// Operation timed out (connect or read).
    Timeout,
    /// Piece bytes arrived but failed the piece digest check.
    ChunkChecksum,
    /// Non-2xx/206 HTTP status.
    HttpStatus(u32),
    /// FTP server returned a permanent (5xx) reply. Permanent.
    FtpPerm,
    /// FTP transient socket/control error, eligible for reconnect retry.
    FtpTemp,
    /// Fewer bytes arrived than the piece's byte range called for.
    IncompleteRead { expected: u64, received: u64 },
    /// Writing the fetched bytes to the shared output file failed.
    Storage(std::io::Error),
}

impl SegmentError {
    /// Whether the Segment Manager should drop the mirror entirely rather
    /// than just reassigning this one piece.
    pub fn is_permanent_for_mirror(&self) -> bool {
        matches!(
            self,
            SegmentError::BadSize | SegmentError::FtpPerm | SegmentError::HttpStatus(400..=499)
        )
    }
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::Redirect(loc) => write!(f, "redirect to {}", loc),
            SegmentError::BadSize => write!(f, "content-range size mismatch"),
            SegmentError::BadSocket(e) => write!(f, "socket error: {}", e),
            SegmentError::Timeout => write!(f, "timed out"),
            SegmentError::ChunkChecksum => write!(f, "piece checksum mismatch"),
            SegmentError::HttpStatus(code) => write!(f, "HTTP {}", code),
            SegmentError::FtpPerm => write!(f, "FTP permanent error"),
            SegmentError::FtpTemp => write!(f, "FTP transient error"),
            SegmentError::IncompleteRead { expected, received } => {
                write!(f, "incomplete read: expected {} bytes, got {}", expected, received)
            }
            SegmentError::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl std::error::Error for SegmentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SegmentError::BadSocket(e) => Some(e),
            SegmentError::Storage(e) => Some(e),
            _ => None,
        }
    }
}
