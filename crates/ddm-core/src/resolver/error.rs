//! Permanent-per-mirror error taxonomy for the Source Resolver and mirror
//! ordering, per spec.md §7.

use std::fmt;

#[derive(Debug)]
pub enum MirrorError {
    /// `Content-Range`/`Content-Length` total didn't match the FileSpec's
    /// expected size.
    BadSize,
    /// FTP server returned a permanent (5xx) reply.
    FtpPerm,
    /// Non-2xx/206 HTTP status.
    HttpStatus(u16),
    /// URL failed to parse or had no recognizable scheme.
    InvalidUrl,
    /// Scheme outside `{http, https, ftp}`.
    UnsupportedProtocol,
}

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorError::BadSize => write!(f, "mirror size mismatch"),
            MirrorError::FtpPerm => write!(f, "FTP permanent error"),
            MirrorError::HttpStatus(code) => write!(f, "HTTP {}", code),
            MirrorError::InvalidUrl => write!(f, "invalid URL"),
            MirrorError::UnsupportedProtocol => write!(f, "unsupported protocol"),
        }
    }
}

impl std::error::Error for MirrorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_http_status() {
        assert_eq!(MirrorError::HttpStatus(404).to_string(), "HTTP 404");
    }
}
