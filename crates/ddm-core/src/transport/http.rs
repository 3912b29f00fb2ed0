//! Range-fetch host over HTTP(S) or FTP, both via `curl::easy::Easy`.
//!
//! Grounded in `fetch_head::probe`'s `Easy` setup (follow_location, header
//! collection) and the teacher's `downloader/segment.rs` curl plumbing for
//! streaming a response body into a buffer via `write_function`.

use std::str;
use std::time::Duration;

use super::headers::{common_headers, CommonHeadersConfig};
use crate::retry::{classify_curl_error, classify_http_status, ErrorKind};
use crate::segment_worker::SegmentError;

/// Successful outcome of one range fetch: the bytes received plus any
/// `Digest` header the server returned alongside them.
#[derive(Debug, Clone)]
pub struct RangeOutcome {
    pub bytes: Vec<u8>,
    pub digest_header: Option<String>,
}

/// A single mirror host reachable over http(s) or ftp. One `HttpHost` is
/// constructed per fetch attempt; it owns no persistent connection state
/// (libcurl's connection reuse is per-process, not modeled here). Cheap to
/// clone into a `spawn_blocking` task since it's just the header config and
/// redirect limit.
#[derive(Clone)]
pub struct HttpHost {
    headers_cfg: CommonHeadersConfig,
    max_redirects: u32,
}

impl HttpHost {
    pub fn new(headers_cfg: CommonHeadersConfig, max_redirects: u32) -> Self {
        HttpHost {
            headers_cfg,
            max_redirects,
        }
    }

    /// Fetches `[start, end_exclusive)` from `url`. For `http(s)://` this is
    /// a `Range: bytes=start-(end-1)` GET expecting `206`; for `ftp://`
    /// libcurl expresses the same request as `REST start` + `RETR` via
    /// `resume_from_large`, so the same code path serves both schemes.
    pub fn fetch_range(
        &self,
        url: &str,
        start: u64,
        end_exclusive: u64,
        expected_total: Option<u64>,
    ) -> Result<RangeOutcome, SegmentError> {
        let is_ftp = url.starts_with("ftp://");
        let mut buf = Vec::with_capacity((end_exclusive.saturating_sub(start)) as usize);
        let mut resp_headers: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(SegmentError::BadSocket)?;
        easy.follow_location(!is_ftp)
            .map_err(SegmentError::BadSocket)?;
        if !is_ftp {
            easy.max_redirections(self.max_redirects)
                .map_err(SegmentError::BadSocket)?;
        }
        easy.connect_timeout(Duration::from_secs(15))
            .map_err(SegmentError::BadSocket)?;
        easy.timeout(Duration::from_secs(120))
            .map_err(SegmentError::BadSocket)?;

        if is_ftp {
            easy.resume_from(start).map_err(SegmentError::BadSocket)?;
        } else {
            let range = format!("{}-{}", start, end_exclusive.saturating_sub(1));
            easy.range(&range).map_err(SegmentError::BadSocket)?;
        }

        let mut list = curl::easy::List::new();
        for (k, v) in common_headers(&self.headers_cfg) {
            list.append(&format!("{}: {}", k, v))
                .map_err(SegmentError::BadSocket)?;
        }
        if !is_ftp {
            easy.http_headers(list).map_err(SegmentError::BadSocket)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    buf.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(SegmentError::BadSocket)?;
            if !is_ftp {
                transfer
                    .header_function(|data| {
                        if let Ok(s) = str::from_utf8(data) {
                            resp_headers.push(s.trim_end().to_string());
                        }
                        true
                    })
                    .map_err(SegmentError::BadSocket)?;
            }
            transfer.perform().map_err(|e| {
                if e.is_operation_timedout() {
                    SegmentError::Timeout
                } else {
                    SegmentError::BadSocket(e)
                }
            })?;
        }

        if is_ftp {
            let expected = end_exclusive.saturating_sub(start);
            if (buf.len() as u64) < expected {
                return Err(SegmentError::IncompleteRead {
                    expected,
                    received: buf.len() as u64,
                });
            }
            return Ok(RangeOutcome {
                bytes: buf,
                digest_header: None,
            });
        }

        let code = easy.response_code().unwrap_or(0);
        if let Some((_, location)) = resp_headers
            .iter()
            .filter_map(|h| h.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("location"))
        {
            if matches!(code, 301 | 302) {
                return Err(SegmentError::Redirect(location.trim().to_string()));
            }
        }
        if code != 206 && code != 200 {
            return Err(SegmentError::HttpStatus(code));
        }

        let parsed = parse_response_headers(&resp_headers);
        if let (Some(total), Some(expected)) = (parsed.content_range_total, expected_total) {
            if total != expected {
                return Err(SegmentError::BadSize);
            }
        }

        Ok(RangeOutcome {
            bytes: buf,
            digest_header: parsed.digest_header,
        })
    }
}

struct ParsedRangeHeaders {
    content_range_total: Option<u64>,
    digest_header: Option<String>,
}

fn parse_response_headers(lines: &[String]) -> ParsedRangeHeaders {
    let mut content_range_total = None;
    let mut digest_header = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-range") {
                // "bytes 0-99/1234"
                if let Some(total_str) = value.rsplit('/').next() {
                    content_range_total = total_str.trim().parse::<u64>().ok();
                }
            }
            if name.eq_ignore_ascii_case("digest") {
                digest_header = Some(value.to_string());
            }
        }
    }
    ParsedRangeHeaders {
        content_range_total,
        digest_header,
    }
}

/// Classifies a [`SegmentError`] into the generic retry taxonomy so
/// callers can drive [`crate::retry::RetryPolicy`] without matching on
/// every worker-specific variant themselves.
pub fn classify_segment_error(e: &SegmentError) -> ErrorKind {
    match e {
        SegmentError::BadSocket(ce) => classify_curl_error(ce),
        SegmentError::HttpStatus(code) => classify_http_status(*code),
        SegmentError::Timeout => ErrorKind::Timeout,
        SegmentError::FtpTemp | SegmentError::IncompleteRead { .. } => ErrorKind::Connection,
        SegmentError::ChunkChecksum
        | SegmentError::Redirect(_)
        | SegmentError::BadSize
        | SegmentError::FtpPerm
        | SegmentError::Storage(_) => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_response_headers_reads_content_range_total() {
        let lines = vec!["Content-Range: bytes 0-99/2000".to_string()];
        let parsed = parse_response_headers(&lines);
        assert_eq!(parsed.content_range_total, Some(2000));
    }

    #[test]
    fn parse_response_headers_reads_digest() {
        let lines = vec!["Digest: sha-256=abc".to_string()];
        let parsed = parse_response_headers(&lines);
        assert_eq!(parsed.digest_header.as_deref(), Some("sha-256=abc"));
    }

    #[test]
    fn classify_maps_worker_errors_onto_retry_kinds() {
        assert_eq!(classify_segment_error(&SegmentError::Timeout), ErrorKind::Timeout);
        assert_eq!(
            classify_segment_error(&SegmentError::HttpStatus(503)),
            ErrorKind::Throttled
        );
        assert_eq!(
            classify_segment_error(&SegmentError::BadSize),
            ErrorKind::Other
        );
    }
}
