//! Transport: HTTP(S)/FTP range retrieval.
//!
//! Exposes two host types, `HttpHost` and `FtpHost`, both built on a single
//! `curl::easy::Easy` handle — libcurl speaks `ftp://` URLs through the same
//! `perform()` entry point as `http(s)://`, so one crate covers both
//! protocols rather than fabricating a second FTP-specific dependency.
//! Grounded in the teacher's `fetch_head::probe` and `downloader/segment.rs`
//! curl plumbing. Connection caps and redirect limits live on
//! [`crate::config::DdmConfig`] rather than as module-level constants, per
//! the single mutable-configuration design (see crate root docs).

mod headers;
mod http;

pub use headers::{common_headers, CommonHeadersConfig};
pub use http::{HttpHost, RangeOutcome};
