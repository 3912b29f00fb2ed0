//! Source Resolver (C7): classifies an input source string into a
//! [`FileSpec`] and orders its mirrors, per spec.md §4.7.
//!
//! Grounded in the teacher's `resolver::Resolver` trait, generalized from a
//! single "resolve one job spec" abstraction into the four-way
//! classification (Jigdo suffix / Metalink XML Content-Type / Metalink
//! -over-HTTP Link+Digest headers / plain URL fallback).

mod classify;
mod error;
mod jigdo;
mod link_header;
mod sort;
mod types;

pub use classify::{classify_head, link_header_spec, plain_url_spec, SourceKind, METALINK_MIME_TYPE};
pub use error::MirrorError;
pub use jigdo::{constituent_specs, parse_jigdo, reassemble, JigdoDescriptor, JigdoError, JigdoPart};
pub use link_header::{parse_link_header, LinkEntry};
pub use sort::{matches_locale, start_sort};
pub use types::{FileSpec, Mirror};

use std::collections::HashMap;

use crate::fetch_head;

/// Runs the full classification pipeline for a plain HTTP(S)/FTP source:
/// HEAD-probes `src` (skipped for `.jigdo` sources, which have no HEAD
/// step) and dispatches on [`classify_head`]. Metalink XML parsing is an
/// external collaborator (spec.md §1's Non-goals); this returns
/// [`SourceKind::MetalinkXml`] for the caller to hand off to that parser
/// rather than attempting it here.
pub fn resolve(src: &str, custom_headers: &HashMap<String, String>) -> Result<ResolvedSource, MirrorError> {
    if src.ends_with(".jigdo") {
        return Ok(ResolvedSource::Jigdo);
    }

    let mut headers = custom_headers.clone();
    headers
        .entry("Accept".to_string())
        .or_insert_with(|| format!("{}, */*", METALINK_MIME_TYPE));

    let head = fetch_head::probe(src, &headers).ok();
    match classify_head(src, head.as_ref()) {
        SourceKind::Jigdo => Ok(ResolvedSource::Jigdo),
        SourceKind::MetalinkXml => Ok(ResolvedSource::MetalinkXml),
        SourceKind::MetalinkLinkHeaders => {
            let head = head.as_ref().expect("classify_head only returns this branch with Some(head)");
            link_header_spec(src, head).map(ResolvedSource::FileSpec)
        }
        SourceKind::PlainUrl => {
            let content_disposition = head.as_ref().and_then(|h| h.content_disposition.as_deref());
            let mut spec = plain_url_spec(src, content_disposition);
            if let Some(h) = &head {
                spec.expected_size = h.content_length;
            }
            Ok(ResolvedSource::FileSpec(spec))
        }
    }
}

/// Outcome of [`resolve`]: either a directly usable FileSpec, or a marker
/// telling the caller to hand `src` off to an external Metalink/Jigdo
/// parser for the full multi-file descriptor.
#[derive(Debug)]
pub enum ResolvedSource {
    FileSpec(FileSpec),
    MetalinkXml,
    Jigdo,
}
