//! Source classification, per spec.md §4.7's ordered rules:
//!
//! 1. `src` ends with `.jigdo` → Jigdo path.
//! 2. HEAD `src` with `Accept: application/metalink+xml, */*`:
//!    - `Content-Type` starts with `application/metalink+xml` → Metalink XML.
//!    - else a `Link` header present alongside a `Digest` header → RFC 6249
//!      synthetic FileSpec.
//!    - else path ends in `.metalink`/`.meta4` → force Metalink XML.
//! 3. Otherwise: plain single-URL FileSpec, output name `basename(src)`.
//!
//! Grounded in the teacher's `resolver::Resolver` trait (single "resolve one
//! job spec" abstraction) generalized to this four-way split, and in
//! `url_model::derive_filename` for the plain-URL output name.

use std::path::PathBuf;

use crate::digest::parse_digest_header;
use crate::fetch_head::HeadResult;
use crate::url_model::derive_filename;

use super::error::MirrorError;
use super::link_header::parse_link_header;
use super::types::{FileSpec, Mirror};

pub const METALINK_MIME_TYPE: &str = "application/metalink+xml";

/// Which of spec.md §4.7's four branches a source falls into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Jigdo,
    MetalinkXml,
    MetalinkLinkHeaders,
    PlainUrl,
}

/// Picks the branch a source classifies into given its HEAD response
/// (`None` when the HEAD probe itself failed, or was never attempted — step
/// 3's fallback still applies).
pub fn classify_head(src: &str, head: Option<&HeadResult>) -> SourceKind {
    if src.ends_with(".jigdo") {
        return SourceKind::Jigdo;
    }

    if let Some(head) = head {
        if let Some(ct) = &head.content_type {
            if ct
                .split(';')
                .next()
                .map(|t| t.trim().eq_ignore_ascii_case(METALINK_MIME_TYPE))
                .unwrap_or(false)
            {
                return SourceKind::MetalinkXml;
            }
        }
        if head.link_header.is_some() && head.digest_header.is_some() {
            return SourceKind::MetalinkLinkHeaders;
        }
        if src.ends_with(".metalink") || src.ends_with(".meta4") {
            return SourceKind::MetalinkXml;
        }
    }

    SourceKind::PlainUrl
}

/// Builds the plain single-URL FileSpec for step 3: one mirror, output name
/// `basename(src)`.
pub fn plain_url_spec(src: &str, content_disposition: Option<&str>) -> FileSpec {
    let filename = derive_filename(src, content_disposition);
    FileSpec::new(PathBuf::from(filename), vec![Mirror::new(src)])
}

/// Builds the synthetic RFC 6249 FileSpec for the `Link` + `Digest` branch:
/// each `rel="duplicate"` entry becomes a Mirror (ranked by `pri`, lower
/// first, matching Metalink's "lower `pri` is preferred" convention by
/// mapping `pri` onto `preference` with the sign flipped); any
/// `rel="describedby"; type="application/pgp-signature"` entry is recorded
/// as the URL to fetch for PGP verification, keyed `"pgp-signature-url"` in
/// `whole_file_digests` rather than fetched here (fetching is an I/O
/// concern for the caller, consistent with `digest::PgpVerifier` being an
/// external collaborator).
pub fn link_header_spec(src: &str, head: &HeadResult) -> Result<FileSpec, MirrorError> {
    let link_value = head.link_header.as_deref().ok_or(MirrorError::InvalidUrl)?;
    let digest_value = head.digest_header.as_deref().ok_or(MirrorError::InvalidUrl)?;

    let entries = parse_link_header(link_value);
    let mirrors: Vec<Mirror> = entries
        .iter()
        .filter(|e| e.rel.as_deref() == Some("duplicate"))
        .map(|e| {
            let preference = e.pri.map(|p| -p).unwrap_or(0);
            Mirror::new(e.url.clone()).with_preference(preference)
        })
        .collect();
    let mirrors = if mirrors.is_empty() {
        vec![Mirror::new(src)]
    } else {
        mirrors
    };

    let mut spec = plain_url_spec(src, head.content_disposition.as_deref());
    spec.mirrors = mirrors;
    spec.expected_size = head.content_length;
    spec.whole_file_digests = parse_digest_header(digest_value);

    if let Some(pgp_entry) = entries.iter().find(|e| {
        e.rel.as_deref() == Some("describedby")
            && e.media_type.as_deref() == Some("application/pgp-signature")
    }) {
        spec.whole_file_digests
            .insert("pgp-signature-url".to_string(), pgp_entry.url.clone());
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(content_type: Option<&str>, link: Option<&str>, digest: Option<&str>) -> HeadResult {
        HeadResult {
            final_url: None,
            content_length: Some(100),
            accept_ranges: true,
            etag: None,
            last_modified: None,
            content_disposition: None,
            content_type: content_type.map(str::to_string),
            link_header: link.map(str::to_string),
            digest_header: digest.map(str::to_string),
        }
    }

    #[test]
    fn jigdo_suffix_wins_regardless_of_head() {
        assert_eq!(classify_head("https://x/file.jigdo", None), SourceKind::Jigdo);
    }

    #[test]
    fn metalink_content_type_classifies_as_metalink_xml() {
        let h = head(Some("application/metalink+xml; charset=utf-8"), None, None);
        assert_eq!(classify_head("https://x/file", Some(&h)), SourceKind::MetalinkXml);
    }

    #[test]
    fn link_and_digest_without_metalink_content_type_classifies_as_link_headers() {
        let h = head(None, Some("<https://a/x>; rel=\"duplicate\""), Some("sha-256=abc"));
        assert_eq!(
            classify_head("https://x/file", Some(&h)),
            SourceKind::MetalinkLinkHeaders
        );
    }

    #[test]
    fn link_without_digest_falls_through() {
        let h = head(None, Some("<https://a/x>; rel=\"duplicate\""), None);
        assert_eq!(classify_head("https://x/file.bin", Some(&h)), SourceKind::PlainUrl);
    }

    #[test]
    fn metalink_suffix_without_headers_forces_metalink_xml() {
        let h = head(None, None, None);
        assert_eq!(
            classify_head("https://x/file.metalink", Some(&h)),
            SourceKind::MetalinkXml
        );
        assert_eq!(
            classify_head("https://x/file.meta4", Some(&h)),
            SourceKind::MetalinkXml
        );
    }

    #[test]
    fn no_head_result_falls_back_to_plain_url() {
        assert_eq!(classify_head("https://x/archive.iso", None), SourceKind::PlainUrl);
    }

    #[test]
    fn plain_url_spec_derives_basename() {
        let spec = plain_url_spec("https://cdn.example/path/debian-12.iso", None);
        assert_eq!(spec.output_path, PathBuf::from("debian-12.iso"));
        assert_eq!(spec.mirrors.len(), 1);
    }

    #[test]
    fn link_header_spec_builds_mirrors_and_digests() {
        let h = head(
            None,
            Some(
                r#"<https://a/x.iso>; rel="duplicate"; pri=1, <https://b/x.iso>; rel="duplicate"; pri=2, <https://a/x.iso.sig>; rel="describedby"; type="application/pgp-signature""#,
            ),
            Some("sha-256=MDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDA="),
        );
        let spec = link_header_spec("https://x/file.iso", &h).unwrap();
        assert_eq!(spec.mirrors.len(), 2);
        // pri=1 ranks above pri=2 (preference is the negated pri).
        assert!(spec.mirrors[0].preference > spec.mirrors[1].preference);
        assert!(spec.whole_file_digests.contains_key("sha256"));
        assert_eq!(
            spec.whole_file_digests.get("pgp-signature-url").map(String::as_str),
            Some("https://a/x.iso.sig")
        );
    }

    #[test]
    fn link_header_spec_requires_both_headers() {
        let h = head(None, None, Some("sha-256=abc"));
        assert!(matches!(link_header_spec("https://x/file", &h), Err(MirrorError::InvalidUrl)));
    }
}
