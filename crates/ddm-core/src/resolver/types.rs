//! Data model for the Source Resolver: `FileSpec` and `Mirror`.
//!
//! Field names follow spec.md §3/§6's `FileSpec` attributes
//! (`filename`/`size`/`hashlist`/`pieces`/`piecelength`/`resources`/`os`/
//! `language`) renamed to the idiomatic Rust equivalents already used by
//! [`crate::resume::ResumeRecord`] and [`crate::segmenter`].

use std::collections::HashMap;
use std::path::PathBuf;

/// One download source: a URL plus the Segment Manager's ranking inputs.
///
/// `preference` mirrors Metalink's `resources[].preference` (higher wins);
/// `location` is the two-letter country code used by [`super::sort::start_sort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    pub url: String,
    pub preference: i32,
    pub location: Option<String>,
}

impl Mirror {
    pub fn new(url: impl Into<String>) -> Self {
        Mirror {
            url: url.into(),
            preference: 0,
            location: None,
        }
    }

    pub fn with_preference(mut self, preference: i32) -> Self {
        self.preference = preference;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Everything the Orchestrator, Segment Manager, and Sequential Manager need
/// to fetch and verify one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub output_path: PathBuf,
    pub expected_size: Option<u64>,
    /// Whole-file digests, keyed by algorithm token (`"sha256"`, `"pgp"`, …).
    pub whole_file_digests: HashMap<String, String>,
    pub piece_size: u64,
    /// Per-piece digests, keyed by algorithm token; `piece_digests[algo][i]`
    /// is the expected digest of piece `i`.
    pub piece_digests: HashMap<String, Vec<String>>,
    pub mirrors: Vec<Mirror>,
    /// File node's `os` attribute for the locale filter (empty ⇒ no constraint).
    pub os_tag: Option<String>,
    /// File node's `lang` attribute for the locale filter (empty or `"any"` ⇒ no constraint).
    pub lang_tag: Option<String>,
}

impl FileSpec {
    pub fn new(output_path: PathBuf, mirrors: Vec<Mirror>) -> Self {
        FileSpec {
            output_path,
            expected_size: None,
            whole_file_digests: HashMap::new(),
            piece_size: crate::config::DdmConfig::default().default_chunk_size,
            piece_digests: HashMap::new(),
            mirrors,
            os_tag: None,
            lang_tag: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_builder_sets_fields() {
        let m = Mirror::new("https://a.example/x").with_preference(5).with_location("DE");
        assert_eq!(m.preference, 5);
        assert_eq!(m.location.as_deref(), Some("DE"));
    }

    #[test]
    fn file_spec_new_defaults_piece_size() {
        let spec = FileSpec::new(PathBuf::from("x.iso"), vec![Mirror::new("https://a/x")]);
        assert_eq!(spec.piece_size, 262_144);
        assert!(spec.whole_file_digests.is_empty());
    }
}
