//! Precedence-based verification: pgp, then the strongest present hash.
//!
//! The first digest attempted decides the result; lower-precedence digests
//! are never consulted as a fallback, matching the original's
//! `verify_checksum`/`verify_chunk_checksum` (a present-but-mismatching
//! strong digest is authoritative, even if a weaker digest would match).

use std::collections::HashMap;
use std::path::Path;

use super::algo::{hash_bytes, hash_stream, Algo};
use super::pgp::{PgpOutcome, PgpVerifier};

/// Verifies a whole file against `digests` (map of algorithm token to
/// expected lowercase-hex digest). Returns `true` when no digests are
/// supplied at all (nothing to check against).
///
/// Precedence: `pgp` first, via `pgp_verifier` (a missing verifier or a
/// missing `pgp` entry counts as "not attempted" and falls through); else
/// the strongest of `{sha512, sha384, sha256, sha1, md5}` present in
/// `digests`.
pub fn verify_file(
    path: &Path,
    digests: &HashMap<String, String>,
    pgp_verifier: Option<&dyn PgpVerifier>,
) -> anyhow::Result<bool> {
    if digests.is_empty() {
        return Ok(true);
    }

    if let Some(sig_hex) = digests.get(Algo::Pgp.token()) {
        if let Some(verifier) = pgp_verifier {
            let sig_bytes = hex::decode(sig_hex).unwrap_or_default();
            match verifier.verify(path, &sig_bytes) {
                PgpOutcome::Verified => return Ok(true),
                PgpOutcome::Failed => return Ok(false),
                PgpOutcome::NotAttempted => {}
            }
        }
    }

    for algo in Algo::HASH_PRECEDENCE {
        if let Some(expected) = digests.get(algo.token()) {
            let actual = hash_stream(path, algo)?;
            return Ok(actual.eq_ignore_ascii_case(expected));
        }
    }

    // Digests were supplied but none matched a known algorithm token.
    Ok(true)
}

/// Verifies an in-memory chunk against `digests`, same precedence as
/// `verify_file` but without the PGP step (PGP signs whole files, not
/// individual pieces).
pub fn verify_chunk(bytes: &[u8], digests: &HashMap<String, String>) -> anyhow::Result<bool> {
    if digests.is_empty() {
        return Ok(true);
    }
    for algo in Algo::HASH_PRECEDENCE {
        if let Some(expected) = digests.get(algo.token()) {
            let actual = hash_bytes(algo, bytes)?;
            return Ok(actual.eq_ignore_ascii_case(expected));
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct AlwaysFail;
    impl PgpVerifier for AlwaysFail {
        fn verify(&self, _path: &Path, _signature: &[u8]) -> PgpOutcome {
            PgpOutcome::Failed
        }
    }

    #[test]
    fn empty_digests_means_assume_ok() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digests = HashMap::new();
        assert!(verify_file(f.path(), &digests, None).unwrap());
    }

    #[test]
    fn strongest_mismatch_is_authoritative_even_with_matching_weak() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();

        let mut digests = HashMap::new();
        // Correct md5 for "hello\n", but deliberately wrong sha512.
        digests.insert("md5".to_string(), "b1946ac92492d2347c6235b4d2611184".to_string());
        digests.insert("sha512".to_string(), "0".repeat(128));

        assert!(!verify_file(f.path(), &digests, None).unwrap());
    }

    #[test]
    fn single_correct_sha256_passes() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let mut digests = HashMap::new();
        digests.insert(
            "sha256".to_string(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03".to_string(),
        );
        assert!(verify_file(f.path(), &digests, None).unwrap());
    }

    #[test]
    fn pgp_verifier_failure_short_circuits() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let mut digests = HashMap::new();
        digests.insert("pgp".to_string(), "00".to_string());
        digests.insert(
            "md5".to_string(),
            "d41d8cd98f00b204e9800998ecf8427e".to_string(), // md5("") -- would pass if consulted
        );
        let verifier = AlwaysFail;
        assert!(!verify_file(f.path(), &digests, Some(&verifier)).unwrap());
    }

    #[test]
    fn verify_chunk_matches_bytes() {
        let mut digests = HashMap::new();
        digests.insert("md5".to_string(), "5d41402abc4b2a76b9719d911017c592".to_string());
        assert!(verify_chunk(b"hello", &digests).unwrap());
        digests.insert("md5".to_string(), "0".repeat(32));
        assert!(!verify_chunk(b"hello", &digests).unwrap());
    }
}
