//! Supported digest algorithms and streaming/one-shot hash computation.

use anyhow::{Context, Result};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest as Sha2Digest, Sha256, Sha384, Sha512};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024;

/// One of the digest algorithms the engine understands, in the precedence
/// order used by [`crate::digest::verify_file`] (strongest first). `Pgp` is
/// not a hash algorithm; it is kept here only so callers can express "try
/// pgp first" without a separate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algo {
    Pgp,
    Sha512,
    Sha384,
    Sha256,
    Sha1,
    Md5,
}

impl Algo {
    /// Parse a Metalink/RFC-3230-style algorithm token. `"sha"` aliases to
    /// `sha1` per the original format.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "pgp" => Some(Algo::Pgp),
            "sha512" | "sha-512" => Some(Algo::Sha512),
            "sha384" | "sha-384" => Some(Algo::Sha384),
            "sha256" | "sha-256" => Some(Algo::Sha256),
            "sha1" | "sha-1" | "sha" => Some(Algo::Sha1),
            "md5" => Some(Algo::Md5),
            _ => None,
        }
    }

    /// Canonical map key used throughout the engine (spec.md §3's
    /// `whole_file_digests`/`piece_digests` keys: `md5`, `sha1`, `sha256`,
    /// `sha384`, `sha512`, `pgp`), undashed regardless of the dashed form a
    /// `Digest:` header may have used on the wire.
    pub fn token(self) -> &'static str {
        match self {
            Algo::Pgp => "pgp",
            Algo::Sha512 => "sha512",
            Algo::Sha384 => "sha384",
            Algo::Sha256 => "sha256",
            Algo::Sha1 => "sha1",
            Algo::Md5 => "md5",
        }
    }

    /// Precedence order used by `verify_file`/`verify_chunk`: strongest hash
    /// algorithm first. Does not include `Pgp` (handled separately since it
    /// delegates to an external verifier rather than comparing hex digests).
    pub const HASH_PRECEDENCE: [Algo; 5] = [
        Algo::Sha512,
        Algo::Sha384,
        Algo::Sha256,
        Algo::Sha1,
        Algo::Md5,
    ];
}

/// Hashes a byte slice and returns the lowercase-hex digest.
pub fn hash_bytes(algo: Algo, data: &[u8]) -> Result<String> {
    let hex = match algo {
        Algo::Pgp => anyhow::bail!("pgp is not a hash algorithm"),
        Algo::Sha512 => {
            let mut h = Sha512::new();
            h.update(data);
            hex::encode(h.finalize())
        }
        Algo::Sha384 => {
            let mut h = Sha384::new();
            h.update(data);
            hex::encode(h.finalize())
        }
        Algo::Sha256 => {
            let mut h = Sha256::new();
            h.update(data);
            hex::encode(h.finalize())
        }
        Algo::Sha1 => {
            let mut h = Sha1::new();
            h.update(data);
            hex::encode(h.finalize())
        }
        Algo::Md5 => {
            let mut h = Md5::new();
            h.update(data);
            hex::encode(h.finalize())
        }
    };
    Ok(hex)
}

/// Reads `path` in 1 MiB chunks and returns the lowercase-hex digest under
/// `algo`. Fails with an I/O error wrapped in context if the read fails.
pub fn hash_stream(path: &Path, algo: Algo) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = vec![0u8; BUF_SIZE];

    macro_rules! stream_with {
        ($hasher:expr) => {{
            let mut hasher = $hasher;
            loop {
                let n = f
                    .read(&mut buf)
                    .with_context(|| format!("read {}", path.display()))?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            hex::encode(hasher.finalize())
        }};
    }

    let hex = match algo {
        Algo::Pgp => anyhow::bail!("pgp is not a hash algorithm"),
        Algo::Sha512 => stream_with!(Sha512::new()),
        Algo::Sha384 => stream_with!(Sha384::new()),
        Algo::Sha256 => stream_with!(Sha256::new()),
        Algo::Sha1 => stream_with!(Sha1::new()),
        Algo::Md5 => stream_with!(Md5::new()),
    };
    Ok(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha256_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = hash_stream(f.path(), Algo::Sha256).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let digest = hash_stream(f.path(), Algo::Sha256).unwrap();
        assert_eq!(
            digest,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn md5_known_content() {
        let hex = hash_bytes(Algo::Md5, b"hello").unwrap();
        assert_eq!(hex, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn algo_token_roundtrip_sha_alias() {
        assert_eq!(Algo::from_token("sha"), Some(Algo::Sha1));
        assert_eq!(Algo::from_token("SHA-256"), Some(Algo::Sha256));
        assert_eq!(Algo::from_token("bogus"), None);
    }
}
