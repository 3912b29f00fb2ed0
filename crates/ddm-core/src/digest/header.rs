//! RFC 3230 `Digest` response header parsing.
//!
//! Grounded in `download.py`'s `digest_parse`: comma-separated
//! `algo=base64value` pairs; the bare token `sha` aliases to `sha-1`;
//! values are base64-decoded then re-encoded as lowercase hex.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::HashMap;

use super::algo::Algo;

/// Parses a `Digest` header value into a map of canonical algorithm token
/// (e.g. `"sha256"`, undashed — see [`Algo::token`]) to lowercase-hex
/// digest. Entries with an unrecognized algorithm or malformed base64 are
/// skipped rather than failing the whole header.
pub fn parse_digest_header(header: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for part in header.split(',') {
        let part = part.trim();
        let Some((raw_algo, raw_value)) = part.split_once('=') else {
            continue;
        };
        let Some(algo) = Algo::from_token(raw_algo) else {
            continue;
        };
        let value = raw_value.trim().trim_matches('"');
        let Ok(decoded) = BASE64.decode(value) else {
            continue;
        };
        out.insert(algo.token().to_string(), hex::encode(decoded));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sha_alias_and_known_algos() {
        // base64("hello") just as a stand-in payload for the test, not a real digest.
        let payload = BASE64.encode(b"hello");
        let header = format!("sha={p},md5={p}", p = payload);
        let parsed = parse_digest_header(&header);
        assert_eq!(parsed.get("sha1"), Some(&hex::encode(b"hello")));
        assert_eq!(parsed.get("md5"), Some(&hex::encode(b"hello")));
    }

    #[test]
    fn skips_unknown_algorithm() {
        let payload = BASE64.encode(b"x");
        let header = format!("crc32={}", payload);
        assert!(parse_digest_header(&header).is_empty());
    }

    #[test]
    fn handles_multiple_comma_separated_values() {
        let a = BASE64.encode(b"AAA");
        let b = BASE64.encode(b"BBB");
        let header = format!("sha-256={}, sha-512={}", a, b);
        let parsed = parse_digest_header(&header);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("sha256"), Some(&hex::encode(b"AAA")));
        assert_eq!(parsed.get("sha512"), Some(&hex::encode(b"BBB")));
    }
}
