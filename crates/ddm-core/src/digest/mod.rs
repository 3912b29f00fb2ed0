//! Digest & Verifier: streaming/one-shot hashing, precedence-based
//! verification, and RFC 3230 `Digest` header parsing.
//!
//! Grounded in the teacher's `checksum::sha256_path` (streaming `sha2` hash
//! over a file), generalized to the algorithm set `{md5, sha1, sha256,
//! sha384, sha512}` plus an opaque PGP verifier slot, and in
//! `download.py`'s `verify_checksum`/`verify_chunk_checksum`/`digest_parse`
//! for the exact precedence and header-parsing semantics.

mod algo;
mod header;
mod pgp;
mod verify;

pub use algo::{hash_bytes, hash_stream, Algo};
pub use header::parse_digest_header;
pub use pgp::{PgpOutcome, PgpVerifier};
pub use verify::{verify_chunk, verify_file};
