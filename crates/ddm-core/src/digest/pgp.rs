//! Opaque PGP verification hook.
//!
//! PGP signature verification itself is out of scope for this engine (see
//! the crate root docs): callers that care about detached `.sig`/`.asc`
//! signatures provide a `PgpVerifier`; callers that don't, simply never
//! populate a `pgp` entry in `whole_file_digests` and this path is never
//! consulted.

use std::path::Path;

/// Outcome of a PGP verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgpOutcome {
    Verified,
    Failed,
    NotAttempted,
}

/// External collaborator that checks a detached PGP signature against a
/// file. `verify_file` treats a missing verifier the same as
/// `PgpOutcome::NotAttempted`: the absence of a verifier is not a failure,
/// it simply means PGP is not consulted and the next-strongest hash decides.
pub trait PgpVerifier {
    fn verify(&self, path: &Path, signature: &[u8]) -> PgpOutcome;
}
