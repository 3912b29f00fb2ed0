//! `ddm checksum <path>` – compute a digest of a file.

use anyhow::{bail, Result};
use ddm_core::digest::{hash_stream, Algo};
use std::path::Path;

pub async fn run_checksum(path: &Path, algo: &str) -> Result<()> {
    let Some(algo) = Algo::from_token(algo) else {
        bail!("unknown digest algorithm: {algo} (expected md5, sha1, sha256, sha384, or sha512)");
    };
    let digest = hash_stream(path, algo)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
