//! `ddm add <source>` – queue a new download job.
//!
//! Classification (URL vs. Metalink vs. Jigdo) happens at `ddm run` time, not
//! here, so `add` never blocks on network I/O.

use anyhow::Result;
use ddm_core::job_queue::{JobSettings, ResumeDb};
use std::path::Path;

pub async fn run_add(db: &ResumeDb, source: &str, download_dir: Option<&Path>) -> Result<()> {
    let settings = JobSettings {
        note: None,
        download_dir: download_dir.map(|p| p.display().to_string()),
    };
    let id = db.add_job(source, &settings).await?;
    println!("Added job {id} for source: {source}");
    Ok(())
}
