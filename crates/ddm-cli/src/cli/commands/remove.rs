//! `ddm remove <id>` – remove a job, optionally deleting its resolved output.

use anyhow::Result;
use ddm_core::job_queue::ResumeDb;
use ddm_core::resume::resume_path_for;
use ddm_core::storage::temp_path;
use std::path::Path;

pub async fn run_remove(db: &ResumeDb, id: i64, delete_files: bool) -> Result<()> {
    if delete_files {
        if let Some(job) = db.get_job(id).await? {
            if let Some(output_path) = &job.output_path {
                let path = Path::new(output_path);
                let _ = std::fs::remove_file(path);
                let _ = std::fs::remove_file(temp_path(path));
                let _ = std::fs::remove_file(resume_path_for(path));
            }
        }
    }
    db.remove_job(id).await?;
    println!("Removed job {id}");
    Ok(())
}
