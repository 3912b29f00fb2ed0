//! `ddm status` – show status of all jobs.

use anyhow::Result;
use ddm_core::job_queue::ResumeDb;

pub async fn run_status(db: &ResumeDb) -> Result<()> {
    let jobs = db.list_jobs().await?;
    if jobs.is_empty() {
        println!("No jobs in database.");
    } else {
        println!(
            "{:<6} {:<10} {:<12} {:<12} {}",
            "ID", "STATE", "SIZE", "DONE", "SOURCE"
        );
        for j in jobs {
            let size_str = j
                .total_size
                .map(|s| format!("{s}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<6} {:<10} {:<12} {:<12} {}",
                j.id,
                j.state.as_str(),
                size_str,
                j.completed_bytes,
                j.source
            );
        }
    }
    Ok(())
}
