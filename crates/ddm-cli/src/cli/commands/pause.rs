//! `ddm pause <id>` – pause a job.

use anyhow::Result;
use ddm_core::job_queue::{JobState, ResumeDb};

pub async fn run_pause(db: &ResumeDb, id: i64) -> Result<()> {
    db.set_state(id, JobState::Paused).await?;
    if let Ok(socket_path) = ddm_core::control::default_control_socket_path() {
        let _ = crate::cli::control_socket::send_pause(&socket_path, id).await;
    }
    println!("Paused job {id}");
    Ok(())
}
