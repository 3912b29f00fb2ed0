//! `ddm run` – drain the Job Queue: resolve each queued job's source and
//! hand it to the Orchestrator, up to `--jobs` at a time sharing the global
//! connection budget.

use anyhow::Result;
use ddm_core::config::DdmConfig;
use ddm_core::control::JobControl;
use ddm_core::host_policy::HostPolicy;
use ddm_core::job_queue::{JobId, JobMetadata, JobState, ResumeDb};
use ddm_core::orchestrator;
use ddm_core::resolver::{self, ResolvedSource};
use ddm_core::scheduler::GlobalConnectionBudget;
use ddm_core::segment_manager::ManagerCallbacks;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::cli::control_socket;

pub async fn run_scheduler(
    db: &ResumeDb,
    cfg: &DdmConfig,
    force_restart: bool,
    jobs: usize,
    overwrite: bool,
) -> Result<()> {
    let recovered = db.recover_running_jobs().await?;
    if recovered > 0 {
        tracing::info!("recovered {} job(s) from previous run", recovered);
    }

    // Loaded and saved around the run; not yet wired into mirror/piece-size
    // selection (see DESIGN.md).
    let host_policy = match HostPolicy::default_path()
        .and_then(|p| HostPolicy::load_from_path(&p, cfg.min_segments, cfg.max_segments))
    {
        Ok(Some(policy)) => policy,
        _ => HostPolicy::new(cfg.min_segments, cfg.max_segments),
    };

    let job_control = Arc::new(JobControl::new());
    if let Ok(socket_path) = ddm_core::control::default_control_socket_path() {
        if control_socket::spawn_control_listener(Arc::clone(&job_control), &socket_path).is_ok() {
            tracing::debug!(path = %socket_path.display(), "control socket listening");
        }
    }

    let queued: Vec<JobId> = db
        .list_jobs()
        .await?
        .into_iter()
        .filter(|j| j.state == JobState::Queued)
        .map(|j| j.id)
        .collect();

    if queued.is_empty() {
        println!("No queued jobs.");
        return Ok(());
    }

    let jobs = jobs.max(1);
    let global_budget = Arc::new(GlobalConnectionBudget::new(cfg.max_total_connections));
    let per_job_reservation = (cfg.max_total_connections / jobs).max(1);
    let semaphore = Arc::new(Semaphore::new(jobs));

    let mut handles = Vec::with_capacity(queued.len());
    for id in queued {
        let db = db.clone();
        let cfg = cfg.clone();
        let job_control = Arc::clone(&job_control);
        let global_budget = Arc::clone(&global_budget);
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
            let reserved = global_budget.reserve(per_job_reservation);
            let outcome = run_one_job(&db, &cfg, id, force_restart, overwrite, &job_control).await;
            global_budget.release(reserved);
            if let Err(e) = outcome {
                eprintln!("job {id}: {e:#}");
            }
        }));
    }

    let mut completed = 0u32;
    for h in handles {
        if h.await.is_ok() {
            completed += 1;
        }
    }

    if let Ok(path) = HostPolicy::default_path() {
        if host_policy.save_to_path(&path).is_err() {
            tracing::warn!("could not save host policy to {}", path.display());
        }
    }

    tracing::info!("run processed {} job(s)", completed);
    Ok(())
}

async fn run_one_job(
    db: &ResumeDb,
    cfg: &DdmConfig,
    id: JobId,
    force_restart: bool,
    overwrite: bool,
    job_control: &Arc<JobControl>,
) -> Result<()> {
    let Some(job) = db.get_job(id).await? else {
        return Ok(());
    };

    db.set_state(id, JobState::Running).await?;
    let abort_token = job_control.register(id);

    let resolved = resolver::resolve(&job.source, &HashMap::new());
    let mut spec = match resolved {
        Ok(ResolvedSource::FileSpec(spec)) => spec,
        Ok(ResolvedSource::MetalinkXml) | Ok(ResolvedSource::Jigdo) => {
            job_control.unregister(id);
            db.set_state(id, JobState::Error).await?;
            anyhow::bail!(
                "source resolves to a Metalink/Jigdo descriptor; parsing multi-file \
                 descriptors is handled by an external collaborator, not this engine"
            );
        }
        Err(e) => {
            job_control.unregister(id);
            db.set_state(id, JobState::Error).await?;
            anyhow::bail!("source resolution failed: {e}");
        }
    };

    if let Some(dir) = &job.settings.download_dir {
        if spec.output_path.is_relative() {
            spec.output_path = PathBuf::from(dir).join(&spec.output_path);
        }
    }
    if overwrite {
        let _ = std::fs::remove_file(&spec.output_path);
    }

    db.update_metadata(
        id,
        &JobMetadata {
            output_path: Some(spec.output_path.display().to_string()),
            total_size: spec.expected_size.map(|s| s as i64),
            completed_bytes: job.completed_bytes,
        },
    )
    .await?;

    let db_progress = db.clone();
    let start = Instant::now();
    let cancel_token = Arc::clone(&abort_token);
    let callbacks = ManagerCallbacks {
        status: Some(Box::new(move |bytes_done, _block_size, total_size| {
            let elapsed = start.elapsed().as_secs_f64();
            let rate_mib = if elapsed > 0.0 {
                bytes_done as f64 / elapsed / 1_048_576.0
            } else {
                0.0
            };
            println!(
                "job {id}: {:.1}/{:.1} MiB  {:.2} MiB/s",
                bytes_done as f64 / 1_048_576.0,
                total_size as f64 / 1_048_576.0,
                rate_mib
            );
            let db = db_progress.clone();
            let bytes_done = bytes_done as i64;
            tokio::spawn(async move {
                let _ = db.update_progress(id, bytes_done).await;
            });
        })),
        cancel: Some(Box::new(move || cancel_token.load(Ordering::Relaxed))),
        ..Default::default()
    };

    let outcome = orchestrator::run_file(&spec, cfg, force_restart, callbacks).await;
    job_control.unregister(id);

    match outcome {
        Ok(_path) => {
            db.set_state(id, JobState::Completed).await?;
            println!("job {id}: completed -> {}", spec.output_path.display());
            Ok(())
        }
        Err(e) => {
            db.set_state(id, JobState::Error).await?;
            anyhow::bail!("download failed: {e}");
        }
    }
}
