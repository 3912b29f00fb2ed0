//! CLI for the DDM download manager.

mod commands;
mod control_socket;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use ddm_core::config;
use ddm_core::job_queue::ResumeDb;
use std::path::Path;

use commands::{
    run_add, run_checksum, run_completions, run_pause, run_remove, run_resume, run_scheduler,
    run_status,
};

/// Top-level CLI for the DDM download manager.
#[derive(Debug, Parser)]
#[command(name = "ddm")]
#[command(about = "DDM: high-throughput segmented download manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Add a new download job. Classification (URL vs. Metalink vs. Jigdo)
    /// happens at `run` time, not here, so `add` never blocks on network I/O.
    Add {
        /// Source to download: a direct URL, or a `.metalink`/`.meta4`/`.jigdo` path.
        source: String,
        /// Directory where the file will be saved (default: current directory). Stored with the job so resume works from any working directory.
        #[arg(long, value_name = "DIR")]
        download_dir: Option<std::path::PathBuf>,
    },

    /// Run the Job Queue loop: resolve and download every queued job.
    Run {
        /// If the remote file changed (or resuming fails), discard progress and re-download from scratch.
        #[arg(long)]
        force_restart: bool,
        /// Run up to N jobs concurrently (default 1), sharing the global connection budget.
        #[arg(long, default_value = "1", value_name = "N")]
        jobs: usize,
        /// Overwrite existing final file if it already exists on disk. Without this, a job whose output already matches is skipped rather than re-downloaded.
        #[arg(long)]
        overwrite: bool,
    },

    /// Show status of all jobs.
    Status,

    /// Pause a job by ID. It will not be picked up on the next `run`, and an
    /// in-flight download for it (if any) is signalled to stop over the
    /// control socket.
    Pause {
        /// Job identifier.
        id: i64,
    },

    /// Resume a paused job by its ID.
    Resume {
        /// Job identifier.
        id: i64,
    },

    /// Remove a job by ID. With --delete-files, also deletes the job's
    /// resolved output file and its resume sidecars.
    Remove {
        /// Job identifier.
        id: i64,
        /// Also delete the job's resolved output, `.part`, and `.temp` resume sidecar.
        #[arg(long)]
        delete_files: bool,
    },

    /// Compute a digest of a file (e.g. after download).
    Checksum {
        /// Path to the file.
        path: String,
        /// Digest algorithm: md5, sha1, sha256, sha384, or sha512.
        #[arg(long, default_value = "sha256")]
        algo: String,
    },

    /// Print a shell completion script to stdout.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let db = ResumeDb::open_default().await?;

        match cli.command {
            CliCommand::Add { source, download_dir } => {
                let dir = download_dir.or_else(|| std::env::current_dir().ok());
                run_add(&db, &source, dir.as_deref()).await?
            }
            CliCommand::Run { force_restart, jobs, overwrite } => {
                run_scheduler(&db, &cfg, force_restart, jobs, overwrite).await?;
            }
            CliCommand::Status => run_status(&db).await?,
            CliCommand::Pause { id } => run_pause(&db, id).await?,
            CliCommand::Resume { id } => run_resume(&db, id).await?,
            CliCommand::Remove { id, delete_files } => run_remove(&db, id, delete_files).await?,
            CliCommand::Checksum { path, algo } => run_checksum(Path::new(&path), &algo).await?,
            CliCommand::Completions { .. } => unreachable!("handled above"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
