//! Orchestrator (C8): skip-if-present logic and the segmented-then-
//! sequential fallback, per spec.md §4.8.
//!
//! Grounded in the teacher's `scheduler::run`/`scheduler::execute`
//! (`execute_download_phase`'s force-restart handling, `finish::
//! finish_after_download`), generalized from "run one SQLite-backed job"
//! to "run one FileSpec".

mod skip;

pub use skip::{skip_check, SkipDecision};

use std::path::PathBuf;

use crate::config::DdmConfig;
use crate::resolver::FileSpec;
use crate::segment_manager::{self, ManagerCallbacks, ManagerOutcome};
use crate::sequential_manager;

/// Runs one FileSpec to completion: skip-if-present, segmented download,
/// sequential fallback on segmented failure. Returns the final output path
/// on success.
pub async fn run_file(
    spec: &FileSpec,
    cfg: &DdmConfig,
    force: bool,
    mut callbacks: ManagerCallbacks,
) -> Result<PathBuf, ManagerOutcome> {
    if !force {
        match skip_check(spec) {
            SkipDecision::AlreadyComplete => {
                callbacks.report_status(
                    spec.expected_size.unwrap_or(0),
                    1,
                    spec.expected_size.unwrap_or(0),
                );
                return Ok(spec.output_path.clone());
            }
            SkipDecision::Resuming | SkipDecision::Fresh => {}
        }
    }

    if let Some(parent) = spec.output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;
    }

    match segment_manager::run(spec, cfg, &mut callbacks).await {
        Ok(()) => Ok(spec.output_path.clone()),
        Err(ManagerOutcome::Cancelled) => Err(ManagerOutcome::Cancelled),
        Err(_) => sequential_manager::run(spec, cfg, &mut callbacks)
            .await
            .map(|()| spec.output_path.clone()),
    }
}
