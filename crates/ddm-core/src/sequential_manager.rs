//! Sequential Manager (C6): the segmented-mode fallback, per spec.md §4.6.
//!
//! Grounded in the teacher's `downloader::single::download_single` (a
//! non-Range sequential GET), generalized to iterate mirrors from a random
//! start and reuse the same Resume Store, treating the whole file as one
//! contiguous "piece 0" run.

use std::time::Instant;

use rand::Rng;

use crate::config::DdmConfig;
use crate::digest::verify_file;
use crate::resolver::{start_sort, FileSpec};
use crate::resume::{resume_path_for, ResumeRecord};
use crate::segment_manager::{format_eta, ManagerCallbacks, ManagerOutcome};
use crate::segment_worker::run_segment;
use crate::storage::{temp_path, SharedWriter, StorageWriterBuilder};
use crate::transport::{CommonHeadersConfig, HttpHost};

/// Runs a whole-file, range-less download of `spec`, trying each mirror in
/// turn starting from a random offset into the ordered mirror list so
/// repeated fallback runs don't always hammer the same first mirror.
pub async fn run(
    spec: &FileSpec,
    cfg: &DdmConfig,
    callbacks: &mut ManagerCallbacks,
) -> Result<(), ManagerOutcome> {
    let mirrors = start_sort(spec.mirrors.clone(), &cfg.country);
    if mirrors.is_empty() {
        return Err(ManagerOutcome::NoMirrorsRemaining);
    }

    let start = rand::thread_rng().gen_range(0..mirrors.len());
    let ordered = mirrors.iter().cycle().skip(start).take(mirrors.len());

    let resume_path = resume_path_for(&spec.output_path);
    let temp = temp_path(&spec.output_path);

    let host = HttpHost::new(
        CommonHeadersConfig {
            uuid: cfg.uuid.clone(),
            accept_metalink: false,
        },
        cfg.max_redirects,
    );

    let started_at = Instant::now();

    for mirror in ordered {
        if callbacks.is_cancelled() {
            return Err(ManagerOutcome::Cancelled);
        }

        let mut resume = ResumeRecord::load(&resume_path);
        if resume.piece_size() != u64::MAX {
            // A segmented-mode sidecar (real piece_size, piece 0 marked as
            // soon as the first range finishes) is not this manager's
            // numbering scheme; start a fresh whole-file record instead of
            // reading its piece 0 as "already done".
            resume = ResumeRecord::new(u64::MAX);
        }
        if resume.is_completed(0) {
            break;
        }

        let writer = if temp.exists() {
            SharedWriter::open_existing(&temp).map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?
        } else {
            if let Some(parent) = spec.output_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let size = spec.expected_size.unwrap_or(0);
            let mut builder = StorageWriterBuilder::create(&temp)
                .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;
            if size > 0 {
                builder
                    .preallocate(size)
                    .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;
            }
            builder.build()
        };

        let url = mirror.url.clone();
        let host_clone = host.clone();
        let writer_clone = writer.clone();
        let expected_total = spec.expected_size;
        let byte_end = spec.expected_size.unwrap_or(u64::MAX);

        let result = tokio::task::spawn_blocking(move || {
            run_segment(&host_clone, &writer_clone, &url, 0, byte_end, expected_total, None)
        })
        .await
        .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;

        match result {
            Ok(outcome) => {
                writer.sync().map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;

                if !spec.whole_file_digests.is_empty() {
                    let ok = verify_file(writer.temp_path(), &spec.whole_file_digests, None)
                        .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;
                    if !ok {
                        return Err(ManagerOutcome::WholeFileChecksum);
                    }
                }

                writer
                    .finalize(&spec.output_path)
                    .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;

                let _ = ResumeRecord::delete(&resume_path);
                let elapsed = started_at.elapsed().as_secs_f64();
                callbacks.report_status(outcome.bytes, 1, outcome.bytes);
                callbacks.report_bitrate(if elapsed > 0.0 {
                    (outcome.bytes as f64 * 8.0 / 1000.0) / elapsed
                } else {
                    0.0
                });
                callbacks.report_time(&format_eta(Some(0.0)));
                return Ok(());
            }
            Err(_) => {
                // Transient or permanent: try the next mirror in the cycle.
                continue;
            }
        }
    }

    Err(ManagerOutcome::NoMirrorsRemaining)
}
