//! Segment Manager (C5): the cooperative driver that assigns `(Mirror,
//! Piece)` work to Segment Workers, collects their results, and reports
//! progress, per spec.md §4.5.
//!
//! Grounded in the teacher's `scheduler::budget`/`scheduler::progress`
//! (reused here for the connection cap and bitrate/ETA math) and the
//! original `Segment_Manager.cycle`/`get_size` for the 100 ms loop and
//! majority-agreement size probing. Workers run as `tokio::task::spawn_blocking`
//! tasks (the curl transport is synchronous) bounded by
//! `host_limit * limit_per_host` concurrent in-flight pieces, per spec.md §5.

mod callbacks;
mod eta;
mod policy;
mod size;

pub use callbacks::ManagerCallbacks;
pub use eta::format_eta;
pub use policy::{get_chunk_index, next_url, remove_errors};
pub use size::{majority_size, probe_majority_size};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::config::DdmConfig;
use crate::resolver::{matches_locale, start_sort, FileSpec, Mirror};
use crate::resume::{resume_path_for, ResumeRecord};
use crate::segment_worker::{run_segment, SegmentError};
use crate::segmenter::{clamp_piece_size, plan_pieces, Piece};
use crate::storage::{SharedWriter, StorageWriterBuilder};
use crate::transport::{CommonHeadersConfig, HttpHost};

const CYCLE_INTERVAL: Duration = Duration::from_millis(100);
const SIZE_PROBE_SAMPLE: usize = 5;

/// Fatal outcomes of a Segment Manager run, per spec.md §7's
/// "Fatal-per-file" taxonomy plus `Cancelled`. `Ok(())` means the file is
/// on disk, piece-verified, and (if present) whole-file-verified.
#[derive(Debug)]
pub enum ManagerOutcome {
    /// Every mirror was dropped (permanent error) before the file completed.
    NoMirrorsRemaining,
    /// All pieces verified individually but the whole-file digest check failed.
    WholeFileChecksum,
    /// The shared output file could not be written to.
    WriteFailure(String),
    /// The Orchestrator's cancellation callback returned true.
    Cancelled,
}

impl fmt::Display for ManagerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerOutcome::NoMirrorsRemaining => write!(f, "no mirrors remaining"),
            ManagerOutcome::WholeFileChecksum => write!(f, "whole-file checksum mismatch"),
            ManagerOutcome::WriteFailure(e) => write!(f, "write failure: {}", e),
            ManagerOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for ManagerOutcome {}

struct InFlight {
    index: usize,
    mirror_url: String,
}

/// Runs the segmented download of `spec` to completion.
///
/// Returns `Ok(())` on a fully verified file; any `Err(ManagerOutcome)`
/// means the caller (the Orchestrator) should fall back to the Sequential
/// Manager, except `Cancelled`, which should propagate as-is.
pub async fn run(
    spec: &FileSpec,
    cfg: &DdmConfig,
    callbacks: &mut ManagerCallbacks,
) -> Result<(), ManagerOutcome> {
    if !matches_locale(spec.os_tag.as_deref(), spec.lang_tag.as_deref(), &cfg.os_tag, &cfg.lang) {
        return Err(ManagerOutcome::NoMirrorsRemaining);
    }

    let mut mirrors = start_sort(spec.mirrors.clone(), &cfg.country);
    if mirrors.is_empty() {
        return Err(ManagerOutcome::NoMirrorsRemaining);
    }

    let total_size = match spec.expected_size {
        Some(size) => size,
        None => probe_majority_size(&mirrors, SIZE_PROBE_SAMPLE)
            .ok_or(ManagerOutcome::NoMirrorsRemaining)?,
    };

    let has_piece_digests = !spec.piece_digests.is_empty();
    let piece_size = if has_piece_digests {
        spec.piece_size
    } else {
        clamp_piece_size(total_size, spec.piece_size, cfg.max_chunks)
    };

    let resume_path = resume_path_for(&spec.output_path);
    let mut resume = ResumeRecord::load(&resume_path);
    if resume.piece_size() == 0 {
        resume = ResumeRecord::new(piece_size);
    } else if resume.piece_size() != piece_size {
        resume.update_piece_size(piece_size);
    }

    let pieces = plan_pieces(total_size, piece_size);
    let temp_path = crate::storage::temp_path(&spec.output_path);

    let writer = if temp_path.exists() {
        SharedWriter::open_existing(&temp_path)
            .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?
    } else {
        if let Some(parent) = spec.output_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let mut builder = StorageWriterBuilder::create(&temp_path)
            .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;
        builder
            .preallocate(total_size)
            .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;
        builder.build()
    };

    let host = HttpHost::new(
        CommonHeadersConfig {
            uuid: cfg.uuid.clone(),
            accept_metalink: false,
        },
        cfg.max_redirects,
    );

    let limit_per_host = cfg.limit_per_host.max(1);
    let host_limit = cfg.host_limit.max(1);
    let max_in_flight = host_limit * limit_per_host;

    let mut completed: HashSet<u64> = resume.completed_indices().collect();
    let mut in_flight: HashSet<u64> = HashSet::new();
    let mut active_per_mirror: HashMap<String, usize> = HashMap::new();
    let mut dropped: HashSet<String> = HashSet::new();

    let mut tasks: JoinSet<(InFlight, Result<crate::segment_worker::WorkerOutcome, SegmentError>)> =
        JoinSet::new();

    let started_at = Instant::now();
    let mut bytes_done: u64 = completed.iter().filter_map(|i| pieces.get(*i as usize)).map(Piece::len).sum();

    loop {
        if callbacks.is_cancelled() {
            return Err(ManagerOutcome::Cancelled);
        }

        if completed.len() == pieces.len() && in_flight.is_empty() {
            break;
        }

        if mirrors.is_empty() && in_flight.is_empty() {
            let _ = resume.save(&resume_path);
            return Err(ManagerOutcome::NoMirrorsRemaining);
        }

        if !callbacks.is_paused() {
            while in_flight.len() < max_in_flight {
                let Some(idx) = get_chunk_index(&pieces, &completed, &in_flight) else {
                    break;
                };
                let Some(mirror) = next_url(&mirrors, &active_per_mirror, &dropped, limit_per_host)
                else {
                    break;
                };

                let piece = pieces[idx];
                let mirror_url = mirror.url.clone();
                *active_per_mirror.entry(mirror_url.clone()).or_insert(0) += 1;
                in_flight.insert(piece.index);

                let host = host.clone();
                let writer = writer.clone();
                let piece_digest = piece_digest_for(spec, piece.index as usize);
                let expected_total = Some(total_size);
                let url_for_task = mirror_url.clone();

                tasks.spawn_blocking(move || {
                    let result = run_segment(
                        &host,
                        &writer,
                        &url_for_task,
                        piece.byte_start,
                        piece.byte_end,
                        expected_total,
                        piece_digest.as_ref(),
                    );
                    (
                        InFlight {
                            index: piece.index as usize,
                            mirror_url: url_for_task,
                        },
                        result,
                    )
                });
            }
        }

        let tick = sleep(CYCLE_INTERVAL);
        tokio::pin!(tick);
        loop {
            tokio::select! {
                _ = &mut tick => break,
                joined = tasks.join_next(), if !tasks.is_empty() => {
                    let Some(joined) = joined else { break };
                    let (flight, result) = joined.map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;
                    in_flight.remove(&(flight.index as u64));
                    if let Some(count) = active_per_mirror.get_mut(&flight.mirror_url) {
                        *count = count.saturating_sub(1);
                    }

                    match result {
                        Ok(outcome) => {
                            if let Some(redirect_url) = outcome.redirect_to {
                                if !mirrors.iter().any(|m| m.url == redirect_url) {
                                    mirrors.push(Mirror::new(redirect_url));
                                }
                            } else {
                                completed.insert(flight.index as u64);
                                resume.mark(flight.index as u64);
                                bytes_done += pieces[flight.index].len();
                            }
                        }
                        Err(e) => {
                            if e.is_permanent_for_mirror() {
                                dropped.insert(flight.mirror_url.clone());
                                mirrors = remove_errors(std::mem::take(&mut mirrors), &dropped);
                            }
                        }
                    }
                }
            }
        }

        let elapsed = started_at.elapsed().as_secs_f64();
        let stats = crate::scheduler::ProgressStats {
            bytes_done,
            total_bytes: total_size,
            elapsed_secs: elapsed,
            segments_done: completed.len(),
            segment_count: pieces.len(),
        };
        callbacks.report_status(bytes_done, 1, total_size);
        callbacks.report_bitrate(stats.kbps());
        callbacks.report_time(&format_eta(stats.eta_secs()));
        let _ = resume.save(&resume_path);
    }

    writer
        .sync()
        .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;

    if !spec.whole_file_digests.is_empty() {
        let ok = crate::digest::verify_file(writer.temp_path(), &spec.whole_file_digests, None)
            .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;
        if !ok {
            return Err(ManagerOutcome::WholeFileChecksum);
        }
    }

    writer
        .finalize(&spec.output_path)
        .map_err(|e| ManagerOutcome::WriteFailure(e.to_string()))?;

    let _ = ResumeRecord::delete(&resume_path);
    callbacks.report_status(total_size, 1, total_size);
    Ok(())
}

fn piece_digest_for(spec: &FileSpec, index: usize) -> Option<HashMap<String, String>> {
    if spec.piece_digests.is_empty() {
        return None;
    }
    let mut out = HashMap::new();
    for (algo, values) in &spec.piece_digests {
        if let Some(v) = values.get(index) {
            out.insert(algo.clone(), v.clone());
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
