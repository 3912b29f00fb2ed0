//! Pure scheduling policy for the Segment Manager's cycle: which piece to
//! assign next, which mirror to assign it to, and when to drop a mirror.
//!
//! Grounded in the original `Segment_Manager.get_chunk_index`/`get_url`
//! (next incomplete, not-in-flight piece; round-robin among mirrors not
//! already at their per-host connection limit) and `remove_errors` (drop a
//! mirror once it accumulates a permanent error). Kept free of I/O so the
//! 100 ms cycle's decisions are unit-testable without a network fixture.

use std::collections::{HashMap, HashSet};

use crate::resolver::Mirror;
use crate::segmenter::Piece;

/// Picks the first piece that is neither completed nor already assigned to
/// a running worker. `None` means every piece is either done or in flight.
pub fn get_chunk_index(
    pieces: &[Piece],
    completed: &HashSet<u64>,
    in_flight: &HashSet<u64>,
) -> Option<usize> {
    pieces
        .iter()
        .position(|p| !completed.contains(&p.index) && !in_flight.contains(&p.index))
}

/// Picks the next mirror to assign work to: the first mirror (in the
/// caller's preference order) whose active-worker count is below
/// `limit_per_host`, skipping mirrors in `dropped`.
pub fn next_url<'a>(
    mirrors: &'a [Mirror],
    active_per_mirror: &HashMap<String, usize>,
    dropped: &HashSet<String>,
    limit_per_host: usize,
) -> Option<&'a Mirror> {
    mirrors.iter().find(|m| {
        !dropped.contains(&m.url)
            && active_per_mirror.get(&m.url).copied().unwrap_or(0) < limit_per_host
    })
}

/// Removes mirrors that have accrued a permanent error from the live set,
/// returning the filtered list. Permanent errors are decided by the caller
/// (e.g. `SegmentError::is_permanent_for_mirror`) and passed in as a set of
/// URLs to drop.
pub fn remove_errors(mirrors: Vec<Mirror>, dropped: &HashSet<String>) -> Vec<Mirror> {
    mirrors.into_iter().filter(|m| !dropped.contains(&m.url)).collect()
}
