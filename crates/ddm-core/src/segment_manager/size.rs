//! Majority-agreement size probing: when a FileSpec doesn't already carry
//! `expected_size`, HEAD each mirror and trust whichever `Content-Length`
//! the most mirrors agree on (grounded in the original `Segment_Manager
//! .get_size`'s "ask every mirror, go with the majority" strategy — a
//! single compromised or stale mirror can't poison the whole download).

use std::collections::{HashMap, HashSet};

use crate::fetch_head::{self, HeadResult};
use crate::resolver::Mirror;

/// Probes up to `sample_limit` mirrors and returns the most common
/// `Content-Length`, or `None` if none responded with a size at all.
pub fn probe_majority_size(mirrors: &[Mirror], sample_limit: usize) -> Option<u64> {
    let empty = HashMap::new();
    let mut tally: HashMap<u64, u32> = HashMap::new();
    let mut order: Vec<u64> = Vec::new();

    for mirror in mirrors.iter().take(sample_limit) {
        let Ok(head) = fetch_head::probe(&mirror.url, &empty) else {
            continue;
        };
        if let Some(size) = head.content_length {
            if !tally.contains_key(&size) {
                order.push(size);
            }
            *tally.entry(size).or_insert(0) += 1;
        }
    }

    order
        .into_iter()
        .max_by_key(|size| tally.get(size).copied().unwrap_or(0))
}

/// Pure variant of the majority vote over already-collected HEAD results,
/// split out from `probe_majority_size` so the tallying logic is testable
/// without a network fixture.
pub fn majority_size(results: &[HeadResult]) -> Option<u64> {
    let mut seen: HashSet<u64> = HashSet::new();
    let mut tally: HashMap<u64, u32> = HashMap::new();
    let mut order: Vec<u64> = Vec::new();
    for r in results {
        if let Some(size) = r.content_length {
            if seen.insert(size) {
                order.push(size);
            }
            *tally.entry(size).or_insert(0) += 1;
        }
    }
    order.into_iter().max_by_key(|size| tally.get(size).copied().unwrap_or(0))
}
