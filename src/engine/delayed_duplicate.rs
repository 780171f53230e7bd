use std::cmp::Ordering;

use tracing::info;

use crate::codec::{decode_idbuf, encode_id};
use crate::domain::Domain;
use crate::error::SolverError;
use crate::outcome::SearchOutcome;

/// Tunables for the delayed-duplicate-detection engine (component §4.7).
#[derive(Debug, Clone)]
pub struct DddConfig {
    /// Total memory budget, shared across the `prevprev`/`prev`/`cur` regions.
    pub ram_bytes: usize,
    /// `true` for directed graphs (full `prevprev := merge(prevprev, prev)`
    /// retention); `false` for undirected graphs (`prevprev := prev`, since a
    /// new state can only collide with the last two generations).
    pub directed: bool,
}

impl DddConfig {
    pub fn new(ram_bytes: usize, directed: bool) -> Self {
        DddConfig { ram_bytes, directed }
    }
}

/// Sorts `v` ascending and removes duplicates in place.
fn sort_and_compress(v: &mut Vec<u64>) {
    v.sort_unstable();
    v.dedup();
}

/// Removes from `v` (sorted ascending) every entry also present in `prevprev`
/// or `prev` (both sorted ascending), by linear co-scan — the Rust expression
/// of `removeduplicates2`.
fn remove_duplicates_against(v: &mut Vec<u64>, prevprev: &[u64], prev: &[u64]) {
    let mut out = Vec::with_capacity(v.len());
    let mut pp = 0usize;
    let mut pr = 0usize;
    for &x in v.iter() {
        while pp < prevprev.len() && prevprev[pp] < x {
            pp += 1;
        }
        while pr < prev.len() && prev[pr] < x {
            pr += 1;
        }
        let in_pp = pp < prevprev.len() && prevprev[pp] == x;
        let in_pr = pr < prev.len() && prev[pr] == x;
        if !in_pp && !in_pr {
            out.push(x);
        }
    }
    *v = out;
}

/// Merges two sorted, duplicate-free, disjoint slices into one sorted Vec.
fn merge_sorted(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less | Ordering::Equal => {
                out.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Runs the delayed-duplicate-detection engine (component §4.7): no disk
/// access, dedup deferred from per-state to per-batch via sort+merge against
/// the previous two sorted generations. Cannot recover a solution path —
/// finding the goal is a hard error, per the reference implementation's own
/// documented limitation (see Design Notes).
pub fn solve<D: Domain>(domain: &mut D, cfg: &DddConfig) -> Result<SearchOutcome, SolverError> {
    let s = domain.state_size();
    if s == 0 || s > 8 {
        return Err(SolverError::Internal(format!(
            "state size {s} outside supported range 1..=8"
        )));
    }
    let cap = (cfg.ram_bytes / s as usize).max(2);

    let start = domain.encode(0);
    let start_v = decode_idbuf(&start);
    if domain.won(0) {
        return Ok(SearchOutcome::Solved { path: vec![start] });
    }

    let mut prevprev: Vec<u64> = Vec::new();
    let mut prev: Vec<u64> = vec![start_v];
    let mut cur_sorted: Vec<u64> = Vec::new();
    let mut cur_unsorted: Vec<u64> = Vec::new();
    let mut tot: u64 = 1;
    let mut iter_no: u32 = 0;

    loop {
        if prev.is_empty() {
            break;
        }
        info!(iter = iter_no, q = prev.len(), tot, "delayed-duplicate BFS generation boundary");
        cur_sorted.clear();
        cur_unsorted.clear();
        let mut repacks = 0u32;

        for &pv in prev.iter() {
            let pbuf = encode_id(pv, s)?;
            domain.decode(&pbuf, 0);
            for child in domain.visit_neighbours(0) {
                domain.decode(&child, 0);
                if domain.won(0) {
                    return Err(SolverError::Internal(
                        "delayed-duplicate engine does not support solution output; \
                         rerun with the disk-swapping or parallel engine to recover a path"
                            .to_string(),
                    ));
                }
                cur_unsorted.push(decode_idbuf(&child));

                let total = prevprev.len() + prev.len() + cur_sorted.len() + cur_unsorted.len();
                if total >= cap {
                    sort_and_compress(&mut cur_unsorted);
                    remove_duplicates_against(&mut cur_unsorted, &prevprev, &prev);
                    if cur_sorted.is_empty() {
                        cur_sorted = std::mem::take(&mut cur_unsorted);
                    } else {
                        cur_sorted = merge_sorted(&cur_sorted, &cur_unsorted);
                        cur_unsorted.clear();
                    }
                    repacks += 1;
                    if prevprev.len() + prev.len() + cur_sorted.len() >= cap {
                        return Err(SolverError::OutOfMemory(format!(
                            "delayed-duplicate arena exhausted after {repacks} repacks"
                        )));
                    }
                }
            }
        }

        if repacks > 0 {
            info!(repacks, "repacked current generation during expansion");
        }

        let mut combined = cur_sorted.clone();
        combined.extend_from_slice(&cur_unsorted);
        sort_and_compress(&mut combined);
        remove_duplicates_against(&mut combined, &prevprev, &prev);

        let new_prevprev = if cfg.directed {
            merge_sorted(&prevprev, &prev)
        } else {
            prev.clone()
        };

        tot += combined.len() as u64;
        prevprev = new_prevprev;
        prev = combined;
        iter_no += 1;
    }

    info!(iter = iter_no, tot, "delayed-duplicate BFS finished with no solution");
    Ok(SearchOutcome::NoSolution)
}
