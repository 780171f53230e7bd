use std::path::PathBuf;

use tracing::info;

use crate::codec::{decode_idbuf, encode_id, IdBuf};
use crate::domain::Domain;
use crate::error::SolverError;
use crate::gen_store::GenerationStore;
use crate::outcome::SearchOutcome;
use crate::visited::ChunkedVisited;

/// Tunables for the disk-swapping and parallel engines (component §4.4/§4.6).
#[derive(Debug, Clone)]
pub struct DiskEngineConfig {
    /// Working directory for `GEN-gggg` frontier files.
    pub dir: PathBuf,
    /// Block-size exponent for the chunked lazy visited set; `2^block_bits`
    /// bits per chunk. `0` means a single chunk.
    pub block_bits: u32,
    /// Read-buffer (incoming generation) size in bytes.
    pub l1_bytes: usize,
    /// Write-buffer (outgoing generation) size in bytes.
    pub l2_bytes: usize,
}

impl DiskEngineConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DiskEngineConfig {
            dir: dir.into(),
            block_bits: 16,
            l1_bytes: 50 * 1024 * 1024,
            l2_bytes: 50 * 1024 * 1024,
        }
    }
}

fn check_state_space<D: Domain>(domain: &D) -> Result<(u8, u64), SolverError> {
    let s = domain.state_size();
    if s == 0 || s > 8 {
        return Err(SolverError::Internal(format!(
            "state size {s} outside supported range 1..=8"
        )));
    }
    let n = domain
        .state_space_size()
        .checked_add(1)
        .ok_or_else(|| SolverError::TooLarge("state space size overflowed u64".to_string()))?;
    if n == 0 || n >= (1u64 << 60) - 1 {
        return Err(SolverError::TooLarge(format!(
            "state space of {n} states exceeds the supported 2^60 - 1 bound"
        )));
    }
    Ok((s, n))
}

/// Runs the single-threaded disk-swapping BFS engine (component §4.6).
pub fn solve<D: Domain>(
    domain: &mut D,
    cfg: &DiskEngineConfig,
) -> Result<SearchOutcome, SolverError> {
    let (s, n) = check_state_space(domain)?;
    let visited = ChunkedVisited::new(n, cfg.block_bits);
    let store = GenerationStore::new(&cfg.dir, s, cfg.l1_bytes, cfg.l2_bytes)?;

    let start = domain.encode(0);
    let start_v = decode_idbuf(&start);
    visited.test_and_set(start_v);
    store.write_initial(&start)?;

    if domain.won(0) {
        return Ok(SearchOutcome::Solved { path: vec![start] });
    }

    let mut tot: u64 = 0;
    let mut gen: u32 = 0;
    loop {
        let mut reader = store.reader(gen)?;
        let frontier_size = reader.len_ids();
        tot += frontier_size;
        info!(gen, frontier_size, tot, "disk BFS generation boundary");
        if frontier_size == 0 {
            break;
        }
        let mut writer = store.writer(gen + 1)?;
        let mut win: Option<(u64, IdBuf)> = None;

        reader.for_each_id(|id| {
            domain.decode(&id, 0);
            for child in domain.visit_neighbours(0) {
                let cv = decode_idbuf(&child);
                if !visited.test_and_set(cv) {
                    continue;
                }
                domain.decode(&child, 0);
                if domain.won(0) {
                    win = Some((cv, child));
                }
                writer.push(&child)?;
            }
            Ok(())
        })?;
        writer.finish()?;

        if let Some((win_v, win_buf)) = win {
            info!(
                allocated = visited.allocated_chunks(),
                total = visited.total_chunks(),
                "chunked visited-set fill at solution time"
            );
            return backward_reconstruct(&store, gen, win_v, win_buf, domain);
        }
        gen += 1;
    }

    info!(
        allocated = visited.allocated_chunks(),
        total = visited.total_chunks(),
        "chunked visited-set fill with no solution found"
    );
    Ok(SearchOutcome::NoSolution)
}

/// Reconstructs the solution path by scanning generation files in reverse.
///
/// No parent pointers are kept on disk, so a predecessor of `target` is found
/// by re-running `visit_neighbours` over every state at depth `gen`, `gen-1`,
/// ..., `0` until one's children include `target`. This is explicitly
/// single-threaded even when invoked from the parallel engine.
pub(crate) fn backward_reconstruct<D: Domain>(
    store: &GenerationStore,
    start_gen: u32,
    win_v: u64,
    win_buf: IdBuf,
    domain: &mut D,
) -> Result<SearchOutcome, SolverError> {
    let mut path = vec![win_buf];
    let mut target = win_v;

    for g in (0..=start_gen).rev() {
        let mut reader = store.reader(g)?;
        let mut found: Option<(u64, IdBuf)> = None;
        reader.for_each_id(|id| {
            if found.is_some() {
                return Ok(());
            }
            domain.decode(&id, 0);
            for child in domain.visit_neighbours(0) {
                if decode_idbuf(&child) == target {
                    found = Some((decode_idbuf(&id), id));
                    break;
                }
            }
            Ok(())
        })?;
        match found {
            Some((pv, pbuf)) => {
                path.push(pbuf);
                target = pv;
            }
            None => {
                return Err(SolverError::Internal(format!(
                    "backward reconstruction found no predecessor of state {target} at depth {g}"
                )));
            }
        }
    }

    path.reverse();
    Ok(SearchOutcome::Solved { path })
}
