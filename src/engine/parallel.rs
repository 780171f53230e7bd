use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Barrier;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::codec::{decode_idbuf, IdBuf};
use crate::domain::Domain;
use crate::engine::disk::backward_reconstruct;
use crate::error::SolverError;
use crate::gen_store::{FrontierWriter, GenerationStore};
use crate::outcome::SearchOutcome;
use crate::visited::ChunkedVisited;

/// Tunables for the parallel engine (component §4.8). `threads` must be in
/// `[1, 999]`, matching the reference implementation's sanity bound.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    pub dir: PathBuf,
    pub threads: usize,
    pub block_bits: u32,
    pub l1_bytes: usize,
    pub l2_bytes: usize,
}

impl ParallelConfig {
    pub fn new(dir: impl Into<PathBuf>, threads: usize) -> Self {
        ParallelConfig {
            dir: dir.into(),
            threads,
            block_bits: 16,
            l1_bytes: 50 * 1024 * 1024,
            l2_bytes: 50 * 1024 * 1024,
        }
    }
}

struct ChunkData {
    bytes: Vec<u8>,
    len: usize,
}

struct SolutionState {
    found: bool,
    win_v: u64,
    win_buf: IdBuf,
}

struct Shared {
    visited: ChunkedVisited,
    chunk: RwLock<ChunkData>,
    out: Mutex<Option<FrontierWriter>>,
    solution: Mutex<SolutionState>,
    shutdown: AtomicBool,
    state_size: u8,
}

fn worker_loop<D: Domain>(thr: usize, mut domain: D, threads: usize, shared: &Shared, barrier: &Barrier) {
    let s = shared.state_size as usize;
    loop {
        barrier.wait();
        if shared.shutdown.load(AtomicOrdering::Acquire) {
            barrier.wait();
            return;
        }
        let (bytes, len) = {
            let chunk = shared.chunk.read();
            (chunk.bytes.clone(), chunk.len)
        };
        let mut off = thr * s;
        while off < len {
            if shared.solution.lock().found {
                break;
            }
            let id = IdBuf::from_bytes(&bytes[off..off + s])
                .expect("chunk offsets are always state-size aligned");
            domain.decode(&id, thr);
            for child in domain.visit_neighbours(thr) {
                if shared.solution.lock().found {
                    break;
                }
                let cv = decode_idbuf(&child);
                if !shared.visited.test_and_set(cv) {
                    continue;
                }
                domain.decode(&child, thr);
                let is_win = domain.won(thr);
                if is_win {
                    let mut sol = shared.solution.lock();
                    if !sol.found {
                        sol.found = true;
                        sol.win_v = cv;
                        sol.win_buf = child;
                    }
                }
                let mut out = shared.out.lock();
                if let Some(w) = out.as_mut() {
                    let _ = w.push(&child);
                }
            }
            off += threads * s;
        }
        barrier.wait();
    }
}

/// Runs the parallel disk-swapping BFS engine (component §4.8): `T` worker
/// threads plus a master, synchronized by a barrier of arity `T+1`. Shares
/// its on-disk generation-file format and chunked visited set with the
/// single-threaded disk engine, and reuses that engine's serial backward
/// reconstruction once a solution is found.
pub fn solve<D: Domain>(
    domain: &D,
    cfg: &ParallelConfig,
) -> Result<SearchOutcome, SolverError> {
    if cfg.threads == 0 || cfg.threads > 999 {
        return Err(SolverError::ThreadSpawn(format!(
            "number of threads should be between 1 and 999, got {}",
            cfg.threads
        )));
    }
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

    let mut master_domain = domain.clone();
    let store = GenerationStore::new(&cfg.dir, s, cfg.l1_bytes, cfg.l2_bytes)?;
    let visited = ChunkedVisited::new(n, cfg.block_bits);

    let start = master_domain.encode(0);
    let start_v = decode_idbuf(&start);
    visited.test_and_set(start_v);
    store.write_initial(&start)?;

    if master_domain.won(0) {
        return Ok(SearchOutcome::Solved { path: vec![start] });
    }

    let shared = Shared {
        visited,
        chunk: RwLock::new(ChunkData {
            bytes: Vec::new(),
            len: 0,
        }),
        out: Mutex::new(None),
        solution: Mutex::new(SolutionState {
            found: false,
            win_v: 0,
            win_buf: start,
        }),
        shutdown: AtomicBool::new(false),
        state_size: s,
    };
    let barrier = Barrier::new(cfg.threads + 1);
    let worker_domains: Vec<D> = (0..cfg.threads).map(|_| domain.clone()).collect();

    let mut tot: u64 = 0;
    let mut gen: u32 = 0;

    let outcome = std::thread::scope(|scope| -> Result<Option<(u32, u64, IdBuf)>, SolverError> {
        for (thr, dom) in worker_domains.into_iter().enumerate() {
            let shared_ref = &shared;
            let barrier_ref = &barrier;
            let threads = cfg.threads;
            scope.spawn(move || worker_loop(thr, dom, threads, shared_ref, barrier_ref));
        }

        loop {
            let mut reader = store.reader(gen)?;
            let frontier_size = reader.len_ids();
            tot += frontier_size;
            info!(gen, frontier_size, tot, "parallel BFS generation boundary");
            if frontier_size == 0 {
                shared.shutdown.store(true, AtomicOrdering::Release);
                barrier.wait();
                barrier.wait();
                break;
            }

            *shared.out.lock() = Some(store.writer(gen + 1)?);

            while let Some(page) = reader.next_page()? {
                let page_len = page.len();
                {
                    let mut chunk = shared.chunk.write();
                    chunk.bytes = page;
                    chunk.len = page_len;
                }
                barrier.wait();
                barrier.wait();
                if shared.solution.lock().found {
                    break;
                }
            }

            if let Some(w) = shared.out.lock().take() {
                w.finish()?;
            }

            let sol = shared.solution.lock();
            if sol.found {
                let result = Some((gen, sol.win_v, sol.win_buf));
                drop(sol);
                shared.shutdown.store(true, AtomicOrdering::Release);
                barrier.wait();
                barrier.wait();
                return Ok(result);
            }
            drop(sol);
            gen += 1;
        }
        Ok(None)
    })?;

    match outcome {
        Some((win_gen, win_v, win_buf)) => {
            info!(
                allocated = shared.visited.allocated_chunks(),
                total = shared.visited.total_chunks(),
                "chunked visited-set fill at solution time"
            );
            backward_reconstruct(&store, win_gen, win_v, win_buf, &mut master_domain)
        }
        None => {
            info!(
                allocated = shared.visited.allocated_chunks(),
                total = shared.visited.total_chunks(),
                "chunked visited-set fill with no solution found"
            );
            Ok(SearchOutcome::NoSolution)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_id;
    use std::io::{Read, Write};

    #[derive(Clone)]
    struct VecGraphDomain {
        edges: Vec<Vec<u64>>,
        goal: u64,
        cur: u64,
    }

    impl VecGraphDomain {
        fn new(n: usize, edges: Vec<(u64, u64)>, start: u64, goal: u64) -> Self {
            let mut adj = vec![Vec::new(); n];
            for (a, b) in edges {
                adj[a as usize].push(b);
            }
            VecGraphDomain {
                edges: adj,
                goal,
                cur: start,
            }
        }
    }

    impl Domain for VecGraphDomain {
        fn init(&mut self, _reader: &mut dyn Read) -> Result<(), SolverError> {
            Ok(())
        }
        fn state_space_size(&self) -> u64 {
            self.edges.len() as u64 - 1
        }
        fn state_size(&self) -> u8 {
            1
        }
        fn encode(&self, _thr: usize) -> IdBuf {
            encode_id(self.cur, 1).unwrap()
        }
        fn decode(&mut self, buf: &IdBuf, _thr: usize) {
            self.cur = decode_idbuf(buf);
        }
        fn print(&self, _thr: usize, out: &mut dyn Write) -> Result<(), SolverError> {
            writeln!(out, "{}", self.cur)?;
            Ok(())
        }
        fn won(&self, _thr: usize) -> bool {
            self.cur == self.goal
        }
        fn visit_neighbours(&mut self, _thr: usize) -> Vec<IdBuf> {
            self.edges[self.cur as usize]
                .iter()
                .map(|&v| encode_id(v, 1).unwrap())
                .collect()
        }
    }

    fn cfg(dir: &std::path::Path, threads: usize) -> ParallelConfig {
        ParallelConfig {
            dir: dir.to_path_buf(),
            threads,
            block_bits: 2,
            l1_bytes: 16,
            l2_bytes: 16,
        }
    }

    #[test]
    fn rejects_thread_count_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let d = VecGraphDomain::new(4, vec![(0, 1)], 0, 1);
        let err = solve(&d, &cfg(dir.path(), 0)).unwrap_err();
        assert!(matches!(err, SolverError::ThreadSpawn(_)));
        let err = solve(&d, &cfg(dir.path(), 1000)).unwrap_err();
        assert!(matches!(err, SolverError::ThreadSpawn(_)));
    }

    #[test]
    fn binary_tree_fan_out_with_multiple_workers() {
        let dir = tempfile::tempdir().unwrap();
        let edges = vec![(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (2, 6)];
        let d = VecGraphDomain::new(7, edges, 0, 6);
        let outcome = solve(&d, &cfg(dir.path(), 3)).unwrap();
        match outcome {
            SearchOutcome::Solved { path } => assert_eq!(path.len() - 1, 2),
            SearchOutcome::NoSolution => panic!("expected a solution"),
        }
    }

    #[test]
    fn disconnected_goal_has_no_solution() {
        let dir = tempfile::tempdir().unwrap();
        let d = VecGraphDomain::new(4, vec![(0, 1)], 0, 3);
        let outcome = solve(&d, &cfg(dir.path(), 2)).unwrap();
        assert!(matches!(outcome, SearchOutcome::NoSolution));
    }

    #[test]
    fn start_already_at_goal() {
        let dir = tempfile::tempdir().unwrap();
        let d = VecGraphDomain::new(4, vec![(0, 1)], 0, 0);
        let outcome = solve(&d, &cfg(dir.path(), 2)).unwrap();
        match outcome {
            SearchOutcome::Solved { path } => assert_eq!(path.len(), 1),
            SearchOutcome::NoSolution => panic!("expected a zero-step solution"),
        }
    }
}
