//! A generic adjacency-list domain used only to exercise the engines in
//! `bfs-solver-core` end to end. Not one of the concrete puzzle domains the
//! core crate's specification explicitly excludes (sliding-block, Sokoban,
//! plank) — states here are bare integers with no puzzle semantics at all.
//!
//! Text format, whitespace-delimited tokens:
//!
//! ```text
//! <n>            number of vertices, states are [0, n)
//! <start> <goal> start and goal vertex
//! <m>            number of directed edges
//! <a> <b>        repeated m times: edge a -> b
//! ```

use std::io::{Read, Write};
use std::time::Instant;

use bfs_solver_core::codec::{decode_idbuf, encode_id};
use bfs_solver_core::{Domain, IdBuf, SearchOutcome, SolverError};

/// Installs a `tracing` subscriber reading `RUST_LOG`, shared by every CLI
/// binary in this crate (defaults to `info` when unset).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Prints a solved path or a "no solution" line, then an elapsed-time
/// summary to stderr, in the progress-then-summary style common to the
/// engines' reference CLIs.
pub fn report_outcome<D: Domain>(
    outcome: &SearchOutcome,
    domain: &mut D,
    started: Instant,
) -> Result<(), SolverError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match outcome {
        SearchOutcome::Solved { path } => {
            writeln!(out, "we won! solution steps:").map_err(SolverError::Io)?;
            for (i, id) in path.iter().enumerate() {
                domain.decode(id, 0);
                writeln!(out, "move {i}").map_err(SolverError::Io)?;
                domain.print(0, &mut out)?;
            }
        }
        SearchOutcome::NoSolution => {
            writeln!(out, "no solution: the reachable state space was exhausted")
                .map_err(SolverError::Io)?;
        }
    }
    eprintln!("elapsed: {:?}", started.elapsed());
    Ok(())
}

#[derive(Debug, Clone)]
pub struct GraphDomain {
    adj: Vec<Vec<u64>>,
    goal: u64,
    cur: u64,
    state_size: u8,
}

impl GraphDomain {
    pub fn empty() -> Self {
        GraphDomain {
            adj: Vec::new(),
            goal: 0,
            cur: 0,
            state_size: 1,
        }
    }

    fn next_token<'a, I: Iterator<Item = &'a str>>(
        tokens: &mut I,
        what: &str,
    ) -> Result<&'a str, SolverError> {
        tokens
            .next()
            .ok_or_else(|| SolverError::BadInput(format!("expected {what}, input ended early")))
    }

    fn next_u64<'a, I: Iterator<Item = &'a str>>(
        tokens: &mut I,
        what: &str,
    ) -> Result<u64, SolverError> {
        Self::next_token(tokens, what)?
            .parse::<u64>()
            .map_err(|e| SolverError::BadInput(format!("{what} is not a valid integer: {e}")))
    }

    /// Smallest byte width `s` such that `n - 1` fits in `s` little-endian
    /// bytes, i.e. `n - 1 < 256^s`. `n` must already be known non-zero.
    fn byte_width_for(max_value: u64) -> u8 {
        let mut s = 1u8;
        while s < 8 && max_value >= (1u64 << (8 * s as u32)) {
            s += 1;
        }
        s
    }
}

impl Domain for GraphDomain {
    fn init(&mut self, reader: &mut dyn Read) -> Result<(), SolverError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(SolverError::Io)?;
        let mut tokens = text.split_whitespace();

        let n = Self::next_u64(&mut tokens, "vertex count")?;
        if n == 0 {
            return Err(SolverError::BadInput(
                "vertex count must be at least 1".to_string(),
            ));
        }
        if n - 1 >= (1u64 << 60) - 1 {
            return Err(SolverError::TooLarge(format!(
                "graph with {n} vertices exceeds the supported 2^60 - 1 state bound"
            )));
        }

        let start = Self::next_u64(&mut tokens, "start vertex")?;
        let goal = Self::next_u64(&mut tokens, "goal vertex")?;
        if start >= n || goal >= n {
            return Err(SolverError::BadInput(format!(
                "start ({start}) and goal ({goal}) must be < vertex count ({n})"
            )));
        }

        let m = Self::next_u64(&mut tokens, "edge count")?;
        let mut adj = vec![Vec::new(); n as usize];
        for i in 0..m {
            let a = Self::next_u64(&mut tokens, &format!("edge {i} source"))?;
            let b = Self::next_u64(&mut tokens, &format!("edge {i} destination"))?;
            if a >= n || b >= n {
                return Err(SolverError::BadInput(format!(
                    "edge {a} -> {b} references a vertex outside [0, {n})"
                )));
            }
            adj[a as usize].push(b);
        }

        self.adj = adj;
        self.goal = goal;
        self.cur = start;
        self.state_size = Self::byte_width_for(n - 1);
        Ok(())
    }

    fn state_space_size(&self) -> u64 {
        self.adj.len() as u64 - 1
    }

    fn state_size(&self) -> u8 {
        self.state_size
    }

    fn encode(&self, _thr: usize) -> IdBuf {
        encode_id(self.cur, self.state_size).expect("current state always fits state_size")
    }

    fn decode(&mut self, buf: &IdBuf, _thr: usize) {
        self.cur = decode_idbuf(buf);
    }

    fn print(&self, _thr: usize, out: &mut dyn Write) -> Result<(), SolverError> {
        writeln!(out, "vertex {}", self.cur).map_err(SolverError::Io)
    }

    fn won(&self, _thr: usize) -> bool {
        self.cur == self.goal
    }

    fn visit_neighbours(&mut self, _thr: usize) -> Vec<IdBuf> {
        self.adj[self.cur as usize]
            .iter()
            .map(|&v| encode_id(v, self.state_size).expect("neighbour fits state_size"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trivial_chain() {
        let mut d = GraphDomain::empty();
        let input = "4\n0 3\n3\n0 1\n1 2\n2 3\n";
        d.init(&mut input.as_bytes()).unwrap();
        assert_eq!(d.state_space_size(), 3);
        assert_eq!(d.state_size(), 1);
        assert!(!d.won(0));
    }

    #[test]
    fn rejects_out_of_range_vertex() {
        let mut d = GraphDomain::empty();
        let input = "2\n0 5\n0\n";
        assert!(matches!(
            d.init(&mut input.as_bytes()),
            Err(SolverError::BadInput(_))
        ));
    }

    #[test]
    fn rejects_truncated_input() {
        let mut d = GraphDomain::empty();
        let input = "4\n0 3\n";
        assert!(matches!(
            d.init(&mut input.as_bytes()),
            Err(SolverError::BadInput(_))
        ));
    }

    #[test]
    fn state_size_grows_with_vertex_count() {
        let mut d = GraphDomain::empty();
        let input = format!("{}\n0 1\n0\n", 1u64 << 20);
        d.init(&mut input.as_bytes()).unwrap();
        assert_eq!(d.state_size(), 3);
    }
}
