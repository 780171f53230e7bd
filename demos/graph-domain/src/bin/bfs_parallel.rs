//! Parallel disk-swapping BFS over a graph read from stdin: `--threads`
//! workers plus a master, synchronized by a barrier each generation.

use std::io;
use std::time::Instant;

use clap::Parser;
use graph_domain_demo::{init_tracing, report_outcome, GraphDomain};

/// Solve a graph-reachability puzzle with the parallel BFS engine.
#[derive(Parser, Debug)]
#[command(name = "bfs-parallel", about = "Parallel disk-swapping BFS solver")]
struct Args {
    /// Number of worker threads, in [1, 999].
    #[arg(long)]
    threads: usize,

    /// Directory to hold GEN-gggg generation files; created if missing.
    #[arg(long, default_value = "bfs-gen")]
    dir: String,

    /// log2 of the chunked visited-set's chunk size in bits.
    #[arg(long, default_value_t = 16)]
    block_bits: u32,

    /// Incoming-generation read-buffer size, in megabytes.
    #[arg(long, default_value_t = 50)]
    l1_mb: usize,

    /// Outgoing-generation write-buffer size, in megabytes.
    #[arg(long, default_value_t = 50)]
    l2_mb: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut domain = GraphDomain::empty();
    domain.init(&mut io::stdin())?;

    let mut cfg = bfs_solver_core::engine::parallel::ParallelConfig::new(&args.dir, args.threads);
    cfg.block_bits = args.block_bits;
    cfg.l1_bytes = args.l1_mb * 1024 * 1024;
    cfg.l2_bytes = args.l2_mb * 1024 * 1024;

    let started = Instant::now();
    let outcome = bfs_solver_core::engine::parallel::solve(&domain, &cfg)?;
    report_outcome(&outcome, &mut domain, started)?;
    Ok(())
}
