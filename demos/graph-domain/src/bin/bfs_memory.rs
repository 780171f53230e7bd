//! In-memory BFS over a graph read from stdin, per the text format
//! documented on [`graph_domain_demo::GraphDomain`].

use std::io;
use std::time::Instant;

use clap::Parser;
use graph_domain_demo::{init_tracing, report_outcome, GraphDomain};

/// Solve a graph-reachability puzzle with the in-memory BFS engine.
#[derive(Parser, Debug)]
#[command(name = "bfs-memory", about = "In-memory BFS solver (parent map + ring queue)")]
struct Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let _args = Args::parse();

    let mut domain = GraphDomain::empty();
    domain.init(&mut io::stdin())?;

    let started = Instant::now();
    let outcome = bfs_solver_core::engine::memory::solve(&mut domain)?;
    report_outcome(&outcome, &mut domain, started)?;
    Ok(())
}
