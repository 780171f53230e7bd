//! Cross-engine integration tests: every engine that can report a solution
//! path must agree on the path's length for the same graph, and the
//! disk/parallel/delayed-duplicate engines must agree on reachability with
//! the in-memory engine used as the reference.

use std::io::Cursor;

use bfs_solver_core::engine::{delayed_duplicate, disk, memory, parallel};
use bfs_solver_core::{Domain, SearchOutcome};
use graph_domain_demo::GraphDomain;

fn domain_from(text: &str) -> GraphDomain {
    let mut d = GraphDomain::empty();
    d.init(&mut Cursor::new(text.as_bytes())).unwrap();
    d
}

fn solution_depth(outcome: &SearchOutcome) -> Option<usize> {
    match outcome {
        SearchOutcome::Solved { path } => Some(path.len() - 1),
        SearchOutcome::NoSolution => None,
    }
}

const BINARY_TREE: &str = "7\n0 6\n6\n0 1\n0 2\n1 3\n1 4\n2 5\n2 6\n";
const DISCONNECTED: &str = "4\n0 3\n1\n0 1\n";
const DIAMOND: &str = "4\n0 3\n4\n0 1\n0 2\n1 3\n2 3\n";

#[test]
fn memory_and_disk_engines_agree_on_binary_tree() {
    let mut mem_domain = domain_from(BINARY_TREE);
    let mem_outcome = memory::solve(&mut mem_domain).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut disk_domain = domain_from(BINARY_TREE);
    let cfg = disk::DiskEngineConfig::new(dir.path());
    let disk_outcome = disk::solve(&mut disk_domain, &cfg).unwrap();

    assert_eq!(solution_depth(&mem_outcome), Some(2));
    assert_eq!(solution_depth(&mem_outcome), solution_depth(&disk_outcome));
}

#[test]
fn all_solving_engines_agree_on_diamond_depth() {
    let mut mem_domain = domain_from(DIAMOND);
    let mem_outcome = memory::solve(&mut mem_domain).unwrap();

    let disk_dir = tempfile::tempdir().unwrap();
    let mut disk_domain = domain_from(DIAMOND);
    let disk_cfg = disk::DiskEngineConfig::new(disk_dir.path());
    let disk_outcome = disk::solve(&mut disk_domain, &disk_cfg).unwrap();

    let par_dir = tempfile::tempdir().unwrap();
    let par_domain = domain_from(DIAMOND);
    let par_cfg = parallel::ParallelConfig::new(par_dir.path(), 3);
    let par_outcome = parallel::solve(&par_domain, &par_cfg).unwrap();

    let depth = solution_depth(&mem_outcome);
    assert_eq!(depth, Some(2));
    assert_eq!(depth, solution_depth(&disk_outcome));
    assert_eq!(depth, solution_depth(&par_outcome));
}

#[test]
fn disconnected_goal_is_unreachable_on_every_engine() {
    let mut mem_domain = domain_from(DISCONNECTED);
    assert!(matches!(
        memory::solve(&mut mem_domain).unwrap(),
        SearchOutcome::NoSolution
    ));

    let disk_dir = tempfile::tempdir().unwrap();
    let mut disk_domain = domain_from(DISCONNECTED);
    let disk_cfg = disk::DiskEngineConfig::new(disk_dir.path());
    assert!(matches!(
        disk::solve(&mut disk_domain, &disk_cfg).unwrap(),
        SearchOutcome::NoSolution
    ));

    let mut ddd_domain = domain_from(DISCONNECTED);
    let ddd_cfg = delayed_duplicate::DddConfig::new(4096, true);
    assert!(matches!(
        delayed_duplicate::solve(&mut ddd_domain, &ddd_cfg).unwrap(),
        SearchOutcome::NoSolution
    ));
}

#[test]
fn delayed_duplicate_engine_errors_instead_of_reporting_a_win() {
    let mut domain = domain_from(BINARY_TREE);
    let cfg = delayed_duplicate::DddConfig::new(4096, true);
    let err = delayed_duplicate::solve(&mut domain, &cfg).unwrap_err();
    assert!(matches!(err, bfs_solver_core::SolverError::Internal(_)));
}

#[test]
fn solved_path_endpoints_match_start_and_goal() {
    let mut domain = domain_from(DIAMOND);
    let outcome = memory::solve(&mut domain).unwrap();
    match outcome {
        SearchOutcome::Solved { path } => {
            let mut first = domain.clone();
            first.decode(&path[0], 0);
            let mut last = domain.clone();
            last.decode(path.last().unwrap(), 0);
            assert!(!first.won(0));
            assert!(last.won(0));
        }
        SearchOutcome::NoSolution => panic!("expected a solution"),
    }
}
