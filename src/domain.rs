use std::io::{Read, Write};

use crate::codec::IdBuf;
use crate::error::SolverError;

/// The contract an engine drives against a puzzle.
///
/// Every operation takes a thread index `thr`, always `0` for the
/// single-threaded engines. The parallel engine clones the domain once per
/// worker (see the `Clone` bound) and drives each clone with its own thread
/// index, so `thr` only ever selects among a domain's own per-thread scratch
/// state, never among distinct domain instances.
///
/// Implementations own their "current state" as mutable scratch; the engine
/// never inspects it directly, only through `encode`/`decode`/`print`/`won`/
/// `visit_neighbours`.
pub trait Domain: Clone + Send {
    /// Parse the puzzle description and build static tables.
    ///
    /// Must fail with [`SolverError::BadInput`] on malformed input and
    /// [`SolverError::TooLarge`] when the resulting state space exceeds
    /// `2^60 - 1` states.
    fn init(&mut self, reader: &mut dyn Read) -> Result<(), SolverError>;

    /// `N - 1`, where `N` is the number of distinct reachable-or-not states
    /// in `[0, N)`. Named after the `domain_size()` "`N-1`, so `2^k` state
    /// spaces are representable" convention this crate's codec inherited.
    fn state_space_size(&self) -> u64;

    /// Byte width `S` of an encoded state ID, in `1..=8`.
    fn state_size(&self) -> u8;

    /// Serialize the scratch state for thread `thr` into an owned buffer.
    fn encode(&self, thr: usize) -> IdBuf;

    /// Install the scratch state for thread `thr` from `buf`.
    fn decode(&mut self, buf: &IdBuf, thr: usize);

    /// Write a human-readable rendering of the scratch state for `thr`.
    fn print(&self, thr: usize, out: &mut dyn Write) -> Result<(), SolverError>;

    /// True iff the scratch state for `thr` satisfies the goal predicate.
    fn won(&self, thr: usize) -> bool;

    /// Enumerate every successor of the scratch state for `thr`, returning
    /// each as an owned, encoded id.
    ///
    /// The original contract drove this through an engine-supplied
    /// `add_child(ptr)` callback invoked once per successor, with `won()`
    /// implicitly tested against whichever neighbour state the domain had
    /// just mutated itself into. A callback re-entering the domain while the
    /// engine already holds it mutably borrowed has no safe Rust expression;
    /// returning the owned list of successors instead gives the engine a
    /// value it can freely decode and test `won()` against afterward, with
    /// the same observable behaviour.
    fn visit_neighbours(&mut self, thr: usize) -> Vec<IdBuf>;
}
