use std::fmt;

use crate::error::SolverError;

/// I/O phase labels for generation-store diagnostics and optional instrumentation.
#[derive(Debug, Clone, Copy)]
pub enum IoPhase {
    ReadFrontier,
    WriteFrontier,
    BackwardScan,
}

impl fmt::Display for IoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFrontier => write!(f, "read_frontier"),
            Self::WriteFrontier => write!(f, "write_frontier"),
            Self::BackwardScan => write!(f, "backward_scan"),
        }
    }
}

/// Trait for reading raw bytes from a generation file.
///
/// Implementations must provide `read_at`. The default `coalesced_read_batch`
/// falls back to sequential `read_at` calls; override for performance.
pub trait IoReader {
    /// Read `len` bytes at byte offset `offset`.
    /// Returns a slice borrowed from the reader's internal buffer.
    fn read_at(&mut self, offset: u64, len: usize, phase: IoPhase) -> Result<&[u8], SolverError>;

    /// Batch-read with coalescing. `requests` must be sorted by offset.
    ///
    /// Default implementation calls `read_at` sequentially (no coalescing).
    fn coalesced_read_batch<T: Copy, F>(
        &mut self,
        requests: &[(u64, usize, T)],
        mut on_complete: F,
        phase: IoPhase,
    ) -> Result<(), SolverError>
    where
        F: FnMut(&[u8], T) -> Result<(), SolverError>,
    {
        for &(offset, len, tag) in requests {
            let buf = self.read_at(offset, len, phase)?;
            on_complete(buf, tag)?;
        }
        Ok(())
    }
}
