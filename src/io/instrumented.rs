use std::io::Write;

use crate::error::SolverError;
use crate::io_phase::{IoPhase, IoReader};

/// A decorator that wraps any [`IoReader`] and logs frontier-file I/O to a CSV file.
pub struct InstrumentedReader<R> {
    inner: R,
    io_log: std::io::BufWriter<std::fs::File>,
    remaining: usize,
}

impl<R> InstrumentedReader<R> {
    /// Wrap `inner` with CSV logging to the given file path.
    pub fn new(inner: R, log_path: &str, limit: usize) -> Result<Self, SolverError> {
        let f = std::fs::File::create(log_path)?;
        let mut w = std::io::BufWriter::new(f);
        writeln!(w, "phase,offset,len")?;
        Ok(Self {
            inner,
            io_log: w,
            remaining: limit,
        })
    }

    fn log_read(&mut self, phase: IoPhase, offset: u64, len: usize) {
        if self.remaining == 0 {
            return;
        }
        let _ = writeln!(self.io_log, "{},{},{}", phase, offset, len);
        self.remaining -= 1;
    }
}

impl<R: IoReader> IoReader for InstrumentedReader<R> {
    fn read_at(&mut self, offset: u64, len: usize, phase: IoPhase) -> Result<&[u8], SolverError> {
        self.log_read(phase, offset, len);
        self.inner.read_at(offset, len, phase)
    }

    fn coalesced_read_batch<T: Copy, F>(
        &mut self,
        requests: &[(u64, usize, T)],
        on_complete: F,
        phase: IoPhase,
    ) -> Result<(), SolverError>
    where
        F: FnMut(&[u8], T) -> Result<(), SolverError>,
    {
        for &(offset, len, _) in requests {
            self.log_read(phase, offset, len);
        }
        self.inner.coalesced_read_batch(requests, on_complete, phase)
    }
}

/// Runtime choice between a bare reader and an instrumented one.
///
/// Avoids dynamic dispatch while allowing the decision to be made at runtime
/// (e.g. based on environment variables).
pub enum MaybeInstrumented<R> {
    Bare(R),
    Instrumented(InstrumentedReader<R>),
}

impl<R> MaybeInstrumented<R> {
    /// Construct from environment variables.
    ///
    /// If `BFS_SOLVER_IO_LOG` is set, wraps `inner` with CSV logging.
    /// `BFS_SOLVER_IO_LOG_LIMIT` optionally caps the number of logged operations.
    pub fn from_env(inner: R) -> Result<Self, SolverError> {
        if let Ok(path) = std::env::var("BFS_SOLVER_IO_LOG") {
            let limit = std::env::var("BFS_SOLVER_IO_LOG_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(usize::MAX);
            Ok(Self::Instrumented(InstrumentedReader::new(
                inner, &path, limit,
            )?))
        } else {
            Ok(Self::Bare(inner))
        }
    }
}

impl<R: IoReader> IoReader for MaybeInstrumented<R> {
    fn read_at(&mut self, offset: u64, len: usize, phase: IoPhase) -> Result<&[u8], SolverError> {
        match self {
            Self::Bare(r) => r.read_at(offset, len, phase),
            Self::Instrumented(r) => r.read_at(offset, len, phase),
        }
    }

    fn coalesced_read_batch<T: Copy, F>(
        &mut self,
        requests: &[(u64, usize, T)],
        on_complete: F,
        phase: IoPhase,
    ) -> Result<(), SolverError>
    where
        F: FnMut(&[u8], T) -> Result<(), SolverError>,
    {
        match self {
            Self::Bare(r) => r.coalesced_read_batch(requests, on_complete, phase),
            Self::Instrumented(r) => r.coalesced_read_batch(requests, on_complete, phase),
        }
    }
}
