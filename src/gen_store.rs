use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::codec::IdBuf;
use crate::error::SolverError;
use crate::io_phase::{IoPhase, IoReader};
use crate::io::instrumented::MaybeInstrumented;

/// Bare [`IoReader`] over a generation file: seeks to the requested offset
/// and reads exactly `len` bytes into an internal scratch buffer.
pub struct FileIoReader {
    file: File,
    scratch: Vec<u8>,
}

impl FileIoReader {
    pub fn new(file: File) -> Self {
        FileIoReader {
            file,
            scratch: Vec::new(),
        }
    }
}

impl IoReader for FileIoReader {
    fn read_at(&mut self, offset: u64, len: usize, _phase: IoPhase) -> Result<&[u8], SolverError> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.scratch.resize(len, 0);
        self.file.read_exact(&mut self.scratch)?;
        Ok(&self.scratch)
    }
}

/// Sequential, page-buffered writer for a single `GEN-gggg` file.
///
/// Mirrors the source's `out_buf`: ids are accumulated in a capacity-`L2`
/// buffer and flushed to disk in one write once full, plus once more at
/// end of generation for any partial remainder.
pub struct FrontierWriter {
    file: File,
    buf: Vec<u8>,
    cap: usize,
}

impl FrontierWriter {
    pub fn create(path: &Path, state_size: u8, l2_bytes: usize) -> Result<Self, SolverError> {
        let cap = ((l2_bytes / state_size as usize).max(1)) * state_size as usize;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(FrontierWriter {
            file,
            buf: Vec::with_capacity(cap),
            cap,
        })
    }

    pub fn push(&mut self, id: &IdBuf) -> Result<(), SolverError> {
        self.buf.extend_from_slice(id.as_bytes());
        if self.buf.len() >= self.cap {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SolverError> {
        if !self.buf.is_empty() {
            self.file.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Flushes any remainder and returns the file's final length in bytes.
    pub fn finish(mut self) -> Result<u64, SolverError> {
        self.flush()?;
        Ok(self.file.metadata()?.len())
    }
}

/// Sequential, page-buffered reader for a single `GEN-gggg` file.
///
/// Mirrors the source's `in_buf`: pages of up to `L1` bytes are pulled in at
/// a time and handed to the caller id-by-id.
pub struct FrontierReader {
    reader: MaybeInstrumented<FileIoReader>,
    state_size: u8,
    page_bytes: usize,
    file_len: u64,
    pos: u64,
}

impl FrontierReader {
    pub fn open(path: &Path, state_size: u8, l1_bytes: usize) -> Result<Self, SolverError> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        if file_len % state_size as u64 != 0 {
            return Err(SolverError::Internal(format!(
                "generation file {} has length {} not a multiple of state size {}",
                path.display(),
                file_len,
                state_size
            )));
        }
        let page_bytes = ((l1_bytes / state_size as usize).max(1)) * state_size as usize;
        let reader = MaybeInstrumented::from_env(FileIoReader::new(file))?;
        Ok(FrontierReader {
            reader,
            state_size,
            page_bytes,
            file_len,
            pos: 0,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.file_len == 0
    }

    pub fn len_ids(&self) -> u64 {
        self.file_len / self.state_size as u64
    }

    /// Reads and returns the next page of raw, state-aligned bytes, advancing
    /// the internal cursor. Returns `None` once the file is exhausted.
    ///
    /// This is the primitive the parallel engine's master uses to hand one
    /// page at a time to the worker barrier round; [`Self::for_each_id`] is
    /// built on top of it for the single-threaded engines.
    pub fn next_page(&mut self) -> Result<Option<Vec<u8>>, SolverError> {
        if self.pos >= self.file_len {
            return Ok(None);
        }
        let remaining = (self.file_len - self.pos) as usize;
        let len = remaining.min(self.page_bytes);
        let page = self
            .reader
            .read_at(self.pos, len, IoPhase::ReadFrontier)?
            .to_vec();
        self.pos += len as u64;
        Ok(Some(page))
    }

    /// Streams every id in the file, in order, via page-sized reads.
    pub fn for_each_id<F: FnMut(IdBuf) -> Result<(), SolverError>>(
        &mut self,
        mut f: F,
    ) -> Result<(), SolverError> {
        while let Some(page) = self.next_page()? {
            for chunk in page.chunks(self.state_size as usize) {
                f(IdBuf::from_bytes(chunk)?)?;
            }
        }
        Ok(())
    }
}

/// Owns the working directory under which `GEN-gggg` frontier files live, and
/// the page-buffer sizes used for reading (`L1`) and writing (`L2`).
pub struct GenerationStore {
    dir: PathBuf,
    state_size: u8,
    l1_bytes: usize,
    l2_bytes: usize,
}

impl GenerationStore {
    /// Creates the working directory (and any missing parents) if it does
    /// not already exist, then returns a store rooted at it.
    pub fn new(
        dir: impl Into<PathBuf>,
        state_size: u8,
        l1_bytes: usize,
        l2_bytes: usize,
    ) -> Result<Self, SolverError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(GenerationStore {
            dir,
            state_size,
            l1_bytes,
            l2_bytes,
        })
    }

    pub fn path_for(&self, gen: u32) -> Result<PathBuf, SolverError> {
        if gen > 9999 {
            return Err(SolverError::Internal(format!(
                "generation {gen} exceeds the 4-digit GEN-gggg naming scheme"
            )));
        }
        Ok(self.dir.join(format!("GEN-{gen:04}")))
    }

    /// Writes the single-state generation-0 file containing only `start`.
    pub fn write_initial(&self, start: &IdBuf) -> Result<(), SolverError> {
        let mut w = FrontierWriter::create(&self.path_for(0)?, self.state_size, self.l2_bytes)?;
        w.push(start)?;
        w.finish()?;
        Ok(())
    }

    pub fn truncate_empty(&self, gen: u32) -> Result<(), SolverError> {
        FrontierWriter::create(&self.path_for(gen)?, self.state_size, self.l2_bytes)?.finish()?;
        Ok(())
    }

    pub fn writer(&self, gen: u32) -> Result<FrontierWriter, SolverError> {
        FrontierWriter::create(&self.path_for(gen)?, self.state_size, self.l2_bytes)
    }

    pub fn reader(&self, gen: u32) -> Result<FrontierReader, SolverError> {
        FrontierReader::open(&self.path_for(gen)?, self.state_size, self.l1_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_id;

    #[test]
    fn round_trip_through_writer_and_reader() {
        let dir = tempfile::tempdir().unwrap();
        let store = GenerationStore::new(dir.path(), 2, 4096, 4096).unwrap();
        let mut w = store.writer(0).unwrap();
        for v in [1u64, 2, 300, 4] {
            w.push(&encode_id(v, 2).unwrap()).unwrap();
        }
        w.finish().unwrap();

        let mut r = store.reader(0).unwrap();
        let mut seen = Vec::new();
        r.for_each_id(|id| {
            seen.push(crate::codec::decode_idbuf(&id));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![1, 2, 300, 4]);
    }

    #[test]
    fn empty_generation_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = GenerationStore::new(dir.path(), 1, 4096, 4096).unwrap();
        store.truncate_empty(3).unwrap();
        let r = store.reader(3).unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn page_sized_reads_span_multiple_pages() {
        let dir = tempfile::tempdir().unwrap();
        let store = GenerationStore::new(dir.path(), 1, 4, 4).unwrap();
        let mut w = store.writer(0).unwrap();
        for v in 0..20u64 {
            w.push(&encode_id(v, 1).unwrap()).unwrap();
        }
        w.finish().unwrap();

        let mut r = store.reader(0).unwrap();
        let mut seen = Vec::new();
        r.for_each_id(|id| {
            seen.push(crate::codec::decode_idbuf(&id));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn generation_beyond_four_digits_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = GenerationStore::new(dir.path(), 1, 4096, 4096).unwrap();
        assert!(store.path_for(10000).is_err());
    }
}
