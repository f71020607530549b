//! Sequential chunk writer for a download in progress.
//!
//! Bytes arrive in whatever blocks the transfer delivers and reach disk in
//! fixed-size chunks, so at most one partial chunk is held in memory. They go
//! to `<final>.part`; `finalize` syncs and renames it over the final name, so
//! the final path only ever holds a complete file. Every failure path removes
//! the `.part` file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.pdf` → `a.pdf.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

pub struct ChunkWriter {
    file: File,
    temp_path: PathBuf,
    chunk_size: usize,
    pending: Vec<u8>,
    written: u64,
}

impl ChunkWriter {
    /// Create (or truncate) the temp file for `final_path`.
    pub fn create(final_path: &Path, chunk_size: usize) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        let chunk_size = chunk_size.max(1);
        Ok(Self {
            file,
            temp_path,
            chunk_size,
            pending: Vec::with_capacity(chunk_size),
            written: 0,
        })
    }

    /// Accept the next block of body bytes. Full chunks are written at once;
    /// a trailing partial chunk waits for more data or `finalize`.
    pub fn write(&mut self, mut data: &[u8]) -> io::Result<()> {
        if !self.pending.is_empty() {
            let take = (self.chunk_size - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.pending.len() < self.chunk_size {
                return Ok(());
            }
            let chunk = std::mem::take(&mut self.pending);
            self.write_chunk(&chunk)?;
            self.pending = chunk;
            self.pending.clear();
        }
        while data.len() >= self.chunk_size {
            let (chunk, rest) = data.split_at(self.chunk_size);
            self.write_chunk(chunk)?;
            data = rest;
        }
        self.pending.extend_from_slice(data);
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Bytes already written to the temp file.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Write the last partial chunk, sync, and rename the temp file to
    /// `final_path`, replacing any existing file. Returns the byte count.
    pub fn finalize(mut self, final_path: &Path) -> io::Result<u64> {
        match self.commit(final_path) {
            Ok(()) => Ok(self.written),
            Err(e) => {
                self.discard();
                Err(e)
            }
        }
    }

    fn commit(&mut self, final_path: &Path) -> io::Result<()> {
        if !self.pending.is_empty() {
            let chunk = std::mem::take(&mut self.pending);
            self.write_chunk(&chunk)?;
        }
        self.file.sync_all()?;
        std::fs::rename(&self.temp_path, final_path)
    }

    /// Drop the temp file after a failed or abandoned download.
    pub fn discard(self) {
        let temp_path = self.temp_path;
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), "could not remove temp file: {}", e);
        }
    }
}
