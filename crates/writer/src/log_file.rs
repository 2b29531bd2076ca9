//! Buffered log file
//!
//! Owns a single open file handle and the chunk buffer in front of it.
//! Records are staged in the buffer and hit the disk in capacity-sized
//! blocks; a record larger than the buffer is written around it in whole
//! chunks so no byte is ever copied twice.
//!
//! A fresh (empty) file starts with the charset's byte order mark. When an
//! existing file is continued, the write cursor moves to the end and the
//! buffer's first fill limit is shortened to `capacity - (len % capacity)`,
//! so flushes keep landing on capacity-aligned offsets across process
//! restarts.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::chunk::ChunkBuffer;
use crate::encoding::Charset;
use crate::error::{Error, Result};

/// A single open log file with a write buffer in front of it
pub struct LogFile {
    file: File,
    path: PathBuf,
    charset: Charset,
    chunk: ChunkBuffer,
    capacity: usize,
}

impl LogFile {
    /// Open or create the log file at `path`
    ///
    /// With `append` set, an existing file is continued at its end; without
    /// it, the file is truncated. Either way a file that ends up empty gets
    /// the charset's byte order mark staged as the first bytes.
    pub fn open(path: &Path, charset: Charset, capacity: usize, append: bool) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| Error::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        let open_error = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(open_error)?;

        let length = if append {
            file.seek(SeekFrom::End(0)).map_err(open_error)?
        } else {
            file.set_len(0).map_err(open_error)?;
            0
        };

        let max_size = capacity - (length as usize % capacity);
        let mut chunk = ChunkBuffer::new(capacity, max_size);
        if length == 0 {
            chunk.store(charset.byte_order_mark(), 0);
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            charset,
            chunk,
            capacity,
        })
    }

    /// Path this file was opened at
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode and write a log record
    ///
    /// After this returns, every byte of `content` is either buffered or on
    /// the file descriptor, in order. Zero-length records are no-ops.
    pub fn write(&mut self, content: &str) -> Result<()> {
        if content.is_empty() {
            return Ok(());
        }
        let data = self.charset.encode(content);
        self.write_bytes(&data)
    }

    /// Write already-encoded bytes
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let mut stored = self.chunk.store(data, 0);

        if self.chunk.is_full() {
            self.chunk
                .write_to(&mut self.file)
                .map_err(|source| self.write_error(source))?;
            self.chunk.reset(self.capacity);

            // Whole chunks of the remainder bypass the buffer entirely.
            let direct = (data.len() - stored) / self.capacity * self.capacity;
            if direct > 0 {
                self.file
                    .write_all(&data[stored..stored + direct])
                    .map_err(|source| self.write_error(source))?;
                stored += direct;
            }

            if stored < data.len() {
                self.chunk.store(data, stored);
            }
        }

        Ok(())
    }

    /// Push buffered bytes to the file descriptor
    ///
    /// The buffer is re-armed with the remaining headroom so the next flush
    /// still lands on a capacity-aligned offset.
    pub fn flush(&mut self) -> Result<()> {
        if !self.chunk.is_empty() {
            let headroom = self
                .chunk
                .write_to(&mut self.file)
                .map_err(|source| Error::Flush {
                    path: self.path.clone(),
                    source,
                })?;
            self.chunk
                .reset(if headroom == 0 { self.capacity } else { headroom });
        }
        Ok(())
    }

    /// Flush and close the file
    ///
    /// The file handle is released even when the flush fails; the flush
    /// error is reported after the handle is gone.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    fn write_error(&self, source: std::io::Error) -> Error {
        Error::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "log_file_test.rs"]
mod log_file_test;
