//! Fixed-capacity chunk buffer
//!
//! Staging area between encoded log records and the file descriptor. The
//! buffer's logical fill limit (`max_size`) can be smaller than its
//! allocation so that the first flush after continuing an existing file
//! lands on a capacity-aligned file offset.

use std::io::{self, Write};

/// Byte accumulator with a fixed allocation and an adjustable fill limit
///
/// Invariant: `0 <= position <= max_size <= capacity`.
pub struct ChunkBuffer {
    data: Box<[u8]>,
    max_size: usize,
    position: usize,
}

impl ChunkBuffer {
    /// Create a buffer with the given allocation size and initial fill limit
    pub fn new(capacity: usize, max_size: usize) -> Self {
        debug_assert!(max_size <= capacity);
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            max_size,
            position: 0,
        }
    }

    /// Allocation size of the buffer
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes currently stored
    pub fn position(&self) -> usize {
        self.position
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// True if the buffer has reached its current fill limit
    pub fn is_full(&self) -> bool {
        self.position == self.max_size
    }

    /// Store bytes from `data`, skipping the first `offset` bytes that were
    /// already consumed elsewhere
    ///
    /// Copies as much as still fits below the fill limit and returns the
    /// number of bytes actually stored.
    pub fn store(&mut self, data: &[u8], offset: usize) -> usize {
        let count = (data.len() - offset).min(self.max_size - self.position);
        self.data[self.position..self.position + count]
            .copy_from_slice(&data[offset..offset + count]);
        self.position += count;
        count
    }

    /// Write all stored bytes to the sink
    ///
    /// Returns the headroom left below the fill limit, which is the byte
    /// count that would still fit before the next capacity-aligned file
    /// offset. Callers use it to re-arm the buffer after a partial flush.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<usize> {
        sink.write_all(&self.data[..self.position])?;
        Ok(self.max_size - self.position)
    }

    /// Discard the contents and set a new fill limit
    pub fn reset(&mut self, max_size: usize) {
        debug_assert!(max_size <= self.data.len());
        self.position = 0;
        self.max_size = max_size;
    }
}

#[cfg(test)]
#[path = "chunk_test.rs"]
mod chunk_test;
