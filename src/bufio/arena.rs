//! Slice arena
//!
//! Bump allocator for the small byte slices produced while parsing.
//!
//! ## Allocation Policy
//! ```text
//! n == 0          → empty buffer, no allocation
//! 0 < n < 512     → carved from the current 8 KiB chunk
//! n >= 512        → dedicated allocation
//! ```
//!
//! Carved slices are owned `BytesMut` values that share the chunk's backing
//! allocation; the regions never overlap and the chunk is freed once every
//! slice carved from it has been dropped.

use bytes::BytesMut;

/// Size of each backing chunk
pub const ARENA_CHUNK_SIZE: usize = 8192;

/// Requests at or above this size bypass the arena
pub const LARGE_SLICE_THRESHOLD: usize = 512;

/// Bump allocator handing out non-overlapping owned slices
#[derive(Debug, Default)]
pub struct SliceAlloc {
    /// Unused tail of the current chunk
    chunk: BytesMut,
}

impl SliceAlloc {
    /// Create an arena; the first chunk is allocated lazily
    pub fn new() -> Self {
        Self {
            chunk: BytesMut::new(),
        }
    }

    /// Hand out a zeroed slice of exactly `n` bytes
    pub fn make(&mut self, n: usize) -> BytesMut {
        match n {
            0 => BytesMut::new(),
            n if n >= LARGE_SLICE_THRESHOLD => BytesMut::zeroed(n),
            n => {
                if self.chunk.len() < n {
                    self.chunk = BytesMut::zeroed(ARENA_CHUNK_SIZE);
                }
                self.chunk.split_to(n)
            }
        }
    }

    /// Hand out a slice holding a copy of `src`
    pub fn copy_from(&mut self, src: &[u8]) -> BytesMut {
        let mut slice = self.make(src.len());
        slice.copy_from_slice(src);
        slice
    }

    /// Bytes left in the current chunk
    pub fn remaining(&self) -> usize {
        self.chunk.len()
    }
}
