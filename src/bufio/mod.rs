//! Buffered I/O Module
//!
//! Copy- and allocation-conscious stream primitives used by every codec.
//!
//! ## Responsibilities
//! - Byte, delimiter and fixed-length reads with few refill calls
//! - Batched writes with a direct path for large payloads
//! - Arena-backed owned slices for parsed fields
//! - Sticky errors: the first failure halts all further progress

mod arena;
mod reader;
mod writer;

pub use arena::{SliceAlloc, ARENA_CHUNK_SIZE, LARGE_SLICE_THRESHOLD};
pub use reader::BufReader;
pub use writer::BufWriter;
