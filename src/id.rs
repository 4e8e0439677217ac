//! Request ID Generator
//!
//! Monotonically increasing ids for correlating requests with responses,
//! e.g. the id handed to [`Protocol::trigger`](crate::protocol::Protocol::trigger).

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free id counter; the first id handed out is 1
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Next id (wraps on overflow)
    pub fn next_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    pub fn next_id_string(&self) -> String {
        stream_id_to_string(self.next_id())
    }
}

static DEFAULT_GENERATOR: IdGenerator = IdGenerator::new();

/// Next id from the process-wide generator
pub fn generate_id() -> u64 {
    DEFAULT_GENERATOR.next_id()
}

pub fn generate_id_string() -> String {
    DEFAULT_GENERATOR.next_id_string()
}

/// Decimal form of a stream id
pub fn stream_id_to_string(id: u64) -> String {
    id.to_string()
}

/// Parse a decimal request id
pub fn parse_request_id(s: &str) -> Option<u64> {
    s.parse().ok()
}
