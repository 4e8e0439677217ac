//! # wirecodec
//!
//! Wire-protocol codec layer for a multi-protocol proxy:
//! - Buffered stream I/O with arena-backed owned reads
//! - Streaming RESP decoder/encoder with sticky error states
//! - Pluggable protocol abstraction (RESP, Dubbo) behind one registry
//!
//! ## Data Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Network (Read/Write)                     │
//! └──────────────┬───────────────────────────────▲──────────────┘
//!                │                               │
//! ┌──────────────▼──────────────┐ ┌──────────────┴──────────────┐
//! │       bufio::BufReader      │ │       bufio::BufWriter      │
//! │    (refill, delim scans)    │ │    (batching, bypass)       │
//! └──────────────┬──────────────┘ └──────────────▲──────────────┘
//!                │                               │
//! ┌──────────────▼──────────────┐ ┌──────────────┴──────────────┐
//! │        resp::Decoder        │ │        resp::Encoder        │
//! └──────────────┬──────────────┘ └──────────────▲──────────────┘
//!                │                               │
//! ┌──────────────▼───────────────────────────────┴──────────────┐
//! │          protocol::ProtocolRegistry / FrameReader           │
//! │           (name → codec, incremental frame reads)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod id;

pub mod bufio;
pub mod resp;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CodecError, ProtocolError, Result};
pub use config::Config;
pub use protocol::{Frame, FrameReader, Protocol, ProtocolName, ProtocolRegistry};
pub use resp::{RespProtocol, RespValue};
pub use protocol::dubbo::DubboProtocol;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of wirecodec
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
