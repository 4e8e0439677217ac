//! Error types for wirecodec
//!
//! Provides a unified error type for all codec operations, plus the
//! structural [`ProtocolError`] taxonomy surfaced by decoders.
//!
//! "Need more data" and "unsupported capability" are not errors: they are
//! reported as `Ok(None)` and `None` respectively.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::protocol::ProtocolName;

/// Result type alias using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;

/// Unified error type for wirecodec operations
///
/// `Clone` so that buffered readers and writers can latch an error and hand
/// the same value back on every later call.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(Arc<io::Error>),

    /// The source reported end-of-stream (`Ok(0)` from `Read::read`)
    #[error("unexpected end of stream")]
    EndOfStream,

    /// `read_slice` found no delimiter in a completely full buffer
    #[error("buffer full before delimiter was found")]
    BufferFull,

    #[error("short write: expected {expected} bytes, wrote {written}")]
    ShortWrite { expected: usize, written: usize },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("use of failed encoder")]
    FailedEncoder,

    #[error("use of failed decoder")]
    FailedDecoder,

    #[error("{protocol}: encode with unknown model type")]
    UnknownModel { protocol: ProtocolName },

    // -------------------------------------------------------------------------
    // Registry Errors
    // -------------------------------------------------------------------------
    #[error("protocol {0} is already registered")]
    DuplicateProtocol(ProtocolName),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        CodecError::Io(Arc::new(err))
    }
}

impl CodecError {
    /// True for structural errors in the input bytes
    pub fn is_protocol(&self) -> bool {
        matches!(self, CodecError::Protocol(_))
    }

    /// True for errors raised by the underlying source or sink
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            CodecError::Io(_) | CodecError::EndOfStream | CodecError::ShortWrite { .. }
        )
    }

    /// The structural error, if this is one
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            CodecError::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

/// Structural errors found while framing or parsing wire data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    // -------------------------------------------------------------------------
    // RESP
    // -------------------------------------------------------------------------
    #[error("invalid type tag: {0:#04x}")]
    InvalidTypeTag(u8),

    /// Length or count text that is not a decimal integer
    #[error("invalid length or count: {0:?}")]
    InvalidLength(String),

    #[error("invalid bulk string length: {0}")]
    InvalidBulkLength(i64),

    #[error("invalid array length: {0}")]
    InvalidArrayLength(i64),

    #[error("bulk string too large: {len} bytes (max {max})")]
    BulkTooLarge { len: usize, max: usize },

    #[error("too many array elements: {count} (max {max})")]
    TooManyElements { count: usize, max: usize },

    #[error("missing CRLF terminator")]
    MissingCrlf,

    #[error("empty command")]
    EmptyCommand,

    #[error("multi-bulk element is not a bulk string")]
    InvalidMultiBulk,

    #[error("unexpected end of input")]
    UnexpectedEof,

    // -------------------------------------------------------------------------
    // Binary framing
    // -------------------------------------------------------------------------
    #[error("bad magic: {0:02x?}")]
    BadMagic([u8; 2]),

    #[error("payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: u32, max: u32 },
}
