//! Configuration for wirecodec
//!
//! Centralized configuration with sensible defaults.

use crate::error::{CodecError, Result};

/// Default capacity of a buffered reader (bytes)
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Default capacity of a buffered writer used by the encoder (bytes)
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 8192;

/// Main configuration for the codec layer
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Buffered I/O Configuration
    // -------------------------------------------------------------------------
    /// Capacity of the buffer sitting in front of each byte source
    pub read_buffer_size: usize,

    /// Capacity of the buffer sitting in front of each byte sink
    pub write_buffer_size: usize,

    // -------------------------------------------------------------------------
    // RESP Configuration
    // -------------------------------------------------------------------------
    /// Largest bulk string the decoder accepts (in bytes)
    pub max_bulk_len: usize,

    /// Largest element count the decoder accepts for one array
    pub max_array_len: usize,

    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Largest payload a binary RPC frame may declare (in bytes)
    pub max_frame_payload: u32,

    /// Bytes pulled from the source per read by the frame reader
    pub read_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            max_bulk_len: 512 * 1024 * 1024, // 512 MB
            max_array_len: 1024 * 1024,
            max_frame_payload: 8 * 1024 * 1024, // 8 MB
            read_chunk_size: 4096,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the codecs cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_size == 0 {
            return Err(CodecError::Config("read_buffer_size must be > 0".to_string()));
        }
        if self.write_buffer_size == 0 {
            return Err(CodecError::Config("write_buffer_size must be > 0".to_string()));
        }
        if self.read_chunk_size == 0 {
            return Err(CodecError::Config("read_chunk_size must be > 0".to_string()));
        }
        if self.max_frame_payload == 0 {
            return Err(CodecError::Config("max_frame_payload must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the buffered reader capacity (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Set the buffered writer capacity (in bytes)
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.config.write_buffer_size = size;
        self
    }

    /// Set the largest accepted bulk string (in bytes)
    pub fn max_bulk_len(mut self, len: usize) -> Self {
        self.config.max_bulk_len = len;
        self
    }

    /// Set the largest accepted array element count
    pub fn max_array_len(mut self, len: usize) -> Self {
        self.config.max_array_len = len;
        self
    }

    /// Set the largest accepted binary frame payload (in bytes)
    pub fn max_frame_payload(mut self, len: u32) -> Self {
        self.config.max_frame_payload = len;
        self
    }

    /// Set the frame reader's per-read chunk size (in bytes)
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
