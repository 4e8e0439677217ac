//! Frame Reader
//!
//! Incremental read loop over a byte source: accumulate bytes, ask the
//! protocol for a frame, read more while it reports an incomplete frame.
//!
//! The first error ends the stream: later reads return the same error and
//! the iterator stops after yielding it.

use std::io::{ErrorKind, Read};
use std::sync::Arc;

use bytes::BytesMut;

use crate::config::Config;
use crate::error::{CodecError, Result};

use super::{Frame, Protocol};

/// Pulls whole frames of one protocol out of a byte source
pub struct FrameReader<R> {
    /// Underlying byte source
    source: R,

    /// Bytes received but not yet decoded
    buffer: BytesMut,

    /// Codec for this connection
    protocol: Arc<dyn Protocol>,

    /// Bytes requested from the source per read
    chunk_size: usize,

    /// First error seen; sticky
    err: Option<CodecError>,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader with the default chunk size
    pub fn new(source: R, protocol: Arc<dyn Protocol>) -> Self {
        Self::with_config(source, protocol, &Config::default())
    }

    pub fn with_config(source: R, protocol: Arc<dyn Protocol>, config: &Config) -> Self {
        let chunk_size = config.read_chunk_size.max(1);
        Self {
            source,
            buffer: BytesMut::with_capacity(chunk_size),
            protocol,
            chunk_size,
            err: None,
        }
    }

    /// Bytes received but not yet decoded
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// The error that ended this stream, if any
    pub fn error(&self) -> Option<&CodecError> {
        self.err.as_ref()
    }

    /// Read the next frame
    ///
    /// Returns `Ok(None)` when the source ends cleanly between frames and
    /// [`CodecError::EndOfStream`] when it ends in the middle of one.
    pub fn next_frame(&mut self) -> Result<Option<Box<dyn Frame>>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let result = self.read_frame();
        if let Err(err) = &result {
            self.err = Some(err.clone());
        }
        result
    }

    fn read_frame(&mut self) -> Result<Option<Box<dyn Frame>>> {
        loop {
            if let Some(frame) = self.protocol.decode(&mut self.buffer)? {
                tracing::trace!(
                    protocol = %self.protocol.name(),
                    remaining = self.buffer.len(),
                    "Frame ready"
                );
                return Ok(Some(frame));
            }

            if self.fill()? == 0 {
                if self.buffer.is_empty() {
                    tracing::debug!(protocol = %self.protocol.name(), "Stream closed");
                    return Ok(None);
                }
                tracing::debug!(
                    protocol = %self.protocol.name(),
                    pending = self.buffer.len(),
                    "Stream closed mid-frame"
                );
                return Err(CodecError::EndOfStream);
            }
        }
    }

    /// One read from the source into the buffer's tail
    fn fill(&mut self) -> Result<usize> {
        let start = self.buffer.len();
        self.buffer.resize(start + self.chunk_size, 0);
        loop {
            match self.source.read(&mut self.buffer[start..]) {
                Ok(n) => {
                    self.buffer.truncate(start + n);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buffer.truncate(start);
                    return Err(e.into());
                }
            }
        }
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Box<dyn Frame>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.err.is_some() {
            return None;
        }
        self.next_frame().transpose()
    }
}
