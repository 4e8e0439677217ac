//! Buffered Writer
//!
//! Fixed-capacity write buffer in front of a `std::io::Write` sink.
//! Small writes are batched; a chunk larger than the whole buffer arriving
//! while the buffer is empty goes straight to the sink. The first error is
//! latched and returned by every later call.

use std::io::Write;

use crate::config::DEFAULT_WRITE_BUFFER_SIZE;
use crate::error::{CodecError, Result};

/// Buffered writer with sticky-error semantics
pub struct BufWriter<W> {
    /// Underlying byte sink
    wr: W,

    /// Fixed-capacity buffer
    buf: Box<[u8]>,

    /// End of pending data
    wpos: usize,

    /// Latched error, if any
    err: Option<CodecError>,
}

impl<W: Write> BufWriter<W> {
    /// Create a writer with the default capacity
    pub fn new(wr: W) -> Self {
        Self::with_capacity(wr, DEFAULT_WRITE_BUFFER_SIZE)
    }

    /// Create a writer with a given capacity (0 selects the default)
    pub fn with_capacity(wr: W, size: usize) -> Self {
        let size = if size == 0 { DEFAULT_WRITE_BUFFER_SIZE } else { size };
        Self {
            wr,
            buf: vec![0u8; size].into_boxed_slice(),
            wpos: 0,
            err: None,
        }
    }

    /// Bytes waiting to be flushed
    pub fn buffered(&self) -> usize {
        self.wpos
    }

    /// Free space left in the buffer
    pub fn available(&self) -> usize {
        self.buf.len() - self.wpos
    }

    /// Total buffer capacity
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Reference to the underlying sink
    pub fn get_ref(&self) -> &W {
        &self.wr
    }

    /// Give back the sink; pending bytes that were never flushed are dropped
    pub fn into_inner(self) -> W {
        self.wr
    }

    /// The latched error, if the writer has failed
    pub fn error(&self) -> Option<&CodecError> {
        self.err.as_ref()
    }

    fn check(&self) -> Result<()> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn latch(&mut self, err: CodecError) -> CodecError {
        self.err = Some(err.clone());
        err
    }

    /// Push pending bytes to the sink
    pub fn flush(&mut self) -> Result<()> {
        self.check()?;
        if self.wpos == 0 {
            return Ok(());
        }
        if let Err(e) = self.wr.write_all(&self.buf[..self.wpos]) {
            return Err(self.latch(e.into()));
        }
        self.wpos = 0;
        Ok(())
    }

    /// Write all of `p`, returning the number of bytes accepted
    pub fn write(&mut self, mut p: &[u8]) -> Result<usize> {
        self.check()?;
        let total = p.len();

        while p.len() > self.available() {
            if self.wpos == 0 {
                // Larger than the whole buffer: skip the copy
                if let Err(e) = self.wr.write_all(p) {
                    return Err(self.latch(e.into()));
                }
                return Ok(total);
            }
            let n = self.available();
            self.buf[self.wpos..].copy_from_slice(&p[..n]);
            self.wpos += n;
            p = &p[n..];
            self.flush()?;
        }

        self.buf[self.wpos..self.wpos + p.len()].copy_from_slice(p);
        self.wpos += p.len();
        Ok(total)
    }

    /// Write a single byte
    pub fn write_byte(&mut self, c: u8) -> Result<()> {
        self.check()?;
        if self.available() == 0 {
            self.flush()?;
        }
        self.buf[self.wpos] = c;
        self.wpos += 1;
        Ok(())
    }

    /// Write a string's bytes
    ///
    /// Unlike [`write`](Self::write), long strings are always copied through
    /// the buffer in buffer-sized pieces.
    pub fn write_str(&mut self, s: &str) -> Result<usize> {
        self.check()?;
        let mut p = s.as_bytes();
        let total = p.len();

        while p.len() > self.available() {
            let n = self.available();
            self.buf[self.wpos..].copy_from_slice(&p[..n]);
            self.wpos += n;
            p = &p[n..];
            self.flush()?;
        }

        self.buf[self.wpos..self.wpos + p.len()].copy_from_slice(p);
        self.wpos += p.len();
        Ok(total)
    }
}
