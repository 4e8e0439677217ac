//! Buffered Reader
//!
//! Fixed-capacity read buffer in front of a `std::io::Read` source.
//!
//! ## Buffer Layout
//! ```text
//! 0          rpos             wpos          capacity
//! ├──────────┼────────────────┼─────────────┤
//! │ consumed │  unread bytes  │  free tail  │
//! └──────────┴────────────────┴─────────────┘
//! ```
//!
//! A refill shifts the unread bytes to offset 0, then issues exactly one
//! read into the free tail. The first error is latched: every later call
//! returns it without touching the source again.

use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use memchr::memchr;

use crate::config::DEFAULT_READ_BUFFER_SIZE;
use crate::error::{CodecError, Result};

use super::SliceAlloc;

/// Buffered reader with delimiter scans and arena-backed owned reads
pub struct BufReader<R> {
    /// Underlying byte source
    rd: R,

    /// Fixed-capacity buffer
    buf: Box<[u8]>,

    /// Start of unread data
    rpos: usize,

    /// End of unread data
    wpos: usize,

    /// Total bytes pulled from the source
    nread: u64,

    /// Latched error, if any
    err: Option<CodecError>,

    /// Backing storage for owned slices
    slice: SliceAlloc,
}

impl<R: Read> BufReader<R> {
    /// Create a reader with the default capacity
    pub fn new(rd: R) -> Self {
        Self::with_capacity(rd, DEFAULT_READ_BUFFER_SIZE)
    }

    /// Create a reader with a given capacity (0 selects the default)
    pub fn with_capacity(rd: R, size: usize) -> Self {
        let size = if size == 0 { DEFAULT_READ_BUFFER_SIZE } else { size };
        Self {
            rd,
            buf: vec![0u8; size].into_boxed_slice(),
            rpos: 0,
            wpos: 0,
            nread: 0,
            err: None,
            slice: SliceAlloc::new(),
        }
    }

    /// Number of unread bytes held in the buffer
    pub fn buffered(&self) -> usize {
        self.wpos - self.rpos
    }

    /// Bytes handed to callers since the reader was created
    pub fn position(&self) -> u64 {
        self.nread - self.buffered() as u64
    }

    /// Total buffer capacity
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Reference to the underlying source
    pub fn get_ref(&self) -> &R {
        &self.rd
    }

    /// The latched error, if the reader has failed
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

    /// Compact and pull one read's worth of bytes from the source
    fn fill(&mut self) -> Result<()> {
        self.check()?;

        if self.rpos > 0 {
            self.buf.copy_within(self.rpos..self.wpos, 0);
            self.wpos -= self.rpos;
            self.rpos = 0;
        }

        loop {
            match self.rd.read(&mut self.buf[self.wpos..]) {
                Ok(0) => return Err(self.latch(CodecError::EndOfStream)),
                Ok(n) => {
                    self.wpos += n;
                    self.nread += n as u64;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.latch(e.into())),
            }
        }
    }

    /// Copy up to `dst.len()` bytes into `dst`
    ///
    /// When nothing is buffered and `dst` is at least as large as the
    /// internal buffer, the source reads straight into `dst`.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.check()?;
        if dst.is_empty() {
            return Ok(0);
        }

        if self.buffered() == 0 {
            if dst.len() >= self.buf.len() {
                loop {
                    match self.rd.read(dst) {
                        Ok(0) => return Err(self.latch(CodecError::EndOfStream)),
                        Ok(n) => {
                            self.nread += n as u64;
                            return Ok(n);
                        }
                        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                        Err(e) => return Err(self.latch(e.into())),
                    }
                }
            }
            self.fill()?;
        }

        let n = dst.len().min(self.buffered());
        dst[..n].copy_from_slice(&self.buf[self.rpos..self.rpos + n]);
        self.rpos += n;
        Ok(n)
    }

    /// Read a single byte
    pub fn read_byte(&mut self) -> Result<u8> {
        let c = self.peek_byte()?;
        self.rpos += 1;
        Ok(c)
    }

    /// Look at the next byte without consuming it
    pub fn peek_byte(&mut self) -> Result<u8> {
        self.check()?;
        if self.buffered() == 0 {
            self.fill()?;
        }
        Ok(self.buf[self.rpos])
    }

    /// Locate the end (exclusive) of the next `delim`-terminated record
    ///
    /// Returns `None` when the buffer is completely full without a delimiter.
    fn scan(&mut self, delim: u8) -> Result<Option<usize>> {
        self.check()?;
        loop {
            if let Some(i) = memchr(delim, &self.buf[self.rpos..self.wpos]) {
                return Ok(Some(self.rpos + i + 1));
            }
            if self.buffered() == self.buf.len() {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    /// Borrow the bytes up to and including the next `delim`
    ///
    /// Fails with [`CodecError::BufferFull`] if the whole buffer holds no
    /// delimiter; nothing is consumed in that case, so callers can fall back
    /// to [`read_bytes`](Self::read_bytes).
    pub fn read_slice(&mut self, delim: u8) -> Result<&[u8]> {
        match self.scan(delim)? {
            Some(end) => {
                let start = self.rpos;
                self.rpos = end;
                Ok(&self.buf[start..end])
            }
            None => Err(CodecError::BufferFull),
        }
    }

    /// Read the bytes up to and including the next `delim` into an owned slice
    ///
    /// Works for records of any length regardless of buffer capacity.
    pub fn read_bytes(&mut self, delim: u8) -> Result<BytesMut> {
        let mut full: Vec<BytesMut> = Vec::new();
        let mut size = 0;

        let end = loop {
            match self.scan(delim)? {
                Some(end) => break end,
                None => {
                    let frag = self.slice.copy_from(&self.buf[self.rpos..self.wpos]);
                    self.rpos = self.wpos;
                    size += frag.len();
                    full.push(frag);
                }
            }
        };
        size += end - self.rpos;

        let mut out = self.slice.make(size);
        let mut n = 0;
        for frag in &full {
            out[n..n + frag.len()].copy_from_slice(frag);
            n += frag.len();
        }
        out[n..].copy_from_slice(&self.buf[self.rpos..end]);
        self.rpos = end;

        Ok(out)
    }

    /// Read exactly `n` bytes into an owned slice
    pub fn read_full(&mut self, n: usize) -> Result<BytesMut> {
        self.check()?;
        let mut out = self.slice.make(n);
        let mut filled = 0;
        while filled < n {
            filled += self.read(&mut out[filled..])?;
        }
        Ok(out)
    }
}
